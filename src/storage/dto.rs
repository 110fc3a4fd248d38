//! The JSON representation of records.
//!
//! These types are deliberately duplicated in order to provide loose coupling between the domain type and the on-disk
//! representation.

use std::fmt;

use serde::{
    Deserialize, Deserializer, Serialize,
    de::{IgnoredAny, MapAccess, Visitor},
};

use crate::Record;

/// A record as it appears in the store file.
///
/// Keys are written capitalised. When reading, keys match regardless of case, so
/// `{"id": "1", "email": "e@test.com", "age": 23}` decodes the same as the stored form. If a key appears more than
/// once the last value wins, a `null` value leaves the field at its default, and unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JsonRecord {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "Email")]
    email: String,
    #[serde(rename = "Age")]
    age: i64,
}

impl<'de> Deserialize<'de> for JsonRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(JsonRecordVisitor)
    }
}

struct JsonRecordVisitor;

impl<'de> Visitor<'de> for JsonRecordVisitor {
    type Value = JsonRecord;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object with Id, Email and Age keys")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut record = JsonRecord::default();

        while let Some(key) = map.next_key::<String>()? {
            match key.to_lowercase().as_str() {
                "id" => {
                    if let Some(id) = map.next_value::<Option<String>>()? {
                        record.id = id;
                    }
                }
                "email" => {
                    if let Some(email) = map.next_value::<Option<String>>()? {
                        record.email = email;
                    }
                }
                "age" => {
                    if let Some(age) = map.next_value::<Option<i64>>()? {
                        record.age = age;
                    }
                }
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        Ok(record)
    }
}

/// Errors raised while decoding records.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The input is not JSON of the expected shape.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A new record has a missing or empty id.
    #[error("record has no id")]
    EmptyId,
}

impl From<JsonRecord> for Record {
    fn from(json: JsonRecord) -> Self {
        let JsonRecord { id, email, age } = json;
        Self::new(id, email, age)
    }
}

impl From<&Record> for JsonRecord {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id().to_owned(),
            email: record.email().to_owned(),
            age: record.age(),
        }
    }
}

/// Decode a single record from a JSON object, such as the payload passed to `add`.
///
/// # Errors
///
/// Returns an error if the payload is not a JSON object of the right shape, or if it has no `id`.
pub fn parse_item(payload: &str) -> Result<Record, DecodeError> {
    let json: JsonRecord = serde_json::from_str(payload)?;
    if json.id.is_empty() {
        return Err(DecodeError::EmptyId);
    }
    Ok(json.into())
}

/// Decode the full contents of the store file.
///
/// An empty file, or one holding `null`, is an empty store. Stored records are not validated.
pub(crate) fn decode_records(bytes: &[u8]) -> Result<Vec<Record>, DecodeError> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    let records = serde_json::from_slice::<Option<Vec<JsonRecord>>>(bytes)?.unwrap_or_default();
    Ok(records.into_iter().map(Record::from).collect())
}

/// Encode the store as a compact JSON array.
pub(crate) fn encode_records(records: &[Record]) -> serde_json::Result<Vec<u8>> {
    let json: Vec<JsonRecord> = records.iter().map(JsonRecord::from).collect();
    serde_json::to_vec(&json)
}

/// Encode a single record as a compact JSON object.
pub(crate) fn encode_record(record: &Record) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(&JsonRecord::from(record))
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(r#"{"id":"1","email":"e@test.com","age":23}"# ; "lowercase")]
    #[test_case(r#"{"Id":"1","Email":"e@test.com","Age":23}"# ; "capitalised")]
    #[test_case(r#"{"ID":"1","EMAIL":"e@test.com","AGE":23}"# ; "uppercase")]
    #[test_case(r#"{"iD":"1","eMail":"e@test.com","aGe":23}"# ; "mixed case")]
    #[test_case(r#"{"Id":"0","id":"1","email":"e@test.com","age":23}"# ; "repeated key last wins")]
    #[test_case(r#"{"id":"1","email":"old@test.com","EMAIL":"e@test.com","age":23}"# ; "repeated key in other case")]
    #[test_case(r#"{"id":"1","email":"e@test.com","Age":null,"age":23}"# ; "null then value")]
    #[test_case(r#"{ "id": "1", "email": "e@test.com", "age": 23, "extra": true }"# ; "unknown keys ignored")]
    fn parse_payload(payload: &str) {
        let record = parse_item(payload).unwrap();
        assert!(record.has_id("1"));
        assert_eq!(record.email(), "e@test.com");
        assert_eq!(record.age(), 23);
    }

    #[test]
    fn mixed_case_keys_are_not_dropped() {
        let record = parse_item(r#"{"id":"1","eMail":"x@y.com","Age":3}"#).unwrap();
        assert_eq!(record.email(), "x@y.com");
        assert_eq!(record.age(), 3);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let record = parse_item(r#"{"id":"7"}"#).unwrap();
        assert_eq!(record.email(), "");
        assert_eq!(record.age(), 0);
    }

    #[test_case(r#"{"email":"e@test.com","age":23}"# ; "missing id")]
    #[test_case(r#"{"id":"","email":"e@test.com","age":23}"# ; "empty id")]
    #[test_case(r#"{"id":null,"email":"e@test.com","age":23}"# ; "null id")]
    #[test_case(r#"{"id":"1","Id":""}"# ; "id overwritten by empty")]
    fn payload_without_id(payload: &str) {
        assert!(matches!(parse_item(payload), Err(DecodeError::EmptyId)));
    }

    #[test_case("not json")]
    #[test_case(r#"{"id":1}"# ; "numeric id")]
    #[test_case(r#"{"id":"1","age":"old"}"# ; "string age")]
    #[test_case(r#"[{"id":"1"}]"# ; "array")]
    fn malformed_payload(payload: &str) {
        assert!(matches!(parse_item(payload), Err(DecodeError::Json(_))));
    }

    #[test]
    fn encodes_capitalised_compact_array() {
        let records = vec![
            parse_item(r#"{"id":"1","email":"a@b.com","age":30}"#).unwrap(),
            parse_item(r#"{"id":"2","email":"c@d.com","age":41}"#).unwrap(),
        ];

        let bytes = encode_records(&records).unwrap();

        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"[{"Id":"1","Email":"a@b.com","Age":30},{"Id":"2","Email":"c@d.com","Age":41}]"#
        );
    }

    #[test]
    fn empty_file_is_empty_store() {
        assert!(decode_records(b"").unwrap().is_empty());
        assert!(decode_records(b"[]").unwrap().is_empty());
    }

    #[test]
    fn stored_record_without_id_is_kept() {
        let content = br#"[{"Id":"","Email":"x","Age":1},{"Email":"y"},{"Id":"1"}]"#;

        let records = decode_records(content).unwrap();

        let ids: Vec<&str> = records.iter().map(Record::id).collect();
        assert_eq!(ids, ["", "", "1"]);
    }

    #[test]
    fn null_file_is_empty_store() {
        assert!(decode_records(b"null").unwrap().is_empty());
    }

    #[test]
    fn object_is_not_a_store() {
        let result = decode_records(br#"{"Id":"1"}"#);
        assert!(matches!(result, Err(DecodeError::Json(_))));
    }
}

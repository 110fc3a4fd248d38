/// A single entry in the store.
///
/// Identity is the `id`. A new record must have a non-empty id and one that isn't already stored; records already in
/// the store are taken as they are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    id: String,
    email: String,
    age: i64,
}

impl Record {
    /// Create a new record.
    #[must_use]
    pub const fn new(id: String, email: String, age: i64) -> Self {
        Self { id, email, age }
    }

    /// The identifier of the record.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The email address stored with the record.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// The age stored with the record.
    #[must_use]
    pub const fn age(&self) -> i64 {
        self.age
    }

    /// Returns true if this record has the given id.
    #[must_use]
    pub fn has_id(&self, id: &str) -> bool {
        self.id == id
    }
}

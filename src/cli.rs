use std::{
    ffi::{OsStr, OsString},
    io,
};

use recstore::{Arguments, perform};

/// Long flags that take a value. These may also be written with a single leading dash, as in `-operation add`.
const VALUE_FLAGS: &[&str] = &["operation", "item", "fileName", "file-name", "id"];

/// Long flags without a value that may be written with a single leading dash.
const SWITCH_FLAGS: &[&str] = &["help"];

/// Keep id/email/age records in a JSON file.
#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Possible values: 'add', 'list', 'findById', 'remove'
    #[arg(long, allow_hyphen_values = true)]
    operation: Option<String>,

    /// Usage example: '{"id": "1", "email": "email@test.com", "age": 23}'
    #[arg(long, allow_hyphen_values = true)]
    item: Option<String>,

    /// Usage example: 'users.json'
    #[arg(long = "fileName", alias = "file-name", allow_hyphen_values = true)]
    file_name: Option<String>,

    /// The id to find or remove
    #[arg(long, allow_hyphen_values = true)]
    id: Option<String>,
}

impl Cli {
    /// Parse the process arguments, accepting both `-flag` and `--flag` spellings.
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse_from(normalize(std::env::args_os()))
    }

    /// Validate the inputs and run the operation against standard output.
    ///
    /// Invalid inputs are returned as an error. Failures inside the operation are logged and otherwise ignored, so
    /// the process still exits successfully.
    pub fn run(self) -> anyhow::Result<()> {
        let invocation = Arguments::from(self).validate()?;

        let mut stdout = io::stdout().lock();
        if let Err(e) = perform(&invocation, &mut stdout) {
            tracing::error!("{} failed: {e}", invocation.operation());
        }

        Ok(())
    }
}

impl From<Cli> for Arguments {
    fn from(cli: Cli) -> Self {
        Self {
            operation: cli.operation,
            item: cli.item,
            file_name: cli.file_name,
            id: cli.id,
        }
    }
}

/// A recognised long flag, as written on the command line.
struct LongFlag {
    single_dash: bool,
    /// The next argument is this flag's value.
    takes_next: bool,
}

/// Rewrite single-dash long flags (`-fileName x`, `-fileName=x`) to their double-dash form.
///
/// The argument following a value-taking flag is its value and is never rewritten, even if it looks like a flag.
fn normalize(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    let mut value_next = false;
    let mut normalized = Vec::new();

    for arg in args {
        if std::mem::take(&mut value_next) {
            normalized.push(arg);
            continue;
        }
        match long_flag(&arg) {
            Some(flag) => {
                value_next = flag.takes_next;
                if flag.single_dash {
                    let mut long = OsString::from("-");
                    long.push(&arg);
                    normalized.push(long);
                } else {
                    normalized.push(arg);
                }
            }
            None => normalized.push(arg),
        }
    }

    normalized
}

fn long_flag(arg: &OsStr) -> Option<LongFlag> {
    let arg = arg.to_str()?;
    let (single_dash, flag) = match arg.strip_prefix("--") {
        Some(flag) => (false, flag),
        None => (true, arg.strip_prefix('-')?),
    };
    let (name, inline_value) = flag
        .split_once('=')
        .map_or((flag, false), |(name, _)| (name, true));

    if VALUE_FLAGS.contains(&name) {
        Some(LongFlag {
            single_dash,
            takes_next: !inline_value,
        })
    } else if SWITCH_FLAGS.contains(&name) {
        Some(LongFlag {
            single_dash,
            takes_next: false,
        })
    } else {
        None
    }
}

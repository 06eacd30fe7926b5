//! Console command handling.
//!
//! Two commands are understood: `status` prints a one-shot summary of the
//! link, `set` inspects or updates runtime settings. Anything else gets a
//! usage line. Replies are returned to the caller, an empty reply means
//! nothing should be printed.

use crate::modem::ModemLink;
use crate::scheduler::Reporter;

const USAGE: &str = "usage: status | set <option> <value>";

pub fn handle<L: ModemLink>(
    reporter: &mut Reporter<L>,
    now_ms: u64,
    line: &str,
) -> String {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return String::new();
    };
    match command {
        "status" => reporter.describe(now_ms),
        "set" => match (words.next(), words.next()) {
            (None, _) => reporter.settings().render(),
            (Some(option), Some(value)) => {
                match reporter.settings_mut().set(option, value) {
                    Ok(()) => String::new(),
                    Err(err) => err.to_string(),
                }
            }
            (Some(_), None) => "usage: set <option> <value>".to_owned(),
        },
        _ => USAGE.to_owned(),
    }
}

//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Natural-language task parsing prompt
pub const PARSE_TASK: &str = include_str!("../../prompts/parse-task.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "parse-task" => Some(PARSE_TASK),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}

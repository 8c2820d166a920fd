//! Schema validation for decoded model output
//!
//! Out-of-schema fields are repaired with fixed defaults rather than
//! rejected. Only a non-object root is an error; there is nothing to repair.

use serde_json::Value;
use tracing::debug;

use super::ParseError;
use crate::domain::{Category, ParsedTask, Priority};

/// Turn a decoded response into a `ParsedTask`
///
/// - `category` missing or outside {Study, Work, Life, Other} becomes `Other`
/// - `priority` missing or not the integer 1, 2 or 3 becomes `2`
/// - `title` missing, blank or not a string becomes `user_input`, untrimmed
/// - `subtasks` is passed through in order; see `subtask_list`
pub fn validate(value: Value, user_input: &str) -> Result<ParsedTask, ParseError> {
    let mut obj = match value {
        Value::Object(obj) => obj,
        other => return Err(ParseError::Schema(format!("expected a JSON object, got {}", kind(&other)))),
    };

    let category = obj.get("category").and_then(Category::from_json).unwrap_or_else(|| {
        debug!(raw = ?obj.get("category"), "validate: category replaced");
        Category::Other
    });

    let priority = obj.get("priority").and_then(Priority::from_json).unwrap_or_else(|| {
        debug!(raw = ?obj.get("priority"), "validate: priority replaced");
        Priority::Medium
    });

    let title = match obj.remove("title") {
        Some(Value::String(s)) if !s.trim().is_empty() => s,
        raw => {
            debug!(?raw, "validate: title replaced with input");
            user_input.to_string()
        }
    };

    let subtasks = obj.remove("subtasks").and_then(subtask_list);

    Ok(ParsedTask {
        title,
        category,
        priority,
        subtasks,
    })
}

/// Read `subtasks` without rejecting the response
///
/// A list keeps its order: strings verbatim, `null` items dropped, other
/// items as their JSON text. A bare non-blank string is a one-item list.
/// Anything else counts as absent.
fn subtask_list(value: Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Null => None,
                    Value::String(s) => Some(s),
                    other => Some(other.to_string()),
                })
                .collect(),
        ),
        Value::String(s) if !s.trim().is_empty() => Some(vec![s]),
        other => {
            debug!(raw = ?other, "validate: subtasks dropped");
            None
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

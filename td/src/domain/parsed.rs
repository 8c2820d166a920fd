//! The structured result of parsing a task description

use serde::{Deserialize, Serialize};

use super::{Category, Priority};

/// A validated task proposal
///
/// Every value of this type satisfies the schema: `category` and `priority`
/// are closed enums and `title` is never blank. `subtasks` is `None` (and
/// omitted from JSON) on the fallback path and when the model sent no list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTask {
    pub title: String,
    pub category: Category,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtasks: Option<Vec<String>>,
}

impl ParsedTask {
    /// The minimal result derived only from the user's own words
    pub fn fallback(user_input: &str) -> Self {
        Self {
            title: user_input.to_string(),
            category: Category::Other,
            priority: Priority::Medium,
            subtasks: None,
        }
    }
}

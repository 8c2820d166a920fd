//! Task categories

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The fixed set of task categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Category {
    Study,
    Work,
    Life,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 4] = [Category::Study, Category::Work, Category::Life, Category::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Study => "Study",
            Self::Work => "Work",
            Self::Life => "Life",
            Self::Other => "Other",
        }
    }

    /// Exact, case-sensitive match of a JSON string
    pub fn from_json(value: &Value) -> Option<Self> {
        value.as_str().and_then(|s| s.parse().ok())
    }

    /// Any text outside the set becomes `Other`
    pub fn coerce(text: &str) -> Self {
        text.parse().unwrap_or_default()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

//! Priority levels for tasks

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Task priority, serialized as the integer 1 (high), 2 (medium) or 3 (low)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(into = "u8", try_from = "u8")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_u8(self) -> u8 {
        match self {
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }

    /// Strict read of a JSON value: only the integers 1, 2 and 3 are accepted
    pub fn from_json(value: &Value) -> Option<Self> {
        value.as_u64().and_then(|n| u8::try_from(n).ok()).and_then(|n| Self::try_from(n).ok())
    }

    /// Lenient read used for user edits: integers, floats (truncated) and
    /// numeric strings; anything else or out of range is `Medium`
    pub fn from_loose(value: &Value) -> Self {
        let number = match value {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        number
            .and_then(|n| u8::try_from(n).ok())
            .and_then(|n| Self::try_from(n).ok())
            .unwrap_or_default()
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.as_u8()
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::High),
            2 => Ok(Self::Medium),
            3 => Ok(Self::Low),
            other => Err(format!("Unknown priority: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::High < Priority::Medium);
        assert!(Priority::Medium < Priority::Low);
    }

    #[test]
    fn test_priority_serde_is_numeric() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "1");
        assert_eq!(serde_json::from_str::<Priority>("3").unwrap(), Priority::Low);
        assert!(serde_json::from_str::<Priority>("4").is_err());
    }

    #[test]
    fn test_from_json_is_strict() {
        assert_eq!(Priority::from_json(&json!(1)), Some(Priority::High));
        assert_eq!(Priority::from_json(&json!(3)), Some(Priority::Low));
        assert_eq!(Priority::from_json(&json!(0)), None);
        assert_eq!(Priority::from_json(&json!(9)), None);
        assert_eq!(Priority::from_json(&json!(-1)), None);
        assert_eq!(Priority::from_json(&json!(1.5)), None);
        assert_eq!(Priority::from_json(&json!("1")), None);
        assert_eq!(Priority::from_json(&json!(true)), None);
        assert_eq!(Priority::from_json(&json!(257)), None);
    }

    #[test]
    fn test_from_loose() {
        assert_eq!(Priority::from_loose(&json!(1)), Priority::High);
        assert_eq!(Priority::from_loose(&json!("3")), Priority::Low);
        assert_eq!(Priority::from_loose(&json!(" 1 ")), Priority::High);
        assert_eq!(Priority::from_loose(&json!(3.9)), Priority::Low);
        assert_eq!(Priority::from_loose(&json!("high")), Priority::Medium);
        assert_eq!(Priority::from_loose(&json!(7)), Priority::Medium);
        assert_eq!(Priority::from_loose(&json!(null)), Priority::Medium);
    }
}

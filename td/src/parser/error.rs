//! Parse pipeline error types

use thiserror::Error;

use crate::llm::LlmError;

/// Why a parse attempt fell back
///
/// Never surfaces past `TaskParser::parse_task`; it exists so the failure
/// can be logged with the stage that produced it.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to build prompt: {0}")]
    Prompt(String),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Model returned no text content")]
    EmptyResponse,

    #[error("Response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Response does not match the task schema: {0}")]
    Schema(String),
}

impl ParseError {
    /// Pipeline stage name for logs
    pub fn stage(&self) -> &'static str {
        match self {
            ParseError::Prompt(_) => "prompt",
            ParseError::Llm(_) => "llm",
            ParseError::EmptyResponse => "response",
            ParseError::Decode(_) => "decode",
            ParseError::Schema(_) => "validate",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_stage_names() {
        assert_eq!(ParseError::Llm(LlmError::Timeout(Duration::from_secs(20))).stage(), "llm");
        assert_eq!(ParseError::EmptyResponse.stage(), "response");
        assert_eq!(ParseError::Schema("x".to_string()).stage(), "validate");

        let decode = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        assert_eq!(ParseError::from(decode).stage(), "decode");
    }

    #[test]
    fn test_llm_error_is_transparent() {
        let err = ParseError::from(LlmError::Timeout(Duration::from_secs(20)));
        assert_eq!(err.to_string(), "Timeout after 20s");
    }
}

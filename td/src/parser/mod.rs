//! TaskParser - natural-language task descriptions into structured tasks
//!
//! Pipeline: prompt -> LLM call -> fence stripping -> JSON decode -> schema
//! validation. Any stage failing short-circuits to `ParsedTask::fallback`,
//! so `parse_task` is total: it always returns a schema-valid task.

use std::sync::Arc;

use tracing::{debug, info, warn};

mod error;
mod sanitize;
mod validate;

pub use error::ParseError;
pub use sanitize::strip_code_fence;
pub use validate::validate;

use crate::config::LlmConfig;
use crate::domain::ParsedTask;
use crate::llm::{CompletionRequest, LlmClient, Message, StopReason};
use crate::prompts::PromptLoader;

/// Input used by the connection self-test
pub const TEST_INPUT: &str = "test";

/// Parses task descriptions with an LLM
///
/// Holds no per-request state; one instance serves all concurrent requests.
pub struct TaskParser {
    llm: Arc<dyn LlmClient>,
    prompts: PromptLoader,
    max_tokens: u32,
    temperature: f32,
}

impl TaskParser {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: PromptLoader, config: &LlmConfig) -> Self {
        debug!(max_tokens = config.max_tokens, temperature = config.temperature, "TaskParser::new: called");
        Self {
            llm,
            prompts,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Parse a task description, falling back to a plain task on any failure
    pub async fn parse_task(&self, user_input: &str) -> ParsedTask {
        info!(%user_input, "Parsing task");
        match self.try_parse(user_input).await {
            Ok(task) => {
                info!(?task, "Parsed task");
                task
            }
            Err(e) => {
                warn!(stage = e.stage(), error = %e, "Task parse failed, using fallback");
                ParsedTask::fallback(user_input)
            }
        }
    }

    /// Run the pipeline, reporting which stage failed
    pub async fn try_parse(&self, user_input: &str) -> Result<ParsedTask, ParseError> {
        let system_prompt = self
            .prompts
            .build_system_prompt()
            .map_err(|e| ParseError::Prompt(e.to_string()))?;
        debug!(prompt_len = system_prompt.len(), "try_parse: prompt built");

        let request = CompletionRequest {
            system_prompt,
            messages: vec![Message::user(user_input)],
            max_tokens: self.max_tokens,
            temperature: Some(self.temperature),
        };

        let response = self.llm.complete(request).await?;
        if response.stop_reason == StopReason::MaxTokens {
            warn!(max_tokens = self.max_tokens, "try_parse: response hit the token limit");
        }

        let raw = response.content.ok_or(ParseError::EmptyResponse)?;
        debug!(%raw, "try_parse: raw response");

        let cleaned = strip_code_fence(&raw);
        debug!(%cleaned, "try_parse: cleaned response");

        let value: serde_json::Value = serde_json::from_str(cleaned)?;
        validate(value, user_input)
    }

    /// One trial parse; reports the outcome instead of failing
    pub async fn test_connection(&self) -> (bool, String) {
        debug!("test_connection: called");
        match self.try_parse(TEST_INPUT).await {
            Ok(_) => (true, "AI connection OK".to_string()),
            Err(e) => {
                warn!(stage = e.stage(), error = %e, "AI connection test failed");
                (false, format!("AI connection failed: {}", e))
            }
        }
    }
}

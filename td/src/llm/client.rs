//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless LLM client - each call is independent (fresh context)
///
/// Implementations are built once at startup and shared by `Arc`; a call
/// owns its own request and response buffers, so concurrent calls need no
/// coordination.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request and wait for the full response
    ///
    /// Errors are returned as-is; callers decide what a failure means.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

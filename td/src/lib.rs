//! tododesk - session-scoped task list with LLM-assisted task parsing
//!
//! Users keep a task list scoped to an anonymous browser session. Free-text
//! descriptions can be turned into structured tasks by an OpenAI-compatible
//! model; when the model misbehaves the parser falls back to a plain task, so
//! a parse always yields something the user can save.
//!
//! # Modules
//!
//! - [`parser`] - prompt -> LLM -> fence stripping -> decode -> validation
//! - [`llm`] - LLM client trait and OpenAI-compatible implementation
//! - [`prompts`] - Handlebars prompt templates with override directory
//! - [`domain`] - `ParsedTask`, `Priority`, `Category`
//! - [`server`] - axum JSON API with cookie sessions
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod llm;
pub mod parser;
pub mod prompts;
pub mod server;

// Re-export commonly used types
pub use config::{Config, LlmConfig};
pub use domain::{Category, ParsedTask, Priority};
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, OpenAIClient, create_client};
pub use parser::{ParseError, TaskParser};
pub use prompts::PromptLoader;
pub use server::{AppState, build_router};

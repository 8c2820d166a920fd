//! LLM-backed routes and the session debug view

use axum::Json;
use axum::extract::{Extension, State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use super::AppState;
use super::error::ApiError;
use super::session::SessionId;
use crate::domain::ParsedTask;

#[derive(Debug, Deserialize)]
pub struct AiParseBody {
    #[serde(default)]
    input: Option<String>,
}

/// POST /api/ai-parse
///
/// Never fails once the input is accepted: the parser falls back on its own.
pub async fn ai_parse(
    State(state): State<AppState>,
    Json(body): Json<AiParseBody>,
) -> Result<Json<ParsedTask>, ApiError> {
    let input = body.input.as_deref().unwrap_or_default().trim();
    if input.is_empty() {
        return Err(ApiError::BadRequest("Input is required".to_string()));
    }
    debug!(%input, "ai_parse: called");

    Ok(Json(state.parser.parse_task(input).await))
}

/// GET /api/test-ai
pub async fn test_ai(State(state): State<AppState>) -> Json<Value> {
    let (success, message) = state.parser.test_connection().await;
    Json(json!({ "success": success, "message": message }))
}

/// GET /api/debug
pub async fn debug_info(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Result<Json<Value>, ApiError> {
    let task_count = state.store.count_tasks(session.as_str())?;
    Ok(Json(json!({
        "session_id": session.as_str(),
        "task_count": task_count,
        "ai_provider": state.provider,
    })))
}

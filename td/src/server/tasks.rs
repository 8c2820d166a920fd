//! Task and subtask CRUD routes
//!
//! Edits are lenient: bad priorities become medium, unknown categories
//! become `Other`, and a blank title is stored as a single space.

use axum::Json;
use axum::extract::{Extension, Path, State};
use serde::Deserialize;
use serde_json::{Value, json};
use taskstore::{NewTask, TaskId, TaskRecord};
use tracing::debug;

use super::error::ApiError;
use super::session::SessionId;
use super::AppState;
use crate::domain::{Category, Priority};

/// Stored instead of an empty title on edits
const BLANK_TITLE: &str = " ";

#[derive(Debug, Deserialize)]
pub struct CreateTaskBody {
    title: Option<Value>,
    priority: Option<Value>,
    category: Option<Value>,
    subtasks: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskBody {
    completed: Option<Value>,
    title: Option<Value>,
    priority: Option<Value>,
    category: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct AddSubtaskBody {
    title: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSubtaskBody {
    completed: Option<Value>,
    title: Option<Value>,
}

/// JSON scalars as text; `null` as empty
fn text_of(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `true` and non-zero numbers count as completed
fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}

fn edited_title(value: &Value) -> String {
    let title = text_of(value).trim().to_string();
    if title.is_empty() { BLANK_TITLE.to_string() } else { title }
}

fn category_of(value: &Value) -> Category {
    Category::coerce(text_of(value).trim())
}

/// GET /api/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Result<Json<Vec<TaskRecord>>, ApiError> {
    Ok(Json(state.store.list_tasks(session.as_str())?))
}

/// POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Json(body): Json<CreateTaskBody>,
) -> Result<Json<Value>, ApiError> {
    let title = body.title.as_ref().map(text_of).unwrap_or_default().trim().to_string();
    if title.is_empty() {
        return Err(ApiError::BadRequest("Title is required".to_string()));
    }

    let subtasks = match &body.subtasks {
        Some(Value::Array(items)) => items.iter().map(text_of).collect(),
        _ => Vec::new(),
    };

    let task = NewTask {
        title,
        priority: body.priority.as_ref().map(Priority::from_loose).unwrap_or_default().as_u8(),
        category: body.category.as_ref().map(category_of).unwrap_or_default().to_string(),
        subtasks,
    };
    debug!(?task, "create_task: inserting");

    let task_id = state.store.create_task(session.as_str(), &task)?;
    Ok(Json(json!({ "success": true, "task_id": task_id })))
}

/// PATCH /api/tasks/{id}
pub async fn update_task(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Path(task_id): Path<TaskId>,
    Json(body): Json<UpdateTaskBody>,
) -> Result<Json<Value>, ApiError> {
    let store = &state.store;
    let session = session.as_str();

    if let Some(completed) = &body.completed {
        store.update_task_status(session, task_id, truthy(completed))?;
    }
    if let Some(title) = &body.title {
        store.update_task_title(session, task_id, &edited_title(title))?;
    }
    if let Some(priority) = &body.priority {
        store.update_task_priority(session, task_id, Priority::from_loose(priority).as_u8())?;
    }
    if let Some(category) = &body.category {
        store.update_task_category(session, task_id, category_of(category).as_str())?;
    }

    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/tasks/{id}
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Path(task_id): Path<TaskId>,
) -> Result<Json<Value>, ApiError> {
    state.store.delete_task(session.as_str(), task_id)?;
    Ok(Json(json!({ "success": true })))
}

/// POST /api/tasks/{id}/subtasks
///
/// A blank title is not an error: nothing is created and `id` is null.
pub async fn add_subtask(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Path(task_id): Path<TaskId>,
    Json(body): Json<AddSubtaskBody>,
) -> Result<Json<Value>, ApiError> {
    let title = body.title.as_ref().map(text_of).unwrap_or_default().trim().to_string();
    if title.is_empty() {
        return Ok(Json(json!({ "success": true, "id": null })));
    }

    let id = state.store.create_subtask(session.as_str(), task_id, &title)?;
    Ok(Json(json!({ "success": true, "id": id })))
}

/// PATCH /api/subtasks/{id}
pub async fn update_subtask(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Path(subtask_id): Path<TaskId>,
    Json(body): Json<UpdateSubtaskBody>,
) -> Result<Json<Value>, ApiError> {
    let store = &state.store;
    let session = session.as_str();

    if let Some(completed) = &body.completed {
        store.update_subtask_status(session, subtask_id, truthy(completed))?;
    }
    if let Some(title) = &body.title {
        store.update_subtask_title(session, subtask_id, &edited_title(title))?;
    }

    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/subtasks/{id}
pub async fn delete_subtask(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Path(subtask_id): Path<TaskId>,
) -> Result<Json<Value>, ApiError> {
    state.store.delete_subtask(session.as_str(), subtask_id)?;
    Ok(Json(json!({ "success": true })))
}

//! HTTP API
//!
//! JSON routes over the task store and the task parser. Every request passes
//! through `session_layer`, so handlers can always extract a `SessionId`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, patch, post};
use eyre::{Context, Result};
use taskstore::TaskStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

mod ai;
mod error;
mod session;
mod tasks;

pub use error::ApiError;
pub use session::{CookieSettings, SESSION_COOKIE, SessionId};

use crate::parser::TaskParser;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: TaskStore,
    pub parser: Arc<TaskParser>,
    /// Reported by `/api/debug`
    pub provider: String,
    pub cookies: Arc<CookieSettings>,
}

/// Assemble the API router
pub fn build_router(state: AppState) -> Router {
    debug!("build_router: called");
    let cookies = state.cookies.clone();

    Router::new()
        .route("/api/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route("/api/tasks/{id}", patch(tasks::update_task).delete(tasks::delete_task))
        .route("/api/tasks/{id}/subtasks", post(tasks::add_subtask))
        .route(
            "/api/subtasks/{id}",
            patch(tasks::update_subtask).delete(tasks::delete_subtask),
        )
        .route("/api/ai-parse", post(ai::ai_parse))
        .route("/api/test-ai", get(ai::test_ai))
        .route("/api/debug", get(ai::debug_info))
        .fallback(error::not_found)
        .layer(middleware::from_fn_with_state(cookies, session::session_layer))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on an already-bound listener until ctrl-c
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let addr = listener.local_addr().context("Failed to read listener address")?;
    info!(%addr, "Serving HTTP API");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("HTTP API stopped");
    Ok(())
}

/// Bind `addr` and serve
pub async fn run(addr: SocketAddr, state: AppState) -> Result<()> {
    debug!(%addr, "run: called");
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    serve(listener, state).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

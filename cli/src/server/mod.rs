//! HTTP surface: the three task procedures, the read queries, a change feed,
//! and the direct collection endpoints that the write policy always refuses.

pub mod collections;
pub mod error;
pub mod events;
pub mod procedures;
pub mod queries;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use taskboard_core::{BoardError, DenyClientWrites, DirectAccess, TaskRepository, TaskService};

use crate::config::{Config, ValidationMode};
use crate::server::error::ApiError;
use crate::server::events::BoardEvent;

pub type SharedRepo = Arc<dyn TaskRepository + Send + Sync>;

const EVENT_BUFFER: usize = 256;

pub struct AppState {
    pub service: TaskService<SharedRepo>,
    pub direct: DirectAccess<SharedRepo, DenyClientWrites>,
    pub validation: ValidationMode,
    pub events: broadcast::Sender<BoardEvent>,
}

impl AppState {
    pub fn new(repo: SharedRepo, validation: ValidationMode) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Arc::new(Self {
            service: TaskService::new(Arc::clone(&repo)),
            direct: DirectAccess::new(repo, DenyClientWrites),
            validation,
            events,
        })
    }

    pub fn publish(&self, event: BoardEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Maps a failed procedure onto a response. In lenient mode validation
    /// errors are swallowed and the caller sees a plain success.
    pub fn reject(&self, method: &str, err: BoardError) -> Result<Response, ApiError> {
        if err.is_validation() && self.validation == ValidationMode::Lenient {
            warn!(method, error = %err, "dropping invalid write");
            return Ok(StatusCode::NO_CONTENT.into_response());
        }
        Err(err.into())
    }
}

/// Runs a store call on the blocking pool. The outer error is a panicked
/// worker; the inner one is the store's own result.
pub async fn run_blocking<T, F>(
    state: &Arc<AppState>,
    f: F,
) -> Result<taskboard_core::Result<T>, ApiError>
where
    F: FnOnce(&AppState) -> taskboard_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    Ok(tokio::task::spawn_blocking(move || f(&state)).await?)
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(queries::health))
        .route("/api/methods/createTask", post(procedures::create_task))
        .route("/api/methods/updateTask", post(procedures::update_task))
        .route("/api/methods/removeTask", post(procedures::remove_task))
        .route("/api/tasks", get(queries::list_tasks))
        .route("/api/board", get(queries::board))
        .route("/api/states", get(queries::states))
        .route("/api/events", get(events::stream))
        .route("/api/collections/tasks", post(collections::insert))
        .route(
            "/api/collections/tasks/:id",
            put(collections::update).delete(collections::remove),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: &Config, repo: SharedRepo) -> anyhow::Result<()> {
    let state = AppState::new(repo, config.validation);
    let app = router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(validation = ?config.validation, "Starting server on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use taskboard_core::InMemoryTaskRepository;

    pub fn state(validation: ValidationMode) -> Arc<AppState> {
        AppState::new(Arc::new(InMemoryTaskRepository::new()), validation)
    }

    pub async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}

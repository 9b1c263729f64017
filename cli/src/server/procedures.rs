//! `createTask`, `updateTask` and `removeTask`: the only writes the server
//! performs on behalf of clients.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use taskboard_core::{EstimationInput, TaskDto};

use crate::server::error::ApiError;
use crate::server::events::BoardEvent;
use crate::server::{run_blocking, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateTaskParams {
    pub description: String,
    pub estimation: EstimationInput,
    pub state: String,
}

/// Ids are taken as plain strings: one that is not a UUID cannot match a
/// task, which makes the call a no-op rather than a bad request.
#[derive(Debug, Deserialize)]
pub struct UpdateTaskParams {
    pub id: String,
    pub description: String,
    pub estimation: EstimationInput,
    pub state: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveTaskParams {
    pub id: String,
}

fn parse_id(method: &str, raw: &str) -> Option<Uuid> {
    let id = Uuid::parse_str(raw).ok();
    if id.is_none() {
        tracing::debug!(method, id = raw, "not a task id, nothing to do");
    }
    id
}

/// POST /api/methods/createTask
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(params): Json<CreateTaskParams>,
) -> Result<Response, ApiError> {
    let outcome = run_blocking(&state, move |s| {
        s.service
            .create_task(params.description, params.estimation, &params.state)
    })
    .await?;

    match outcome {
        Ok(task) => {
            let dto = TaskDto::from_entity(task);
            state.publish(BoardEvent::Created { task: dto.clone() });
            Ok((StatusCode::CREATED, Json(dto)).into_response())
        }
        Err(err) => state.reject("createTask", err),
    }
}

/// POST /api/methods/updateTask
///
/// Answers `204` whether or not a task matched the id.
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Json(params): Json<UpdateTaskParams>,
) -> Result<Response, ApiError> {
    let Some(id) = parse_id("updateTask", &params.id) else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    let outcome = run_blocking(&state, move |s| {
        let matched =
            s.service
                .update_task(&id, params.description, params.estimation, &params.state)?;
        if matched {
            s.service.get_task(&id)
        } else {
            Ok(None)
        }
    })
    .await?;

    match outcome {
        Ok(updated) => {
            if let Some(task) = updated {
                state.publish(BoardEvent::Updated {
                    task: TaskDto::from_entity(task),
                });
            } else {
                tracing::debug!(%id, "updateTask: no such task");
            }
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        Err(err) => state.reject("updateTask", err),
    }
}

/// POST /api/methods/removeTask
pub async fn remove_task(
    State(state): State<Arc<AppState>>,
    Json(params): Json<RemoveTaskParams>,
) -> Result<Response, ApiError> {
    let Some(id) = parse_id("removeTask", &params.id) else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    let removed = run_blocking(&state, move |s| s.service.remove_task(&id)).await??;
    if removed {
        state.publish(BoardEvent::Removed { id });
    }
    Ok(StatusCode::NO_CONTENT.into_response())
}

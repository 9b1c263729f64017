use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use taskboard_core::{BoardView, TaskDto, TaskState};

use crate::server::error::ApiError;
use crate::server::{run_blocking, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct TasksQuery {
    pub state: Option<String>,
}

/// GET /api/health
pub async fn health() -> &'static str {
    "ok"
}

/// GET /api/states
pub async fn states() -> Json<Vec<&'static str>> {
    Json(TaskState::ALL.iter().map(|s| s.label()).collect())
}

/// GET /api/tasks?state=<label>
///
/// `findByState` when `state` is given, every task otherwise.
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TasksQuery>,
) -> Result<Json<Vec<TaskDto>>, ApiError> {
    let filter = match query.state.as_deref() {
        Some(label) => Some(label.parse::<TaskState>()?),
        None => None,
    };

    let tasks = run_blocking(&state, move |s| match filter {
        Some(task_state) => s.service.find_by_state(task_state),
        None => s.service.list_tasks(),
    })
    .await??;

    Ok(Json(tasks.into_iter().map(TaskDto::from_entity).collect()))
}

/// GET /api/board
pub async fn board(State(state): State<Arc<AppState>>) -> Result<Json<BoardView>, ApiError> {
    let board = run_blocking(&state, |s| s.service.board()).await??;
    Ok(Json(board))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationMode;
    use crate::server::test_support::state;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_states_in_order() {
        let Json(labels) = states().await;
        assert_eq!(labels, vec!["To Do", "In Progress", "To Verify", "Done"]);
    }

    #[tokio::test]
    async fn test_find_by_state() {
        let state = state(ValidationMode::Strict);
        state.service.create_task("Write report", "3h", "To Do").unwrap();
        state.service.create_task("Ship", "1h", "Done").unwrap();

        let Json(todo) = list_tasks(
            State(Arc::clone(&state)),
            Query(TasksQuery {
                state: Some("To Do".to_string()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(todo.len(), 1);
        assert_eq!(todo[0].description, "Write report");

        let Json(all) = list_tasks(State(Arc::clone(&state)), Query(TasksQuery::default()))
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_state_filter_is_unprocessable() {
        let state = state(ValidationMode::Strict);
        let err = list_tasks(
            State(state),
            Query(TasksQuery {
                state: Some("Blocked".to_string()),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_board_has_four_columns() {
        let state = state(ValidationMode::Strict);
        state.service.create_task("a", "1h", "To Verify").unwrap();
        let Json(board) = board(State(state)).await.unwrap();
        assert_eq!(board.columns.len(), 4);
        assert_eq!(board.column(TaskState::ToVerify).unwrap().tasks.len(), 1);
    }
}

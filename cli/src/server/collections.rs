//! Direct writes against the task collection. Kept as endpoints so clients
//! get an explicit `403` instead of a missing route; the write policy refuses
//! all of them.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use taskboard_core::{Caller, TaskDto};

use crate::server::error::ApiError;
use crate::server::events::BoardEvent;
use crate::server::{run_blocking, AppState};

const USER_HEADER: &str = "x-user-id";

fn caller(headers: &HeaderMap) -> Caller {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(Caller::user)
        .unwrap_or_else(Caller::anonymous)
}

// The policy sees the raw document, so anything that is not JSON is passed
// on as `null` rather than rejected earlier with a different status.
fn document(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap_or(Value::Null)
}

/// POST /api/collections/tasks
pub async fn insert(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let caller = caller(&headers);
    let doc = document(&body);
    let task = run_blocking(&state, move |s| s.direct.insert(&caller, &doc)).await??;
    let dto = TaskDto::from_entity(task);
    state.publish(BoardEvent::Created { task: dto.clone() });
    Ok((StatusCode::CREATED, Json(dto)).into_response())
}

/// PUT /api/collections/tasks/:id
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let caller = caller(&headers);
    let doc = document(&body);
    run_blocking(&state, move |s| s.direct.update(&caller, &id, &doc)).await??;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// DELETE /api/collections/tasks/:id
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let caller = caller(&headers);
    run_blocking(&state, move |s| s.direct.remove(&caller, &id)).await??;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationMode;
    use crate::server::test_support::state;
    use axum::http::HeaderValue;

    fn admin_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, HeaderValue::from_static("admin"));
        headers
    }

    #[tokio::test]
    async fn test_direct_insert_is_forbidden() {
        let state = state(ValidationMode::Lenient);
        let bodies = [
            Bytes::from_static(br#"{"description":"x","estimation":"1h","state":"To Do"}"#),
            Bytes::from_static(b"not json"),
            Bytes::new(),
        ];
        for body in bodies {
            for headers in [HeaderMap::new(), admin_headers()] {
                let err = insert(State(Arc::clone(&state)), headers, body.clone())
                    .await
                    .unwrap_err();
                assert_eq!(err.status, StatusCode::FORBIDDEN);
            }
        }
        assert!(state.service.list_tasks().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_direct_update_and_remove_are_forbidden() {
        let state = state(ValidationMode::Strict);
        let task = state.service.create_task("a", "1h", "To Do").unwrap();

        let err = update(
            State(Arc::clone(&state)),
            Path(task.id.to_string()),
            admin_headers(),
            Bytes::from_static(br#"{"description":"b","estimation":"1h","state":"Done"}"#),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let err = remove(
            State(Arc::clone(&state)),
            Path(task.id.to_string()),
            HeaderMap::new(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        assert_eq!(state.service.list_tasks().unwrap(), vec![task]);
    }

    #[test]
    fn test_caller_from_header() {
        assert_eq!(caller(&admin_headers()), Caller::user("admin"));
        assert_eq!(caller(&HeaderMap::new()), Caller::anonymous());
    }
}

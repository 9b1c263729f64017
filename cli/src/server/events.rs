use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use taskboard_core::TaskDto;

use crate::server::AppState;

/// Change feed entry, sent after a procedure has written to the store.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BoardEvent {
    Created { task: TaskDto },
    Updated { task: TaskDto },
    Removed { id: Uuid },
    Lagged { skipped: u64 },
}

impl BoardEvent {
    pub fn event_name(&self) -> &'static str {
        match self {
            BoardEvent::Created { .. } => "created",
            BoardEvent::Updated { .. } => "updated",
            BoardEvent::Removed { .. } => "removed",
            BoardEvent::Lagged { .. } => "lagged",
        }
    }

    fn to_sse(&self) -> Option<Event> {
        match Event::default().event(self.event_name()).json_data(self) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!("Failed to encode {} event: {}", self.event_name(), e);
                None
            }
        }
    }
}

/// GET /api/events
pub async fn stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.events.subscribe();

    let stream = async_stream::stream! {
        loop {
            let event = match rx.recv().await {
                Ok(ev) => ev,
                Err(broadcast::error::RecvError::Lagged(skipped)) => BoardEvent::Lagged { skipped },
                Err(broadcast::error::RecvError::Closed) => break,
            };
            if let Some(sse) = event.to_sse() {
                yield Ok(sse);
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationMode;
    use crate::server::test_support;

    #[test]
    fn test_event_json_shape() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(BoardEvent::Removed { id }).unwrap();
        assert_eq!(json["type"], "removed");
        assert_eq!(json["id"], id.to_string());
        assert_eq!(BoardEvent::Lagged { skipped: 3 }.event_name(), "lagged");
    }

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let state = test_support::state(ValidationMode::Strict);
        let mut rx = state.events.subscribe();
        let id = Uuid::new_v4();
        state.publish(BoardEvent::Removed { id });
        assert_eq!(rx.recv().await.unwrap(), BoardEvent::Removed { id });
    }
}

use thiserror::Error;

use crate::policy::WriteOp;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("'{0}' is not a workflow state (expected one of: To Do, In Progress, To Verify, Done)")]
    InvalidState(String),

    #[error("invalid estimation '{input}': {reason}")]
    InvalidEstimation { input: String, reason: String },

    #[error("direct {op} on the task store is not allowed; use the task procedures")]
    WriteDenied { op: WriteOp },

    #[error("no task matches id '{0}'")]
    UnknownId(String),

    #[error("id '{0}' matches more than one task")]
    AmbiguousId(String),

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not (de)serialize tasks: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BoardError {
    pub(crate) fn invalid_estimation(input: &str, reason: impl Into<String>) -> Self {
        BoardError::InvalidEstimation {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by caller input rather than storage.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BoardError::InvalidState(_) | BoardError::InvalidEstimation { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, BoardError>;

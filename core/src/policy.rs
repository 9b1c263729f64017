//! Write boundary for the task store.
//!
//! Mutating repository methods take a [`WriteGrant`], which only this crate can
//! mint. [`TaskService`](crate::service::task_service::TaskService) mints one
//! for each validated procedure; everything else goes through
//! [`DirectAccess`], which asks a [`WritePolicy`] first.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::error::{BoardError, Result};
use crate::model::estimation::Estimation;
use crate::model::task::{Task, TaskState};
use crate::repository::TaskRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteOp {
    Insert,
    Update,
    Remove,
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WriteOp::Insert => "insert",
            WriteOp::Update => "update",
            WriteOp::Remove => "remove",
        })
    }
}

/// A direct write as seen by the policy: the operation, the target id and the
/// raw document, before any decoding.
#[derive(Debug, Clone, Copy)]
pub enum WriteRequest<'a> {
    Insert { doc: &'a Value },
    Update { id: &'a str, doc: &'a Value },
    Remove { id: &'a str },
}

impl WriteRequest<'_> {
    pub fn op(&self) -> WriteOp {
        match self {
            WriteRequest::Insert { .. } => WriteOp::Insert,
            WriteRequest::Update { .. } => WriteOp::Update,
            WriteRequest::Remove { .. } => WriteOp::Remove,
        }
    }
}

/// Fields a client may send in a direct write document.
#[derive(Debug, Deserialize)]
struct TaskDocument {
    description: String,
    estimation: Estimation,
    state: TaskState,
}

/// Who is attempting a direct write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Option<String>,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(id: impl Into<String>) -> Self {
        Self {
            user_id: Some(id.into()),
        }
    }
}

pub trait WritePolicy {
    fn allows(&self, caller: &Caller, request: &WriteRequest<'_>) -> bool;
}

/// Denies every direct write, whoever sends it and whatever it contains.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyClientWrites;

impl WritePolicy for DenyClientWrites {
    fn allows(&self, _caller: &Caller, _request: &WriteRequest<'_>) -> bool {
        false
    }
}

/// Proof that a write passed through an authorised entry point.
#[derive(Debug)]
pub struct WriteGrant {
    _private: (),
}

impl WriteGrant {
    pub(crate) fn new() -> Self {
        Self { _private: () }
    }
}

/// Client-facing view of the store for writes that bypass the procedures.
pub struct DirectAccess<R, P = DenyClientWrites> {
    repo: R,
    policy: P,
}

impl<R: TaskRepository, P: WritePolicy> DirectAccess<R, P> {
    pub fn new(repo: R, policy: P) -> Self {
        Self { repo, policy }
    }

    pub fn insert(&self, caller: &Caller, doc: &Value) -> Result<Task> {
        self.authorize(caller, &WriteRequest::Insert { doc })?;
        let fields: TaskDocument = serde_json::from_value(doc.clone())?;
        let task = Task::new(fields.description, fields.estimation, fields.state);
        self.repo.insert(task, &WriteGrant::new())
    }

    pub fn update(&self, caller: &Caller, id: &str, doc: &Value) -> Result<bool> {
        self.authorize(caller, &WriteRequest::Update { id, doc })?;
        let fields: TaskDocument = serde_json::from_value(doc.clone())?;
        let task = Task {
            id: parse_id(id)?,
            description: fields.description,
            estimation: fields.estimation,
            state: fields.state,
        };
        self.repo.replace(&task, &WriteGrant::new())
    }

    pub fn remove(&self, caller: &Caller, id: &str) -> Result<bool> {
        self.authorize(caller, &WriteRequest::Remove { id })?;
        self.repo.remove(&parse_id(id)?, &WriteGrant::new())
    }

    fn authorize(&self, caller: &Caller, request: &WriteRequest<'_>) -> Result<()> {
        if self.policy.allows(caller, request) {
            return Ok(());
        }
        let op = request.op();
        warn!(%op, user = ?caller.user_id, "direct write rejected");
        Err(BoardError::WriteDenied { op })
    }
}

fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| BoardError::UnknownId(id.to_string()))
}

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{BoardError, Result};
use crate::model::estimation::{Estimation, EstimationInput};
use crate::model::task::{Task, TaskState};
use crate::policy::WriteGrant;
use crate::repository::TaskRepository;
use crate::service::dto::BoardView;

/// The task procedures. This is the only place that mints a
/// [`WriteGrant`], so every write it performs has been validated first.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// `createTask`. Nothing is written unless both the state and the
    /// estimation are valid.
    pub fn create_task(
        &self,
        description: impl Into<String>,
        estimation: impl Into<EstimationInput>,
        state: &str,
    ) -> Result<Task> {
        let estimation: EstimationInput = estimation.into();
        let (estimation, state) = validate(&estimation, state).inspect_err(|e| {
            warn!(error = %e, "createTask rejected");
        })?;

        let task = self
            .repo
            .insert(Task::new(description.into(), estimation, state), &WriteGrant::new())?;
        info!(id = %task.id, state = %task.state, "task created");
        Ok(task)
    }

    /// `updateTask`. Replaces description, estimation and state of the task
    /// with `id`. Returns `false` when no task has that id.
    pub fn update_task(
        &self,
        id: &Uuid,
        description: impl Into<String>,
        estimation: impl Into<EstimationInput>,
        state: &str,
    ) -> Result<bool> {
        let estimation: EstimationInput = estimation.into();
        let (estimation, state) = validate(&estimation, state).inspect_err(|e| {
            warn!(%id, error = %e, "updateTask rejected");
        })?;

        let task = Task {
            id: *id,
            description: description.into(),
            estimation,
            state,
        };
        let matched = self.repo.replace(&task, &WriteGrant::new())?;
        if matched {
            info!(%id, state = %state, "task updated");
        } else {
            debug!(%id, "updateTask matched no task");
        }
        Ok(matched)
    }

    /// `removeTask`. Returns `false` when no task has that id.
    pub fn remove_task(&self, id: &Uuid) -> Result<bool> {
        let removed = self.repo.remove(id, &WriteGrant::new())?;
        if removed {
            info!(%id, "task removed");
        } else {
            debug!(%id, "removeTask matched no task");
        }
        Ok(removed)
    }

    /// Moves a task to another state, keeping its other fields. Goes through
    /// [`update_task`](Self::update_task) like any other edit.
    pub fn move_task(&self, id: &Uuid, state: TaskState) -> Result<bool> {
        match self.repo.get(id)? {
            Some(task) => self.update_task(id, task.description, task.estimation, state.label()),
            None => Ok(false),
        }
    }

    pub fn find_by_state(&self, state: TaskState) -> Result<Vec<Task>> {
        self.repo.find_by_state(state)
    }

    pub fn list_tasks(&self) -> Result<Vec<Task>> {
        self.repo.list()
    }

    pub fn get_task(&self, id: &Uuid) -> Result<Option<Task>> {
        self.repo.get(id)
    }

    pub fn board(&self) -> Result<BoardView> {
        Ok(BoardView::from_tasks(self.repo.list()?))
    }

    /// Resolves a full id or a unique prefix of its hex form (the short ids
    /// printed by the command line).
    pub fn resolve_id(&self, input: &str) -> Result<Uuid> {
        if let Ok(id) = Uuid::parse_str(input) {
            return Ok(id);
        }

        let prefix: String = input
            .chars()
            .filter(|c| *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        if prefix.is_empty() {
            return Err(BoardError::UnknownId(input.to_string()));
        }

        let matches: Vec<Uuid> = self
            .repo
            .list()?
            .into_iter()
            .map(|t| t.id)
            .filter(|id| id.simple().to_string().starts_with(&prefix))
            .collect();

        match matches.as_slice() {
            [id] => Ok(*id),
            [] => Err(BoardError::UnknownId(input.to_string())),
            _ => Err(BoardError::AmbiguousId(input.to_string())),
        }
    }
}

fn validate(estimation: &EstimationInput, state: &str) -> Result<(Estimation, TaskState)> {
    let state: TaskState = state.parse()?;
    let estimation = estimation.resolve()?;
    Ok((estimation, state))
}

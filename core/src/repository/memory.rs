use std::sync::{PoisonError, RwLock};

use uuid::Uuid;

use crate::error::Result;
use crate::model::task::Task;
use crate::policy::WriteGrant;
use crate::repository::traits::TaskRepository;

/// Process-local store. Used by tests and by `serve --ephemeral`.
#[derive(Debug, Default)]
pub struct InMemoryTaskRepository {
    tasks: RwLock<Vec<Task>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskRepository for InMemoryTaskRepository {
    fn list(&self) -> Result<Vec<Task>> {
        let tasks = self.tasks.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tasks.clone())
    }

    fn insert(&self, task: Task, _grant: &WriteGrant) -> Result<Task> {
        let mut tasks = self.tasks.write().unwrap_or_else(PoisonError::into_inner);
        tasks.push(task.clone());
        Ok(task)
    }

    fn replace(&self, task: &Task, _grant: &WriteGrant) -> Result<bool> {
        let mut tasks = self.tasks.write().unwrap_or_else(PoisonError::into_inner);
        match tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => {
                *slot = task.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn remove(&self, id: &Uuid, _grant: &WriteGrant) -> Result<bool> {
        let mut tasks = self.tasks.write().unwrap_or_else(PoisonError::into_inner);
        let initial_len = tasks.len();
        tasks.retain(|t| t.id != *id);
        Ok(tasks.len() != initial_len)
    }
}

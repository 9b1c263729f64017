use std::sync::Arc;

use uuid::Uuid;

use crate::error::Result;
use crate::model::task::{Task, TaskState};
use crate::policy::WriteGrant;

/// Storage for tasks. Reads are open to anyone; every write needs a
/// [`WriteGrant`], so only the task procedures and the policy-checked
/// [`DirectAccess`](crate::policy::DirectAccess) can mutate the store.
///
/// Each call is atomic with respect to the others. Concurrent replaces of the
/// same id are last-write-wins.
pub trait TaskRepository {
    /// All tasks in insertion order.
    fn list(&self) -> Result<Vec<Task>>;

    fn get(&self, id: &Uuid) -> Result<Option<Task>> {
        Ok(self.list()?.into_iter().find(|t| t.id == *id))
    }

    fn find_by_state(&self, state: TaskState) -> Result<Vec<Task>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|t| t.state == state)
            .collect())
    }

    fn insert(&self, task: Task, grant: &WriteGrant) -> Result<Task>;

    /// Replaces the stored task with the same id. Returns `false` when no task
    /// matched; that is not an error.
    fn replace(&self, task: &Task, grant: &WriteGrant) -> Result<bool>;

    /// Returns `false` when no task matched.
    fn remove(&self, id: &Uuid, grant: &WriteGrant) -> Result<bool>;
}

impl<T: TaskRepository + ?Sized> TaskRepository for &T {
    fn list(&self) -> Result<Vec<Task>> {
        (**self).list()
    }
    fn get(&self, id: &Uuid) -> Result<Option<Task>> {
        (**self).get(id)
    }
    fn find_by_state(&self, state: TaskState) -> Result<Vec<Task>> {
        (**self).find_by_state(state)
    }
    fn insert(&self, task: Task, grant: &WriteGrant) -> Result<Task> {
        (**self).insert(task, grant)
    }
    fn replace(&self, task: &Task, grant: &WriteGrant) -> Result<bool> {
        (**self).replace(task, grant)
    }
    fn remove(&self, id: &Uuid, grant: &WriteGrant) -> Result<bool> {
        (**self).remove(id, grant)
    }
}

impl<T: TaskRepository + ?Sized> TaskRepository for Arc<T> {
    fn list(&self) -> Result<Vec<Task>> {
        (**self).list()
    }
    fn get(&self, id: &Uuid) -> Result<Option<Task>> {
        (**self).get(id)
    }
    fn find_by_state(&self, state: TaskState) -> Result<Vec<Task>> {
        (**self).find_by_state(state)
    }
    fn insert(&self, task: Task, grant: &WriteGrant) -> Result<Task> {
        (**self).insert(task, grant)
    }
    fn replace(&self, task: &Task, grant: &WriteGrant) -> Result<bool> {
        (**self).replace(task, grant)
    }
    fn remove(&self, id: &Uuid, grant: &WriteGrant) -> Result<bool> {
        (**self).remove(id, grant)
    }
}

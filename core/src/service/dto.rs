use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::task::{Task, TaskState};

/// Read-only view of a task for display and the HTTP API.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TaskDto {
    pub id: Uuid,
    pub short_id: String,
    pub description: String,
    pub estimation: String,
    pub estimation_minutes: u32,
    pub state: TaskState,
}

impl TaskDto {
    pub fn from_entity(task: Task) -> Self {
        Self {
            short_id: task.short_id(),
            id: task.id,
            description: task.description,
            estimation: task.estimation.to_string(),
            estimation_minutes: task.estimation.minutes(),
            state: task.state,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Column {
    pub state: TaskState,
    pub tasks: Vec<TaskDto>,
    pub total_minutes: u64,
}

/// One column per workflow state, in [`TaskState::ALL`] order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BoardView {
    pub columns: Vec<Column>,
}

impl BoardView {
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut columns: Vec<Column> = TaskState::ALL
            .iter()
            .map(|&state| Column {
                state,
                tasks: Vec::new(),
                total_minutes: 0,
            })
            .collect();

        for task in tasks {
            if let Some(column) = columns.get_mut(task.state.position()) {
                column.total_minutes += u64::from(task.estimation.minutes());
                column.tasks.push(TaskDto::from_entity(task));
            }
        }

        Self { columns }
    }

    pub fn column(&self, state: TaskState) -> Option<&Column> {
        self.columns.iter().find(|c| c.state == state)
    }

    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|c| c.tasks.len()).sum()
    }
}

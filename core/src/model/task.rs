use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BoardError;
use crate::model::estimation::Estimation;

/// Workflow states, in board order.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskState {
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "To Verify")]
    ToVerify,
    #[serde(rename = "Done")]
    Done,
}

impl Default for TaskState {
    fn default() -> Self {
        TaskState::ToDo
    }
}

impl TaskState {
    /// Every state, ordered by workflow progression. This is the only list of
    /// states in the program; columns and validation both read from it.
    pub const ALL: [TaskState; 4] = [
        TaskState::ToDo,
        TaskState::InProgress,
        TaskState::ToVerify,
        TaskState::Done,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TaskState::ToDo => "To Do",
            TaskState::InProgress => "In Progress",
            TaskState::ToVerify => "To Verify",
            TaskState::Done => "Done",
        }
    }

    pub fn position(self) -> usize {
        match self {
            TaskState::ToDo => 0,
            TaskState::InProgress => 1,
            TaskState::ToVerify => 2,
            TaskState::Done => 3,
        }
    }

    pub fn next(self) -> Option<TaskState> {
        TaskState::ALL.get(self.position() + 1).copied()
    }

    pub fn previous(self) -> Option<TaskState> {
        self.position()
            .checked_sub(1)
            .and_then(|i| TaskState::ALL.get(i).copied())
    }

    /// Membership test against the fixed set, by exact label.
    pub fn from_label(label: &str) -> Option<TaskState> {
        TaskState::ALL.into_iter().find(|s| s.label() == label)
    }

    /// Lenient lookup used by the command line: exact labels, labels in any
    /// case or spacing, and a few short names.
    pub fn from_alias(input: &str) -> Result<TaskState, BoardError> {
        if let Some(state) = TaskState::from_label(input) {
            return Ok(state);
        }
        let folded: String = input
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        match folded.as_str() {
            "todo" | "backlog" => Ok(TaskState::ToDo),
            "inprogress" | "progress" | "wip" | "doing" => Ok(TaskState::InProgress),
            "toverify" | "verify" | "review" => Ok(TaskState::ToVerify),
            "done" => Ok(TaskState::Done),
            _ => Err(BoardError::InvalidState(input.to_string())),
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskState {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskState::from_label(s).ok_or_else(|| BoardError::InvalidState(s.to_string()))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: Uuid,
    /// Free text; may contain markdown.
    pub description: String,
    pub estimation: Estimation,
    pub state: TaskState,
}

impl Task {
    pub fn new(description: String, estimation: Estimation, state: TaskState) -> Self {
        Self {
            id: Uuid::new_v4(),
            description,
            estimation,
            state,
        }
    }

    /// First eight hex digits of the id, as printed by the command line.
    pub fn short_id(&self) -> String {
        self.id.simple().to_string().chars().take(8).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_states_are_ordered() {
        let labels: Vec<&str> = TaskState::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(labels, vec!["To Do", "In Progress", "To Verify", "Done"]);
        for (i, state) in TaskState::ALL.iter().enumerate() {
            assert_eq!(state.position(), i);
        }
    }

    #[test]
    fn test_exact_label_membership() {
        assert_eq!("To Do".parse::<TaskState>().unwrap(), TaskState::ToDo);
        assert_eq!("Done".parse::<TaskState>().unwrap(), TaskState::Done);
        assert!("Blocked".parse::<TaskState>().is_err());
        assert!("to do".parse::<TaskState>().is_err());
        assert!("".parse::<TaskState>().is_err());
    }

    #[test]
    fn test_aliases() {
        assert_eq!(TaskState::from_alias("todo").unwrap(), TaskState::ToDo);
        assert_eq!(TaskState::from_alias("in progress").unwrap(), TaskState::InProgress);
        assert_eq!(TaskState::from_alias("wip").unwrap(), TaskState::InProgress);
        assert_eq!(TaskState::from_alias("Review").unwrap(), TaskState::ToVerify);
        assert_eq!(TaskState::from_alias("DONE").unwrap(), TaskState::Done);
        assert!(TaskState::from_alias("Blocked").is_err());
    }

    #[test]
    fn test_neighbours() {
        assert_eq!(TaskState::ToDo.next(), Some(TaskState::InProgress));
        assert_eq!(TaskState::Done.next(), None);
        assert_eq!(TaskState::ToDo.previous(), None);
        assert_eq!(TaskState::Done.previous(), Some(TaskState::ToVerify));
    }

    #[test]
    fn test_serializes_as_label() {
        let json = serde_json::to_string(&TaskState::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        assert!(serde_json::from_str::<TaskState>("\"Blocked\"").is_err());
    }

    #[test]
    fn test_short_id() {
        let task = Task::new("x".to_string(), Estimation::default(), TaskState::ToDo);
        assert_eq!(task.short_id().len(), 8);
        assert!(task.id.simple().to_string().starts_with(&task.short_id()));
    }
}

pub mod error;
pub mod input;
pub mod model;
pub mod policy;
pub mod repository;
pub mod service;
pub mod time;

pub use error::{BoardError, Result};
pub use input::{parse_args, quote, split_words, ParsedInput, TaskInput};
pub use model::estimation::{Estimation, EstimationInput};
pub use model::task::{Task, TaskState};
pub use policy::{Caller, DenyClientWrites, DirectAccess, WriteOp, WritePolicy, WriteRequest};
pub use repository::{FileTaskRepository, InMemoryTaskRepository, TaskRepository};
pub use service::dto::{BoardView, Column, TaskDto};
pub use service::task_service::TaskService;
pub use time::{format_minutes, parse_minutes};

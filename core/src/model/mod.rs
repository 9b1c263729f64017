pub mod estimation;
pub mod task;

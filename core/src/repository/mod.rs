pub mod file;
pub mod memory;
pub mod traits;

// Re-export
pub use file::FileTaskRepository;
pub use memory::InMemoryTaskRepository;
pub use traits::TaskRepository;

//! In-memory adapters for tests and tooling.

mod category;
mod comment;
mod maintenance;
mod task;

pub use category::InMemoryCategoryRepository;
pub use comment::InMemoryCommentRepository;
pub use maintenance::InMemoryMaintenanceRepository;
pub use task::InMemoryTaskRepository;

//! Port contracts for task lifecycle management.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod category;
pub mod comment;
pub mod maintenance;
pub mod repository;

pub use category::{CategoryRepository, CategoryRepositoryError, CategoryRepositoryResult};
pub use comment::{CommentRepository, CommentRepositoryError, CommentRepositoryResult};
pub use maintenance::{
    MaintenanceRepository, MaintenanceRepositoryError, MaintenanceRepositoryResult,
};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};

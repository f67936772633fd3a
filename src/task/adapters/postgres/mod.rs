//! `PostgreSQL` adapters for task lifecycle persistence.

mod category;
mod comment;
mod maintenance;
mod models;
mod repository;
mod schema;

pub use category::PostgresCategoryRepository;
pub use comment::PostgresCommentRepository;
pub use maintenance::PostgresMaintenanceRepository;
pub use repository::PostgresTaskRepository;

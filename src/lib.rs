//! Workshop: fleet maintenance task lifecycle.
//!
//! This crate tracks workshop tasks raised against fleet vehicles and plant,
//! either by hand or from failed inspection items. It moves tasks through a
//! four-state workflow, keeps their timeline of status changes and comments,
//! and writes completion values back into the asset's maintenance record.
//!
//! # Architecture
//!
//! Workshop follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`task`]: Task creation, status workflow, comments and completion updates
//! - [`error_log`]: Recording of internal errors and admin notification
//! - [`error`]: Mapping of service errors onto client-facing categories
//! - [`config`]: Layered configuration
//! - [`database`]: `PostgreSQL` connection pooling
//! - [`telemetry`]: Tracing subscriber installation

pub mod config;
pub mod database;
pub mod error;
pub mod error_log;
pub mod task;
pub mod telemetry;

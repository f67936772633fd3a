//! Workshop task lifecycle management.
//!
//! Tasks are raised by hand or synced from failed inspection items, move
//! through `pending`, `logged`, `on_hold` and `completed`, and collect
//! comments along the way. Completing a task can write values into the
//! asset's maintenance record through the rules of its category. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;

//! Adapter implementations for error log ports.

pub mod memory;
pub mod postgres;

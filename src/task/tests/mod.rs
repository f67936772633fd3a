//! Unit tests for the task module.
//!
//! Domain tests pin timestamps by rebuilding records with `from_persisted`;
//! service tests run against the in-memory adapters.

mod comment_tests;
mod timeline_tests;

//! Central log of internal errors with admin notification.
//!
//! Internal (5xx) failures are recorded with a fingerprint that groups
//! repeats of the same fault. When admin recipients are configured, a
//! rendered report is handed to an [`ports::ErrorNotifier`], at most once per
//! fingerprint within the configured cooldown.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Reporting service in [`service`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

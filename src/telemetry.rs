//! Tracing subscriber installation.

use crate::config::LoggingConfig;
use std::sync::OnceLock;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static SUBSCRIBER_INSTALLED: OnceLock<()> = OnceLock::new();

/// Installs the global `tracing` subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over `config.filter` when set. Later calls,
/// and calls made after another subscriber was installed, do nothing.
pub fn init_tracing(config: &LoggingConfig) {
    SUBSCRIBER_INSTALLED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.filter))
            .unwrap_or_else(|_| EnvFilter::new("info"));
        let registry = tracing_subscriber::registry().with(filter);

        let installed = if config.json {
            registry
                .with(fmt::layer().json().with_target(true).with_current_span(true))
                .try_init()
        } else {
            registry.with(fmt::layer().with_target(true)).try_init()
        };

        if installed.is_err() {
            tracing::debug!("global tracing subscriber already installed");
        } else {
            tracing::info!(filter = %config.filter, json = config.json, "tracing initialised");
        }
    });
}

//! # Logging
//!
//! Tracing subscriber setup driven by [`LogConfig`].
//!
//! `RUST_LOG` directives take precedence over the configured level.

use crate::config::{LogConfig, LogFormat};
use tracing_subscriber::EnvFilter;

/// Builds the filter: `RUST_LOG` if set, the configured level otherwise.
#[must_use]
pub fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Installs the global tracing subscriber.
///
/// Does nothing if a subscriber is already installed.
pub fn init_tracing(config: &LogConfig) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_target(config.include_target);

    // Err means a subscriber is already set.
    let _ = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
}

//! Logging setup for the input core, built on the `tracing` ecosystem.
//!
//! The core itself only emits `tracing` events. Embedders either call
//! [`init_logging`] with the `[logging]` table of the configuration, or install
//! their own subscriber.

use std::io::{stderr, IsTerminal};
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

use crate::config::{LogFormat, LoggingConfig};
use crate::error::InputCoreError;

/// Initializes a minimal logging setup writing to `stderr`.
///
/// Filters with `RUST_LOG`, defaulting to `info`. Meant for tests and early
/// startup. Errors (e.g. a subscriber is already installed) are ignored.
pub fn init_minimal_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(stderr)
        .with_ansi(stderr().is_terminal())
        .try_init();
}

/// Installs the global `tracing` subscriber described by `config`.
///
/// `RUST_LOG`, when set, takes precedence over `config.level`.
///
/// # Errors
///
/// Returns `InputCoreError::LoggingInitialization` if the level is invalid or
/// a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), InputCoreError> {
    let level = match config.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        invalid => {
            return Err(InputCoreError::LoggingInitialization(format!(
                "Invalid log level in config: {}",
                invalid
            )))
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let layer = match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(stderr)
            .with_ansi(false)
            .with_filter(filter)
            .boxed(),
        LogFormat::Text => fmt::layer()
            .with_writer(stderr)
            .with_ansi(stderr().is_terminal())
            .with_filter(filter)
            .boxed(),
    };

    Registry::default().with(layer).try_init().map_err(|e| {
        InputCoreError::LoggingInitialization(format!(
            "Failed to set global tracing subscriber. Was it already initialized? Error: {}",
            e
        ))
    })
}

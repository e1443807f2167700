//! Structured logging for the lkml2cube binary.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the binary so embedders keep control of their own.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log format configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable format
    #[default]
    Pretty,
    /// JSON lines, one event per line
    Json,
    /// Single-line format
    Compact,
}

impl LogFormat {
    pub fn from_name(name: &str) -> Self {
        match name {
            "json" => LogFormat::Json,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }

    /// Parse from the `LOG_FORMAT` environment variable
    pub fn from_env() -> Self {
        std::env::var("LOG_FORMAT")
            .map(|v| Self::from_name(&v))
            .unwrap_or_default()
    }
}

/// Filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_FILTER: &str = "warn";

/// Initialize logging to stderr.
///
/// Environment variables:
/// - `RUST_LOG`: filter directives (e.g. "debug", "lkml2cube::loader=debug"), default `warn`
/// - `LOG_FORMAT`: "pretty", "json" or "compact"
///
/// ```bash
/// RUST_LOG=debug LOG_FORMAT=compact lkml2cube cubes "views/*.lkml" --printonly
/// ```
///
/// Calling this more than once keeps the first subscriber.
pub fn init() {
    let format = LogFormat::from_env();
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_target(true).with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
    };

    if result.is_ok() {
        tracing::debug!(format = ?format, "logging initialized");
    }
}

//! logging
//!
//! tracing-subscriber initialisation for the `pmod` binary.
//!
//! Call [`init`] once at startup. Library code only emits `tracing` events
//! and never installs a subscriber.

use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Default level when neither `--debug` nor `RUST_LOG` says otherwise.
pub const DEFAULT_LEVEL: &str = "warn";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log level '{level}': {message}")]
    InvalidLevel { level: String, message: String },

    #[error("failed to set subscriber: {0}")]
    Subscriber(String),
}

/// Install the global subscriber, writing to stderr.
///
/// If `prefer_level` is `true`, `level` wins over `RUST_LOG`; otherwise
/// `RUST_LOG` wins and `level` is the fallback.
///
/// # Errors
///
/// Returns `LoggingError` if no usable filter can be built or a subscriber
/// is already installed.
pub fn init(level: &str, prefer_level: bool) -> Result<(), LoggingError> {
    let filter = if prefer_level {
        EnvFilter::try_new(level).map_err(|e| LoggingError::InvalidLevel {
            level: level.to_string(),
            message: e.to_string(),
        })?
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level))
            .map_err(|e| LoggingError::InvalidLevel {
                level: level.to_string(),
                message: e.to_string(),
            })?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| LoggingError::Subscriber(e.to_string()))
}

/// Parse a level string, rejecting anything tracing doesn't know.
///
/// # Errors
///
/// Returns `LoggingError::InvalidLevel` for empty or unknown levels.
pub fn parse_level(level: &str) -> Result<LevelFilter, LoggingError> {
    if level.is_empty() {
        return Err(LoggingError::InvalidLevel {
            level: String::new(),
            message: "log level must not be empty".into(),
        });
    }
    level
        .parse::<LevelFilter>()
        .map_err(|e| LoggingError::InvalidLevel {
            level: level.to_string(),
            message: e.to_string(),
        })
}

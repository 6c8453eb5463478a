#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Logging setup for the compiler.
//!
//! Library crates only emit `tracing` events; binaries call [`init`] once to
//! install a formatting subscriber on stderr, optionally mirrored into a file.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Errors raised while installing the subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The level is not a valid filter directive
    #[error("Invalid log filter `{directive}`: {message}")]
    InvalidFilter {
        /// Rejected directive
        directive: String,
        /// Parser message
        message: String,
    },
    /// The log file could not be opened
    #[error("Failed to open log file {path}: {source}")]
    File {
        /// Log file path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
    /// A global subscriber is already installed
    #[error("A global tracing subscriber is already installed")]
    AlreadyInitialized,
}

/// Build the filter: `RUST_LOG` wins when set, otherwise `level` applies.
fn build_filter(level: &str, env_override: Option<String>) -> Result<EnvFilter, LoggingError> {
    let directive = env_override.filter(|d| !d.trim().is_empty()).unwrap_or_else(|| level.to_string());
    EnvFilter::try_new(&directive)
        .map_err(|e| LoggingError::InvalidFilter { directive, message: e.to_string() })
}

fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::File { path: path.to_path_buf(), source })
}

/// Install the global subscriber.
///
/// `level` is a plain level (`info`) or any `EnvFilter` directive. When
/// `file` is given, events are also appended to it without ANSI colors.
pub fn init(level: &str, file: Option<&Path>) -> Result<(), LoggingError> {
    let filter = build_filter(level, std::env::var("RUST_LOG").ok())?;

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(true);
    let file_layer = match file {
        Some(path) => Some(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(open_log_file(path)?))
                .with_ansi(false)
                .with_target(true),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)?;

    tracing::debug!("Logging initialized at {}", level);
    Ok(())
}

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! High-level pipeline that turns a registry snapshot on disk into generated
//! artifacts on disk.
//!
//! ## Module Organization
//!
//! - `orchestration` - Main pipeline entry points (`compile`, `check`)
//! - `manifest` - Artifact digests written next to the outputs

use thiserror::Error;

/// Convenient result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while running the codegen pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Snapshot analysis recorded errors; nothing was generated.
    #[error("Snapshot analysis failed with {} errors: {}", .errors.len(), .errors.join("; "))]
    Analysis {
        /// Recorded error messages
        errors: Vec<String>,
    },
    /// Generic message-based error.
    #[error("{0}")]
    Message(String),
    /// Error from configuration loading.
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    /// Error from an analysis phase.
    #[error(transparent)]
    Phase(#[from] analysis::PhaseError),
    /// Error propagated from the codegen crate.
    #[error(transparent)]
    Codegen(#[from] codegen::CodegenError),
    /// I/O error while creating or writing files.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// JSON serialization error while writing the manifest.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

// Module declarations
pub mod manifest;
pub mod orchestration;

pub use manifest::Manifest;
// Re-export public API from orchestration module
pub use orchestration::{analyze, check, compile, CompileReport};

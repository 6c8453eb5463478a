#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! idlsmith Snapshot Analysis
//!
//! Checks a registry snapshot before any text is generated. Each check is a
//! [`CompilerPhase`] that records findings in the shared [`CompilerContext`];
//! the pipeline decides whether recorded errors stop generation.

use std::collections::HashMap;
use std::path::Path;

use ir::{RegistrySnapshot, SnapshotError};
use thiserror::Error;

pub mod references;
pub mod validator;

pub use references::ReferenceChecker;
pub use validator::SnapshotValidator;

/// Compiler context shared by all analysis phases
#[derive(Debug)]
pub struct CompilerContext {
    /// Snapshot under analysis
    pub snapshot: RegistrySnapshot,
    /// Compiler diagnostics
    pub diagnostics: CompilerDiagnostics,
    /// Root name of the generated artifacts
    pub root_name: String,
}

impl CompilerContext {
    /// Create a new compiler context
    pub fn new(snapshot: RegistrySnapshot, root_name: impl Into<String>) -> Self {
        let mut diagnostics = CompilerDiagnostics::default();
        diagnostics.total_definitions = snapshot.definition_count();
        Self { snapshot, diagnostics, root_name: root_name.into() }
    }

    /// Load the snapshot from a JSON file and create a context for it
    pub fn from_file(path: &Path, root_name: impl Into<String>) -> Result<Self> {
        let snapshot = RegistrySnapshot::from_file(path)?;
        Ok(Self::new(snapshot, root_name))
    }

    /// Add diagnostic warning
    pub fn add_warning(&mut self, warning: String) { self.diagnostics.warnings.push(warning); }

    /// Add diagnostic error
    pub fn add_error(&mut self, error: String) { self.diagnostics.errors.push(error); }

    /// Run phases in order, stopping at the first phase failure
    pub fn run_phases(&mut self, phases: &[&dyn CompilerPhase]) -> PhaseResult {
        for phase in phases {
            tracing::debug!("Running phase {}: {}", phase.name(), phase.description());
            phase.run(self)?;
        }
        Ok(())
    }
}

/// Compiler diagnostics
#[derive(Debug, Default, Clone)]
pub struct CompilerDiagnostics {
    /// Total definitions in the snapshot
    pub total_definitions: usize,
    /// Warnings generated
    pub warnings: Vec<String>,
    /// Errors generated
    pub errors: Vec<String>,
    /// Statistics
    pub stats: HashMap<String, usize>,
}

impl CompilerDiagnostics {
    /// Whether any error was recorded
    pub fn has_errors(&self) -> bool { !self.errors.is_empty() }

    /// Add `count` to the named statistic
    pub fn bump(&mut self, stat: &str, count: usize) {
        *self.stats.entry(stat.to_string()).or_insert(0) += count;
    }
}

#[derive(Debug, Error)]
/// Errors produced by individual compiler phases or during orchestration.
pub enum PhaseError {
    /// Snapshot could not be loaded.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    /// Any other phase-specific error surfaced as a message.
    #[error("phase error: {0}")]
    Other(String),
}

/// Result alias for phase execution.
pub type Result<T> = std::result::Result<T, PhaseError>;

/// Result of a compiler phase
/// Empty Ok indicates success; findings are recorded in the context.
pub type PhaseResult = Result<()>;

/// Trait for compiler phases
pub trait CompilerPhase {
    /// Name of the phase
    fn name(&self) -> &str;

    /// Description of what this phase does
    fn description(&self) -> &str;

    /// Execute this phase on the compiler context
    fn run(&self, ctx: &mut CompilerContext) -> PhaseResult;
}

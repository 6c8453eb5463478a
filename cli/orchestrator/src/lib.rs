#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
//! Collection of utilities for the idlsmith CLI orchestrator.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError};
use thiserror::Error;

/// Errors that can occur during idlsmith operations.
#[derive(Debug, Error)]
pub enum CompilerError {
    /// Configuration could not be loaded or saved.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The pipeline failed.
    #[error(transparent)]
    Pipeline(#[from] pipeline::PipelineError),
    /// Generic compilation error with a custom message.
    #[error("Compilation error: {0}")]
    Message(String),
}

/// Result type alias for idlsmith operations.
pub type Result<T> = std::result::Result<T, CompilerError>;

/// Command-line values that take precedence over the configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Snapshot path
    pub input: Option<PathBuf>,
    /// Output directory
    pub output: Option<PathBuf>,
    /// Root name
    pub root: Option<String>,
    /// Disable CRUD operations
    pub no_crud: bool,
    /// Treat dangling references as errors
    pub strict: bool,
}

impl Overrides {
    /// Apply the set values to `config`
    pub fn apply(&self, config: &mut Config) {
        if let Some(input) = &self.input {
            config.codegen.input_path = input.clone();
        }
        if let Some(output) = &self.output {
            config.codegen.output_dir = output.clone();
        }
        if let Some(root) = &self.root {
            config.codegen.root_name = root.clone();
        }
        if self.no_crud {
            config.codegen.crud = false;
        }
        if self.strict {
            config.codegen.strict_references = true;
        }
    }
}

/// Write a default configuration to `path`, or to [`Config::default_path`].
///
/// An existing file is left untouched and reported as an error.
pub fn init_config(path: Option<&Path>) -> Result<PathBuf> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => Config::default_path()?,
    };
    if path.exists() {
        return Err(CompilerError::Message(format!("{} already exists", path.display())));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(ConfigError::from)?;
    }
    Config::default().save(&path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply() {
        let mut config = Config::default();
        let overrides = Overrides {
            input: Some(PathBuf::from("snap.json")),
            output: None,
            root: Some("Zoo".to_string()),
            no_crud: true,
            strict: false,
        };
        overrides.apply(&mut config);

        assert_eq!(config.codegen.input_path, PathBuf::from("snap.json"));
        assert_eq!(config.codegen.root_name, "Zoo");
        assert!(!config.codegen.crud);
        assert!(!config.codegen.strict_references);
        assert_eq!(config.codegen.output_dir, Config::default().codegen.output_dir);
    }

    #[test]
    fn test_init_config() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("nested").join("idlsmith.toml");

        let written = init_config(Some(&path)).expect("init config");
        assert_eq!(written, path);
        let loaded = Config::from_file(&path).expect("reload");
        assert_eq!(loaded.codegen.root_name, "App");

        assert!(matches!(init_config(Some(&path)), Err(CompilerError::Message(_))));
    }
}

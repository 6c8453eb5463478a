#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! idlsmith Configuration
//!
//! This crate provides configuration management for idlsmith.
//! It handles loading, saving, and managing configuration files that specify
//! where the registry snapshot lives, where artifacts go, how generation
//! behaves and how much gets logged.
//!
//! Configuration is stored in TOML format and can be loaded from files or created
//! with sensible defaults for development and testing.

use std::path::{Path, PathBuf};

use codegen::CodegenOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    /// Failed to parse the TOML configuration file
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize configuration to TOML format
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Configuration file was not found at the specified path
    #[error("Config file not found at: {0}")]
    NotFound(PathBuf),
    /// Could not locate the user's configuration directory
    #[error("Could not find user config directory")]
    ConfigDirUnavailable,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Code generation settings
    #[serde(default)]
    pub codegen: CodegenConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (debug, info, warn, error)
    pub level: String,
    /// Log file path (optional)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self { Self { level: "info".to_string(), file: None } }
}

/// Code generation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenConfig {
    /// Path to the registry snapshot JSON
    pub input_path: PathBuf,
    /// Where to write generated artifacts
    pub output_dir: PathBuf,
    /// Seeds the dispatch class and artifact file names
    pub root_name: String,
    /// Emit create/update/remove operations
    pub crud: bool,
    /// Fail on relations whose inverse entity is missing
    pub strict_references: bool,
    /// Module the generated script imports its runtime from
    pub runtime_module: String,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        let options = CodegenOptions::default();
        Self {
            input_path: PathBuf::from("registry.json"),
            output_dir: Config::default_output_dir(),
            root_name: "App".to_string(),
            crud: options.crud,
            strict_references: options.strict_references,
            runtime_module: options.runtime_module,
        }
    }
}

impl From<&CodegenConfig> for CodegenOptions {
    fn from(config: &CodegenConfig) -> Self {
        CodegenOptions {
            crud: config.crud,
            strict_references: config.strict_references,
            runtime_module: config.runtime_module.clone(),
        }
    }
}

impl CodegenConfig {
    /// Generation options this configuration selects
    pub fn options(&self) -> CodegenOptions { CodegenOptions::from(self) }
}

impl Config {
    /// Load configuration from a TOML file at `path`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise from [`Config::default_path`] if
    /// that file exists, otherwise fall back to [`Config::default`].
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if !path.exists() => Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Ok(path) if path.exists() => Self::from_file(path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Save this configuration as a pretty-printed TOML file at `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Returns the default config file path:
    /// `{config_dir()}/idlsmith/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::ConfigDirUnavailable)?.join("idlsmith");
        Ok(config_dir.join("config.toml"))
    }

    /// Get the default output directory for generated artifacts
    pub fn default_output_dir() -> PathBuf {
        Self::default_output_dir_internal(std::env::var("OUT_DIR").ok(), std::env::current_dir().ok())
    }

    /// Internal function for testing - allows injection of environment values
    fn default_output_dir_internal(out_dir: Option<String>, current_dir: Option<PathBuf>) -> PathBuf {
        if let Some(out_dir) = out_dir {
            return PathBuf::from(out_dir);
        }

        if let Some(current_dir) = current_dir {
            return current_dir;
        }

        PathBuf::from(".")
    }
}

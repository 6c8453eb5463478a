#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Thrift IDL generation for idlsmith registry snapshots.
//!
//! This crate turns a [`ir::RegistrySnapshot`] into four artifacts: the IDL
//! document, the server-side glue script, the codec patch script and the
//! literal find/replace mapping that goes with it. Generation is pure and
//! deterministic; writing the artifacts is left to [`write_generated`].
//!
//! Loading snapshots, validating them and driving a full run live in
//! companion crates.

pub mod assembler;
pub mod escape;
pub mod generators;
pub mod idl;
pub mod patch;
pub mod type_mapper;
pub mod utils;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ir::RegistrySnapshot;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use assembler::ThriftGenerator;
pub use idl::IdlDocument;

/// Error type for code generation operations in this crate.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Underlying I/O error while reading or writing files.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// JSON serialization/deserialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Formatting error when building generated source.
    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),
    /// A select tree names a member the selected type does not have, or
    /// nests a selection under a member that is not structured.
    #[error("Select on `{type_name}` cannot select member `{member}`")]
    InvalidSelect {
        /// Selected type
        type_name: String,
        /// Offending member
        member: String,
    },
    /// A structured type is not present in the snapshot.
    #[error("Unknown type `{name}`")]
    UnknownType {
        /// Missing type name
        name: String,
    },
    /// A relation points at an entity the snapshot does not define.
    #[error("Relation `{entity}.{relation}` references unknown entity `{inverse}`")]
    MissingReference {
        /// Owning entity
        entity: String,
        /// Relation property
        relation: String,
        /// Missing inverse entity
        inverse: String,
    },
    /// Generic message-based error.
    #[error("{0}")]
    Message(String),
}

impl From<String> for CodegenError {
    fn from(msg: String) -> Self { CodegenError::Message(msg) }
}

/// Convenient result type for codegen functions in this crate.
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Knobs for one generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenOptions {
    /// Emit create/update/remove operations and their records
    pub crud: bool,
    /// Fail on relations whose inverse entity is missing
    pub strict_references: bool,
    /// Module the generated script imports its runtime from
    pub runtime_module: String,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self { crud: true, strict_references: false, runtime_module: "@idlsmith/runtime".to_string() }
    }
}

/// Output of one generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    /// Serialized IDL document
    pub idl: String,
    /// Glue script: dispatch service, proxies and handlers
    pub script: String,
    /// Codec patch script
    pub patch: String,
    /// Literal find → replace pairs for the generated client sources
    pub replacements: BTreeMap<String, String>,
    /// The IDL as a tree, for inspection
    pub document: IdlDocument,
}

impl Artifacts {
    /// `(file name, content)` pairs named after `root`:
    /// `<root>.thrift`, `<root>.service.ts`, `<root>.patch.ts`, `<root>.replace.json`.
    pub fn files(&self, root: &str) -> Result<Vec<(String, String)>> {
        let stem = root.to_lowercase();
        let replacements = serde_json::to_string_pretty(&self.replacements)?;
        Ok(vec![
            (format!("{}.thrift", stem), self.idl.clone()),
            (format!("{}.service.ts", stem), self.script.clone()),
            (format!("{}.patch.ts", stem), self.patch.clone()),
            (format!("{}.replace.json", stem), replacements),
        ])
    }
}

/// Defines the core interface for producing artifacts from a snapshot.
/// Implementors are bound to their snapshot and options at construction.
pub trait CodeGenerator {
    /// Generate every artifact, seeding generated identifiers with `root`.
    fn generate(&self, root: &str) -> Result<Artifacts>;
}

/// Generate with default options
pub fn emit(snapshot: &RegistrySnapshot, root: &str) -> Result<Artifacts> {
    ThriftGenerator::new(snapshot).emit(root)
}

/// Trim trailing whitespace from each line and drop trailing blank lines.
/// Always ensures the returned string ends with a single newline when not empty.
pub fn clean_generated_source(src: &str) -> String {
    let mut lines: Vec<String> = src.lines().map(|l| l.trim_end().to_string()).collect();

    while matches!(lines.last(), Some(line) if line.is_empty()) {
        lines.pop();
    }

    if lines.is_empty() {
        String::new()
    } else {
        format!("{}\n", lines.join("\n"))
    }
}

/// Persist generated files under `out_dir`, creating any necessary
/// subdirectories. Returns the written paths in input order.
pub fn write_generated<P: AsRef<Path>>(out_dir: P, files: &[(String, String)]) -> std::io::Result<Vec<PathBuf>> {
    fs::create_dir_all(&out_dir)?;
    let mut written = Vec::with_capacity(files.len());
    for (name, src) in files {
        let path = out_dir.as_ref().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, clean_generated_source(src).as_bytes())?;
        written.push(path);
    }
    Ok(written)
}

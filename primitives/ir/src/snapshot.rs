//! Registry Snapshot
//!
//! The immutable, point-in-time copy of every registered category that one
//! generation pass consumes. Snapshots are plain values: cloning one is the
//! copy-on-read boundary between the live registry and a generator run.

use std::cmp::Ordering;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metadata::{ApiMetadata, DatabaseMetadata, EntityMetadata, EnumMetadata, TypeMetadata};

/// Errors while reading or writing snapshot files
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// File could not be read or written
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// File is not a valid snapshot document
    #[error("invalid snapshot document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Immutable copy of all categorized metadata
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    #[serde(default)]
    databases: Vec<DatabaseMetadata>,
    #[serde(default)]
    apis: Vec<ApiMetadata>,
    #[serde(default)]
    enums: Vec<EnumMetadata>,
    #[serde(default)]
    inputs: Vec<TypeMetadata>,
    #[serde(default)]
    types: Vec<TypeMetadata>,
    #[serde(default)]
    registry: Vec<TypeMetadata>,
}

/// The single collation every generated ordering uses: byte-wise by name.
pub fn by_name(a: &str, b: &str) -> Ordering { a.cmp(b) }

fn sorted<'a, T>(items: &'a [T], name: impl Fn(&T) -> &str) -> Vec<&'a T> {
    let mut out: Vec<&T> = items.iter().collect();
    out.sort_by(|a, b| by_name(name(a), name(b)));
    out
}

impl RegistrySnapshot {
    /// Empty snapshot
    pub fn new() -> Self { Self::default() }

    /// Add a database
    pub fn with_database(mut self, database: DatabaseMetadata) -> Self {
        self.databases.push(database);
        self
    }

    /// Add an API
    pub fn with_api(mut self, api: ApiMetadata) -> Self {
        self.apis.push(api);
        self
    }

    /// Add an enum
    pub fn with_enum(mut self, meta: EnumMetadata) -> Self {
        self.enums.push(meta);
        self
    }

    /// Add an input type
    pub fn with_input(mut self, meta: TypeMetadata) -> Self {
        self.inputs.push(meta);
        self
    }

    /// Add a plain type
    pub fn with_type(mut self, meta: TypeMetadata) -> Self {
        self.types.push(meta);
        self
    }

    /// Add a registry meta-type
    pub fn with_registry_type(mut self, meta: TypeMetadata) -> Self {
        self.registry.push(meta);
        self
    }

    /// Load a snapshot from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a snapshot from a JSON document
    pub fn from_json(content: &str) -> Result<Self, SnapshotError> { Ok(serde_json::from_str(content)?) }

    /// Save the snapshot to a JSON file with pretty formatting
    pub fn to_file(&self, path: &Path) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Databases in registration order
    pub fn databases(&self) -> &[DatabaseMetadata] { &self.databases }

    /// APIs in registration order
    pub fn apis(&self) -> &[ApiMetadata] { &self.apis }

    /// Enums in registration order
    pub fn enums(&self) -> &[EnumMetadata] { &self.enums }

    /// Input types in registration order
    pub fn inputs(&self) -> &[TypeMetadata] { &self.inputs }

    /// Plain types in registration order
    pub fn types(&self) -> &[TypeMetadata] { &self.types }

    /// Registry meta-types in registration order
    pub fn registry_types(&self) -> &[TypeMetadata] { &self.registry }

    /// Databases sorted by name
    pub fn sorted_databases(&self) -> Vec<&DatabaseMetadata> { sorted(&self.databases, |d| &d.name) }

    /// APIs sorted by name
    pub fn sorted_apis(&self) -> Vec<&ApiMetadata> { sorted(&self.apis, |a| &a.name) }

    /// Enums sorted by name
    pub fn sorted_enums(&self) -> Vec<&EnumMetadata> { sorted(&self.enums, |e| &e.name) }

    /// Input types sorted by name
    pub fn sorted_inputs(&self) -> Vec<&TypeMetadata> { sorted(&self.inputs, |t| &t.name) }

    /// Plain types sorted by name
    pub fn sorted_types(&self) -> Vec<&TypeMetadata> { sorted(&self.types, |t| &t.name) }

    /// Registry meta-types sorted by name
    pub fn sorted_registry_types(&self) -> Vec<&TypeMetadata> { sorted(&self.registry, |t| &t.name) }

    /// Every entity of every database, in registration order
    pub fn entities(&self) -> impl Iterator<Item = &EntityMetadata> {
        self.databases.iter().flat_map(|d| d.entities.iter())
    }

    /// Enum by name
    pub fn find_enum(&self, name: &str) -> Option<&EnumMetadata> {
        self.enums.iter().find(|e| e.name == name)
    }

    /// Structured type by name, searching inputs, plain types and registry types
    pub fn find_struct(&self, name: &str) -> Option<&TypeMetadata> {
        self.inputs
            .iter()
            .chain(self.types.iter())
            .chain(self.registry.iter())
            .find(|t| t.name == name)
    }

    /// Entity by name, searching every database
    pub fn find_entity(&self, name: &str) -> Option<&EntityMetadata> {
        self.entities().find(|e| e.name == name)
    }

    /// Total number of registered definitions across all categories
    pub fn definition_count(&self) -> usize {
        self.databases.len()
            + self.entities().count()
            + self.apis.len()
            + self.enums.len()
            + self.inputs.len()
            + self.types.len()
            + self.registry.len()
    }
}

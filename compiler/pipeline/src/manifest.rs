//! Artifact manifest
//!
//! `manifest.json` maps every written artifact to the SHA-256 of its bytes
//! on disk, so callers can tell whether a run changed anything.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::Result;

/// File name of the manifest inside the output directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// Lowercase hex SHA-256 of `bytes`
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Digests of one run's artifacts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Root name the artifacts were generated for
    pub root: String,
    /// Artifact file name → SHA-256 hex
    pub artifacts: BTreeMap<String, String>,
}

impl Manifest {
    /// Empty manifest for `root`
    pub fn new(root: impl Into<String>) -> Self { Self { root: root.into(), artifacts: BTreeMap::new() } }

    /// Record the digest of `content` under `name`
    pub fn record(&mut self, name: impl Into<String>, content: &[u8]) {
        self.artifacts.insert(name.into(), sha256_hex(content));
    }

    /// Digest recorded for `name`
    pub fn digest(&self, name: &str) -> Option<&str> { self.artifacts.get(name).map(String::as_str) }

    /// Write the manifest into `dir`, returning its path
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(MANIFEST_FILE);
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        std::fs::write(&path, json)?;
        Ok(path)
    }

    /// Read a manifest from `dir`
    pub fn read(dir: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(dir.join(MANIFEST_FILE))?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        assert_eq!(sha256_hex(b""), "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855");
        assert_eq!(sha256_hex(b"abc").len(), 64);
    }

    #[test]
    fn test_write_and_read() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut manifest = Manifest::new("App");
        manifest.record("app.thrift", b"typedef string ID\n");

        let path = manifest.write(dir.path()).expect("write manifest");
        assert!(path.ends_with(MANIFEST_FILE));
        let loaded = Manifest::read(dir.path()).expect("read manifest");
        assert_eq!(loaded, manifest);
        assert_eq!(loaded.digest("app.thrift"), Some(sha256_hex(b"typedef string ID\n").as_str()));
    }
}

//! Member keys and identifier validation

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::{RegistryError, Result};

/// Key of a decorated class member.
///
/// Only [`PropertyKey::Name`] is a valid target; symbol-keyed and
/// index-keyed members cannot be expressed in the IDL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKey {
    /// Plain string name
    Name(String),
    /// Symbol with its description
    Symbol(String),
    /// Numeric index
    Index(u32),
}

impl From<&str> for PropertyKey {
    fn from(name: &str) -> Self { PropertyKey::Name(name.to_string()) }
}

impl From<String> for PropertyKey {
    fn from(name: String) -> Self { PropertyKey::Name(name) }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::Name(name) => f.write_str(name),
            PropertyKey::Symbol(description) => write!(f, "Symbol({})", description),
            PropertyKey::Index(index) => write!(f, "[{}]", index),
        }
    }
}

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier pattern is valid")
    })
}

/// Whether `name` can be used as a definition or member identifier
pub fn is_identifier(name: &str) -> bool { identifier_pattern().is_match(name) }

/// Check a definition or member name, reporting `owner` on failure
pub fn validate_identifier(owner: &str, name: &str) -> Result<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(RegistryError::InvalidMetadataTarget { owner: owner.to_string(), target: name.to_string() })
    }
}

/// Resolve a member key to its string name
pub fn member_name(owner: &str, key: PropertyKey) -> Result<String> {
    match key {
        PropertyKey::Name(name) => {
            validate_identifier(owner, &name)?;
            Ok(name)
        }
        other => Err(RegistryError::InvalidMetadataTarget {
            owner: owner.to_string(),
            target: other.to_string(),
        }),
    }
}

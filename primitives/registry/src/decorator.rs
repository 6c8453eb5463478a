//! Method decorator categories

use std::str::FromStr;

use ir::MethodKind;

use crate::RegistryError;

/// Decorator attached to a service method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodDecorator {
    /// Read operation
    Query,
    /// Write operation
    Mutation,
    /// Read operation served by an advice handler
    Advice,
    /// Write operation served by a command handler
    Command,
    /// Field resolver on another type
    Extension,
}

impl MethodDecorator {
    /// Exposure recorded for a method carrying this decorator
    pub fn kind(&self) -> MethodKind {
        match self {
            MethodDecorator::Query | MethodDecorator::Advice => MethodKind::Query,
            MethodDecorator::Mutation | MethodDecorator::Command => MethodKind::Mutation,
            MethodDecorator::Extension => MethodKind::Extension,
        }
    }
}

impl FromStr for MethodDecorator {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "query" => Ok(MethodDecorator::Query),
            "mutation" => Ok(MethodDecorator::Mutation),
            "advice" => Ok(MethodDecorator::Advice),
            "command" => Ok(MethodDecorator::Command),
            "extension" => Ok(MethodDecorator::Extension),
            _ => Err(RegistryError::Configuration { category: s.to_string() }),
        }
    }
}

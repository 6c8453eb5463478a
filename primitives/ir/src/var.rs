//! Type descriptors
//!
//! A [`VarType`] describes the declared type of a member, column, parameter or
//! method result as the reflection layer recorded it. Target-specific tokens
//! (IDL, GraphQL, script) are derived from it by the code generator.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Built-in scalar types known to the reflection layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scalar {
    /// Opaque identifier
    #[serde(rename = "ID")]
    Id,
    /// UTF-8 string
    String,
    /// Boolean flag
    Boolean,
    /// 32-bit signed integer
    Int,
    /// Double precision float
    Float,
    /// Point in time, carried as a millisecond timestamp on the wire
    Date,
    /// E-mail address, carried as a string
    Email,
}

impl Scalar {
    /// Name used in metadata documents (`"ID"`, `"String"`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Scalar::Id => "ID",
            Scalar::String => "String",
            Scalar::Boolean => "Boolean",
            Scalar::Int => "Int",
            Scalar::Float => "Float",
            Scalar::Date => "Date",
            Scalar::Email => "Email",
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Registry category a structured type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StructKind {
    /// Plain output type
    Type,
    /// Input type
    Input,
    /// ORM entity
    Entity,
    /// Internal registry meta-type
    Registry,
}

impl StructKind {
    /// Category name, used verbatim in `kind` annotations
    pub fn as_str(&self) -> &'static str {
        match self {
            StructKind::Type => "Type",
            StructKind::Input => "Input",
            StructKind::Entity => "Entity",
            StructKind::Registry => "Registry",
        }
    }
}

impl fmt::Display for StructKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Declared type of a variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VarType {
    /// No value
    Void,
    /// Arbitrary structured JSON value
    Any,
    /// Framework-injected argument (resolver info, context). Never part of a wire signature.
    Resolver,
    /// Built-in scalar
    Scalar {
        /// The scalar
        scalar: Scalar,
    },
    /// Reference to an enum by name
    Enum {
        /// Enum name
        name: String,
    },
    /// Reference to a structured type by name
    Struct {
        /// Type name
        name: String,
        /// Category of the referenced type
        #[serde(rename = "of")]
        struct_kind: StructKind,
    },
    /// Homogeneous list
    Array {
        /// Element type
        item: Box<VarType>,
    },
}

impl VarType {
    /// Scalar descriptor
    pub fn scalar(scalar: Scalar) -> Self { VarType::Scalar { scalar } }

    /// Enum reference
    pub fn enumeration(name: impl Into<String>) -> Self { VarType::Enum { name: name.into() } }

    /// Struct reference of the given category
    pub fn structure(name: impl Into<String>, struct_kind: StructKind) -> Self {
        VarType::Struct { name: name.into(), struct_kind }
    }

    /// List of `item`
    pub fn array(item: VarType) -> Self { VarType::Array { item: Box::new(item) } }

    /// Whether this is [`VarType::Void`]
    pub fn is_void(&self) -> bool { matches!(self, VarType::Void) }

    /// Whether this is [`VarType::Resolver`]
    pub fn is_resolver(&self) -> bool { matches!(self, VarType::Resolver) }

    /// Whether the type is (or is a list of) a structured type
    pub fn is_structured(&self) -> bool {
        match self {
            VarType::Struct { .. } => true,
            VarType::Array { item } => item.is_structured(),
            _ => false,
        }
    }

    /// Innermost element type, unwrapping nested lists
    pub fn element(&self) -> &VarType {
        match self {
            VarType::Array { item } => item.element(),
            other => other,
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarType::Void => f.write_str("void"),
            VarType::Any => f.write_str("any"),
            VarType::Resolver => f.write_str("resolver"),
            VarType::Scalar { scalar } => write!(f, "{}", scalar),
            VarType::Enum { name } => write!(f, "enum {}", name),
            VarType::Struct { name, struct_kind } => write!(f, "{} {}", struct_kind, name),
            VarType::Array { item } => write!(f, "[{}]", item),
        }
    }
}

//! Type Mapper
//!
//! Derives the IDL, GraphQL and script spellings of a [`VarType`]. Struct and
//! enum references map to their own name in every target.

use ir::{Scalar, VarType};

use crate::idl::Coercion;

/// Target-specific spellings of one declared type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMapping {
    /// IDL type token
    pub idl: String,
    /// GraphQL type token (without the non-null marker)
    pub gql: String,
    /// Script type token
    pub script: String,
    /// The value may be absent on the GraphQL side, so variables drop `!`
    pub optional: bool,
    /// Codec coercion needed when the value crosses the wire
    pub coercion: Option<Coercion>,
}

impl TypeMapping {
    fn plain(idl: &str, gql: &str, script: &str) -> Self {
        Self {
            idl: idl.to_string(),
            gql: gql.to_string(),
            script: script.to_string(),
            optional: false,
            coercion: None,
        }
    }

    /// GraphQL variable type, `T!` unless the value may be absent
    pub fn gql_variable(&self) -> String {
        if self.optional {
            self.gql.clone()
        } else {
            format!("{}!", self.gql)
        }
    }
}

fn map_scalar(scalar: Scalar) -> TypeMapping {
    match scalar {
        Scalar::Id => TypeMapping::plain("ID", "ID", "string"),
        Scalar::String => TypeMapping::plain("string", "String", "string"),
        Scalar::Boolean => TypeMapping::plain("bool", "Boolean", "boolean"),
        Scalar::Int => TypeMapping::plain("i32", "Int", "number"),
        Scalar::Float => TypeMapping::plain("double", "Float", "number"),
        Scalar::Date => TypeMapping::plain("Timestamp", "Date", "Date"),
        Scalar::Email => TypeMapping::plain("string", "Email", "string"),
    }
}

/// Map a declared type
pub fn map_type(ty: &VarType) -> TypeMapping {
    match ty {
        VarType::Void => TypeMapping { optional: true, ..TypeMapping::plain("void", "Void", "void") },
        VarType::Resolver => TypeMapping { optional: true, ..TypeMapping::plain("void", "Void", "any") },
        VarType::Any => TypeMapping { optional: true, ..TypeMapping::plain("Json", "JSON", "any") },
        VarType::Scalar { scalar } => map_scalar(*scalar),
        VarType::Enum { name } => TypeMapping {
            coercion: Some(Coercion::Enum { name: name.clone() }),
            ..TypeMapping::plain(name, name, name)
        },
        VarType::Struct { name, .. } => TypeMapping::plain(name, name, name),
        VarType::Array { item } => {
            let inner = map_type(item);
            TypeMapping {
                idl: format!("list<{}>", inner.idl),
                gql: format!("[{}]", inner.gql),
                script: format!("{}[]", inner.script),
                optional: false,
                coercion: None,
            }
        }
    }
}

/// Whether a member name triggers the identifier override (literal, case-sensitive suffix)
pub fn is_id_name(name: &str) -> bool { name.ends_with("Id") }

/// Map the declared type of a named struct member or entity column.
///
/// A scalar member whose name ends in `Id` maps to the identifier type
/// regardless of its declared scalar.
pub fn map_field(name: &str, ty: &VarType) -> TypeMapping {
    match ty {
        VarType::Scalar { .. } if is_id_name(name) => map_scalar(Scalar::Id),
        other => map_type(other),
    }
}

#[cfg(test)]
mod tests {
    use ir::StructKind;

    use super::*;

    #[test]
    fn test_scalar_table() {
        let idl = |s| map_type(&VarType::scalar(s)).idl;
        assert_eq!(idl(Scalar::Id), "ID");
        assert_eq!(idl(Scalar::String), "string");
        assert_eq!(idl(Scalar::Boolean), "bool");
        assert_eq!(idl(Scalar::Int), "i32");
        assert_eq!(idl(Scalar::Float), "double");
        assert_eq!(idl(Scalar::Date), "Timestamp");
        assert_eq!(idl(Scalar::Email), "string");
        assert_eq!(map_type(&VarType::Any).idl, "Json");
        assert_eq!(map_type(&VarType::Void).idl, "void");
    }

    #[test]
    fn test_optional_wrapper() {
        assert_eq!(map_type(&VarType::Any).gql_variable(), "JSON");
        assert_eq!(map_type(&VarType::scalar(Scalar::Int)).gql_variable(), "Int!");
        let list = map_type(&VarType::array(VarType::structure("Tag", StructKind::Entity)));
        assert_eq!((list.idl.as_str(), list.gql.as_str(), list.script.as_str()), ("list<Tag>", "[Tag]", "Tag[]"));
    }

    #[test]
    fn test_enum_marks_coercion() {
        let mapping = map_type(&VarType::enumeration("Color"));
        assert_eq!(mapping.idl, "Color");
        assert_eq!(mapping.coercion, Some(Coercion::Enum { name: "Color".into() }));
        assert_eq!(map_type(&VarType::array(VarType::enumeration("Color"))).coercion, None);
    }

    #[test]
    fn test_id_suffix_override() {
        assert_eq!(map_field("tenantId", &VarType::scalar(Scalar::String)).idl, "ID");
        assert_eq!(map_field("ownerId", &VarType::scalar(Scalar::Int)).script, "string");
        // Only the literal suffix counts
        assert_eq!(map_field("tenantID", &VarType::scalar(Scalar::String)).idl, "string");
        assert_eq!(map_field("paid", &VarType::scalar(Scalar::Boolean)).idl, "bool");
        // Non-scalar declarations keep their mapping
        assert_eq!(map_field("colorId", &VarType::enumeration("Color")).idl, "Color");
    }
}

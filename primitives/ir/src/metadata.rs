//! Reflected metadata
//!
//! Plain data records describing the enums, structured types, ORM entities,
//! service APIs and databases that the reflection layer registered. Every
//! ordered collection is a `Vec` so declaration order survives serialization.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::select::TypeSelect;
use crate::var::{StructKind, VarType};

/// Enum definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMetadata {
    /// Enum name
    pub name: String,
    /// Option names; position is the ordinal
    pub options: Vec<String>,
}

impl EnumMetadata {
    /// Create an enum definition
    pub fn new(name: impl Into<String>, options: Vec<String>) -> Self {
        Self { name: name.into(), options }
    }
}

/// One member of a structured type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMetadata {
    /// Member name
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub ty: VarType,
}

impl FieldMetadata {
    /// Create a member
    pub fn new(name: impl Into<String>, ty: VarType) -> Self { Self { name: name.into(), ty } }
}

/// Structured type (plain type, input type or registry meta-type)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMetadata {
    /// Type name
    pub name: String,
    /// Category the type was registered in
    pub kind: StructKind,
    /// Members in declaration order
    #[serde(default)]
    pub members: Vec<FieldMetadata>,
}

impl TypeMetadata {
    /// Create an empty structured type
    pub fn new(name: impl Into<String>, kind: StructKind) -> Self {
        Self { name: name.into(), kind, members: Vec::new() }
    }

    /// Builder-style member append
    pub fn with_member(mut self, name: impl Into<String>, ty: VarType) -> Self {
        self.members.push(FieldMetadata::new(name, ty));
        self
    }
}

/// ORM column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Property name
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub ty: VarType,
    /// Value must be present
    #[serde(default)]
    pub mandatory: bool,
    /// Part of the primary key
    #[serde(default)]
    pub primary: bool,
    /// Not persisted
    #[serde(default)]
    pub transient: bool,
    /// Assigned by the store on insert
    #[serde(default)]
    pub generated: bool,
    /// Creation timestamp column
    #[serde(default)]
    pub create_date: bool,
    /// Update timestamp column
    #[serde(default)]
    pub update_date: bool,
    /// Optimistic-locking version column
    #[serde(default)]
    pub version: bool,
    /// Computed column
    #[serde(default, rename = "virtual")]
    pub is_virtual: bool,
}

impl ColumnMetadata {
    /// Optional, non-key, persisted column
    pub fn new(name: impl Into<String>, ty: VarType) -> Self {
        Self {
            name: name.into(),
            ty,
            mandatory: false,
            primary: false,
            transient: false,
            generated: false,
            create_date: false,
            update_date: false,
            version: false,
            is_virtual: false,
        }
    }

    /// Required primary-key column
    pub fn primary(name: impl Into<String>, ty: VarType) -> Self {
        Self { mandatory: true, primary: true, ..Self::new(name, ty) }
    }

    /// Mark the column mandatory
    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Mark the column transient
    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    /// Whether the server assigns this column, so creators may omit it
    pub fn is_server_assigned(&self) -> bool {
        self.create_date || self.update_date || self.version || self.is_virtual || self.generated
    }
}

/// Cardinality of an entity relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    /// Many owners reference one inverse
    ManyToOne,
    /// One owner references one inverse
    OneToOne,
    /// One owner references many inverses
    OneToMany,
    /// Many owners reference many inverses
    ManyToMany,
}

impl RelationKind {
    /// Annotation value (`"ManyToOne"`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::ManyToOne => "ManyToOne",
            RelationKind::OneToOne => "OneToOne",
            RelationKind::OneToMany => "OneToMany",
            RelationKind::ManyToMany => "ManyToMany",
        }
    }

    /// Whether the owning side holds a list of inverse records
    pub fn is_to_many(&self) -> bool {
        matches!(self, RelationKind::OneToMany | RelationKind::ManyToMany)
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Entity relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationMetadata {
    /// Property name on the owning entity
    pub property: String,
    /// Cardinality
    pub kind: RelationKind,
    /// Name of the inverse entity
    pub inverse: String,
}

impl RelationMetadata {
    /// Create a relation
    pub fn new(property: impl Into<String>, kind: RelationKind, inverse: impl Into<String>) -> Self {
        Self { property: property.into(), kind, inverse: inverse.into() }
    }
}

/// ORM entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
    /// Entity name
    pub name: String,
    /// Columns in declaration order
    #[serde(default)]
    pub columns: Vec<ColumnMetadata>,
    /// Relations in declaration order
    #[serde(default)]
    pub relations: Vec<RelationMetadata>,
}

impl EntityMetadata {
    /// Create an entity without columns
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), columns: Vec::new(), relations: Vec::new() }
    }

    /// Builder-style column append
    pub fn with_column(mut self, column: ColumnMetadata) -> Self {
        self.columns.push(column);
        self
    }

    /// Builder-style relation append
    pub fn with_relation(mut self, relation: RelationMetadata) -> Self {
        self.relations.push(relation);
        self
    }

    /// Persisted columns in declaration order
    pub fn persistent_columns(&self) -> impl Iterator<Item = &ColumnMetadata> {
        self.columns.iter().filter(|c| !c.transient)
    }

    /// Transient columns in declaration order
    pub fn transient_columns(&self) -> impl Iterator<Item = &ColumnMetadata> {
        self.columns.iter().filter(|c| c.transient)
    }

    /// Primary-key columns in declaration order
    pub fn primary_columns(&self) -> impl Iterator<Item = &ColumnMetadata> {
        self.persistent_columns().filter(|c| c.primary)
    }
}

/// How a service method is exposed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    /// Read operation
    Query,
    /// Write operation
    Mutation,
    /// Field resolver attached to another type
    Extension,
    /// Not exposed through the graph
    #[default]
    Internal,
}

/// Method parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamMetadata {
    /// Parameter name
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub ty: VarType,
}

impl ParamMetadata {
    /// Create a parameter
    pub fn new(name: impl Into<String>, ty: VarType) -> Self { Self { name: name.into(), ty } }
}

/// Service method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodMetadata {
    /// Method name
    pub name: String,
    /// Name of the owning API
    pub api: String,
    /// Exposure
    #[serde(default)]
    pub kind: MethodKind,
    /// Parameters in declaration order
    #[serde(default)]
    pub inputs: Vec<ParamMetadata>,
    /// Result type
    pub result: VarType,
    /// Requested nested fields of a structured result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<TypeSelect>,
    /// Type an extension method resolves a field on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl MethodMetadata {
    /// Create a method without parameters
    pub fn new(api: impl Into<String>, name: impl Into<String>, kind: MethodKind, result: VarType) -> Self {
        Self { name: name.into(), api: api.into(), kind, inputs: Vec::new(), result, select: None, target: None }
    }

    /// Builder-style parameter append
    pub fn with_input(mut self, name: impl Into<String>, ty: VarType) -> Self {
        self.inputs.push(ParamMetadata::new(name, ty));
        self
    }

    /// Builder-style select tree
    pub fn with_select(mut self, select: TypeSelect) -> Self {
        self.select = Some(select);
        self
    }

    /// Builder-style extension target
    pub fn extending(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Read operation
    pub fn is_query(&self) -> bool { self.kind == MethodKind::Query }

    /// Write operation
    pub fn is_mutation(&self) -> bool { self.kind == MethodKind::Mutation }

    /// Exposed as a graph operation
    pub fn is_operation(&self) -> bool { self.is_query() || self.is_mutation() }

    /// Parameters that appear on the wire (not void, not injected)
    pub fn wire_inputs(&self) -> impl Iterator<Item = &ParamMetadata> {
        self.inputs.iter().filter(|p| !p.ty.is_void() && !p.ty.is_resolver())
    }
}

/// Service API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMetadata {
    /// API name
    pub name: String,
    /// Methods in declaration order
    #[serde(default)]
    pub methods: Vec<MethodMetadata>,
}

impl ApiMetadata {
    /// Create an API without methods
    pub fn new(name: impl Into<String>) -> Self { Self { name: name.into(), methods: Vec::new() } }

    /// Builder-style method append
    pub fn with_method(mut self, method: MethodMetadata) -> Self {
        self.methods.push(method);
        self
    }

    /// Methods exposed as graph operations, in declaration order
    pub fn operations(&self) -> impl Iterator<Item = &MethodMetadata> {
        self.methods.iter().filter(|m| m.is_operation())
    }
}

/// Database owning a set of entities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseMetadata {
    /// Database name
    pub name: String,
    /// Connection alias; also the route key of the generated handler when set
    #[serde(default)]
    pub alias: String,
    /// Owned entities
    #[serde(default)]
    pub entities: Vec<EntityMetadata>,
}

impl DatabaseMetadata {
    /// Create a database without entities or alias
    pub fn new(name: impl Into<String>) -> Self { Self { name: name.into(), alias: String::new(), entities: Vec::new() } }

    /// Builder-style connection alias
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    /// Builder-style entity append
    pub fn with_entity(mut self, entity: EntityMetadata) -> Self {
        self.entities.push(entity);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::var::Scalar;

    #[test]
    fn test_column_flags_from_json() {
        let column: ColumnMetadata = serde_json::from_str(
            r#"{"name":"created","type":{"kind":"scalar","scalar":"Date"},"create_date":true,"virtual":false}"#,
        )
        .expect("parse column");
        assert!(column.is_server_assigned());
        assert!(!column.mandatory);
        assert!(!column.primary);
    }

    #[test]
    fn test_entity_column_views() {
        let entity = EntityMetadata::new("User")
            .with_column(ColumnMetadata::primary("id", VarType::scalar(Scalar::Id)))
            .with_column(ColumnMetadata::new("cache", VarType::Any).transient())
            .with_column(ColumnMetadata::primary("tenantId", VarType::scalar(Scalar::String)));

        let keys: Vec<_> = entity.primary_columns().map(|c| c.name.as_str()).collect();
        assert_eq!(keys, vec!["id", "tenantId"]);
        assert_eq!(entity.persistent_columns().count(), 2);
        assert_eq!(entity.transient_columns().count(), 1);
    }

    #[test]
    fn test_method_wire_inputs() {
        let method = MethodMetadata::new("UserApi", "getUser", MethodKind::Query, VarType::Any)
            .with_input("input", VarType::structure("GetUserInput", StructKind::Input))
            .with_input("info", VarType::Resolver)
            .with_input("nothing", VarType::Void);
        let names: Vec<_> = method.wire_inputs().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["input"]);
        assert!(method.is_operation());
    }
}

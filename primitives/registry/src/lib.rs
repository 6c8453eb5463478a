#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Metadata Registry: the live store that reflection decorators write into.
//!
//! Definitions are registered one at a time through opaque handles and
//! validated as they arrive. A generation pass never reads the registry
//! directly; it takes a [`RegistrySnapshot`] and works on that copy, so later
//! registrations cannot leak into an in-flight pass.

pub mod decorator;
pub mod target;

use ir::{
    ApiMetadata, ColumnMetadata, DatabaseMetadata, EntityMetadata, EnumMetadata, FieldMetadata,
    MethodMetadata, ParamMetadata, RegistrySnapshot, RelationMetadata, StructKind, TypeMetadata,
    TypeSelect, VarType,
};
use thiserror::Error;
use tracing::debug;

pub use decorator::MethodDecorator;
pub use target::{is_identifier, PropertyKey};

use target::{member_name, validate_identifier};

/// Registration failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Unknown decorator category
    #[error("unknown decorator category `{category}`")]
    Configuration {
        /// Category as written on the decorator
        category: String,
    },
    /// Decorator applied to something that cannot carry metadata
    #[error("invalid metadata target `{target}` on `{owner}`")]
    InvalidMetadataTarget {
        /// Definition owning the target
        owner: String,
        /// Offending key or name
        target: String,
    },
    /// Name registered twice within one category
    #[error("duplicate {category} `{name}`")]
    Duplicate {
        /// Category
        category: &'static str,
        /// Repeated name
        name: String,
    },
    /// Structured types of this kind are not registered through `define_type`
    #[error("{0} types cannot be defined directly")]
    UnsupportedKind(StructKind),
}

/// Result alias for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Handle to a registered enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumId(usize);

/// Handle to a registered structured type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeId {
    kind: StructKind,
    index: usize,
}

/// Handle to a registered API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiId(usize);

/// Handle to a registered database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseId(usize);

/// Handle to a registered entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityId {
    database: usize,
    index: usize,
}

/// Signature of a service method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Parameters in declaration order
    pub inputs: Vec<ParamMetadata>,
    /// Result type
    pub result: VarType,
    /// Requested nested fields of a structured result
    pub select: Option<TypeSelect>,
    /// Type an `Extension` method resolves a field on
    pub target: Option<String>,
}

impl Signature {
    /// Signature without parameters
    pub fn returning(result: VarType) -> Self { Self { inputs: Vec::new(), result, select: None, target: None } }

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
}

/// The live metadata store.
#[derive(Debug, Default)]
pub struct Registry {
    enums: Vec<EnumMetadata>,
    inputs: Vec<TypeMetadata>,
    types: Vec<TypeMetadata>,
    registry: Vec<TypeMetadata>,
    apis: Vec<ApiMetadata>,
    databases: Vec<DatabaseMetadata>,
}

/// A handle issued by a different registry
fn unknown_handle(handle: String) -> RegistryError {
    RegistryError::InvalidMetadataTarget { owner: "registry".to_string(), target: handle }
}

fn ensure_unique<'a>(
    category: &'static str,
    mut names: impl Iterator<Item = &'a str>,
    name: &str,
) -> Result<()> {
    if names.any(|n| n == name) {
        return Err(RegistryError::Duplicate { category, name: name.to_string() });
    }
    Ok(())
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self { Self::default() }

    /// Register an enum with its options in ordinal order
    pub fn define_enum<I, S>(&mut self, name: &str, options: I) -> Result<EnumId>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        validate_identifier(name, name)?;
        ensure_unique("enum", self.enums.iter().map(|e| e.name.as_str()), name)?;

        let mut collected: Vec<String> = Vec::new();
        for option in options {
            let option = option.into();
            validate_identifier(name, &option)?;
            ensure_unique("enum option", collected.iter().map(String::as_str), &option)?;
            collected.push(option);
        }

        debug!("Registry - defined enum {} ({} options)", name, collected.len());
        self.enums.push(EnumMetadata::new(name, collected));
        Ok(EnumId(self.enums.len() - 1))
    }

    /// Register a plain type, input type or registry meta-type
    pub fn define_type(&mut self, kind: StructKind, name: &str) -> Result<TypeId> {
        validate_identifier(name, name)?;
        let bucket = match kind {
            StructKind::Type => &mut self.types,
            StructKind::Input => &mut self.inputs,
            StructKind::Registry => &mut self.registry,
            StructKind::Entity => return Err(RegistryError::UnsupportedKind(kind)),
        };
        let category = match kind {
            StructKind::Input => "input",
            StructKind::Registry => "registry type",
            _ => "type",
        };
        ensure_unique(category, bucket.iter().map(|t| t.name.as_str()), name)?;

        debug!("Registry - defined {} type {}", kind, name);
        bucket.push(TypeMetadata::new(name, kind));
        Ok(TypeId { kind, index: bucket.len() - 1 })
    }

    fn type_mut(&mut self, id: TypeId) -> Result<&mut TypeMetadata> {
        let bucket = match id.kind {
            StructKind::Input => &mut self.inputs,
            StructKind::Registry => &mut self.registry,
            _ => &mut self.types,
        };
        bucket.get_mut(id.index).ok_or_else(|| unknown_handle(format!("{:?}", id)))
    }

    /// Append a member to a structured type
    pub fn add_member(&mut self, owner: TypeId, key: impl Into<PropertyKey>, ty: VarType) -> Result<()> {
        let meta = self.type_mut(owner)?;
        let name = member_name(&meta.name, key.into())?;
        ensure_unique("member", meta.members.iter().map(|m| m.name.as_str()), &name)?;
        meta.members.push(FieldMetadata::new(name, ty));
        Ok(())
    }

    /// Register a service API
    pub fn define_api(&mut self, name: &str) -> Result<ApiId> {
        validate_identifier(name, name)?;
        ensure_unique("api", self.apis.iter().map(|a| a.name.as_str()), name)?;

        debug!("Registry - defined api {}", name);
        self.apis.push(ApiMetadata::new(name));
        Ok(ApiId(self.apis.len() - 1))
    }

    /// Register a decorated method on an API.
    ///
    /// `decorator` is the category written on the method (`"Query"`,
    /// `"Mutation"`, `"Advice"`, `"Command"` or `"Extension"`). An extension
    /// must name the type it extends; other categories never carry a target.
    pub fn define_method(
        &mut self,
        api: ApiId,
        key: impl Into<PropertyKey>,
        decorator: &str,
        signature: Signature,
    ) -> Result<()> {
        let decorator: MethodDecorator = decorator.parse()?;
        let owner = self.apis.get_mut(api.0).ok_or_else(|| unknown_handle(format!("{:?}", api)))?;
        let name = member_name(&owner.name, key.into())?;
        ensure_unique("method", owner.methods.iter().map(|m| m.name.as_str()), &name)?;

        let target = match (decorator, signature.target) {
            (MethodDecorator::Extension, Some(target)) => {
                validate_identifier(&owner.name, &target)?;
                Some(target)
            }
            (MethodDecorator::Extension, None) => {
                return Err(RegistryError::InvalidMetadataTarget { owner: owner.name.clone(), target: name });
            }
            _ => None,
        };

        debug!("Registry - defined method {}.{} ({:?})", owner.name, name, decorator);
        let mut method = MethodMetadata::new(owner.name.clone(), name, decorator.kind(), signature.result);
        method.inputs = signature.inputs;
        method.select = signature.select;
        method.target = target;
        owner.methods.push(method);
        Ok(())
    }

    /// Register a database
    pub fn define_database(&mut self, name: &str, alias: &str) -> Result<DatabaseId> {
        validate_identifier(name, name)?;
        ensure_unique("database", self.databases.iter().map(|d| d.name.as_str()), name)?;

        debug!("Registry - defined database {} (alias `{}`)", name, alias);
        self.databases.push(DatabaseMetadata::new(name).with_alias(alias));
        Ok(DatabaseId(self.databases.len() - 1))
    }

    /// Register an entity owned by `database`
    pub fn define_entity(&mut self, database: DatabaseId, name: &str) -> Result<EntityId> {
        validate_identifier(name, name)?;
        let all_entities = self.databases.iter().flat_map(|d| d.entities.iter());
        ensure_unique("entity", all_entities.map(|e| e.name.as_str()), name)?;

        let owner = self
            .databases
            .get_mut(database.0)
            .ok_or_else(|| unknown_handle(format!("{:?}", database)))?;
        debug!("Registry - defined entity {} in {}", name, owner.name);
        owner.entities.push(EntityMetadata::new(name));
        Ok(EntityId { database: database.0, index: owner.entities.len() - 1 })
    }

    fn entity_mut(&mut self, id: EntityId) -> Result<&mut EntityMetadata> {
        self.databases
            .get_mut(id.database)
            .and_then(|db| db.entities.get_mut(id.index))
            .ok_or_else(|| unknown_handle(format!("{:?}", id)))
    }

    /// Append a column to an entity
    pub fn add_column(&mut self, entity: EntityId, column: ColumnMetadata) -> Result<()> {
        let meta = self.entity_mut(entity)?;
        validate_identifier(&meta.name, &column.name)?;
        ensure_unique("column", meta.columns.iter().map(|c| c.name.as_str()), &column.name)?;
        meta.columns.push(column);
        Ok(())
    }

    /// Append a relation to an entity
    pub fn add_relation(&mut self, entity: EntityId, relation: RelationMetadata) -> Result<()> {
        let meta = self.entity_mut(entity)?;
        validate_identifier(&meta.name, &relation.property)?;
        let taken = meta.columns.iter().map(|c| c.name.as_str());
        let taken = taken.chain(meta.relations.iter().map(|r| r.property.as_str()));
        ensure_unique("relation", taken, &relation.property)?;
        meta.relations.push(relation);
        Ok(())
    }

    /// Total number of definitions registered so far
    pub fn definition_count(&self) -> usize { self.snapshot().definition_count() }

    /// Copy every category into an immutable snapshot
    pub fn snapshot(&self) -> RegistrySnapshot {
        let mut snapshot = RegistrySnapshot::new();
        for database in &self.databases {
            snapshot = snapshot.with_database(database.clone());
        }
        for api in &self.apis {
            snapshot = snapshot.with_api(api.clone());
        }
        for meta in &self.enums {
            snapshot = snapshot.with_enum(meta.clone());
        }
        for meta in &self.inputs {
            snapshot = snapshot.with_input(meta.clone());
        }
        for meta in &self.types {
            snapshot = snapshot.with_type(meta.clone());
        }
        for meta in &self.registry {
            snapshot = snapshot.with_registry_type(meta.clone());
        }
        snapshot
    }
}

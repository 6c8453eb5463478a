//! Database Emitter
//!
//! Aggregates the entities of one database into a single service, the
//! entity records and expression records, and one provider-backed proxy.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use ir::{by_name, DatabaseMetadata, EntityMetadata, RegistrySnapshot};
use tracing::debug;

use super::api::handler;
use super::entity::{emit_entity, EntityEmission};
use super::GEN;
use crate::idl::{IdlItem, IdlService, ServiceMember};
use crate::utils::{indent, kebab_case, screaming_snake_case};
use crate::{CodegenOptions, Result};

/// Items and script emitted for one database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseEmission {
    /// Banner, service, entity records and expression records in output order
    pub items: Vec<IdlItem>,
    /// Route constant, proxy and handler
    pub script: String,
}

/// Emit one database
pub fn emit_database(
    db: &DatabaseMetadata,
    snapshot: &RegistrySnapshot,
    options: &CodegenOptions,
) -> Result<DatabaseEmission> {
    let mut entities: Vec<&EntityMetadata> = db.entities.iter().collect();
    entities.sort_by(|a, b| by_name(&a.name, &b.name));

    // Working set, one emission per entity name
    let mut working: BTreeMap<&str, EntityEmission> = BTreeMap::new();
    for entity in entities {
        if working.contains_key(entity.name.as_str()) {
            continue;
        }
        working.insert(entity.name.as_str(), emit_entity(entity, snapshot, options)?);
    }

    let mut service = IdlService::new(&db.name);
    service.kind = Some("Database".to_string());
    for emission in working.values() {
        service.members.push(ServiceMember::Comment(format!("-- {}", emission.name)));
        for function in emission.queries.iter().chain(emission.mutations.iter()) {
            service.members.push(ServiceMember::Function(function.clone()));
        }
    }

    let mut items = vec![IdlItem::Comment(format!("-- Database: {} --", db.name)), IdlItem::Service(service)];
    for emission in working.values() {
        items.push(IdlItem::Comment(format!("-- Entity: {} --", emission.name)));
        items.push(IdlItem::Struct(emission.model.clone()));
    }
    for emission in working.values() {
        items.push(IdlItem::Comment(format!("-- Entity: {} --", emission.name)));
        items.extend(emission.expressions.iter().cloned().map(IdlItem::Struct));
    }

    let snake = screaming_snake_case(&db.name);
    let mut script = String::new();
    let route = if db.alias.is_empty() { kebab_case(&db.name) } else { db.alias.clone() };
    writeln!(script, "const {} = '{}';", snake, route)?;
    writeln!(script, "const {}_PROXY: {}.{}.IHandler<any> = {{", snake, GEN, db.name)?;
    let queries = working.values().flat_map(|e| e.query_closures.iter());
    let mutations = working.values().flat_map(|e| e.mutation_closures.iter());
    for closure in queries.chain(mutations) {
        writeln!(script, "{},", indent(&closure.to_string(), "  "))?;
    }
    writeln!(script, "}};")?;
    writeln!(script)?;
    script.push_str(&handler(&db.name));

    debug!("Emitted database {} ({} entities)", db.name, working.len());
    Ok(DatabaseEmission { items, script })
}

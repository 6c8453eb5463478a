//! Document assembler
//!
//! Drives every emitter over one snapshot in the fixed category order and
//! concatenates their output into the four artifacts.

use ir::RegistrySnapshot;
use tracing::{debug, info};

use crate::generators::prolog::prolog_items;
use crate::generators::{dispatch_service, emit_api, emit_database, emit_enum, emit_struct};
use crate::idl::{IdlDocument, IdlItem};
use crate::patch::build_patch;
use crate::{Artifacts, CodeGenerator, CodegenOptions, Result};

/// Thrift IDL generator over a registry snapshot
#[derive(Debug, Clone)]
pub struct ThriftGenerator<'a> {
    snapshot: &'a RegistrySnapshot,
    options: CodegenOptions,
}

impl<'a> ThriftGenerator<'a> {
    /// Generator with default options
    pub fn new(snapshot: &'a RegistrySnapshot) -> Self { Self { snapshot, options: CodegenOptions::default() } }

    /// Replace the generation options
    pub fn with_options(mut self, options: CodegenOptions) -> Self {
        self.options = options;
        self
    }

    /// Options in effect
    pub fn options(&self) -> &CodegenOptions { &self.options }

    /// Emit every artifact for the snapshot. `root` names the dispatch class
    /// and the generated module path; it does not affect the IDL.
    pub fn emit(&self, root: &str) -> Result<Artifacts> {
        let snapshot = self.snapshot;
        let apis = snapshot.sorted_apis();
        let databases = snapshot.sorted_databases();

        let mut document = IdlDocument::new();
        document.extend(prolog_items());

        let routes: Vec<&str> =
            databases.iter().map(|d| d.name.as_str()).chain(apis.iter().map(|a| a.name.as_str())).collect();
        let mut script = dispatch_service(root, &self.options.runtime_module, &routes)?;

        document.push(IdlItem::Section("API".to_string()));
        for api in &apis {
            let emission = emit_api(api, snapshot)?;
            document.push(IdlItem::Service(emission.service));
            script.push_str(&emission.script);
            script.push('\n');
        }

        document.push(IdlItem::Section("ENUM".to_string()));
        for meta in snapshot.sorted_enums() {
            debug!("Emitting enum {}", meta.name);
            document.push(IdlItem::Enum(emit_enum(meta)));
        }

        document.push(IdlItem::Section("INPUTS".to_string()));
        for meta in snapshot.sorted_inputs() {
            debug!("Emitting input {}", meta.name);
            document.push(IdlItem::Struct(emit_struct(meta)));
        }

        document.push(IdlItem::Section("TYPES".to_string()));
        for meta in snapshot.sorted_types() {
            debug!("Emitting type {}", meta.name);
            document.push(IdlItem::Struct(emit_struct(meta)));
        }

        document.push(IdlItem::Section("DATABASE".to_string()));
        for db in &databases {
            let emission = emit_database(db, snapshot, &self.options)?;
            document.extend(emission.items);
            script.push_str(&emission.script);
            script.push('\n');
        }

        document.push(IdlItem::Section("METADATA".to_string()));
        for meta in snapshot.sorted_registry_types() {
            debug!("Emitting registry type {}", meta.name);
            document.push(IdlItem::Struct(emit_struct(meta)));
        }

        let patch = build_patch(&document)?;
        let idl = document.render();

        info!(
            "Generated {} ({} apis, {} databases, {} enums, {} records, {} replacements)",
            root,
            apis.len(),
            databases.len(),
            document.enums().count(),
            document.structs().count(),
            patch.replacements.len()
        );

        Ok(Artifacts { idl, script, patch: patch.text, replacements: patch.replacements, document })
    }
}

impl CodeGenerator for ThriftGenerator<'_> {
    fn generate(&self, root: &str) -> Result<Artifacts> { self.emit(root) }
}

//! Snapshot Validation
//!
//! Structural checks on a snapshot: identifiers are usable, top-level names
//! do not collide in the generated document, and members are unique within
//! their owner. Snapshots loaded from disk bypass the registry's own checks,
//! so everything is re-verified here.

use std::collections::HashSet;

use ir::{RegistrySnapshot, TypeMetadata};
use registry::is_identifier;

use crate::{CompilerContext, CompilerPhase, PhaseResult};

/// Snapshot validator
#[derive(Debug, Default)]
pub struct SnapshotValidator;

/// Findings of one validation run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Problems that make generated output unusable
    pub errors: Vec<String>,
    /// Suspicious but generatable definitions
    pub warnings: Vec<String>,
}

impl SnapshotValidator {
    /// Create a new snapshot validator
    pub fn new() -> Self { Self }

    /// Validate a snapshot
    pub fn validate(&self, snapshot: &RegistrySnapshot) -> ValidationReport {
        let mut report = ValidationReport::default();

        // 1) Top-level names share one namespace in the generated document
        let mut seen = HashSet::new();
        let top_level = snapshot
            .enums()
            .iter()
            .map(|e| e.name.as_str())
            .chain(snapshot.inputs().iter().map(|t| t.name.as_str()))
            .chain(snapshot.types().iter().map(|t| t.name.as_str()))
            .chain(snapshot.registry_types().iter().map(|t| t.name.as_str()))
            .chain(snapshot.entities().map(|e| e.name.as_str()))
            .chain(snapshot.databases().iter().map(|d| d.name.as_str()))
            .chain(snapshot.apis().iter().map(|a| a.name.as_str()));
        for name in top_level {
            if !is_identifier(name) {
                report.errors.push(format!("Invalid definition name: `{}`", name));
            }
            if !seen.insert(name) {
                report.errors.push(format!("Duplicate definition name: {}", name));
            }
        }

        // 2) Enums
        for e in snapshot.enums() {
            if e.options.is_empty() {
                report.errors.push(format!("Enum `{}` declares no options", e.name));
            }
            check_unique(&e.name, "option", e.options.iter().map(String::as_str), &mut report);
        }

        // 3) Structured types
        for t in snapshot.inputs().iter().chain(snapshot.types()).chain(snapshot.registry_types()) {
            self.validate_type(t, &mut report);
        }

        // 4) Entities
        for entity in snapshot.entities() {
            let names = entity
                .columns
                .iter()
                .map(|c| c.name.as_str())
                .chain(entity.relations.iter().map(|r| r.property.as_str()));
            check_unique(&entity.name, "column", names, &mut report);
            if entity.primary_columns().next().is_none() {
                report.warnings.push(format!(
                    "Entity `{}` has no primary key; get and remove take no keys",
                    entity.name
                ));
            }
        }

        // 5) API methods
        for api in snapshot.apis() {
            check_unique(&api.name, "method", api.methods.iter().map(|m| m.name.as_str()), &mut report);
            for method in &api.methods {
                if method.api != api.name {
                    report.errors.push(format!(
                        "Method `{}` is owned by `{}` but declares api `{}`",
                        method.name, api.name, method.api
                    ));
                }
                let params = method.wire_inputs().map(|p| p.name.as_str());
                check_unique(&format!("{}.{}", api.name, method.name), "param", params, &mut report);
                if method.select.is_some() && !method.result.is_structured() {
                    report.warnings.push(format!(
                        "Method `{}.{}` selects fields of a non-structured result",
                        api.name, method.name
                    ));
                }
            }
        }

        report
    }

    fn validate_type(&self, t: &TypeMetadata, report: &mut ValidationReport) {
        check_unique(&t.name, "member", t.members.iter().map(|m| m.name.as_str()), report);
        for m in &t.members {
            if !is_identifier(&m.name) {
                report.errors.push(format!("Type `{}` has invalid member name `{}`", t.name, m.name));
            }
        }
    }
}

fn check_unique<'a>(
    owner: &str,
    what: &str,
    names: impl Iterator<Item = &'a str>,
    report: &mut ValidationReport,
) {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            report.errors.push(format!("`{}` duplicate {} `{}`", owner, what, name));
        }
    }
}

impl CompilerPhase for SnapshotValidator {
    fn name(&self) -> &str { "SnapshotValidator" }

    fn description(&self) -> &str { "Validate snapshot names and structure" }

    fn run(&self, ctx: &mut CompilerContext) -> PhaseResult {
        let report = self.validate(&ctx.snapshot);

        ctx.diagnostics.bump("snapshot_validation_errors", report.errors.len());
        ctx.diagnostics.bump("snapshot_validation_warnings", report.warnings.len());
        for warning in report.warnings {
            ctx.add_warning(warning);
        }
        for error in report.errors {
            ctx.add_error(error);
        }

        Ok(())
    }
}

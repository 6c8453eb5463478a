//! Reference Checking
//!
//! Every enum or struct a member, column, parameter or result names must be
//! registered, every relation must point at a registered entity and every
//! extension must extend a registered type or entity. A
//! dangling reference still generates (the IDL simply names an undefined
//! type), so it is a warning unless the checker runs in strict mode.

use ir::{RegistrySnapshot, StructKind, VarType};

use crate::{CompilerContext, CompilerPhase, PhaseResult};

/// Reference checker
#[derive(Debug, Default)]
pub struct ReferenceChecker {
    strict: bool,
}

/// A name that does not resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    /// Where the reference appears (`Type.member`, `Api.method`, ...)
    pub location: String,
    /// The unresolved type name
    pub target: String,
}

impl std::fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "`{}` references unknown type `{}`", self.location, self.target)
    }
}

impl ReferenceChecker {
    /// Checker that reports dangling references as warnings
    pub fn new() -> Self { Self::default() }

    /// Checker that reports dangling references as errors
    pub fn strict() -> Self { Self { strict: true } }

    /// Collect every dangling reference in declaration order
    pub fn check(&self, snapshot: &RegistrySnapshot) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();
        let visit = |dangling: &mut Vec<DanglingReference>, location: String, ty: &VarType| {
            if let Some(target) = unresolved(snapshot, ty) {
                dangling.push(DanglingReference { location, target });
            }
        };

        for t in snapshot.inputs().iter().chain(snapshot.types()).chain(snapshot.registry_types()) {
            for m in &t.members {
                visit(&mut dangling, format!("{}.{}", t.name, m.name), &m.ty);
            }
        }
        for entity in snapshot.entities() {
            for c in &entity.columns {
                visit(&mut dangling, format!("{}.{}", entity.name, c.name), &c.ty);
            }
        }
        for api in snapshot.apis() {
            for method in &api.methods {
                for p in &method.inputs {
                    visit(&mut dangling, format!("{}.{}({})", api.name, method.name, p.name), &p.ty);
                }
                visit(&mut dangling, format!("{}.{}", api.name, method.name), &method.result);
                if let Some(target) = &method.target {
                    if snapshot.find_struct(target).is_none() && snapshot.find_entity(target).is_none() {
                        dangling.push(DanglingReference {
                            location: format!("{}.{}", api.name, method.name),
                            target: target.clone(),
                        });
                    }
                }
            }
        }
        for entity in snapshot.entities() {
            for r in &entity.relations {
                if snapshot.find_entity(&r.inverse).is_none() {
                    dangling.push(DanglingReference {
                        location: format!("{}.{}", entity.name, r.property),
                        target: r.inverse.clone(),
                    });
                }
            }
        }

        dangling
    }
}

fn unresolved(snapshot: &RegistrySnapshot, ty: &VarType) -> Option<String> {
    match ty.element() {
        VarType::Enum { name } if snapshot.find_enum(name).is_none() => Some(name.clone()),
        VarType::Struct { name, struct_kind: StructKind::Entity } if snapshot.find_entity(name).is_none() => {
            Some(name.clone())
        }
        VarType::Struct { name, struct_kind } if *struct_kind != StructKind::Entity => {
            match snapshot.find_struct(name) {
                Some(found) if found.kind == *struct_kind => None,
                _ => Some(name.clone()),
            }
        }
        _ => None,
    }
}

impl CompilerPhase for ReferenceChecker {
    fn name(&self) -> &str { "ReferenceChecker" }

    fn description(&self) -> &str { "Check that every referenced enum, struct and entity is registered" }

    fn run(&self, ctx: &mut CompilerContext) -> PhaseResult {
        let dangling = self.check(&ctx.snapshot);
        ctx.diagnostics.bump("dangling_references", dangling.len());

        for reference in dangling {
            if self.strict {
                ctx.add_error(reference.to_string());
            } else {
                ctx.add_warning(reference.to_string());
            }
        }
        Ok(())
    }
}

//! Selection Builder
//!
//! Renders the field-selection block of a GraphQL document for a structured
//! result. An explicit select tree is followed member by member; without one
//! every non-structured member is selected, which keeps recursion finite on
//! cyclic type graphs.

use ir::{RegistrySnapshot, StructKind, TypeSelect, VarType};

use crate::{CodegenError, Result};

/// Selection renderer bound to one snapshot
#[derive(Debug, Clone, Copy)]
pub struct SelectionBuilder<'a> {
    snapshot: &'a RegistrySnapshot,
}

impl<'a> SelectionBuilder<'a> {
    /// Create a builder resolving types against `snapshot`
    pub fn new(snapshot: &'a RegistrySnapshot) -> Self { Self { snapshot } }

    /// Render the selection block for `ty` at nesting depth `depth`.
    ///
    /// Returns `None` for results that are not structured (scalars, enums,
    /// `any`, `void`). The block starts with `{` and its closing brace is
    /// indented by `depth` levels.
    pub fn render(&self, ty: &VarType, select: Option<&TypeSelect>, depth: usize) -> Result<Option<String>> {
        match ty.element() {
            VarType::Struct { name, struct_kind } => self.render_struct(name, *struct_kind, select, depth).map(Some),
            _ => Ok(None),
        }
    }

    /// Members of a structured type in declaration order. Entities expose
    /// their columns followed by their relations.
    fn members(&self, name: &str, kind: StructKind) -> Result<Vec<(String, VarType)>> {
        if kind == StructKind::Entity {
            let entity = self
                .snapshot
                .find_entity(name)
                .ok_or_else(|| CodegenError::UnknownType { name: name.to_string() })?;
            let columns = entity.columns.iter().map(|c| (c.name.clone(), c.ty.clone()));
            let relations = entity.relations.iter().map(|r| {
                let target = VarType::structure(r.inverse.clone(), StructKind::Entity);
                let ty = if r.kind.is_to_many() { VarType::array(target) } else { target };
                (r.property.clone(), ty)
            });
            return Ok(columns.chain(relations).collect());
        }
        let meta = self
            .snapshot
            .find_struct(name)
            .ok_or_else(|| CodegenError::UnknownType { name: name.to_string() })?;
        Ok(meta.members.iter().map(|m| (m.name.clone(), m.ty.clone())).collect())
    }

    fn render_struct(&self, name: &str, kind: StructKind, select: Option<&TypeSelect>, depth: usize) -> Result<String> {
        let members = self.members(name, kind)?;
        let pad = "  ".repeat(depth + 1);
        let mut lines: Vec<String> = Vec::new();

        match select {
            Some(tree) => {
                for entry in tree.fields() {
                    let invalid =
                        || CodegenError::InvalidSelect { type_name: name.to_string(), member: entry.name.clone() };
                    let (_, ty) = members.iter().find(|(member, _)| *member == entry.name).ok_or_else(invalid)?;
                    if entry.select.is_some() && !ty.is_structured() {
                        return Err(invalid());
                    }
                    match self.render(ty, entry.select.as_ref(), depth + 1)? {
                        Some(block) => lines.push(format!("{}{} {}", pad, entry.name, block)),
                        None => lines.push(format!("{}{}", pad, entry.name)),
                    }
                }
            }
            None => {
                for (member, ty) in &members {
                    if ty.is_structured() || ty.is_void() || ty.is_resolver() {
                        continue;
                    }
                    lines.push(format!("{}{}", pad, member));
                }
            }
        }

        if lines.is_empty() {
            lines.push(format!("{}__typename", pad));
        }
        Ok(format!("{{\n{}\n{}}}", lines.join("\n"), "  ".repeat(depth)))
    }
}

//! Struct Emitter
//!
//! Plain types, input types and registry meta-types become records whose
//! members are all optional. Enum-typed members carry a coercion mark for the
//! patch pass.

use ir::TypeMetadata;

use crate::escape::escape;
use crate::idl::{IdlStruct, Requiredness};
use crate::type_mapper::map_field;

/// Emit the record for a structured type
pub fn emit_struct(meta: &TypeMetadata) -> IdlStruct {
    let mut record = IdlStruct::new(&meta.name).with_kind(meta.kind.as_str());
    for member in &meta.members {
        let mapping = map_field(&member.name, &member.ty);
        record.push(Requiredness::Optional, mapping.idl, escape(&member.name)).coercion = mapping.coercion;
    }
    record
}

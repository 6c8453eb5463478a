//! Enum Emitter

use ir::EnumMetadata;

use crate::escape::escape;
use crate::idl::{IdlEnum, IdlEnumValue};

/// Emit an enum with explicit 0-based ordinals in declaration order
pub fn emit_enum(meta: &EnumMetadata) -> IdlEnum {
    let values = meta
        .options
        .iter()
        .enumerate()
        .map(|(value, option)| IdlEnumValue { name: escape(option), value })
        .collect();
    IdlEnum { name: meta.name.clone(), values }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals_follow_declaration_order() {
        let meta = EnumMetadata::new("Color", vec!["RED".into(), "GREEN".into(), "BLUE".into()]);
        assert_eq!(emit_enum(&meta).to_string(), "enum Color {\n  RED = 0,\n  GREEN = 1,\n  BLUE = 2\n}");
    }

    #[test]
    fn test_reserved_options_are_escaped() {
        let meta = EnumMetadata::new("Shape", vec!["list".into(), "set".into()]);
        let names: Vec<_> = emit_enum(&meta).values.into_iter().map(|v| v.name).collect();
        assert_eq!(names, vec!["__esc_list", "__esc_set"]);
    }
}

//! Codec patch pass
//!
//! Runs over the finished [`IdlDocument`] and turns every coercion mark into
//! a codec override plus the literal find/replace pairs downstream tooling
//! applies to the generated client sources.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use tracing::debug;

use crate::generators::prolog::BASE_PATCH;
use crate::idl::{Coercion, IdlDocument, IdlEnum, IdlItem, IdlStruct};
use crate::utils::indent;
use crate::Result;

/// Output of the patch pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    /// Script patch text
    pub text: String,
    /// Literal find → replace pairs
    pub replacements: BTreeMap<String, String>,
}

/// Two-way coercion between an enum option name and its ordinal
fn enum_coercion(meta: &IdlEnum) -> Result<String> {
    let name = &meta.name;
    let mut out = String::new();
    writeln!(out, "export const {}Coercion = {{", name)?;
    writeln!(
        out,
        "  encode: (value: {0} | string): {0} => (typeof value === 'string' ? {0}[value as keyof typeof {0}] : value),",
        name
    )?;
    writeln!(out, "  decode: (value: {0}): string => {0}[value],", name)?;
    writeln!(out, "}};")?;
    Ok(out)
}

/// Codec override for one record. Callers may pass enum option names; the
/// wire carries ordinals.
fn codec_override(record: &IdlStruct) -> Result<String> {
    let mut encode = Vec::new();
    let mut decode = Vec::new();
    for field in record.coerced_fields() {
        let Some(Coercion::Enum { name }) = &field.coercion else { continue };
        let f = &field.name;
        encode.push(format!("if (obj && typeof obj.{f} === 'string') obj.{f} = {name}[obj.{f} as any];"));
        decode.push(format!("if (obj && typeof obj.{f} === 'number') obj.{f} = {name}[obj.{f}];"));
    }

    let name = &record.name;
    let mut out = String::new();
    writeln!(out, "{{")?;
    writeln!(out, "  const codec = {{ ...{}Codec }};", name)?;
    writeln!(out, "  {0}Codec.encode = (obj: I{0}Args, output: thrift.TProtocol) => {{", name)?;
    writeln!(out, "{}", indent(&encode.join("\n"), "    "))?;
    writeln!(out, "    codec.encode(obj, output);")?;
    writeln!(out, "  }};")?;
    writeln!(out, "  {0}Codec.decode = (input: thrift.TProtocol): I{0} => {{", name)?;
    writeln!(out, "    const obj = codec.decode(input);")?;
    writeln!(out, "{}", indent(&decode.join("\n"), "    "))?;
    writeln!(out, "    return obj;")?;
    writeln!(out, "  }};")?;
    writeln!(out, "}}")?;
    Ok(out)
}

/// Derive the patch text and replacement mapping from `document`.
///
/// Enums and records are visited in document order; a replacement key produced twice
/// keeps the value written last.
pub fn build_patch(document: &IdlDocument) -> Result<Patch> {
    let mut patch = Patch { text: BASE_PATCH.to_string(), replacements: BTreeMap::new() };

    for item in &document.items {
        let record = match item {
            IdlItem::Enum(meta) => {
                patch.text.push_str(&enum_coercion(meta)?);
                continue;
            }
            IdlItem::Struct(record) if record.coerced_fields().next().is_some() => record,
            _ => continue,
        };
        patch.text.push_str(&codec_override(record)?);
        for field in record.coerced_fields() {
            let Some(Coercion::Enum { name }) = &field.coercion else { continue };
            patch.replacements.insert(
                format!("output.writeI32(obj.{});", field.name),
                format!("output.writeI32(obj.{} as number);", field.name),
            );
            patch.replacements.insert(format!(": {}", name), format!(": ({} | string)", name));
        }
        debug!("Patched codec {}", record.name);
    }

    Ok(patch)
}

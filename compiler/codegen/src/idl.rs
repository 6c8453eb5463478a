//! IDL document tree
//!
//! Emitters build these nodes instead of concatenating text; the document is
//! serialized once, at the end of a run, through the `Display` impls below.

use std::fmt;

/// Field requiredness qualifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requiredness {
    /// `required`
    Required,
    /// `optional`
    Optional,
    /// No qualifier (service parameters, union arms)
    Default,
}

impl Requiredness {
    /// `Required` when `required` is set, `Optional` otherwise
    pub fn from_flag(required: bool) -> Self {
        if required {
            Requiredness::Required
        } else {
            Requiredness::Optional
        }
    }
}

/// Codec coercion a field needs on the script side
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coercion {
    /// Enum value carried as its option name by callers and as an ordinal on the wire
    Enum {
        /// Enum name
        name: String,
    },
}

/// Field annotation, `key = "value"` or a bare `key`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Annotation key
    pub key: String,
    /// Annotation value
    pub value: Option<String>,
}

impl Annotation {
    /// `key = "value"`
    pub fn pair(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: Some(value.into()) }
    }

    /// Bare `key`
    pub fn flag(key: impl Into<String>) -> Self { Self { key: key.into(), value: None } }
}

/// Numbered struct field, union arm or function parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdlField {
    /// 1-based field id
    pub index: usize,
    /// Requiredness qualifier
    pub requiredness: Requiredness,
    /// IDL type token
    pub ty: String,
    /// Escaped field name
    pub name: String,
    /// Trailing annotations
    pub annotations: Vec<Annotation>,
    /// Coercion mark consumed by the patch pass
    pub coercion: Option<Coercion>,
}

impl IdlField {
    /// Create a field without annotations
    pub fn new(index: usize, requiredness: Requiredness, ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            index,
            requiredness,
            ty: ty.into(),
            name: name.into(),
            annotations: Vec::new(),
            coercion: None,
        }
    }

}

impl fmt::Display for IdlField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.index)?;
        match self.requiredness {
            Requiredness::Required => f.write_str("required ")?,
            Requiredness::Optional => f.write_str("optional ")?,
            Requiredness::Default => {}
        }
        write!(f, "{} {}", self.ty, self.name)?;
        if !self.annotations.is_empty() {
            let rendered: Vec<String> = self
                .annotations
                .iter()
                .map(|a| match &a.value {
                    Some(value) => format!("{} = \"{}\"", a.key, value),
                    None => a.key.clone(),
                })
                .collect();
            write!(f, " ({})", rendered.join(", "))?;
        }
        Ok(())
    }
}

/// Record (struct or union)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdlStruct {
    /// Type name
    pub name: String,
    /// Fields in id order
    pub fields: Vec<IdlField>,
    /// Value of the trailing `kind` annotation
    pub kind: Option<String>,
}

impl IdlStruct {
    /// Create an empty record
    pub fn new(name: impl Into<String>) -> Self { Self { name: name.into(), fields: Vec::new(), kind: None } }

    /// Builder-style `kind` annotation
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Append a field numbered after the last one
    pub fn push(&mut self, requiredness: Requiredness, ty: impl Into<String>, name: impl Into<String>) -> &mut IdlField {
        let index = self.fields.len() + 1;
        self.fields.push(IdlField::new(index, requiredness, ty, name));
        let last = self.fields.len() - 1;
        &mut self.fields[last]
    }

    /// Field by (escaped) name
    pub fn field(&self, name: &str) -> Option<&IdlField> { self.fields.iter().find(|f| f.name == name) }

    /// Fields carrying a coercion mark
    pub fn coerced_fields(&self) -> impl Iterator<Item = &IdlField> {
        self.fields.iter().filter(|f| f.coercion.is_some())
    }

    fn render(&self, keyword: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {{", keyword, self.name)?;
        for (i, field) in self.fields.iter().enumerate() {
            let sep = if i == 0 { "" } else { "," };
            write!(f, "{}\n  {}", sep, field)?;
        }
        f.write_str("\n}")?;
        if let Some(kind) = &self.kind {
            write!(f, " (kind=\"{}\")", kind)?;
        }
        Ok(())
    }
}

impl fmt::Display for IdlStruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.render("struct", f) }
}

/// Enum option with its explicit value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdlEnumValue {
    /// Escaped option name
    pub name: String,
    /// Ordinal
    pub value: usize,
}

/// Enum definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdlEnum {
    /// Enum name
    pub name: String,
    /// Options in ordinal order
    pub values: Vec<IdlEnumValue>,
}

impl fmt::Display for IdlEnum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "enum {} {{", self.name)?;
        for (i, value) in self.values.iter().enumerate() {
            let sep = if i == 0 { "" } else { "," };
            write!(f, "{}\n  {} = {}", sep, value.name, value.value)?;
        }
        f.write_str("\n}")
    }
}

/// Service operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdlFunction {
    /// Result type token
    pub result: String,
    /// Escaped operation name
    pub name: String,
    /// Parameters in id order
    pub params: Vec<IdlField>,
    /// Trailing `//` comment inside the service body
    pub comment: Option<String>,
}

impl IdlFunction {
    /// Operation without a trailing comment
    pub fn new(result: impl Into<String>, name: impl Into<String>, params: Vec<IdlField>) -> Self {
        Self { result: result.into(), name: name.into(), params, comment: None }
    }

    /// Builder-style trailing comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Parameter names in order
    pub fn param_names(&self) -> Vec<&str> { self.params.iter().map(|p| p.name.as_str()).collect() }
}

impl fmt::Display for IdlFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        write!(f, "{} {}({})", self.result, self.name, params.join(", "))
    }
}

/// Line inside a service body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceMember {
    /// `// text`
    Comment(String),
    /// Operation
    Function(IdlFunction),
}

/// Service definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdlService {
    /// Service name
    pub name: String,
    /// Operations and grouping comments
    pub members: Vec<ServiceMember>,
    /// Value of the trailing `kind` annotation
    pub kind: Option<String>,
}

impl IdlService {
    /// Create an empty service
    pub fn new(name: impl Into<String>) -> Self { Self { name: name.into(), members: Vec::new(), kind: None } }

    /// Operations in order, skipping comments
    pub fn functions(&self) -> impl Iterator<Item = &IdlFunction> {
        self.members.iter().filter_map(|m| match m {
            ServiceMember::Function(function) => Some(function),
            ServiceMember::Comment(_) => None,
        })
    }

    /// Operation by name
    pub fn function(&self, name: &str) -> Option<&IdlFunction> { self.functions().find(|f| f.name == name) }
}

impl fmt::Display for IdlService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "service {} {{", self.name)?;
        let total = self.functions().count();
        let mut seen = 0;
        for member in &self.members {
            match member {
                ServiceMember::Comment(text) => write!(f, "\n  // {}", text)?,
                ServiceMember::Function(function) => {
                    seen += 1;
                    let sep = if seen < total { "," } else { "" };
                    write!(f, "\n  {}{}", function, sep)?;
                    if let Some(comment) = &function.comment {
                        write!(f, " // {}", comment)?;
                    }
                }
            }
        }
        f.write_str("\n}")?;
        if let Some(kind) = &self.kind {
            write!(f, " (kind=\"{}\")", kind)?;
        }
        Ok(())
    }
}

/// Top-level document node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdlItem {
    /// Category banner, followed by a blank line
    Section(String),
    /// Comment line attached to the next definition
    Comment(String),
    /// `typedef <target> <name>`
    Typedef {
        /// Aliased type token
        target: String,
        /// Alias name
        name: String,
    },
    /// Union
    Union(IdlStruct),
    /// Struct
    Struct(IdlStruct),
    /// Enum
    Enum(IdlEnum),
    /// Service
    Service(IdlService),
}

impl fmt::Display for IdlItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdlItem::Section(title) => write!(f, "//////// {} ////////", title),
            IdlItem::Comment(text) => write!(f, "# {}", text),
            IdlItem::Typedef { target, name } => write!(f, "typedef {} {}", target, name),
            IdlItem::Union(record) => record.render("union", f),
            IdlItem::Struct(record) => fmt::Display::fmt(record, f),
            IdlItem::Enum(meta) => fmt::Display::fmt(meta, f),
            IdlItem::Service(service) => fmt::Display::fmt(service, f),
        }
    }
}

/// Complete IDL document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdlDocument {
    /// Items in output order
    pub items: Vec<IdlItem>,
}

impl IdlDocument {
    /// Empty document
    pub fn new() -> Self { Self::default() }

    /// Append an item
    pub fn push(&mut self, item: IdlItem) { self.items.push(item); }

    /// Append several items
    pub fn extend(&mut self, items: impl IntoIterator<Item = IdlItem>) { self.items.extend(items); }

    /// Every struct in output order
    pub fn structs(&self) -> impl Iterator<Item = &IdlStruct> {
        self.items.iter().filter_map(|item| match item {
            IdlItem::Struct(record) => Some(record),
            _ => None,
        })
    }

    /// Every enum in output order
    pub fn enums(&self) -> impl Iterator<Item = &IdlEnum> {
        self.items.iter().filter_map(|item| match item {
            IdlItem::Enum(meta) => Some(meta),
            _ => None,
        })
    }

    /// Every service in output order
    pub fn services(&self) -> impl Iterator<Item = &IdlService> {
        self.items.iter().filter_map(|item| match item {
            IdlItem::Service(service) => Some(service),
            _ => None,
        })
    }

    /// Struct by name
    pub fn find_struct(&self, name: &str) -> Option<&IdlStruct> { self.structs().find(|s| s.name == name) }

    /// Enum by name
    pub fn find_enum(&self, name: &str) -> Option<&IdlEnum> { self.enums().find(|e| e.name == name) }

    /// Service by name
    pub fn find_service(&self, name: &str) -> Option<&IdlService> { self.services().find(|s| s.name == name) }

    /// Serialize the document.
    ///
    /// Definitions are separated by a blank line; comment items stick to the
    /// definition that follows them.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for item in &self.items {
            out.push_str(&item.to_string());
            match item {
                IdlItem::Comment(_) => out.push('\n'),
                _ => out.push_str("\n\n"),
            }
        }
        let trimmed = out.trim_end().len();
        out.truncate(trimmed);
        if !out.is_empty() {
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_struct_rendering() {
        let mut record = IdlStruct::new("User").with_kind("Entity");
        record.push(Requiredness::Required, "ID", "id");
        record.push(Requiredness::Optional, "string", "name");
        record
            .push(Requiredness::Optional, "list<Tag>", "tags")
            .annotations
            .push(Annotation::pair("relation", "ManyToMany"));

        assert_eq!(
            record.to_string(),
            "struct User {\n  1: required ID id,\n  2: optional string name,\n  3: optional list<Tag> tags (relation = \"ManyToMany\")\n} (kind=\"Entity\")"
        );
    }

    #[test]
    fn test_service_separators_skip_comments() {
        let function = |name: &str| IdlFunction::new("void", name, vec![]);
        let service = IdlService {
            name: "Zoo".into(),
            members: vec![
                ServiceMember::Comment("-- Tag".into()),
                ServiceMember::Function(function("a")),
                ServiceMember::Comment("-- User".into()),
                ServiceMember::Function(function("b").with_comment("@crud(auth: {})")),
            ],
            kind: Some("Database".into()),
        };
        assert_eq!(
            service.to_string(),
            "service Zoo {\n  // -- Tag\n  void a(),\n  // -- User\n  void b() // @crud(auth: {})\n} (kind=\"Database\")"
        );
    }

    #[test]
    fn test_document_spacing() {
        let mut doc = IdlDocument::new();
        doc.push(IdlItem::Typedef { target: "string".into(), name: "ID".into() });
        doc.push(IdlItem::Comment("-- Entity: User --".into()));
        doc.push(IdlItem::Struct(IdlStruct::new("User")));
        assert_eq!(doc.render(), "typedef string ID\n\n# -- Entity: User --\nstruct User {\n}\n");
    }
}

//! Field-select trees
//!
//! A [`TypeSelect`] lists which members of a structured result a generated
//! query document should fetch. Entries keep their order; a nested tree
//! narrows the selection of a structured member.

use serde::{Deserialize, Serialize};

/// Ordered field selection
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeSelect(Vec<FieldSelect>);

/// One selected member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSelect {
    /// Member name
    pub name: String,
    /// Nested selection for a structured member
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<TypeSelect>,
}

impl TypeSelect {
    /// Empty selection
    pub fn new() -> Self { Self::default() }

    /// Append a leaf member
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.0.push(FieldSelect { name: name.into(), select: None });
        self
    }

    /// Append a structured member with its own selection
    pub fn nested(mut self, name: impl Into<String>, select: TypeSelect) -> Self {
        self.0.push(FieldSelect { name: name.into(), select: Some(select) });
        self
    }

    /// Selected members in order
    pub fn fields(&self) -> &[FieldSelect] { &self.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_keeps_order() {
        let select: TypeSelect = serde_json::from_str(
            r#"[{"name":"name"},{"name":"owner","select":[{"name":"email"}]},{"name":"id"}]"#,
        )
        .expect("parse select");
        let names: Vec<_> = select.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["name", "owner", "id"]);
        assert_eq!(select, TypeSelect::new().field("name").nested("owner", TypeSelect::new().field("email")).field("id"));
    }
}

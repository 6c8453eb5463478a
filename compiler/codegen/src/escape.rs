//! Identifier escaping for IDL keywords

/// Words that cannot appear as field, parameter or operation names
pub const RESERVED: &[&str] = &[
    "required", "optional", "service", "enum", "extends", "exception", "struct", "throws", "string",
    "bool", "list", "set",
];

/// Prefix added to reserved identifiers
pub const ESCAPE_PREFIX: &str = "__esc_";

/// Whether `name` collides with an IDL keyword
pub fn is_reserved(name: &str) -> bool { RESERVED.contains(&name) }

/// Escape a member identifier. Type names are never passed through here.
pub fn escape(name: &str) -> String {
    if is_reserved(name) {
        format!("{}{}", ESCAPE_PREFIX, name)
    } else {
        name.to_string()
    }
}

/// Object-literal entry binding the original key to its escaped local
/// (`id`, or `list: __esc_list`)
pub fn binding(name: &str) -> String {
    let escaped = escape(name);
    if escaped == name {
        escaped
    } else {
        format!("{}: {}", name, escaped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("list"), "__esc_list");
        assert_eq!(escape("set"), "__esc_set");
        assert_eq!(escape("lists"), "lists");
        // Case-sensitive
        assert_eq!(escape("List"), "List");
    }

    #[test]
    fn test_binding() {
        assert_eq!(binding("id"), "id");
        assert_eq!(binding("list"), "list: __esc_list");
    }
}

// codegen/src/utils.rs

/// Converts a PascalCase or camelCase name to snake_case
///
/// A word boundary is placed before an upper-case letter that follows a
/// lower-case letter or digit, and before the last capital of an acronym
/// that is followed by a lower-case letter. Existing underscores are kept.
///
/// # Examples
/// ```
/// use idlsmith_codegen::utils::to_snake_case;
/// assert_eq!(to_snake_case("UserApi"), "user_api");
/// assert_eq!(to_snake_case("UserApi_getUser"), "user_api_get_user");
/// assert_eq!(to_snake_case("HTTPGateway"), "http_gateway");
/// ```
pub fn to_snake_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut result = String::new();

    for (i, c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 && !result.ends_with('_') {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                result.push('_');
            }
        }
        result.extend(c.to_lowercase());
    }

    result
}

/// SCREAMING_SNAKE_CASE name used for generated script constants
pub fn screaming_snake_case(input: &str) -> String { to_snake_case(input).to_uppercase() }

/// kebab-case name used as a service routing key
pub fn kebab_case(input: &str) -> String { to_snake_case(input).replace('_', "-") }

/// Prefix every non-empty line of `text` with `prefix`
pub fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| if line.is_empty() { String::new() } else { format!("{}{}", prefix, line) })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("Zoo"), "zoo");
        assert_eq!(to_snake_case("UserApi"), "user_api");
        assert_eq!(to_snake_case("getUser"), "get_user");
        assert_eq!(to_snake_case("Api2Users"), "api2_users");
        assert_eq!(to_snake_case("HTTPGateway"), "http_gateway");
        assert_eq!(to_snake_case("UserApi_getUser"), "user_api_get_user");
    }

    #[test]
    fn test_constant_and_route_names() {
        assert_eq!(screaming_snake_case("UserApi"), "USER_API");
        assert_eq!(kebab_case("UserApi"), "user-api");
        assert_eq!(kebab_case("Zoo"), "zoo");
    }

    #[test]
    fn test_indent() {
        assert_eq!(indent("a\n\nb", "  "), "  a\n\n  b");
    }
}

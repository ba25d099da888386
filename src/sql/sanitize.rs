//! Identifier and literal quoting
//!
//! Every identifier is wrapped in backticks so that case and special
//! characters survive a round trip through the parser.

use std::sync::LazyLock;

use regex::Regex;

use crate::table::TableIdentifier;

static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w]+$").expect("static name pattern is valid")
});

/// Quote an identifier with backticks
///
/// Embedded backticks are doubled.
///
/// # Example
/// ```
/// use catalog_ddl::sql::quote_identifier;
///
/// assert_eq!(quote_identifier("a"), "`a`");
/// assert_eq!(quote_identifier("we`ird"), "`we``ird`");
/// ```
pub fn quote_identifier(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}

/// Quote a table identifier as `` `namespace`.`name` ``
///
/// Identifiers without a namespace are qualified with `current_namespace`.
pub fn quote_table_identifier(identifier: &TableIdentifier, current_namespace: &str) -> String {
    let namespace = identifier
        .namespace
        .as_deref()
        .unwrap_or(current_namespace);
    format!(
        "{}.{}",
        quote_identifier(namespace),
        quote_identifier(&identifier.name)
    )
}

/// Render a single-quoted string literal
///
/// Backslashes and single quotes are escaped with a backslash; control
/// characters use the escapes the parser understands.
///
/// # Example
/// ```
/// use catalog_ddl::sql::quote_string;
///
/// assert_eq!(quote_string("it's"), r"'it\'s'");
/// ```
pub fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\{:03o}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Validate a namespace or table name
///
/// Rules:
/// - Must not be empty
/// - Only letters, digits and underscores
pub fn validate_identifier(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Identifier cannot be empty".to_string());
    }

    if !NAME_PATTERN.is_match(name) {
        return Err(format!(
            "Identifier '{}' is invalid. Only letters, digits and underscores are allowed.",
            name
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // quote_identifier Tests
    // =========================================================================

    #[test]
    fn test_quote_identifier_simple() {
        assert_eq!(quote_identifier("my_table"), "`my_table`");
        assert_eq!(quote_identifier("a"), "`a`");
    }

    #[test]
    fn test_quote_identifier_preserves_case() {
        assert_eq!(quote_identifier("MyColumn"), "`MyColumn`");
    }

    #[test]
    fn test_quote_identifier_with_backticks() {
        assert_eq!(quote_identifier("a`b"), "`a``b`");
        assert_eq!(quote_identifier("`x`"), "```x```");
    }

    #[test]
    fn test_quote_identifier_special_chars() {
        assert_eq!(quote_identifier("my-col"), "`my-col`");
        assert_eq!(quote_identifier("a.b"), "`a.b`");
        assert_eq!(quote_identifier("with space"), "`with space`");
        assert_eq!(quote_identifier("日本語"), "`日本語`");
    }

    #[test]
    fn test_quote_identifier_empty() {
        assert_eq!(quote_identifier(""), "``");
    }

    // =========================================================================
    // quote_table_identifier Tests
    // =========================================================================

    #[test]
    fn test_quote_table_identifier_qualified() {
        let ident = TableIdentifier::new("db", "t1");
        assert_eq!(quote_table_identifier(&ident, "default"), "`db`.`t1`");
    }

    #[test]
    fn test_quote_table_identifier_uses_current_namespace() {
        let ident = TableIdentifier::unqualified("t1");
        assert_eq!(quote_table_identifier(&ident, "default"), "`default`.`t1`");
    }

    // =========================================================================
    // quote_string Tests
    // =========================================================================

    #[test]
    fn test_quote_string_plain() {
        assert_eq!(quote_string("value1"), "'value1'");
        assert_eq!(quote_string(""), "''");
    }

    #[test]
    fn test_quote_string_escapes() {
        assert_eq!(quote_string("it's"), "'it\\'s'");
        assert_eq!(quote_string("a\\b"), "'a\\\\b'");
        assert_eq!(quote_string("x\ty"), "'x\\ty'");
        assert_eq!(quote_string("line\nbreak"), "'line\\nbreak'");
    }

    #[test]
    fn test_quote_string_control_chars_octal() {
        assert_eq!(quote_string("\u{1}"), "'\\001'");
        assert_eq!(quote_string("\u{0}"), "'\\000'");
    }

    // =========================================================================
    // validate_identifier Tests
    // =========================================================================

    #[test]
    fn test_validate_identifier_valid() {
        assert!(validate_identifier("t1").is_ok());
        assert!(validate_identifier("_tmp").is_ok());
        assert!(validate_identifier("Sales_2024").is_ok());
    }

    #[test]
    fn test_validate_identifier_empty() {
        let result = validate_identifier("");
        assert!(result.unwrap_err().contains("cannot be empty"));
    }

    #[test]
    fn test_validate_identifier_invalid_chars() {
        assert!(validate_identifier("my-table").is_err());
        assert!(validate_identifier("my table").is_err());
        assert!(validate_identifier("a.b").is_err());
        assert!(validate_identifier("a`b").is_err());
    }
}

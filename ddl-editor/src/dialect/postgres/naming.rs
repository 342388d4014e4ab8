// Copyright (c) 2024-2025 DDL Editor Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Identifier and literal quoting for PostgreSQL

use crate::command::PersistAction;
use crate::config::{EditorConfig, IdentifierQuoting};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;

static SIMPLE_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_$]*$").expect("valid identifier pattern"));

static RESERVED_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric", "both",
        "case", "cast", "check", "collate", "column", "constraint", "create", "current_catalog",
        "current_date", "current_role", "current_time", "current_timestamp", "current_user",
        "default", "deferrable", "desc", "distinct", "do", "else", "end", "except", "false",
        "fetch", "for", "foreign", "from", "grant", "group", "having", "in", "initially",
        "intersect", "into", "lateral", "leading", "limit", "localtime", "localtimestamp", "not",
        "null", "offset", "on", "only", "or", "order", "placing", "primary", "references",
        "returning", "select", "session_user", "some", "symmetric", "table", "then", "to",
        "trailing", "true", "union", "unique", "user", "using", "variadic", "when", "where",
        "window", "with",
    ]
    .into_iter()
    .collect()
});

pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(name.to_ascii_lowercase().as_str())
}

/// Render an identifier according to the configured quoting policy
pub fn quote_identifier(name: &str, config: &EditorConfig) -> String {
    let quote = match config.identifier_quoting {
        IdentifierQuoting::Never => false,
        IdentifierQuoting::Always => true,
        IdentifierQuoting::AsNeeded => !SIMPLE_IDENTIFIER.is_match(name) || is_reserved_word(name),
    };
    if quote {
        format!("\"{}\"", name.replace('"', "\"\""))
    } else {
        name.to_string()
    }
}

/// Single-quoted string literal
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Text of a string-valued property; `None` for unset, non-string or blank values
pub(crate) fn text_value(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}

/// `COMMENT ON <target> IS ...`; a blank description clears the comment
pub(crate) fn comment_action(title: &str, target: &str, description: &Value) -> PersistAction {
    let comment = text_value(description)
        .map(quote_literal)
        .unwrap_or_else(|| "NULL".to_string());
    PersistAction::new(title, format!("COMMENT ON {} IS {}", target, comment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_needed_quoting() {
        let config = EditorConfig::default();
        assert_eq!(quote_identifier("v1", &config), "v1");
        assert_eq!(quote_identifier("order_items", &config), "order_items");
        assert_eq!(quote_identifier("NewView", &config), "\"NewView\"");
        assert_eq!(quote_identifier("user", &config), "\"user\"");
        assert_eq!(quote_identifier("my view", &config), "\"my view\"");
        assert_eq!(quote_identifier("a\"b", &config), "\"a\"\"b\"");
    }

    #[test]
    fn test_quoting_policies() {
        let always = EditorConfig::strict_quoting();
        assert_eq!(quote_identifier("v1", &always), "\"v1\"");

        let never = EditorConfig {
            identifier_quoting: IdentifierQuoting::Never,
            ..EditorConfig::default()
        };
        assert_eq!(quote_identifier("NewView", &never), "NewView");
    }

    #[test]
    fn test_literals_and_comments() {
        assert_eq!(quote_literal("it's"), "'it''s'");

        let action = comment_action("Comment view", "VIEW v1", &Value::from("daily totals"));
        assert_eq!(action.script(), "COMMENT ON VIEW v1 IS 'daily totals'");

        let cleared = comment_action("Comment view", "VIEW v1", &Value::Null);
        assert_eq!(cleared.script(), "COMMENT ON VIEW v1 IS NULL");
    }
}

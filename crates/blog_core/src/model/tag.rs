//! Tag domain model and tag-field parsing.
//!
//! # Responsibility
//! - Define the tag record.
//! - Turn the editor's comma-separated tag field into a name set.
//!
//! # Invariants
//! - Tag names are unique in storage.
//! - Names compare by exact string equality after trimming; no case folding.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub type TagId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

/// Parses a comma-separated tag field.
///
/// Each element is trimmed of surrounding whitespace; empty elements are
/// dropped and repeated names collapse into one.
pub fn parse_tag_field(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Renders a tag-name set back into the editor field format.
pub fn format_tag_field<'a>(names: impl IntoIterator<Item = &'a String>) -> String {
    names
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::{format_tag_field, parse_tag_field};

    #[test]
    fn parse_trims_and_drops_empty_elements() {
        let parsed = parse_tag_field("  rust , ,sqlite,, ");
        let names: Vec<&str> = parsed.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["rust", "sqlite"]);
    }

    #[test]
    fn parse_is_case_sensitive_and_dedupes_exact_matches() {
        let parsed = parse_tag_field("Rust,rust, Rust ");
        assert_eq!(parsed.len(), 2);
        assert!(parsed.contains("Rust"));
        assert!(parsed.contains("rust"));
    }

    #[test]
    fn parse_empty_field_yields_empty_set() {
        assert!(parse_tag_field("").is_empty());
        assert!(parse_tag_field(" , ").is_empty());
    }

    #[test]
    fn format_joins_with_comma_space() {
        let parsed = parse_tag_field("b,a");
        assert_eq!(format_tag_field(&parsed), "a, b");
    }
}

//! Parsing of R package `DESCRIPTION` files
//!
//! The format is label-prefixed: a field starts on a line `Label: value` and
//! continues over following lines that begin with whitespace. Continuation
//! lines are trimmed and joined to the field value with single spaces.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static FIELD_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9@/._-]*):\s*(.*)$").expect("field pattern is valid")
});

/// Fields extracted from a package manifest
///
/// Missing labels yield empty strings and empty lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    pub title: String,
    pub version: String,
    pub description: String,
    pub license: String,
    pub depends: Vec<String>,
    pub imports: Vec<String>,
    pub suggests: Vec<String>,
}

impl PackageManifest {
    pub fn parse(text: &str) -> Self {
        let fields = parse_fields(text);
        let field = |label: &str| {
            fields
                .iter()
                .find(|(name, _)| name == label)
                .map(|(_, value)| value.clone())
                .unwrap_or_default()
        };

        Self {
            title: field("Title"),
            version: field("Version"),
            description: field("Description"),
            license: field("License"),
            depends: split_list(&field("Depends")),
            imports: split_list(&field("Imports")),
            suggests: split_list(&field("Suggests")),
        }
    }

    /// Use `fallback` when the manifest carries no description of its own
    pub fn with_fallback_description(mut self, fallback: Option<&str>) -> Self {
        if self.description.is_empty() {
            self.description = fallback.unwrap_or_default().to_string();
        }
        self
    }
}

/// Split manifest text into `(label, value)` pairs in file order
fn parse_fields(text: &str) -> Vec<(String, String)> {
    let mut fields: Vec<(String, String)> = Vec::new();
    let mut continuing = false;

    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continuing = false;
            continue;
        }

        if line.starts_with([' ', '\t']) {
            if let (true, Some((_, value))) = (continuing, fields.last_mut()) {
                if !value.is_empty() {
                    value.push(' ');
                }
                value.push_str(line.trim());
            }
            continue;
        }

        match FIELD_START.captures(line) {
            Some(caps) => {
                fields.push((caps[1].to_string(), caps[2].trim().to_string()));
                continuing = true;
            }
            None => continuing = false,
        }
    }

    fields
}

/// Split a comma-separated dependency field, keeping version constraints
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

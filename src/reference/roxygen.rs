//! Extraction of roxygen documentation blocks from R sources
//!
//! A block is a run of consecutive `#'` lines immediately followed by a
//! function definition such as `step_pca <- function(`. Runs that are not
//! followed by a definition (data docs, package docs) are skipped.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::NO_DOCUMENTATION;

static FUNCTION_DEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[A-Za-z.][A-Za-z0-9._]*\s*(<-|=)\s*function\s*\(")
        .expect("function pattern is valid")
});

const ROXYGEN_MARKER: &str = "#'";

/// All documentation blocks attached to function definitions, in file order
pub fn extract_blocks(source: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in source.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(rest) = line.trim_start().strip_prefix(ROXYGEN_MARKER) {
            current.push(rest.strip_prefix(' ').unwrap_or(rest));
            continue;
        }

        if !current.is_empty() && FUNCTION_DEF.is_match(line) {
            blocks.push(current.join("\n"));
        }
        current.clear();
    }

    blocks
}

/// Blocks whose text contains `query`, ignoring case
pub fn matching_blocks(source: &str, query: &str) -> Vec<String> {
    let needle = query.to_lowercase();
    extract_blocks(source)
        .into_iter()
        .filter(|block| block.to_lowercase().contains(&needle))
        .collect()
}

/// Matching blocks separated by a blank line, or the no-documentation sentinel
pub fn render_documentation(source: &str, query: &str) -> String {
    let blocks = matching_blocks(source, query);
    if blocks.is_empty() {
        NO_DOCUMENTATION.to_string()
    } else {
        blocks.join("\n\n")
    }
}

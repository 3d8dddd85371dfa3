//! Auxiliary-file parsing: bibliography paths and cited keys.
//!
//! LaTeX writes a `.aux` file recording which `.bib` files were used
//! (`\bibdata{a,b}`) and which keys were cited (`\bibcite{key}{label}`).
//! This module extracts both without interpreting anything else in the file.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

#[allow(clippy::expect_used)]
static BIBDATA_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\bibdata\{(.*?)\}").expect("bibdata regex is valid"));

#[allow(clippy::expect_used)]
static BIBCITE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\bibcite\{(.*?)\}").expect("bibcite regex is valid"));

/// Everything recovered from one auxiliary file.
#[derive(Debug, Clone)]
pub struct AuxData {
    /// Full text of the aux file.
    pub raw: String,
    /// Bibliography file paths from the `\bibdata` directive, in directive order.
    /// Empty when the directive is absent.
    pub bib_paths: Vec<String>,
    /// Cited keys in order of occurrence, duplicates preserved.
    pub cite_keys: Vec<String>,
}

/// Parses auxiliary-file text into bibliography paths and cited keys.
///
/// A missing `\bibdata` directive yields an empty path list, not an error;
/// a document with no citations yields an empty key list.
#[must_use]
pub fn parse_aux(text: &str) -> AuxData {
    let bib_paths: Vec<String> = match BIBDATA_PATTERN.captures(text) {
        Some(cap) => cap[1].split(',').map(str::to_string).collect(),
        None => Vec::new(),
    };

    // Advance past each match so a degenerate `\bibcite{}` cannot loop.
    let mut cite_keys = Vec::new();
    let mut pos = 0;
    while let Some(m) = BIBCITE_PATTERN.captures_at(text, pos) {
        let Some(full) = m.get(0) else { break };
        cite_keys.push(m[1].to_string());
        pos = full.end();
    }

    debug!(
        bib_paths = bib_paths.len(),
        cite_keys = cite_keys.len(),
        "parsed aux file"
    );

    AuxData {
        raw: text.to_string(),
        bib_paths,
        cite_keys,
    }
}

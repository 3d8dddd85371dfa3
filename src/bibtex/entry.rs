//! BibTeX entry model and parser.
//!
//! The pipeline only needs key -> field-map access, so every entry type is
//! accepted; `@comment`, `@preamble`, and `@string` blocks are skipped.
//! Segmentation is brace-balanced and quote-aware so that braces inside
//! field values (`title = {The {LIGO} Detector}`) do not end an entry.

use std::collections::HashMap;

use thiserror::Error;

const IGNORED_BLOCK_TYPES: [&str; 3] = ["comment", "preamble", "string"];

/// A single parsed BibTeX entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibEntry {
    /// Entry type after `@`, lowercased (`article`, `book`, ...).
    pub entry_type: String,
    /// Citation key after `@type{`.
    pub key: String,
    /// Original text for this entry.
    pub raw: String,
    /// Field name (lowercased) to value, one layer of braces/quotes stripped.
    pub fields: HashMap<String, String>,
}

impl BibEntry {
    /// Returns the value of a field, looked up case-insensitively.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// Errors raised while parsing BibTeX text.
#[derive(Debug, Error)]
pub enum BibtexError {
    /// An entry candidate could not be parsed.
    #[error("malformed BibTeX entry `{preview}`: {reason}")]
    MalformedEntry {
        /// Truncated entry text for diagnostics.
        preview: String,
        /// What was wrong with it.
        reason: String,
    },
}

impl BibtexError {
    fn malformed(entry: &str, reason: impl Into<String>) -> Self {
        Self::MalformedEntry {
            preview: preview(entry),
            reason: reason.into(),
        }
    }
}

fn preview(entry: &str) -> String {
    const MAX: usize = 60;
    if entry.chars().count() <= MAX {
        entry.to_string()
    } else {
        let head: String = entry.chars().take(MAX).collect();
        format!("{head}...")
    }
}

/// Parses BibTeX text into entries.
///
/// The first malformed entry aborts the parse; the caller treats the whole
/// file as unusable and skips it.
pub fn parse_bibtex(input: &str) -> Result<Vec<BibEntry>, BibtexError> {
    let mut entries = Vec::new();
    for raw_entry in segment_entries(input) {
        if let Some(entry) = parse_entry(&raw_entry)? {
            entries.push(entry);
        }
    }
    Ok(entries)
}

fn segment_entries(input: &str) -> Vec<String> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut entries = Vec::new();
    let mut i = 0usize;

    while i < chars.len() {
        if chars[i].1 != '@' {
            i += 1;
            continue;
        }

        let mut j = i + 1;
        while j < chars.len() && chars[j].1.is_ascii_alphabetic() {
            j += 1;
        }
        while j < chars.len() && chars[j].1.is_whitespace() {
            j += 1;
        }

        if j >= chars.len() || chars[j].1 != '{' {
            i += 1;
            continue;
        }

        let start = chars[i].0;
        let mut depth = 0usize;
        let mut in_quotes = false;
        let mut escape = false;
        let mut found_end = None;

        for (k, (_, ch)) in chars.iter().enumerate().skip(j) {
            if escape {
                escape = false;
                continue;
            }
            if *ch == '\\' {
                escape = true;
                continue;
            }
            if *ch == '"' {
                in_quotes = !in_quotes;
                continue;
            }
            if in_quotes {
                continue;
            }
            if *ch == '{' {
                depth += 1;
                continue;
            }
            if *ch == '}' {
                if depth == 0 {
                    break;
                }
                depth -= 1;
                if depth == 0 {
                    found_end = Some(k);
                    break;
                }
            }
        }

        if let Some(end_index) = found_end {
            let end_exclusive = if end_index + 1 < chars.len() {
                chars[end_index + 1].0
            } else {
                input.len()
            };
            entries.push(input[start..end_exclusive].trim().to_string());
            i = end_index + 1;
        } else {
            // Unbalanced braces: keep the malformed tail as one candidate so
            // the parser can report it.
            entries.push(input[start..].trim().to_string());
            break;
        }
    }

    entries
}

/// Parses one segmented candidate; `Ok(None)` for ignored block types.
fn parse_entry(raw_entry: &str) -> Result<Option<BibEntry>, BibtexError> {
    let trimmed = raw_entry.trim();
    let Some(after_at) = trimmed.strip_prefix('@') else {
        return Err(BibtexError::malformed(trimmed, "missing '@type{...}' prefix"));
    };
    let Some(brace_pos) = after_at.find('{') else {
        return Err(BibtexError::malformed(
            trimmed,
            "missing opening '{' after entry type",
        ));
    };

    let entry_type = after_at[..brace_pos].trim().to_ascii_lowercase();
    if IGNORED_BLOCK_TYPES.contains(&entry_type.as_str()) {
        return Ok(None);
    }

    if !trimmed.ends_with('}') {
        return Err(BibtexError::malformed(
            trimmed,
            "unbalanced braces (entry never closed)",
        ));
    }
    let body = &after_at[brace_pos + 1..];
    let body = &body[..body.len().saturating_sub(1)];
    let Some((key_raw, fields_raw)) = body.split_once(',') else {
        return Err(BibtexError::malformed(
            trimmed,
            "missing citation key or field list",
        ));
    };

    let key = key_raw.trim();
    if key.is_empty() {
        return Err(BibtexError::malformed(trimmed, "empty citation key"));
    }

    let fields =
        parse_fields(fields_raw).map_err(|reason| BibtexError::malformed(trimmed, reason))?;

    Ok(Some(BibEntry {
        entry_type,
        key: key.to_string(),
        raw: trimmed.to_string(),
        fields,
    }))
}

fn parse_fields(input: &str) -> Result<HashMap<String, String>, String> {
    let mut pairs = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut escape = false;

    for ch in input.chars() {
        if escape {
            current.push(ch);
            escape = false;
            continue;
        }
        if ch == '\\' {
            current.push(ch);
            escape = true;
            continue;
        }
        if ch == '"' {
            in_quotes = !in_quotes;
            current.push(ch);
            continue;
        }
        if !in_quotes {
            if ch == '{' {
                depth += 1;
            } else if ch == '}' {
                if depth == 0 {
                    return Err("closing brace without matching opening brace".to_string());
                }
                depth -= 1;
            } else if ch == ',' && depth == 0 {
                let segment = current.trim();
                if !segment.is_empty() {
                    pairs.push(segment.to_string());
                }
                current.clear();
                continue;
            }
        }
        current.push(ch);
    }

    if in_quotes {
        return Err("unterminated quoted value".to_string());
    }
    if depth != 0 {
        return Err("unbalanced braces in field values".to_string());
    }

    let tail = current.trim();
    if !tail.is_empty() {
        pairs.push(tail.to_string());
    }

    let mut fields = HashMap::new();
    for pair in pairs {
        let Some((name, value_raw)) = pair.split_once('=') else {
            return Err(format!("missing '=' in field segment `{pair}`"));
        };
        let field_name = name.trim().to_ascii_lowercase();
        if field_name.is_empty() {
            return Err("empty field name".to_string());
        }
        let value = strip_bibtex_value(value_raw.trim())
            .ok_or_else(|| format!("invalid value in field `{field_name}`"))?;
        // First-value-wins per standard BibTeX convention.
        fields.entry(field_name).or_insert(value);
    }

    Ok(fields)
}

fn strip_bibtex_value(value: &str) -> Option<String> {
    let trimmed = value.trim().trim_end_matches(',').trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with('{') && trimmed.ends_with('}') && trimmed.len() >= 2 {
        return Some(trimmed[1..trimmed.len() - 1].trim().to_string());
    }
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        let inner = &trimmed[1..trimmed.len() - 1];
        return Some(inner.replace("\\\"", "\"").trim().to_string());
    }

    Some(trimmed.to_string())
}

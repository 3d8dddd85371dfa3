//! Extraction of known external identifiers for candidate keys.

use tracing::debug;

use crate::bibtex::BibDatabase;
use crate::inspire::{Identifier, IdentifierKind, IdentifierSet};

/// Identifier kinds looked for by default, in lookup-preference order.
pub const DEFAULT_VOCABULARY: [IdentifierKind; 2] = [IdentifierKind::Eprint, IdentifierKind::Doi];

/// Maps each candidate key to the identifiers its bibliography entry carries.
///
/// Databases are searched in load order and the first one containing a key
/// wins. Keys found in no database, or whose entry has none of the desired
/// fields, are dropped. Output preserves the input key order.
#[must_use]
pub fn matchable_fields(
    keys: &[String],
    dbs: &[BibDatabase],
    vocabulary: &[IdentifierKind],
) -> Vec<(String, IdentifierSet)> {
    let mut mapping = Vec::new();

    for key in keys {
        let Some(entry) = dbs.iter().find_map(|db| db.entry(key)) else {
            debug!(key = %key, "key not present in any loaded bibliography");
            continue;
        };

        let identifiers: Vec<Identifier> = vocabulary
            .iter()
            .filter_map(|kind| {
                kind.field_name().and_then(|field| {
                    entry
                        .field(field)
                        .map(|value| Identifier::new(*kind, value))
                })
            })
            .collect();

        if identifiers.is_empty() {
            debug!(key = %key, "entry has none of the desired identifier fields");
            continue;
        }

        mapping.push((key.clone(), IdentifierSet::new(identifiers)));
    }

    mapping
}

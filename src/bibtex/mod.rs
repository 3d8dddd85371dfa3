//! Bibliography loading: file resolution, parsing, and keyed access.
//!
//! Loading is best-effort: a listed file that is missing or fails to parse is
//! logged and skipped, and the pipeline continues with fewer databases.

mod entry;

pub use entry::{BibEntry, BibtexError, parse_bibtex};

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::paths::resolve_with_suffix;

/// One parsed bibliography file, indexed by citation key.
#[derive(Debug, Clone)]
pub struct BibDatabase {
    /// Path the file was actually read from (after `.bib` probing).
    pub path: PathBuf,
    entries: Vec<BibEntry>,
}

impl BibDatabase {
    /// Builds a database from already-parsed entries.
    #[must_use]
    pub fn new(path: PathBuf, entries: Vec<BibEntry>) -> Self {
        Self { path, entries }
    }

    /// Returns the first entry with the given key, if any.
    #[must_use]
    pub fn entry(&self, key: &str) -> Option<&BibEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// Whether any entry carries the given key.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entry(key).is_some()
    }

    /// Entries in file order.
    #[must_use]
    pub fn entries(&self) -> &[BibEntry] {
        &self.entries
    }
}

/// Loads each listed bibliography file that exists and parses.
///
/// Paths may omit the `.bib` extension. Missing files and parse failures are
/// warned about and skipped; the returned databases preserve list order.
#[must_use]
pub fn load_bib_dbs(path_strs: &[String]) -> Vec<BibDatabase> {
    let mut dbs = Vec::new();

    for path_str in path_strs {
        let Some(resolved) = resolve_with_suffix(Path::new(path_str), "bib") else {
            warn!(path = %path_str, "neither the literal path nor its .bib variant exists, skipping");
            continue;
        };

        match load_one(&resolved) {
            Ok(db) => dbs.push(db),
            Err(err) => {
                warn!(path = %resolved.display(), error = %err, "bibliography exists but loading failed, skipping");
            }
        }
    }

    dbs
}

fn load_one(path: &Path) -> Result<BibDatabase, anyhow::Error> {
    let text = fs::read_to_string(path)?;
    let entries = parse_bibtex(&text)?;
    Ok(BibDatabase::new(path.to_path_buf(), entries))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_resolves_missing_bib_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("refs.bib");
        fs::write(&file, "@article{k, title = {T}}").unwrap();

        let bare = dir.path().join("refs").to_string_lossy().into_owned();
        let dbs = load_bib_dbs(&[bare]);
        assert_eq!(dbs.len(), 1);
        assert_eq!(dbs[0].path, file);
        assert!(dbs[0].contains("k"));
    }

    #[test]
    fn test_load_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("real.bib");
        fs::write(&file, "@article{a, title = {T}}").unwrap();

        let paths = vec![
            dir.path().join("ghost").to_string_lossy().into_owned(),
            file.to_string_lossy().into_owned(),
        ];
        let dbs = load_bib_dbs(&paths);
        assert_eq!(dbs.len(), 1);
        assert!(dbs[0].contains("a"));
    }

    #[test]
    fn test_load_skips_unparseable_files() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.bib");
        fs::write(&bad, "@article{broken, title = {oops").unwrap();
        let good = dir.path().join("good.bib");
        fs::write(&good, "@article{fine, title = {T}}").unwrap();

        let paths = vec![
            bad.to_string_lossy().into_owned(),
            good.to_string_lossy().into_owned(),
        ];
        let dbs = load_bib_dbs(&paths);
        assert_eq!(dbs.len(), 1);
        assert!(dbs[0].contains("fine"));
    }

    #[test]
    fn test_database_entry_lookup() {
        let entries = parse_bibtex("@article{x, doi = {10.1/x}}\n@article{y, doi = {10.1/y}}").unwrap();
        let db = BibDatabase::new(PathBuf::from("mem.bib"), entries);
        assert_eq!(db.entry("y").unwrap().field("doi"), Some("10.1/y"));
        assert!(db.entry("z").is_none());
    }
}

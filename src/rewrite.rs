//! In-place rewriting of LaTeX sources and appending to the bibliography.
//!
//! Both operations are whole-file read/overwrite, optionally preserving the
//! pre-image as a `.bak.tex` / `.bak.bib` sibling.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::bibtex::BibDatabase;
use crate::inspire::Replacement;
use crate::paths::resolve_with_suffix;

/// Width of the separator lines appended before new bibliography entries.
const SEPARATOR_WIDTH: usize = 60;

/// Errors raised while rewriting files.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// File system error reading or writing a target.
    #[error("IO error on {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The bibliography targeted for appending does not exist.
    #[error("neither {path} nor {path}.bib exists")]
    MissingBibFile {
        /// The path as listed in the aux file.
        path: String,
    },
}

impl RewriteError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Replaces every occurrence of each old key with its new key in one file.
///
/// Replacements apply in list order as global literal substitutions. When an
/// old key is a substring of another key, or of a later replacement's new
/// key, the result depends on list order; that collision is not guarded
/// against. With `backup`, the pre-image is written to `<stem>.bak.tex`
/// before the overwrite.
///
/// # Errors
///
/// Returns [`RewriteError::Io`] when the target cannot be read or written.
pub fn rewrite_tex_file(
    path: &Path,
    replacements: &[Replacement],
    backup: bool,
) -> Result<(), RewriteError> {
    let mut tex = fs::read_to_string(path).map_err(|e| RewriteError::io(path, e))?;

    if backup {
        let backup_path = path.with_extension("bak.tex");
        fs::write(&backup_path, &tex).map_err(|e| RewriteError::io(&backup_path, e))?;
        debug!(path = %backup_path.display(), "wrote backup");
    }

    for rep in replacements {
        tex = tex.replace(&rep.ads_key, &rep.insp_key);
    }

    fs::write(path, &tex).map_err(|e| RewriteError::io(path, e))?;
    info!(path = %path.display(), replacements = replacements.len(), "rewrote");
    Ok(())
}

/// Appends fetched entries that no loaded database already has.
///
/// The needed set is the fetched keys minus keys present in any database;
/// when it is empty nothing is written at all, which makes repeated runs
/// idempotent. Otherwise the file gains a `%`-rule separator block and the
/// raw fetched text of each needed entry, in list order.
///
/// # Errors
///
/// Returns [`RewriteError::MissingBibFile`] when neither `path` nor
/// `path.bib` exists (a hard failure for this step), or
/// [`RewriteError::Io`] on read/write failure.
pub fn append_needed_to_bib_file(
    path_str: &str,
    replacements: &[Replacement],
    bib_dbs: &[BibDatabase],
    backup: bool,
) -> Result<(), RewriteError> {
    let needed = needed_keys(replacements, bib_dbs);
    if needed.is_empty() {
        info!(path = %path_str, "no new entries needed");
        return Ok(());
    }

    let path =
        resolve_with_suffix(Path::new(path_str), "bib").ok_or_else(|| {
            RewriteError::MissingBibFile {
                path: path_str.to_string(),
            }
        })?;

    let mut bib = fs::read_to_string(&path).map_err(|e| RewriteError::io(&path, e))?;

    if backup {
        let backup_path = path.with_extension("bak.bib");
        fs::write(&backup_path, &bib).map_err(|e| RewriteError::io(&backup_path, e))?;
        debug!(path = %backup_path.display(), "wrote backup");
    }

    let breaker = format!("{}\n", "%".repeat(SEPARATOR_WIDTH));
    bib.push('\n');
    bib.push_str(&breaker);
    bib.push_str(&breaker);
    bib.push('\n');

    let mut appended = 0usize;
    for rep in replacements {
        if needed.contains(rep.insp_key.as_str()) {
            bib.push_str(&rep.bib_entry);
            bib.push('\n');
            appended += 1;
        }
    }

    fs::write(&path, &bib).map_err(|e| RewriteError::io(&path, e))?;
    info!(path = %path.display(), appended, "appended new entries");
    Ok(())
}

/// Fetched keys that are absent from every loaded database.
fn needed_keys<'a>(
    replacements: &'a [Replacement],
    bib_dbs: &[BibDatabase],
) -> HashSet<&'a str> {
    replacements
        .iter()
        .map(|rep| rep.insp_key.as_str())
        .filter(|key| !bib_dbs.iter().any(|db| db.contains(key)))
        .collect()
}

//! Filesystem probing for paths that may omit their conventional extension.

use std::path::{Path, PathBuf};

/// Resolves a path that may have been written without its extension.
///
/// Tries the literal path first, then the path with `.{suffix}` appended.
/// Returns `None` when neither exists; callers decide whether that is fatal.
#[must_use]
pub fn resolve_with_suffix(path: &Path, suffix: &str) -> Option<PathBuf> {
    if path.exists() {
        return Some(path.to_path_buf());
    }
    let mut with_suffix = path.as_os_str().to_os_string();
    with_suffix.push(".");
    with_suffix.push(suffix);
    let candidate = PathBuf::from(with_suffix);
    candidate.exists().then_some(candidate)
}

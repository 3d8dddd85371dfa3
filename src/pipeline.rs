//! End-to-end pipeline: aux file in, rewritten sources and augmented
//! bibliography out.
//!
//! Stages run strictly in order; per-file and per-key failures are logged
//! and swallowed here so a bad key never aborts the run. Only the aux file
//! and the append target are allowed to fail the whole run.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use tracing::{info, warn};

use crate::auxfile::parse_aux;
use crate::bibtex::load_bib_dbs;
use crate::fields::{DEFAULT_VOCABULARY, matchable_fields};
use crate::filter::{KeyFilter, is_inspire_like};
use crate::inspire::{FetchPolicy, Identifier, IdentifierKind, IdentifierSet, InspireClient};
use crate::rewrite::{append_needed_to_bib_file, rewrite_tex_file};

/// Everything one run needs to know.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Resolved path of the auxiliary file.
    pub aux_path: PathBuf,
    /// LaTeX sources to rewrite, in command-line order.
    pub tex_paths: Vec<PathBuf>,
    /// Whether to keep `.bak.tex` / `.bak.bib` pre-images.
    pub backup: bool,
    /// Which cited keys are lookup candidates.
    pub filter: KeyFilter,
    /// Also look up INSPIRE-like keys cited but absent from the bibliography.
    pub fill_missing: bool,
    /// API base, `https://inspirehep.net/api/` in production.
    pub api_base: String,
    /// Rate-limit retry configuration.
    pub policy: FetchPolicy,
}

/// Runs the whole pipeline.
///
/// # Errors
///
/// Fails when the aux file cannot be read, the HTTP client cannot be built,
/// or the bibliography targeted for appending cannot be written.
pub async fn run(config: &PipelineConfig) -> anyhow::Result<()> {
    let aux_text = fs::read_to_string(&config.aux_path)
        .with_context(|| format!("cannot read aux file {}", config.aux_path.display()))?;
    let aux = parse_aux(&aux_text);
    info!(
        aux = %config.aux_path.display(),
        cited = aux.cite_keys.len(),
        bib_files = aux.bib_paths.len(),
        "parsed aux file"
    );

    let candidates = config.filter.select(&aux.cite_keys);
    info!(candidates = candidates.len(), filter = ?config.filter, "selected candidate keys");

    let bib_dbs = load_bib_dbs(&aux.bib_paths);
    let mapping = matchable_fields(&candidates, &bib_dbs, &DEFAULT_VOCABULARY);
    info!(matchable = mapping.len(), "keys with known identifiers");

    let client = InspireClient::new(config.api_base.clone(), config.policy)
        .context("cannot build HTTP client")?;
    let mut replacements = client.fetch_replacements(&mapping).await;

    if config.fill_missing {
        let missing = missing_inspire_mapping(&aux.cite_keys, &bib_dbs);
        info!(missing = missing.len(), "INSPIRE-like keys absent from the bibliography");
        let additions = client.fetch_replacements(&missing).await;
        replacements.extend(additions);
    }

    info!(resolved = replacements.len(), "lookups complete");

    for tex_path in &config.tex_paths {
        info!(path = %tex_path.display(), backup = config.backup, "rewriting");
        if let Err(err) = rewrite_tex_file(tex_path, &replacements, config.backup) {
            warn!(path = %tex_path.display(), error = %err, "rewrite failed, continuing");
        }
    }

    // New entries go into the first bibliography file the aux named.
    match bib_dbs.first() {
        Some(first_db) => {
            let target = first_db.path.to_string_lossy().into_owned();
            info!(path = %target, backup = config.backup, "appending");
            append_needed_to_bib_file(&target, &replacements, &bib_dbs, config.backup)
                .context("appending to bibliography failed")?;
        }
        None => {
            warn!("no bibliography file loaded, skipping append step");
        }
    }

    Ok(())
}

/// Maps cited INSPIRE-like keys that no database has to a texkey lookup.
///
/// First occurrence wins; duplicates in the citation list do not trigger a
/// second query.
fn missing_inspire_mapping(
    cite_keys: &[String],
    bib_dbs: &[crate::bibtex::BibDatabase],
) -> Vec<(String, IdentifierSet)> {
    let mut seen = HashSet::new();

    cite_keys
        .iter()
        .filter(|key| is_inspire_like(key))
        .filter(|key| !bib_dbs.iter().any(|db| db.contains(key)))
        .filter(|key| seen.insert(key.as_str()))
        .map(|key| {
            let set = IdentifierSet::new(vec![Identifier::new(IdentifierKind::Texkey, key.clone())]);
            (key.clone(), set)
        })
        .collect()
}

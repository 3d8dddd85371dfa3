//! ads2inspire Core Library
//!
//! Replaces legacy ADS citation keys in LaTeX documents with their INSPIRE
//! counterparts and appends the fetched INSPIRE entries to the manuscript's
//! bibliography file.
//!
//! # Architecture
//!
//! The pipeline is linear and strictly sequential:
//! - [`auxfile`] - extracts bibliography paths and cited keys from a `.aux` file
//! - [`filter`] - selects which cited keys are lookup candidates
//! - [`bibtex`] - loads `.bib` files into keyed databases
//! - [`fields`] - maps candidate keys to their known identifiers (eprint, DOI)
//! - [`inspire`] - queries the INSPIRE API with rate-limit retries
//! - [`rewrite`] - rewrites LaTeX sources and appends new entries to the `.bib`
//! - [`pipeline`] - wires the stages together

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auxfile;
pub mod bibtex;
pub mod fields;
pub mod filter;
pub mod inspire;
pub mod paths;
pub mod pipeline;
pub mod rewrite;

// Re-export commonly used types
pub use auxfile::{AuxData, parse_aux};
pub use bibtex::{BibDatabase, BibEntry, BibtexError, load_bib_dbs, parse_bibtex};
pub use fields::{DEFAULT_VOCABULARY, matchable_fields};
pub use filter::{KeyFilter, is_inspire_like};
pub use inspire::{
    DEFAULT_API_BASE, DEFAULT_DELAY, DEFAULT_MAX_RETRIES, FetchPolicy, Identifier, IdentifierKind,
    IdentifierSet, InspireClient, LookupError, Replacement, RetryDecision, insp_key_from_bib_str,
};
pub use paths::resolve_with_suffix;
pub use pipeline::{PipelineConfig, run};
pub use rewrite::{RewriteError, append_needed_to_bib_file, rewrite_tex_file};

//! CLI argument definitions using clap derive macros.

use clap::{Parser, ValueEnum};

use ads2inspire_core::{DEFAULT_API_BASE, DEFAULT_MAX_RETRIES, KeyFilter};

/// Replace ADS citation keys with their INSPIRE counterparts.
///
/// Run latex/bibtex/latex/latex on your manuscript first so the `.aux` file
/// exists. The first `.bib` file named inside it receives the new entries.
#[derive(Parser, Debug)]
#[command(name = "ads2inspire")]
#[command(author, version, about)]
pub struct Args {
    /// Path to the .aux file (for wonderful.tex this is wonderful.aux)
    pub auxpath: String,

    /// TeX file(s) to rewrite
    pub texpath: Vec<String>,

    /// Back up .tex files as .bak.tex and the .bib file as .bak.bib before writing
    #[arg(short, long)]
    pub backup: bool,

    /// Which keys to filter for converting into INSPIRE
    #[arg(short, long, value_enum, default_value = "ads")]
    pub filter_type: FilterType,

    /// Also search for INSPIRE-like keys cited but missing from the .bib file,
    /// inserting them when found
    #[arg(short = 'm', long)]
    pub fill_missing: bool,

    /// Maximum rate-limit retries per lookup URL (0-10)
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_RETRIES as u8, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub max_retries: u8,

    /// Delay between requests and rate-limit retries in milliseconds (max 60000)
    #[arg(short = 'l', long, default_value_t = 500, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub delay_ms: u64,

    /// INSPIRE API base URL
    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

/// CLI surface of the two key-selection policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterType {
    /// Keys shaped like legacy ADS identifiers.
    Ads,
    /// Every key not already shaped like an INSPIRE key.
    All,
}

impl From<FilterType> for KeyFilter {
    fn from(value: FilterType) -> Self {
        match value {
            FilterType::Ads => KeyFilter::Ads,
            FilterType::All => KeyFilter::All,
        }
    }
}

//! CLI entry point for the ads2inspire tool.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;

use ads2inspire_core::{FetchPolicy, PipelineConfig, resolve_with_suffix, run};
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    // The aux path may be given without its extension, like the bib paths
    // inside it.
    let Some(aux_path) = resolve_with_suffix(Path::new(&args.auxpath), "aux") else {
        bail!("neither {0} nor {0}.aux exist", args.auxpath);
    };

    let config = PipelineConfig {
        aux_path,
        tex_paths: args.texpath.iter().map(PathBuf::from).collect(),
        backup: args.backup,
        filter: args.filter_type.into(),
        fill_missing: args.fill_missing,
        api_base: args.api_base.clone(),
        policy: FetchPolicy::new(
            u32::from(args.max_retries),
            Duration::from_millis(args.delay_ms),
        ),
    };

    run(&config).await?;

    info!("done");
    Ok(())
}

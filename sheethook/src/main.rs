use anyhow::{Context, Result};
use clap::Parser;
use sheethook_core::{Hook, HookConfig};
use std::path::PathBuf;
use tracing_subscriber::prelude::*;

mod progress;

#[derive(Parser)]
#[command(name = "sheethook")]
#[command(about = "Extract VBA and text reports from Excel workbooks before commit", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory to scan for workbooks; outputs are written under it
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    root: PathBuf,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Keep `Attribute VB_Name` lines in extracted modules
    #[arg(long)]
    keep_vb_name: bool,

    /// Append formula text to the formulas-and-values report
    #[arg(long)]
    formulas: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = load_config(&cli)?;
    config.validate().context("Invalid configuration")?;

    let hook = Hook::new(config);
    let summary = hook
        .run_with_progress(&cli.root, &mut progress::ConsoleProgress)
        .with_context(|| format!("Hook failed in {}", cli.root.display()))?;

    tracing::info!(
        "{} workbooks, {} VBA files, {} reports",
        summary.workbooks,
        summary.vba_files,
        summary.report_files
    );

    Ok(())
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Explicit `--config`, else `sheethook.toml` in the root, else defaults.
/// Command line flags only ever switch options on.
fn load_config(cli: &Cli) -> Result<HookConfig> {
    let mut config = if let Some(config_path) = &cli.config {
        HookConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        HookConfig::discover(&cli.root).with_context(|| {
            format!("Failed to load config from {}", cli.root.display())
        })?
    };

    config.keep_vb_name |= cli.keep_vb_name;
    config.include_formulas |= cli.formulas;
    Ok(config)
}

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use forge_app::config::load_config;
use forge_app::logging::{self, LogDestination};
use forge_app::runner;
use forge_engine::SongPlan;
use forge_logging::{forge_info, forge_warn};
use log::LevelFilter;

/// Generates one 3D object per song-plan entry and reveals them on cue.
#[derive(Debug, Parser)]
#[command(name = "forge_app", version)]
struct Cli {
    /// Song plan JSON (song, images with minute/second/objectDescription).
    plan: PathBuf,
    /// RON config file; defaults apply when absent.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = LogDestination::Terminal)]
    log: LogDestination,
    /// Log debug output.
    #[arg(long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::initialize(cli.log, level);

    let config = load_config(cli.config.as_deref())?;
    let text = fs::read_to_string(&cli.plan)
        .with_context(|| format!("reading song plan {}", cli.plan.display()))?;
    let plan = SongPlan::from_json(&text)?;

    let summary = runner::run(&config, &plan)?;
    if summary.timed_out {
        forge_warn!("Run timed out: {:?}", summary);
    } else {
        forge_info!("Run finished: {:?}", summary);
    }
    Ok(())
}

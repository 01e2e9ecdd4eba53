#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Tile Defence boards headlessly.

mod config;
mod layout_transfer;
mod script;
mod session;

use std::{fs, io, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tile_defence_rendering::TextBackend;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{config::SimulationConfig, session::Session};

/// Command-line arguments; every flag overrides the matching config entry.
#[derive(Debug, Parser)]
#[command(name = "tile-defence", about = "Headless Tile Defence simulation")]
struct CliArgs {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Board width in cells.
    #[arg(long)]
    columns: Option<u32>,
    /// Board height in cells.
    #[arg(long)]
    rows: Option<u32>,
    /// Ticks to simulate when no script is given.
    #[arg(long)]
    ticks: Option<u32>,
    /// Seed for spawner selection.
    #[arg(long)]
    seed: Option<u64>,
    /// Edit script to execute instead of the plain tick run.
    #[arg(long)]
    script: Option<PathBuf>,
    /// Layout string to load instead of the default board.
    #[arg(long)]
    layout: Option<String>,
    /// Print the final layout string.
    #[arg(long, default_value_t = false)]
    export_layout: bool,
    /// Suppress the banner and board frames.
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

impl CliArgs {
    fn resolve_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::load(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => SimulationConfig::default(),
        };

        if let Some(columns) = self.columns {
            config.board.columns = columns;
        }
        if let Some(rows) = self.rows {
            config.board.rows = rows;
        }
        if let Some(ticks) = self.ticks {
            config.simulation.ticks = ticks;
        }
        if let Some(seed) = self.seed {
            config.spawning.seed = seed;
        }
        Ok(config.validated())
    }
}

/// Entry point for the Tile Defence command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tile_defence=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = CliArgs::parse();
    let config = args.resolve_config()?;
    let layout = args
        .layout
        .as_deref()
        .map(layout_transfer::decode)
        .transpose()
        .context("invalid layout string")?;

    let mut session = Session::new(&config, layout.as_ref())?;
    let mut backend = TextBackend::new(io::stdout());
    if !args.quiet {
        println!("{}", session.welcome_banner());
    }

    match &args.script {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read script {}", path.display()))?;
            let steps = script::parse_script(&source)
                .with_context(|| format!("invalid script {}", path.display()))?;
            for step in steps {
                if args.quiet && step == script::ScriptStep::Show {
                    continue;
                }
                session.execute(step, &mut backend)?;
            }
        }
        None => {
            session.run(config.simulation.ticks);
            if !args.quiet {
                session.present(&mut backend)?;
            }
        }
    }

    let stats = session.stats();
    info!(
        ticks = stats.ticks,
        spawned = stats.spawned,
        arrived = stats.arrived,
        rejected_edits = stats.rejected_edits,
        "simulation finished"
    );

    if args.export_layout {
        let encoded =
            layout_transfer::encode(&session.layout()).context("failed to export layout")?;
        println!("{encoded}");
    }

    Ok(())
}

//! Kiln headless runner
//!
//! Loads a game module and an optional archive, runs init and a fixed
//! number of ticks on the headless device, and prints a summary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use kiln_common::ArchivePack;
use kiln_core::WasmEngine;
use kiln_host::{HeadlessRunner, HostConfig};

#[derive(Parser)]
#[command(name = "kiln")]
#[command(about = "Run a Kiln game headless with rollback self-checks")]
#[command(version)]
struct Cli {
    /// Game module (.wasm)
    module: PathBuf,

    /// Asset archive (.kpak)
    #[arg(short, long)]
    archive: Option<PathBuf>,

    /// Ticks to run
    #[arg(short, long, default_value_t = 600)]
    ticks: u64,

    /// Roll back and replay every K ticks (0 disables)
    #[arg(long, value_name = "K")]
    rollback_check: Option<usize>,

    /// Session RNG seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Host config file (defaults to the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = HostConfig::load(cli.config.as_deref())?;
    if let Some(distance) = cli.rollback_check {
        config.rollback.check_distance = distance;
    }
    if let Some(seed) = cli.seed {
        config.session.seed = seed;
    }

    let archive = cli
        .archive
        .as_deref()
        .map(|path| {
            ArchivePack::load(path)
                .with_context(|| format!("Failed to load archive {}", path.display()))
        })
        .transpose()?
        .map(Arc::new);

    let wasm = std::fs::read(&cli.module)
        .with_context(|| format!("Failed to read {}", cli.module.display()))?;

    let engine = WasmEngine::new()?;
    let mut runner = HeadlessRunner::new(&engine, &wasm, archive, &config)?;
    let summary = runner.run(cli.ticks)?;
    println!("{summary}");
    Ok(())
}

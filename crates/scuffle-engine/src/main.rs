//! # Scuffle Engine
//!
//! Headless entry point for Project Scuffle: runs a scripted skirmish
//! through the combat core at a fixed timestep.
//!
//! Usage: `scuffle [config.toml]`. With `--write-default <path>` the default
//! configuration is written out instead.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod config;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::app::Skirmish;
use crate::config::{SimConfig, CONFIG_FILE};

/// Main entry point.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("scuffle=info".parse()?))
        .init();

    info!("Project Scuffle starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1);
    let first = args.next();

    if first.as_deref() == Some("--write-default") {
        let path = args.next().unwrap_or_else(|| CONFIG_FILE.to_string());
        SimConfig::default()
            .save_to(&path)
            .with_context(|| format!("writing {path}"))?;
        return Ok(());
    }

    let mut config = SimConfig::load_from(first.as_deref().unwrap_or(CONFIG_FILE));
    config.validate();

    let summary = Skirmish::new(config)?.run()?;
    info!(
        player_deaths = summary.player_deaths,
        "Project Scuffle shutdown complete"
    );
    Ok(())
}

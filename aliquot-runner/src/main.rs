//! Aliquot - Liquid-Handling Station Runner
//!
//! Runs the bead cleanup (Station B) or PCR setup (Station C) sequence
//! against the logged workstation host. Configuration comes from an
//! embedded TOML file, an optional file on the command line, and flags.
//!
//! Set `RUST_LOG=aliquot::host=info` to see every robot command, or
//! `RUST_LOG=debug` for transfer and configuration detail.

mod cli;
mod config;
mod stations;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::info;

use crate::cli::{Cli, Station};
use crate::config::load_config;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    info!("Aliquot runner starting...");

    let mut config = load_config(cli.config.as_deref()).context("loading configuration")?;
    config.apply(cli.overrides());

    // Fixed for the rest of the run
    let mode = config.run.mode();
    info!(
        "Run mode: {}, tip tracking {}",
        if mode.simulating { "simulated" } else { "live" },
        if mode.tip_tracking { "on" } else { "off" }
    );

    let summary = match cli.station {
        Station::StationB => stations::run_station_b(&config.station_b, &config.run)
            .context("running Station B")?,
        Station::StationC => stations::run_station_c(&config.station_c, &config.run)
            .context("running Station C")?,
    };

    info!(
        "Done: {} columns, {} transfers delivering {}, {} tips, {} min of waits",
        summary.columns, summary.transfers, summary.delivered, summary.pick_ups, summary.wait_minutes
    );
    if summary.rack_replacements > 0 {
        info!("Tip racks replaced {} times", summary.rack_replacements);
    }

    Ok(())
}

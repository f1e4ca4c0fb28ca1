//! Command-line interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Overrides;

/// Run an extraction or PCR setup station
#[derive(Debug, Parser)]
#[command(name = "aliquot-runner", version, about)]
pub struct Cli {
    /// TOML configuration file (embedded defaults if omitted)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Dry run on the workstation host
    #[arg(long, conflicts_with = "live")]
    pub simulate: bool,

    /// Run against the robot; enables tip-record access
    #[arg(long)]
    pub live: bool,

    /// Read persisted tip counts at start-up
    #[arg(long)]
    pub tip_tracking: bool,

    /// Tip-count record path
    #[arg(long, value_name = "PATH")]
    pub tip_record: Option<PathBuf>,

    /// Wait for Enter when tips must be replaced
    #[arg(long)]
    pub interactive: bool,

    #[command(subcommand)]
    pub station: Station,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Station {
    /// Magnetic-bead nucleic-acid cleanup
    StationB,
    /// Mastermix preparation and PCR plate setup
    StationC,
}

impl Cli {
    /// Settings that replace configuration file values
    pub fn overrides(&self) -> Overrides {
        let simulate = match (self.simulate, self.live) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };

        Overrides {
            simulate,
            tip_tracking: self.tip_tracking,
            tip_record: self.tip_record.clone(),
            interactive: self.interactive,
        }
    }
}

//! Runner configuration
//!
//! Loads configuration from a TOML file or the embedded defaults, then
//! applies command-line overrides.

pub mod loader;

use std::path::PathBuf;

use aliquot_core::config::{RunMode, StationBConfig, StationCConfig};
use aliquot_hal_sim::DEFAULT_RECORD_PATH;
use serde::{Deserialize, Serialize};

pub use loader::load_config;

/// The `[run]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSection {
    /// Dry run on the workstation host
    pub simulate: bool,
    /// Read persisted tip counts at start-up
    pub tip_tracking: bool,
    /// Where the tip-count record lives
    pub tip_record: PathBuf,
    /// Wait for the operator on pauses
    pub interactive: bool,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            simulate: true,
            tip_tracking: false,
            tip_record: PathBuf::from(DEFAULT_RECORD_PATH),
            interactive: false,
        }
    }
}

impl RunSection {
    /// Resolve the run mode for the whole run
    pub fn mode(&self) -> RunMode {
        RunMode {
            simulating: self.simulate,
            tip_tracking: self.tip_tracking,
        }
    }
}

/// Complete runner configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub run: RunSection,
    pub station_b: StationBConfig,
    pub station_c: StationCConfig,
}

/// Command-line settings that replace file values
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `Some(true)` for `--simulate`, `Some(false)` for `--live`
    pub simulate: Option<bool>,
    pub tip_tracking: bool,
    pub tip_record: Option<PathBuf>,
    pub interactive: bool,
}

impl RunnerConfig {
    /// Apply command-line overrides
    ///
    /// Flags only switch features on; leaving a flag off keeps the file value.
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(simulate) = overrides.simulate {
            self.run.simulate = simulate;
        }
        if overrides.tip_tracking {
            self.run.tip_tracking = true;
        }
        if let Some(path) = overrides.tip_record {
            self.run.tip_record = path;
        }
        if overrides.interactive {
            self.run.interactive = true;
        }
    }
}

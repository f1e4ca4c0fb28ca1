//! Station sequences
//!
//! Each station is a fixed, linear sequence of pipetting, mixing,
//! incubation and magnet steps issued to the host traits. A sequence
//! validates its configuration up front, then runs to completion; the
//! only interruption is the operator pause when tips run out.

pub mod clean_na;
pub mod mixing;
pub mod pcr_setup;

pub use clean_na::StationB;
pub use pcr_setup::{mastermix_volumes, MastermixVolumes, StationC};

use aliquot_hal::Volume;

use crate::config::ConfigError;
use crate::transfer::{TransferError, TransferSummary};

/// Errors that stop a station before or during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationError {
    /// Configuration rejected before any command was issued
    Config(ConfigError),
    /// A transfer could not be built
    Transfer(TransferError),
}

impl From<ConfigError> for StationError {
    fn from(e: ConfigError) -> Self {
        StationError::Config(e)
    }
}

impl From<TransferError> for StationError {
    fn from(e: TransferError) -> Self {
        StationError::Transfer(e)
    }
}

/// Totals from a completed station run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Plate columns processed
    pub columns: u8,
    /// Helper transfers executed
    pub transfers: u32,
    /// Net volume delivered by those transfers, per channel
    pub delivered: Volume,
    /// Tips picked up
    pub pick_ups: u32,
    /// Time spent in timed waits
    pub wait_minutes: u32,
    /// Times the operator replaced exhausted tip racks
    pub rack_replacements: u32,
}

impl RunSummary {
    /// Fold in a transfer result
    pub fn record_transfer(&mut self, summary: &TransferSummary) {
        self.transfers += 1;
        self.delivered += summary.delivered();
    }
}

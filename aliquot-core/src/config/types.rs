//! Configuration type definitions
//!
//! Run and station parameters. Defaults reproduce the validated bench
//! protocol; change them only after re-validating on hardware.

use aliquot_hal::Volume;

use super::layout::{StationBLayout, StationCLayout};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Samples per plate column
pub const SAMPLES_PER_COLUMN: u8 = 8;

/// Most samples Station B can process (two wells kept free)
pub const MAX_STATION_B_SAMPLES: u8 = 94;

/// Most samples Station C can process (three wells kept for controls)
pub const MAX_STATION_C_SAMPLES: u8 = 93;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Sample count outside `1..=max`
    SampleCount { samples: u8, max: u8 },
    /// Elution volume must exceed the 10 µL kept back while mixing
    ElutionVolume(u16),
    /// Sample volume outside what the 20 µL pipette can move
    SampleVolume(u16),
    /// Not enough tip racks for the sample count
    NotEnoughTipRacks { needed: u8, loaded: u8 },
}

/// How a run is executed, fixed at start-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunMode {
    /// Host is simulating rather than driving hardware
    pub simulating: bool,
    /// Read persisted tip counts at start-up
    pub tip_tracking: bool,
}

impl RunMode {
    /// Simulated run without tip tracking
    pub const fn simulated() -> Self {
        Self {
            simulating: true,
            tip_tracking: false,
        }
    }

    /// Whether the persisted tip record is read
    ///
    /// Only real-hardware runs with tracking enabled touch the record.
    pub const fn uses_persisted_counts(&self) -> bool {
        !self.simulating && self.tip_tracking
    }
}

/// Plate columns needed for a sample count
pub const fn column_count(samples: u8) -> u8 {
    samples.div_ceil(SAMPLES_PER_COLUMN)
}

fn check_samples(samples: u8, max: u8) -> Result<(), ConfigError> {
    if samples == 0 || samples > max {
        return Err(ConfigError::SampleCount { samples, max });
    }
    Ok(())
}

/// Station B (bead cleanup) parameters
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct StationBConfig {
    /// Samples on the magnetic plate
    pub num_samples: u8,
    /// Water added to elute, in µL
    pub elution_volume_ul: u16,
    /// Sample volume already in each well, in µL
    pub starting_volume_ul: u16,
    /// Magnet engage height (mm × 10)
    pub magnet_height_x10: u16,
    /// Deck layout
    pub layout: StationBLayout,
}

impl Default for StationBConfig {
    fn default() -> Self {
        Self {
            num_samples: 8,
            elution_volume_ul: 50,
            starting_volume_ul: 200,
            magnet_height_x10: 137,
            layout: StationBLayout::default(),
        }
    }
}

impl StationBConfig {
    /// Plate columns processed
    pub fn columns(&self) -> u8 {
        column_count(self.num_samples)
    }

    /// Elution volume
    pub fn elution_volume(&self) -> Volume {
        Volume::from_ul(u32::from(self.elution_volume_ul))
    }

    /// Starting sample volume
    pub fn starting_volume(&self) -> Volume {
        Volume::from_ul(u32::from(self.starting_volume_ul))
    }

    /// Check parameters against the deck
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_samples(self.num_samples, MAX_STATION_B_SAMPLES)?;

        if self.elution_volume_ul <= 10 {
            return Err(ConfigError::ElutionVolume(self.elution_volume_ul));
        }

        // Four tip sets, one column of tips per sample column
        let needed = self.columns() * 4;
        let loaded = self.layout.tip_capacity();
        if needed > loaded {
            return Err(ConfigError::NotEnoughTipRacks { needed, loaded });
        }

        Ok(())
    }
}

/// Station C (PCR setup) parameters
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct StationCConfig {
    /// Samples on the elution plate
    pub num_samples: u8,
    /// Sample added to each reaction, in µL
    pub sample_volume_ul: u16,
    /// Build the reaction mix from its components first
    pub prepare_mastermix: bool,
    /// Add water, positive and negative control reactions
    pub add_controls: bool,
    /// Deck layout
    pub layout: StationCLayout,
}

impl Default for StationCConfig {
    fn default() -> Self {
        Self {
            num_samples: 8,
            sample_volume_ul: 5,
            prepare_mastermix: true,
            add_controls: true,
            layout: StationCLayout::default(),
        }
    }
}

impl StationCConfig {
    /// Sample columns transferred
    pub fn columns(&self) -> u8 {
        column_count(self.num_samples)
    }

    /// PCR plate columns that receive mastermix
    ///
    /// Controls occupy three extra wells after the last sample.
    pub fn mastermix_columns(&self) -> u8 {
        if self.add_controls {
            column_count(self.num_samples.saturating_add(3))
        } else {
            self.columns()
        }
    }

    /// Sample volume per reaction
    pub fn sample_volume(&self) -> Volume {
        Volume::from_ul(u32::from(self.sample_volume_ul))
    }

    /// Check parameters against the deck
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_samples(self.num_samples, MAX_STATION_C_SAMPLES)?;

        if self.sample_volume_ul == 0 || self.sample_volume_ul > 20 {
            return Err(ConfigError::SampleVolume(self.sample_volume_ul));
        }

        if self.layout.p20_racks.is_empty() || self.layout.p300_racks.is_empty() {
            return Err(ConfigError::NotEnoughTipRacks {
                needed: 1,
                loaded: 0,
            });
        }

        Ok(())
    }
}

//! Pipette abstraction
//!
//! Physical failures (clogs, missing liquid, crashes) are the host
//! runtime's concern, so the primitives here are infallible.

use crate::location::Location;
use crate::units::Volume;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Plunger flow rates in µL/s
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlowRates {
    /// Aspirate rate
    pub aspirate: u16,
    /// Dispense rate
    pub dispense: u16,
    /// Blow-out rate
    pub blow_out: u16,
}

impl Default for FlowRates {
    fn default() -> Self {
        Self {
            aspirate: 92,
            dispense: 92,
            blow_out: 92,
        }
    }
}

/// Trait for a pipetting head
///
/// Implementations drive a single- or multi-channel pipette mounted on
/// the robot. Multi-channel heads address a column through its row-A well.
pub trait Pipette {
    /// Maximum volume a single stroke can hold
    fn max_volume(&self) -> Volume;

    /// Draw liquid into the tip
    fn aspirate(&mut self, volume: Volume, location: Location);

    /// Expel liquid from the tip
    fn dispense(&mut self, volume: Volume, location: Location);

    /// Mix by repeated aspirate/dispense in place
    fn mix(&mut self, repetitions: u8, volume: Volume, location: Location) {
        for _ in 0..repetitions {
            self.aspirate(volume, location);
            self.dispense(volume, location);
        }
    }

    /// Push out residual liquid, at `location` or where the pipette is
    fn blow_out(&mut self, location: Option<Location>);

    /// Pick up a tip
    ///
    /// `None` takes the next fresh tip from the pipette's assigned racks.
    fn pick_up_tip(&mut self, tip: Option<Location>);

    /// Drop the tip
    ///
    /// `None` discards it in the trash; `Some` returns it to a rack position.
    fn drop_tip(&mut self, location: Option<Location>);

    /// Mark every assigned tip rack as full again
    fn reset_tipracks(&mut self);

    /// Current flow rates
    fn flow_rates(&self) -> FlowRates;

    /// Replace the flow rates
    fn set_flow_rates(&mut self, rates: FlowRates);

    /// Change only the aspirate rate
    fn set_aspirate_rate(&mut self, rate: u16) {
        let mut rates = self.flow_rates();
        rates.aspirate = rate;
        self.set_flow_rates(rates);
    }
}

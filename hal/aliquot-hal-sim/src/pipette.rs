//! Logged pipette
//!
//! Logs every command and keeps a tip inventory sized by the racks assigned
//! to the pipette, the way the robot runtime hands out tips in rack order.

use aliquot_hal::{FlowRates, Location, Pipette, Volume};
use log::{info, warn};

use crate::LOG_TARGET;

/// Running totals for one pipette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipetteTotals {
    /// Everything drawn into the tip, per channel
    pub aspirated: Volume,
    /// Everything expelled from the tip, per channel
    pub dispensed: Volume,
    /// Tips picked up
    pub pick_ups: u32,
    /// Tips discarded in the trash
    pub trashed: u32,
    /// Tips put back in a rack
    pub returned: u32,
    /// Rack resets
    pub resets: u32,
    /// Pick-ups requested with the racks empty
    pub starved: u32,
}

/// Pipette that logs commands instead of moving
#[derive(Debug, Clone)]
pub struct LoggedPipette {
    name: String,
    max_volume: Volume,
    rack_capacity: u32,
    tips_left: u32,
    holding_tip: bool,
    content: Volume,
    flow: FlowRates,
    totals: PipetteTotals,
}

impl LoggedPipette {
    /// An 8-channel pipette; each rack gives 12 column pick-ups
    pub fn multi(name: impl Into<String>, max_volume: Volume, racks: u32) -> Self {
        Self::new(name.into(), max_volume, racks * 12)
    }

    /// A single-channel pipette; each rack gives 96 pick-ups
    pub fn single(name: impl Into<String>, max_volume: Volume, racks: u32) -> Self {
        Self::new(name.into(), max_volume, racks * 96)
    }

    fn new(name: String, max_volume: Volume, rack_capacity: u32) -> Self {
        Self {
            name,
            max_volume,
            rack_capacity,
            tips_left: rack_capacity,
            holding_tip: false,
            content: Volume::ZERO,
            flow: FlowRates::default(),
            totals: PipetteTotals::default(),
        }
    }

    /// Pipette name used in log lines
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tips left in the assigned racks
    pub fn tips_left(&self) -> u32 {
        self.tips_left
    }

    /// Liquid and air currently in the tip
    pub fn content(&self) -> Volume {
        self.content
    }

    /// Running totals
    pub fn totals(&self) -> PipetteTotals {
        self.totals
    }
}

impl Pipette for LoggedPipette {
    fn max_volume(&self) -> Volume {
        self.max_volume
    }

    fn aspirate(&mut self, volume: Volume, location: Location) {
        info!(target: LOG_TARGET, "{}: aspirate {} from {}", self.name, volume, location);
        if !self.holding_tip {
            warn!(target: LOG_TARGET, "{}: aspirating without a tip", self.name);
        }

        self.content += volume;
        self.totals.aspirated += volume;
        if self.content > self.max_volume {
            warn!(
                target: LOG_TARGET,
                "{}: tip holds {}, above {}", self.name, self.content, self.max_volume
            );
        }
    }

    fn dispense(&mut self, volume: Volume, location: Location) {
        info!(target: LOG_TARGET, "{}: dispense {} into {}", self.name, volume, location);
        self.content = self.content.saturating_sub(volume);
        self.totals.dispensed += volume;
    }

    fn mix(&mut self, repetitions: u8, volume: Volume, location: Location) {
        info!(
            target: LOG_TARGET,
            "{}: mix {}x {} in {}", self.name, repetitions, volume, location
        );
        let moved = volume * u32::from(repetitions);
        self.totals.aspirated += moved;
        self.totals.dispensed += moved;
    }

    fn blow_out(&mut self, location: Option<Location>) {
        match location {
            Some(location) => info!(target: LOG_TARGET, "{}: blow out at {}", self.name, location),
            None => info!(target: LOG_TARGET, "{}: blow out", self.name),
        }
        self.content = Volume::ZERO;
    }

    fn pick_up_tip(&mut self, tip: Option<Location>) {
        if self.holding_tip {
            warn!(target: LOG_TARGET, "{}: picking up with a tip attached", self.name);
        }

        match tip {
            Some(location) => {
                info!(target: LOG_TARGET, "{}: pick up tip at {}", self.name, location);
            }
            None if self.tips_left == 0 => {
                warn!(target: LOG_TARGET, "{}: no tips left in assigned racks", self.name);
                self.totals.starved += 1;
            }
            None => {
                let position = self.rack_capacity - self.tips_left + 1;
                info!(
                    target: LOG_TARGET,
                    "{}: pick up tip {}/{}", self.name, position, self.rack_capacity
                );
                self.tips_left -= 1;
            }
        }

        self.holding_tip = true;
        self.totals.pick_ups += 1;
    }

    fn drop_tip(&mut self, location: Option<Location>) {
        match location {
            Some(location) => {
                info!(target: LOG_TARGET, "{}: return tip to {}", self.name, location);
                self.totals.returned += 1;
            }
            None => {
                info!(target: LOG_TARGET, "{}: drop tip in trash", self.name);
                self.totals.trashed += 1;
            }
        }

        self.holding_tip = false;
        self.content = Volume::ZERO;
    }

    fn reset_tipracks(&mut self) {
        info!(target: LOG_TARGET, "{}: tip racks reset", self.name);
        self.tips_left = self.rack_capacity;
        self.totals.resets += 1;
    }

    fn flow_rates(&self) -> FlowRates {
        self.flow
    }

    fn set_flow_rates(&mut self, rates: FlowRates) {
        info!(
            target: LOG_TARGET,
            "{}: flow rates aspirate {} dispense {} blow out {} uL/s",
            self.name,
            rates.aspirate,
            rates.dispense,
            rates.blow_out
        );
        self.flow = rates;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aliquot_hal::{DeckSlot, Well};

    fn well() -> Location {
        Location::new(DeckSlot(1), Well::new(0, 0))
    }

    #[test]
    fn test_tip_inventory() {
        let mut pipette = LoggedPipette::multi("P20", Volume::from_ul(20), 1);
        assert_eq!(pipette.tips_left(), 12);

        for _ in 0..12 {
            pipette.pick_up_tip(None);
            pipette.drop_tip(None);
        }
        assert_eq!(pipette.tips_left(), 0);

        pipette.pick_up_tip(None);
        assert_eq!(pipette.totals().starved, 1);

        pipette.reset_tipracks();
        assert_eq!(pipette.tips_left(), 12);
        assert_eq!(pipette.totals().pick_ups, 13);
    }

    #[test]
    fn test_explicit_tips_do_not_use_inventory() {
        let mut pipette = LoggedPipette::multi("P300", Volume::from_ul(300), 1);

        pipette.pick_up_tip(Some(well()));
        pipette.drop_tip(Some(well()));

        assert_eq!(pipette.tips_left(), 12);
        assert_eq!(pipette.totals().returned, 1);
        assert_eq!(pipette.totals().trashed, 0);
    }

    #[test]
    fn test_volume_totals() {
        let mut pipette = LoggedPipette::single("P300", Volume::from_ul(200), 1);
        pipette.pick_up_tip(None);

        pipette.aspirate(Volume::from_ul(120), well());
        pipette.dispense(Volume::from_ul(120), well());
        pipette.aspirate(Volume::from_ul(10), well());
        assert_eq!(pipette.content(), Volume::from_ul(10));

        pipette.blow_out(None);
        assert_eq!(pipette.content(), Volume::ZERO);

        pipette.mix(3, Volume::from_ul(50), well());
        let totals = pipette.totals();
        assert_eq!(totals.aspirated, Volume::from_ul(280));
        assert_eq!(totals.dispensed, Volume::from_ul(270));
    }

    #[test]
    fn test_set_aspirate_rate() {
        let mut pipette = LoggedPipette::multi("P300", Volume::from_ul(300), 4);
        pipette.set_flow_rates(FlowRates {
            aspirate: 50,
            dispense: 150,
            blow_out: 300,
        });

        pipette.set_aspirate_rate(20);

        assert_eq!(pipette.flow_rates().aspirate, 20);
        assert_eq!(pipette.flow_rates().dispense, 150);
    }
}

//! Deck layouts
//!
//! Which slot holds which piece of labware. Defaults match the deck maps
//! the stations were validated with.

use aliquot_hal::DeckSlot;
use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum 300 µL multi-channel racks on Station B
pub const MAX_STATION_B_RACKS: usize = 4;

/// Maximum 20 µL racks on Station C
pub const MAX_P20_RACKS: usize = 6;

/// Maximum 300 µL racks on Station C
pub const MAX_P300_RACKS: usize = 2;

/// Column pick-ups an 8-channel pipette gets from one rack
const COLUMNS_PER_RACK: u8 = 12;

fn slots<const N: usize>(numbers: &[u8]) -> Vec<DeckSlot, N> {
    let mut v = Vec::new();
    for &n in numbers.iter().take(N) {
        let _ = v.push(DeckSlot(n));
    }
    v
}

/// Station B deck
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct StationBLayout {
    /// Racks supplying the four per-column tip sets, in pick order
    pub tip_racks: Vec<DeckSlot, MAX_STATION_B_RACKS>,
    /// Rack of tips used once per reagent
    pub single_tips: DeckSlot,
    /// Magnetic module with the deep-well sample plate
    pub magnet: DeckSlot,
    /// Temperature module with the elution plate
    pub temp_block: DeckSlot,
    /// Liquid waste reservoir
    pub waste: DeckSlot,
    /// Lysis, bead and wash buffer reservoir
    pub reservoir_1: DeckSlot,
    /// Ethanol and water reservoir
    pub reservoir_2: DeckSlot,
}

impl Default for StationBLayout {
    fn default() -> Self {
        Self {
            tip_racks: slots(&[5, 9, 7, 10]),
            single_tips: DeckSlot(6),
            magnet: DeckSlot(4),
            temp_block: DeckSlot(1),
            waste: DeckSlot(11),
            reservoir_1: DeckSlot(2),
            reservoir_2: DeckSlot(3),
        }
    }
}

impl StationBLayout {
    /// Column pick-ups available across the tip-set racks
    pub fn tip_capacity(&self) -> u8 {
        self.tip_racks.len() as u8 * COLUMNS_PER_RACK
    }
}

/// Station C deck
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct StationCLayout {
    /// Chilled elution plate from Station B
    pub source_plate: DeckSlot,
    /// 20 µL filter tip racks
    pub p20_racks: Vec<DeckSlot, MAX_P20_RACKS>,
    /// 200 µL filter tip racks
    pub p300_racks: Vec<DeckSlot, MAX_P300_RACKS>,
    /// Temperature module with the PCR plate
    pub pcr_plate: DeckSlot,
    /// Aluminium block with the mastermix and control strips
    pub pcr_strips: DeckSlot,
    /// Screw-tube block with reagents and controls
    pub tube_block: DeckSlot,
}

impl Default for StationCLayout {
    fn default() -> Self {
        Self {
            source_plate: DeckSlot(1),
            p20_racks: slots(&[3, 6, 8, 9, 10, 11]),
            p300_racks: slots(&[2]),
            pcr_plate: DeckSlot(4),
            pcr_strips: DeckSlot(7),
            tube_block: DeckSlot(5),
        }
    }
}

//! Bead resuspension mixing
//!
//! Both patterns start by drawing an air buffer, cycle liquid between two
//! heights of the well, then expel the buffer. Each pattern performs
//! `repetitions - 1` cycles.

use aliquot_hal::{Location, Pipette, Volume};

/// Air drawn before mixing and expelled after
pub const AIR_BUFFER: Volume = Volume::from_ul(20);

/// Sideways offset for cross mixing (1 mm)
const CROSS_OFFSET_X10: i16 = 10;

/// Low mixing height above the well bottom (0.6 mm)
const LOW_Z_X10: i16 = 6;

/// High cross-mixing height (5.5 mm)
const CROSS_HIGH_Z_X10: i16 = 55;

/// High side-mixing height (4 mm)
const SIDE_HIGH_Z_X10: i16 = 40;

/// Mix across the bottom of a well, alternating sides
///
/// Used to resuspend a freshly formed bead pellet. `well` is the well's
/// default location; offsets are applied relative to its bottom.
pub fn cross_mix<P: Pipette + ?Sized>(
    pipette: &mut P,
    repetitions: u8,
    well: Location,
    volume: Volume,
) {
    let low_right = well.shifted(CROSS_OFFSET_X10, 0, LOW_Z_X10);
    let high_right = well.shifted(CROSS_OFFSET_X10, 0, CROSS_HIGH_Z_X10);
    let low_left = well.shifted(-CROSS_OFFSET_X10, 0, LOW_Z_X10);
    let high_left = well.shifted(-CROSS_OFFSET_X10, 0, CROSS_HIGH_Z_X10);

    pipette.aspirate(AIR_BUFFER, low_right);
    for _ in 1..repetitions {
        pipette.aspirate(volume, low_right);
        pipette.dispense(volume, high_left);
        pipette.aspirate(volume, low_left);
        pipette.dispense(volume, high_right);
    }
    pipette.dispense(AIR_BUFFER, high_right);
}

/// Mix by drawing from one side of a well and washing over the other
///
/// `side_x10` is the offset of the side that gets washed (mm × 10); liquid
/// is drawn from the opposite side. The air buffer comes out of `volume`.
pub fn side_mix<P: Pipette + ?Sized>(
    pipette: &mut P,
    repetitions: u8,
    well: Location,
    volume: Volume,
    side_x10: i16,
) {
    let wash = well.shifted(side_x10, 0, LOW_Z_X10);
    let draw = well.shifted(-side_x10, 0, SIDE_HIGH_Z_X10);
    let mix_volume = volume.saturating_sub(AIR_BUFFER);

    pipette.aspirate(AIR_BUFFER, draw);
    for _ in 1..repetitions {
        pipette.aspirate(mix_volume, draw);
        pipette.dispense(mix_volume, wash);
    }
    pipette.dispense(AIR_BUFFER, draw);
}

#[cfg(test)]
mod tests {
    use super::*;
    use aliquot_hal::{DeckSlot, Well};

    use crate::test_utils::{Command, RecordingPipette};

    fn sample_well() -> Location {
        Location::new(DeckSlot(4), Well::top_of_column(0))
    }

    #[test]
    fn test_cross_mix_sequence() {
        let mut pipette = RecordingPipette::new(Volume::from_ul(300));
        let well = sample_well();

        cross_mix(&mut pipette, 5, well, Volume::from_ul(160));

        // Air in, four cycles of four moves, air out
        assert_eq!(pipette.commands.len(), 1 + 4 * 4 + 1);
        assert_eq!(
            pipette.commands[0],
            Command::Aspirate(Volume::from_ul(20), well.shifted(10, 0, 6))
        );
        assert_eq!(
            pipette.commands[2],
            Command::Dispense(Volume::from_ul(160), well.shifted(-10, 0, 55))
        );
        assert_eq!(
            pipette.commands[17],
            Command::Dispense(Volume::from_ul(20), well.shifted(10, 0, 55))
        );
    }

    #[test]
    fn test_side_mix_sequence() {
        let mut pipette = RecordingPipette::new(Volume::from_ul(300));
        let well = sample_well();

        side_mix(&mut pipette, 3, well, Volume::from_ul(180), -10);

        assert_eq!(
            pipette.commands,
            vec![
                Command::Aspirate(Volume::from_ul(20), well.shifted(10, 0, 40)),
                Command::Aspirate(Volume::from_ul(160), well.shifted(10, 0, 40)),
                Command::Dispense(Volume::from_ul(160), well.shifted(-10, 0, 6)),
                Command::Aspirate(Volume::from_ul(160), well.shifted(10, 0, 40)),
                Command::Dispense(Volume::from_ul(160), well.shifted(-10, 0, 6)),
                Command::Dispense(Volume::from_ul(20), well.shifted(10, 0, 40)),
            ]
        );
    }

    #[test]
    fn test_single_repetition_only_moves_air() {
        let mut pipette = RecordingPipette::new(Volume::from_ul(300));

        side_mix(&mut pipette, 1, sample_well(), Volume::from_ul(180), 10);

        assert_eq!(pipette.commands.len(), 2);
    }
}

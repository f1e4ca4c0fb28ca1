//! Deck locations
//!
//! A location names a well in a piece of labware and a position inside
//! that well. The host runtime resolves it to coordinates; nothing here
//! knows labware geometry.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Deck slot holding a piece of labware (1-12)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct DeckSlot(pub u8);

impl fmt::Display for DeckSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot {}", self.0)
    }
}

/// A well addressed by row and column (both 0-based)
///
/// Row 0 is "A", column 0 is "1".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Well {
    /// Row index (0 = A)
    pub row: u8,
    /// Column index (0 = 1)
    pub column: u8,
}

impl Well {
    /// Create a well from 0-based row and column
    pub const fn new(row: u8, column: u8) -> Self {
        Self { row, column }
    }

    /// Well in row A of the given 0-based column
    ///
    /// Multi-channel pipettes address a whole column through its row-A well.
    pub const fn top_of_column(column: u8) -> Self {
        Self { row: 0, column }
    }
}

impl fmt::Display for Well {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'A' + self.row) as char, self.column + 1)
    }
}

/// Position inside a well
///
/// Offsets are in millimetres × 10 (e.g., -50 = 5.0 mm below the top).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WellPosition {
    /// Host default (usually just above the bottom)
    #[default]
    Default,
    /// Relative to the top of the well
    Top { z_x10: i16 },
    /// Relative to the bottom, shifted sideways
    Shifted { x_x10: i16, y_x10: i16, z_x10: i16 },
}

/// A well in a piece of labware, plus a position inside it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    /// Deck slot of the labware
    pub slot: DeckSlot,
    /// Well within the labware
    pub well: Well,
    /// Position within the well
    pub position: WellPosition,
}

impl Location {
    /// Create a location at the host's default position in a well
    pub const fn new(slot: DeckSlot, well: Well) -> Self {
        Self {
            slot,
            well,
            position: WellPosition::Default,
        }
    }

    /// Same well, relative to its top
    pub const fn top(self, z_x10: i16) -> Self {
        Self {
            position: WellPosition::Top { z_x10 },
            ..self
        }
    }

    /// Same well, relative to its bottom and shifted sideways
    pub const fn shifted(self, x_x10: i16, y_x10: i16, z_x10: i16) -> Self {
        Self {
            position: WellPosition::Shifted { x_x10, y_x10, z_x10 },
            ..self
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}", self.well, self.slot)?;
        match self.position {
            WellPosition::Default => Ok(()),
            WellPosition::Top { z_x10 } => write!(f, " (top {:+}mm/10)", z_x10),
            WellPosition::Shifted { x_x10, y_x10, z_x10 } => {
                write!(f, " (bottom x{:+} y{:+} z{:+} mm/10)", x_x10, y_x10, z_x10)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_positions() {
        let loc = Location::new(DeckSlot(4), Well::top_of_column(2));
        assert_eq!(loc.top(-50).position, WellPosition::Top { z_x10: -50 });
        assert_eq!(
            loc.shifted(-10, 0, 5).position,
            WellPosition::Shifted {
                x_x10: -10,
                y_x10: 0,
                z_x10: 5
            }
        );
        assert_eq!(loc.top(-50).well, loc.well);
    }
}

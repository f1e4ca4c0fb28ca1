//! Logged deck modules

use aliquot_hal::{MagneticModule, TemperatureModule};
use log::info;

use crate::LOG_TARGET;

/// Magnetic module that logs moves
#[derive(Debug, Clone, Default)]
pub struct LoggedMagnet {
    height_x10: Option<u16>,
    engagements: u32,
}

impl LoggedMagnet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engage height, if raised
    pub fn height_x10(&self) -> Option<u16> {
        self.height_x10
    }

    /// Times the magnets were raised
    pub fn engagements(&self) -> u32 {
        self.engagements
    }
}

impl MagneticModule for LoggedMagnet {
    fn engage(&mut self, height_x10: u16) {
        info!(
            target: LOG_TARGET,
            "Magnet engaged at {}.{} mm",
            height_x10 / 10,
            height_x10 % 10
        );
        self.height_x10 = Some(height_x10);
        self.engagements += 1;
    }

    fn disengage(&mut self) {
        info!(target: LOG_TARGET, "Magnet disengaged");
        self.height_x10 = None;
    }
}

/// Temperature block that logs its set point
#[derive(Debug, Clone, Default)]
pub struct LoggedBlock {
    target: Option<i16>,
}

impl LoggedBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last set point, if any
    pub fn target(&self) -> Option<i16> {
        self.target
    }
}

impl TemperatureModule for LoggedBlock {
    fn set_temperature(&mut self, celsius: i16) {
        info!(target: LOG_TARGET, "Temperature block set to {} C", celsius);
        self.target = Some(celsius);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnet() {
        let mut magnet = LoggedMagnet::new();
        assert_eq!(magnet.height_x10(), None);

        magnet.engage(137);
        assert_eq!(magnet.height_x10(), Some(137));

        magnet.disengage();
        assert_eq!(magnet.height_x10(), None);
        assert_eq!(magnet.engagements(), 1);
    }

    #[test]
    fn test_block() {
        let mut block = LoggedBlock::new();
        block.set_temperature(4);
        assert_eq!(block.target(), Some(4));
    }
}

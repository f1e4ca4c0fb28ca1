//! Deck module traits

/// Trait for a magnetic bead module
pub trait MagneticModule {
    /// Raise the magnets to `height_x10` (mm × 10 above the labware base)
    fn engage(&mut self, height_x10: u16);

    /// Lower the magnets
    fn disengage(&mut self);
}

/// Trait for a temperature-controlled block
pub trait TemperatureModule {
    /// Set the target temperature and wait until it is reached
    fn set_temperature(&mut self, celsius: i16);
}

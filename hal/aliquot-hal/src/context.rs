//! Protocol context
//!
//! The run-level services the host provides: the simulation flag,
//! operator messaging and timed waits.

use core::time::Duration;

/// Trait for the run-level host services
pub trait ProtocolContext {
    /// Whether the host is simulating rather than driving hardware
    fn is_simulating(&self) -> bool;

    /// Post a message to the run log
    fn comment(&mut self, message: &str);

    /// Suspend the run until the operator resumes it
    ///
    /// Blocks on real hardware. Simulating hosts return immediately.
    fn pause(&mut self, message: &str);

    /// Wait for a fixed time
    fn delay(&mut self, duration: Duration);

    /// Wait for whole minutes
    fn delay_minutes(&mut self, minutes: u64) {
        self.delay(Duration::from_secs(minutes * 60));
    }
}

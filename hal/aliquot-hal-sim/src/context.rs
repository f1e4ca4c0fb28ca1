//! Logged protocol context

use std::io::{self, BufRead};
use std::time::Duration;

use aliquot_hal::ProtocolContext;
use log::{info, warn};

use crate::LOG_TARGET;

/// Protocol context for workstation runs
///
/// Delays are logged and totalled, never slept. A pause blocks on a line
/// from stdin only when the context is interactive and not simulating.
#[derive(Debug, Clone, Default)]
pub struct LoggedContext {
    simulating: bool,
    interactive: bool,
    comments: u32,
    pauses: u32,
    waited: Duration,
}

impl LoggedContext {
    /// Create a context
    pub fn new(simulating: bool, interactive: bool) -> Self {
        Self {
            simulating,
            interactive,
            ..Default::default()
        }
    }

    /// Comments posted
    pub fn comments(&self) -> u32 {
        self.comments
    }

    /// Operator pauses requested
    pub fn pauses(&self) -> u32 {
        self.pauses
    }

    /// Total time spent in delays
    pub fn waited(&self) -> Duration {
        self.waited
    }

    fn wait_for_operator(&self) {
        eprintln!("Press Enter to resume...");
        let mut line = String::new();
        if let Err(e) = io::stdin().lock().read_line(&mut line) {
            warn!(target: LOG_TARGET, "Could not read operator input: {}", e);
        }
    }
}

impl ProtocolContext for LoggedContext {
    fn is_simulating(&self) -> bool {
        self.simulating
    }

    fn comment(&mut self, message: &str) {
        info!(target: LOG_TARGET, "{}", message);
        self.comments += 1;
    }

    fn pause(&mut self, message: &str) {
        warn!(target: LOG_TARGET, "Paused: {}", message);
        self.pauses += 1;

        if self.interactive && !self.simulating {
            self.wait_for_operator();
            info!(target: LOG_TARGET, "Resumed");
        }
    }

    fn delay(&mut self, duration: Duration) {
        info!(target: LOG_TARGET, "Delay {} s", duration.as_secs());
        self.waited += duration;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_messages() {
        let mut ctx = LoggedContext::new(true, true);

        ctx.comment("Mixing samples:");
        ctx.pause("please replace tips.");

        assert!(ctx.is_simulating());
        assert_eq!(ctx.comments(), 1);
        assert_eq!(ctx.pauses(), 1);
    }

    #[test]
    fn test_delays_accumulate() {
        let mut ctx = LoggedContext::new(false, false);

        ctx.delay_minutes(5);
        ctx.delay(Duration::from_secs(30));

        assert_eq!(ctx.waited(), Duration::from_secs(330));
    }
}

//! Per-channel tip state machine

/// Tip supply state for one pipette channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TipState {
    /// Racks have tips left; pick-ups proceed
    #[default]
    Counting,
    /// Racks are exhausted; waiting for the operator to replace them
    AwaitingReplacement,
}

/// Events that move a channel between states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipEvent {
    /// A pick-up was requested with the count at rack capacity
    RackExhausted,
    /// Operator acknowledged fresh racks
    RacksReplaced,
}

impl TipState {
    /// Check if pick-ups are blocked on the operator
    pub fn is_awaiting_replacement(&self) -> bool {
        matches!(self, TipState::AwaitingReplacement)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: TipEvent) -> Self {
        use TipEvent::*;
        use TipState::*;

        match (self, event) {
            (Counting, RackExhausted) => AwaitingReplacement,
            (AwaitingReplacement, RacksReplaced) => Counting,

            // Default: stay in current state
            _ => self,
        }
    }
}

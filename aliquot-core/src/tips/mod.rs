//! Tip inventory tracking
//!
//! Counts tips consumed per pipette, pauses for rack replacement when a
//! rack set runs out, and reads the persisted count record at start-up.
//!
//! Counts are read once and never written back during a run, so they only
//! carry across invocations if something else updates the record.

pub mod record;
pub mod state;
pub mod tracker;

pub use record::{RecordError, TipCountRecord, MAX_RECORD_LEN};
pub use state::{TipEvent, TipState};
pub use tracker::{
    PickUpDecision, RackCapacities, TipChannel, TipCounter, TipTracker, REPLACE_TIPS_MESSAGE,
};

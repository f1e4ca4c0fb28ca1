//! Tip tracker
//!
//! Every pick-up on a tracked pipette goes through [`TipTracker::pick_up`].
//! When a channel has used its full rack capacity the next request moves it
//! to [`TipState::AwaitingReplacement`]; the operator is asked to swap the
//! racks, the pipette's rack references are reset, and counting restarts.

use aliquot_hal::{Pipette, ProtocolContext, StorageError, TipCountStorage};
use log::{info, warn};

use super::record::{RecordError, TipCountRecord, MAX_RECORD_LEN};
use super::state::{TipEvent, TipState};
use crate::config::RunMode;

/// Operator message when a rack set runs out
pub const REPLACE_TIPS_MESSAGE: &str = "please replace tips.";

/// Column pick-ups per rack for an 8-channel pipette
pub const MULTI_PICKUPS_PER_RACK: u32 = 12;

/// Tip pick-ups per rack for a single-channel pipette
pub const SINGLE_PICKUPS_PER_RACK: u32 = 96;

/// A tracked pipette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TipChannel {
    /// 8-channel 20 µL pipette (first record field)
    P20,
    /// Single-channel 300 µL pipette (second record field)
    P300,
}

impl TipChannel {
    /// All channels in record order
    pub const ALL: [TipChannel; 2] = [TipChannel::P20, TipChannel::P300];

    /// Position in the record
    pub const fn index(self) -> usize {
        match self {
            TipChannel::P20 => 0,
            TipChannel::P300 => 1,
        }
    }

    /// Display name
    pub const fn name(self) -> &'static str {
        match self {
            TipChannel::P20 => "P20",
            TipChannel::P300 => "P300",
        }
    }
}

/// Tip usage for one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TipCounter {
    /// Tips picked up since the racks were last full
    pub used: u32,
    /// Pick-ups available from a full rack set
    pub capacity: u32,
    /// Supply state
    pub state: TipState,
}

impl TipCounter {
    /// Create a counter
    pub const fn new(used: u32, capacity: u32) -> Self {
        Self {
            used,
            capacity,
            state: TipState::Counting,
        }
    }

    /// Pick-ups left before a replacement
    pub fn remaining(&self) -> u32 {
        self.capacity.saturating_sub(self.used)
    }

    /// Check if the next pick-up needs fresh racks
    ///
    /// A record can carry a count above the configured capacity (racks were
    /// removed from the deck between runs), so this is `>=`, not `==`.
    pub fn is_exhausted(&self) -> bool {
        self.used >= self.capacity
    }
}

/// Rack capacity per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RackCapacities {
    pub p20: u32,
    pub p300: u32,
}

impl RackCapacities {
    /// Capacities for a number of loaded racks
    pub const fn for_racks(p20_racks: u32, p300_racks: u32) -> Self {
        Self {
            p20: p20_racks * MULTI_PICKUPS_PER_RACK,
            p300: p300_racks * SINGLE_PICKUPS_PER_RACK,
        }
    }

    /// Capacity for a channel
    pub fn get(&self, channel: TipChannel) -> u32 {
        match channel {
            TipChannel::P20 => self.p20,
            TipChannel::P300 => self.p300,
        }
    }
}

/// Outcome of a pick-up request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickUpDecision {
    /// A tip is available
    Proceed,
    /// Racks must be replaced first
    ReplaceRacks,
}

/// Why the persisted record could not be used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TipLoadError {
    Storage(StorageError),
    Record(RecordError),
}

impl From<StorageError> for TipLoadError {
    fn from(e: StorageError) -> Self {
        TipLoadError::Storage(e)
    }
}

impl From<RecordError> for TipLoadError {
    fn from(e: RecordError) -> Self {
        TipLoadError::Record(e)
    }
}

/// Tip inventory for the pipettes of one run
#[derive(Debug, Clone)]
pub struct TipTracker {
    mode: RunMode,
    counters: [TipCounter; 2],
    replacements: u32,
}

impl TipTracker {
    /// Create a tracker with zero counts
    pub fn new(mode: RunMode, capacities: RackCapacities) -> Self {
        Self::with_counts(mode, capacities, TipCountRecord::default())
    }

    /// Create a tracker starting from known counts
    pub fn with_counts(mode: RunMode, capacities: RackCapacities, record: TipCountRecord) -> Self {
        Self {
            mode,
            counters: TipChannel::ALL
                .map(|channel| TipCounter::new(record.count(channel), capacities.get(channel))),
            replacements: 0,
        }
    }

    /// Create a tracker from the persisted record
    ///
    /// Storage is only touched on real hardware with tracking enabled. A
    /// missing record is created as `0, 0`; an unreadable or malformed one
    /// logs a warning and starts from zero.
    pub fn load<S: TipCountStorage + ?Sized>(
        mode: RunMode,
        capacities: RackCapacities,
        storage: &mut S,
    ) -> Self {
        if !mode.uses_persisted_counts() {
            info!(
                "Tip counts start at zero (simulating: {}, tracking: {})",
                mode.simulating, mode.tip_tracking
            );
            return Self::new(mode, capacities);
        }

        match read_record(storage) {
            Ok(record) => {
                info!(
                    "Loaded tip counts: P20 {}/{}, P300 {}/{}",
                    record.p20, capacities.p20, record.p300, capacities.p300
                );
                Self::with_counts(mode, capacities, record)
            }
            Err(e) => {
                warn!("Tip record unusable ({:?}), starting from zero", e);
                Self::new(mode, capacities)
            }
        }
    }

    /// Run mode the tracker was created with
    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Counter for a channel
    pub fn counter(&self, channel: TipChannel) -> &TipCounter {
        &self.counters[channel.index()]
    }

    /// Tips used on a channel since its racks were last full
    pub fn used(&self, channel: TipChannel) -> u32 {
        self.counter(channel).used
    }

    /// Supply state of a channel
    pub fn state(&self, channel: TipChannel) -> TipState {
        self.counter(channel).state
    }

    /// Rack replacements performed this run
    pub fn replacements(&self) -> u32 {
        self.replacements
    }

    /// Current counts in record form
    ///
    /// Nothing writes this back to storage.
    pub fn snapshot(&self) -> TipCountRecord {
        TipCountRecord::new(self.used(TipChannel::P20), self.used(TipChannel::P300))
    }

    /// Ask for a tip on a channel
    pub fn request_pick_up(&mut self, channel: TipChannel) -> PickUpDecision {
        let counter = &mut self.counters[channel.index()];

        if counter.state == TipState::Counting && counter.is_exhausted() {
            counter.state = counter.state.transition(TipEvent::RackExhausted);
        }

        if counter.state.is_awaiting_replacement() {
            PickUpDecision::ReplaceRacks
        } else {
            PickUpDecision::Proceed
        }
    }

    /// Operator has replaced the racks for a channel
    pub fn acknowledge_replacement(&mut self, channel: TipChannel) {
        let counter = &mut self.counters[channel.index()];

        if counter.state.is_awaiting_replacement() {
            counter.used = 0;
            self.replacements += 1;
        }
        counter.state = counter.state.transition(TipEvent::RacksReplaced);
    }

    /// A tip was picked up on a channel
    pub fn record_pick_up(&mut self, channel: TipChannel) {
        self.counters[channel.index()].used += 1;
    }

    /// Pick up the next tip, replacing racks first if they are exhausted
    ///
    /// On real hardware this blocks on an operator pause. Simulated runs
    /// post a comment instead and carry on.
    pub fn pick_up<C, P>(&mut self, ctx: &mut C, pipette: &mut P, channel: TipChannel)
    where
        C: ProtocolContext + ?Sized,
        P: Pipette + ?Sized,
    {
        if self.request_pick_up(channel) == PickUpDecision::ReplaceRacks {
            info!(
                "{} racks exhausted after {} pick-ups",
                channel.name(),
                self.used(channel)
            );
            if self.mode.simulating {
                ctx.comment(REPLACE_TIPS_MESSAGE);
            } else {
                ctx.pause(REPLACE_TIPS_MESSAGE);
            }
            pipette.reset_tipracks();
            self.acknowledge_replacement(channel);
        }

        pipette.pick_up_tip(None);
        self.record_pick_up(channel);
    }
}

fn read_record<S: TipCountStorage + ?Sized>(storage: &mut S) -> Result<TipCountRecord, TipLoadError> {
    storage.ensure_initialized()?;

    let mut buffer = [0u8; MAX_RECORD_LEN];
    let len = storage.read(&mut buffer)?;

    Ok(TipCountRecord::from_bytes(&buffer[..len])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aliquot_hal::Volume;

    use crate::test_utils::{Command, MemoryStorage, RecordingContext, RecordingPipette};

    const LIVE_TRACKED: RunMode = RunMode {
        simulating: false,
        tip_tracking: true,
    };

    fn station_c_racks() -> RackCapacities {
        RackCapacities::for_racks(6, 1)
    }

    #[test]
    fn test_capacities_for_racks() {
        let caps = station_c_racks();
        assert_eq!(caps.p20, 72);
        assert_eq!(caps.p300, 96);
    }

    #[test]
    fn test_pick_up_counts() {
        let mut tracker = TipTracker::new(LIVE_TRACKED, station_c_racks());
        let mut ctx = RecordingContext::live();
        let mut pipette = RecordingPipette::new(Volume::from_ul(200));

        tracker.pick_up(&mut ctx, &mut pipette, TipChannel::P300);
        tracker.pick_up(&mut ctx, &mut pipette, TipChannel::P300);

        assert_eq!(tracker.used(TipChannel::P300), 2);
        assert_eq!(tracker.used(TipChannel::P20), 0);
        assert_eq!(pipette.pick_ups(), 2);
        assert!(ctx.pauses.is_empty());
    }

    #[test]
    fn test_rollover_at_capacity() {
        let mut tracker = TipTracker::with_counts(
            LIVE_TRACKED,
            station_c_racks(),
            TipCountRecord::new(0, 95),
        );
        let mut ctx = RecordingContext::live();
        let mut pipette = RecordingPipette::new(Volume::from_ul(200));

        tracker.pick_up(&mut ctx, &mut pipette, TipChannel::P300);
        assert_eq!(tracker.used(TipChannel::P300), 96);
        assert!(ctx.pauses.is_empty());

        tracker.pick_up(&mut ctx, &mut pipette, TipChannel::P300);
        assert_eq!(ctx.pauses, ["please replace tips."]);
        assert_eq!(pipette.count(|c| *c == Command::ResetRacks), 1);
        assert_eq!(tracker.used(TipChannel::P300), 1);
        assert_eq!(tracker.state(TipChannel::P300), TipState::Counting);
        assert_eq!(tracker.replacements(), 1);

        // Reset happens before the pick-up
        let reset = pipette
            .commands
            .iter()
            .position(|c| *c == Command::ResetRacks);
        assert_eq!(reset, Some(1));
        assert_eq!(pipette.commands[2], Command::PickUp(None));
    }

    #[test]
    fn test_rollover_when_count_exceeds_capacity() {
        let mut tracker = TipTracker::with_counts(
            LIVE_TRACKED,
            station_c_racks(),
            TipCountRecord::new(80, 0),
        );
        let mut ctx = RecordingContext::live();
        let mut pipette = RecordingPipette::new(Volume::from_ul(20));

        tracker.pick_up(&mut ctx, &mut pipette, TipChannel::P20);

        assert_eq!(ctx.pauses.len(), 1);
        assert_eq!(tracker.used(TipChannel::P20), 1);
    }

    #[test]
    fn test_simulated_rollover_does_not_block() {
        let mode = RunMode {
            simulating: true,
            tip_tracking: true,
        };
        let mut tracker = TipTracker::new(mode, RackCapacities::for_racks(1, 1));
        let mut ctx = RecordingContext::simulating();
        let mut pipette = RecordingPipette::new(Volume::from_ul(20));

        for _ in 0..13 {
            tracker.pick_up(&mut ctx, &mut pipette, TipChannel::P20);
        }

        assert!(ctx.pauses.is_empty());
        assert_eq!(ctx.comments, ["please replace tips."]);
        assert_eq!(tracker.used(TipChannel::P20), 1);
        assert_eq!(pipette.pick_ups(), 13);
    }

    #[test]
    fn test_request_and_acknowledge() {
        let mut tracker = TipTracker::with_counts(
            LIVE_TRACKED,
            RackCapacities::for_racks(1, 1),
            TipCountRecord::new(12, 0),
        );

        assert_eq!(
            tracker.request_pick_up(TipChannel::P20),
            PickUpDecision::ReplaceRacks
        );
        // Still waiting until acknowledged
        assert_eq!(
            tracker.request_pick_up(TipChannel::P20),
            PickUpDecision::ReplaceRacks
        );
        assert!(tracker.state(TipChannel::P20).is_awaiting_replacement());

        tracker.acknowledge_replacement(TipChannel::P20);
        assert_eq!(tracker.used(TipChannel::P20), 0);
        assert_eq!(
            tracker.request_pick_up(TipChannel::P20),
            PickUpDecision::Proceed
        );

        // Acknowledging without a pending replacement changes nothing
        tracker.record_pick_up(TipChannel::P20);
        tracker.acknowledge_replacement(TipChannel::P20);
        assert_eq!(tracker.used(TipChannel::P20), 1);
        assert_eq!(tracker.replacements(), 1);
    }

    #[test]
    fn test_load_simulated_skips_storage() {
        let mode = RunMode {
            simulating: true,
            tip_tracking: true,
        };
        let mut storage = MemoryStorage::with_record("12, 34\n");

        let tracker = TipTracker::load(mode, station_c_racks(), &mut storage);

        assert_eq!(tracker.snapshot(), TipCountRecord::new(0, 0));
        assert_eq!(storage.accesses(), 0);
    }

    #[test]
    fn test_load_tracking_disabled_skips_storage() {
        let mode = RunMode {
            simulating: false,
            tip_tracking: false,
        };
        let mut storage = MemoryStorage::default();

        let tracker = TipTracker::load(mode, station_c_racks(), &mut storage);

        assert_eq!(tracker.snapshot(), TipCountRecord::new(0, 0));
        assert_eq!(storage.accesses(), 0);
        assert!(storage.record.is_none());
    }

    #[test]
    fn test_load_reads_record() {
        let mut storage = MemoryStorage::with_record("12, 34\n");

        let tracker = TipTracker::load(LIVE_TRACKED, station_c_racks(), &mut storage);

        assert_eq!(tracker.used(TipChannel::P20), 12);
        assert_eq!(tracker.used(TipChannel::P300), 34);
        assert_eq!(tracker.counter(TipChannel::P20).remaining(), 60);
    }

    #[test]
    fn test_load_creates_missing_record() {
        let mut storage = MemoryStorage::default();

        let tracker = TipTracker::load(LIVE_TRACKED, station_c_racks(), &mut storage);

        assert_eq!(tracker.snapshot(), TipCountRecord::new(0, 0));
        assert_eq!(storage.record.as_deref(), Some(&b"0, 0\n"[..]));
    }

    #[test]
    fn test_load_malformed_record_starts_at_zero() {
        let mut storage = MemoryStorage::with_record("lots, of tips\n");

        let tracker = TipTracker::load(LIVE_TRACKED, station_c_racks(), &mut storage);

        assert_eq!(tracker.snapshot(), TipCountRecord::new(0, 0));
    }

    #[test]
    fn test_record_not_written_back() {
        let mut storage = MemoryStorage::with_record("3, 5\n");
        let mut tracker = TipTracker::load(LIVE_TRACKED, station_c_racks(), &mut storage);
        let mut ctx = RecordingContext::live();
        let mut pipette = RecordingPipette::new(Volume::from_ul(20));

        for _ in 0..4 {
            tracker.pick_up(&mut ctx, &mut pipette, TipChannel::P20);
        }

        assert_eq!(tracker.snapshot(), TipCountRecord::new(7, 5));
        assert_eq!(storage.record.as_deref(), Some(&b"3, 5\n"[..]));
    }

    #[test]
    fn test_load_ignores_trailing_lines_past_buffer() {
        let mut text = String::from("12, 34\n");
        text.push_str(&"#".repeat(80));
        let mut storage = MemoryStorage::with_record(&text);

        let tracker = TipTracker::load(LIVE_TRACKED, station_c_racks(), &mut storage);

        assert_eq!(tracker.snapshot(), TipCountRecord::new(12, 34));
    }

    #[test]
    fn test_load_oversized_first_line_starts_at_zero() {
        let text = "#".repeat(MAX_RECORD_LEN + 1);
        let mut storage = MemoryStorage::with_record(&text);

        let tracker = TipTracker::load(LIVE_TRACKED, station_c_racks(), &mut storage);

        assert_eq!(tracker.snapshot(), TipCountRecord::new(0, 0));
    }
}

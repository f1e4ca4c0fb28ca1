//! Recording host doubles for unit tests

use core::time::Duration;

use aliquot_hal::storage::{copy_first_line, INITIAL_RECORD};
use aliquot_hal::{
    FlowRates, Location, MagneticModule, Pipette, ProtocolContext, StorageError,
    TemperatureModule, TipCountStorage, Volume,
};

/// A command issued to a [`RecordingPipette`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Aspirate(Volume, Location),
    Dispense(Volume, Location),
    Mix(u8, Volume, Location),
    BlowOut(Option<Location>),
    PickUp(Option<Location>),
    Drop(Option<Location>),
    ResetRacks,
    Flow(FlowRates),
}

pub struct RecordingPipette {
    pub max_volume: Volume,
    pub flow: FlowRates,
    pub commands: Vec<Command>,
}

impl RecordingPipette {
    pub fn new(max_volume: Volume) -> Self {
        Self {
            max_volume,
            flow: FlowRates::default(),
            commands: Vec::new(),
        }
    }

    pub fn count(&self, pred: impl Fn(&Command) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    pub fn pick_ups(&self) -> usize {
        self.count(|c| matches!(c, Command::PickUp(_)))
    }

    pub fn drops(&self) -> usize {
        self.count(|c| matches!(c, Command::Drop(_)))
    }
}

impl Pipette for RecordingPipette {
    fn max_volume(&self) -> Volume {
        self.max_volume
    }

    fn aspirate(&mut self, volume: Volume, location: Location) {
        self.commands.push(Command::Aspirate(volume, location));
    }

    fn dispense(&mut self, volume: Volume, location: Location) {
        self.commands.push(Command::Dispense(volume, location));
    }

    fn mix(&mut self, repetitions: u8, volume: Volume, location: Location) {
        self.commands.push(Command::Mix(repetitions, volume, location));
    }

    fn blow_out(&mut self, location: Option<Location>) {
        self.commands.push(Command::BlowOut(location));
    }

    fn pick_up_tip(&mut self, tip: Option<Location>) {
        self.commands.push(Command::PickUp(tip));
    }

    fn drop_tip(&mut self, location: Option<Location>) {
        self.commands.push(Command::Drop(location));
    }

    fn reset_tipracks(&mut self) {
        self.commands.push(Command::ResetRacks);
    }

    fn flow_rates(&self) -> FlowRates {
        self.flow
    }

    fn set_flow_rates(&mut self, rates: FlowRates) {
        self.flow = rates;
        self.commands.push(Command::Flow(rates));
    }
}

#[derive(Default)]
pub struct RecordingContext {
    pub simulating: bool,
    pub comments: Vec<String>,
    pub pauses: Vec<String>,
    pub delays: Vec<Duration>,
}

impl RecordingContext {
    pub fn simulating() -> Self {
        Self {
            simulating: true,
            ..Default::default()
        }
    }

    pub fn live() -> Self {
        Self::default()
    }

    pub fn total_delay(&self) -> Duration {
        self.delays.iter().sum()
    }
}

impl ProtocolContext for RecordingContext {
    fn is_simulating(&self) -> bool {
        self.simulating
    }

    fn comment(&mut self, message: &str) {
        self.comments.push(message.to_string());
    }

    fn pause(&mut self, message: &str) {
        self.pauses.push(message.to_string());
    }

    fn delay(&mut self, duration: Duration) {
        self.delays.push(duration);
    }
}

#[derive(Default)]
pub struct RecordingMagnet {
    pub engaged: bool,
    pub engagements: Vec<u16>,
    pub disengagements: usize,
}

impl MagneticModule for RecordingMagnet {
    fn engage(&mut self, height_x10: u16) {
        self.engaged = true;
        self.engagements.push(height_x10);
    }

    fn disengage(&mut self) {
        self.engaged = false;
        self.disengagements += 1;
    }
}

#[derive(Default)]
pub struct RecordingBlock {
    pub target: Option<i16>,
}

impl TemperatureModule for RecordingBlock {
    fn set_temperature(&mut self, celsius: i16) {
        self.target = Some(celsius);
    }
}

/// In-memory tip-count record that counts every access
#[derive(Default)]
pub struct MemoryStorage {
    pub record: Option<Vec<u8>>,
    pub inits: usize,
    pub reads: usize,
}

impl MemoryStorage {
    pub fn with_record(text: &str) -> Self {
        Self {
            record: Some(text.as_bytes().to_vec()),
            ..Default::default()
        }
    }

    pub fn accesses(&self) -> usize {
        self.inits + self.reads
    }
}

impl TipCountStorage for MemoryStorage {
    fn ensure_initialized(&mut self) -> Result<(), StorageError> {
        self.inits += 1;
        if self.record.is_none() {
            self.record = Some(INITIAL_RECORD.to_vec());
        }
        Ok(())
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, StorageError> {
        self.reads += 1;
        let data = self.record.as_ref().ok_or(StorageError::NotFound)?;
        copy_first_line(data, buffer)
    }
}

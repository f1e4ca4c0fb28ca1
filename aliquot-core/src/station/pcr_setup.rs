//! Station C: mastermix preparation and PCR plate setup
//!
//! Optionally builds the reaction mix from its components and splits it
//! into a PCR strip, adds controls to the strip, then plates mastermix,
//! samples and controls onto the PCR plate. A single-channel 300 µL pipette
//! handles the tube work; an 8-channel 20 µL pipette handles the plate.
//!
//! Every pick-up goes through the [`TipTracker`], so a long run pauses for
//! fresh racks instead of running dry.

use aliquot_hal::{Location, Pipette, ProtocolContext, TemperatureModule, Volume, Well};
use log::{debug, info};

use super::{RunSummary, StationError};
use crate::config::{StationCConfig, SAMPLES_PER_COLUMN};
use crate::tips::{TipChannel, TipTracker};
use crate::transfer::{transfer, TransferRequest};

/// Temperature block set point
const BLOCK_TEMPERATURE_C: i16 = 4;

/// Reagent per reaction (0.01 µL)
const WATER_PER_REACTION: u32 = 260;
const PRIMERS_PER_REACTION: u32 = 200;
const MASTERMIX_PER_REACTION: u32 = 1000;
const ENZYME_PER_REACTION: u32 = 40;

/// Reaction overage, percent
const OVERAGE_PERCENT: u32 = 110;

/// Mixing uses this share of the accumulated reaction mix, percent
const MIX_SHARE_PERCENT: u32 = 90;

/// Largest mix the 300 µL pipette performs with filter tips
const MAX_MIX_VOLUME: Volume = Volume::from_ul(180);

/// Mastermix plated into every reaction well
const PLATE_MASTERMIX: Volume = Volume::from_ul(15);

/// Each control added to the strip
const CONTROL_VOLUME: Volume = Volume::from_ul(20);

/// Mixing volume on the PCR plate
const PLATE_MIX_VOLUME: Volume = Volume::from_ul(15);

/// Tube block positions
const PRIMERS_TUBE: Well = Well::new(0, 5);
const MASTERMIX_TUBE: Well = Well::new(1, 5);
const ENZYME_TUBE: Well = Well::new(2, 5);
const WATER_TUBE: Well = Well::new(3, 5);
const REACTION_MIX_TUBE: Well = Well::new(3, 1);
const POSITIVE_CONTROL_TUBE: Well = Well::new(0, 0);
const NEGATIVE_CONTROL_TUBE: Well = Well::new(3, 0);

/// Strip column holding the split reaction mix
const STRIP_MASTERMIX_COLUMN: u8 = 0;

/// Strip column holding the controls (rows F-H)
const STRIP_CONTROL_COLUMN: u8 = 11;

/// Reagent volumes for one batch of reaction mix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MastermixVolumes {
    pub water: Volume,
    pub primers: Volume,
    pub mastermix: Volume,
    pub enzyme: Volume,
}

impl MastermixVolumes {
    /// Volume of the whole batch
    pub fn total(&self) -> Volume {
        self.water + self.primers + self.mastermix + self.enzyme
    }

    /// Reaction mix split into each well of a strip column, whole µL
    ///
    /// Rounds to the nearest microlitre, dropping one when eight wells of
    /// the rounded share would take more than the tube holds.
    pub fn per_strip_well(&self) -> Volume {
        let total = self.total();
        let wells = u32::from(SAMPLES_PER_COLUMN);
        let share = total.share(wells).round_ul();

        if share * wells > total {
            share.saturating_sub(Volume::from_ul(1))
        } else {
            share
        }
    }
}

/// Reagent volumes for filling a number of PCR plate columns
///
/// Every column is eight reactions, plus ten percent overage.
pub fn mastermix_volumes(mastermix_columns: u8) -> MastermixVolumes {
    let reactions = u32::from(mastermix_columns) * u32::from(SAMPLES_PER_COLUMN);
    let scaled = |per_reaction: u32| {
        (Volume::from_centi_ul(per_reaction) * reactions).scale_percent(OVERAGE_PERCENT)
    };

    MastermixVolumes {
        water: scaled(WATER_PER_REACTION),
        primers: scaled(PRIMERS_PER_REACTION),
        mastermix: scaled(MASTERMIX_PER_REACTION),
        enzyme: scaled(ENZYME_PER_REACTION),
    }
}

/// Mix volume for the reaction mix accumulated so far
pub fn mix_volume(accumulated: Volume) -> Volume {
    accumulated
        .scale_percent(MIX_SHARE_PERCENT)
        .round_ul()
        .min(MAX_MIX_VOLUME)
}

/// Transfer with a held tip, no carry, strokes sized to the pipette
fn move_liquid<P: Pipette + ?Sized>(
    pipette: &mut P,
    summary: &mut RunSummary,
    volume: Volume,
    source: Location,
    destination: Location,
) -> Result<(), StationError> {
    let request = TransferRequest::new(volume, pipette.max_volume(), source, destination)?;
    let result = transfer(pipette, &request);
    summary.record_transfer(&result);
    Ok(())
}

/// Station C sequence bound to its host
pub struct StationC<'a, C: ?Sized, M: ?Sized, S: ?Sized, T: ?Sized> {
    config: &'a StationCConfig,
    ctx: &'a mut C,
    /// 8-channel 20 µL
    p20: &'a mut M,
    /// Single-channel 300 µL
    p300: &'a mut S,
    block: &'a mut T,
    tracker: &'a mut TipTracker,
    summary: RunSummary,
}

impl<'a, C, M, S, T> StationC<'a, C, M, S, T>
where
    C: ProtocolContext + ?Sized,
    M: Pipette + ?Sized,
    S: Pipette + ?Sized,
    T: TemperatureModule + ?Sized,
{
    /// Bind the sequence to a host, rejecting an invalid configuration
    pub fn new(
        config: &'a StationCConfig,
        ctx: &'a mut C,
        p20: &'a mut M,
        p300: &'a mut S,
        block: &'a mut T,
        tracker: &'a mut TipTracker,
    ) -> Result<Self, StationError> {
        config.validate()?;

        Ok(Self {
            config,
            ctx,
            p20,
            p300,
            block,
            tracker,
            summary: RunSummary {
                columns: config.columns(),
                ..Default::default()
            },
        })
    }

    /// Run the whole setup
    pub fn run(mut self) -> Result<RunSummary, StationError> {
        let mastermix_columns = self.config.mastermix_columns();
        info!(
            "Station C: {} samples, {} sample columns, {} mastermix columns",
            self.config.num_samples, self.summary.columns, mastermix_columns
        );

        self.block.set_temperature(BLOCK_TEMPERATURE_C);

        if self.config.prepare_mastermix {
            self.prepare_mastermix(mastermix_columns)?;
        }

        if self.config.add_controls {
            self.add_strip_controls();
        }

        // Plate mastermix with one tip
        self.pick_up_p20();
        let strip_mastermix = self.strip(Well::top_of_column(STRIP_MASTERMIX_COLUMN));
        for column in 0..mastermix_columns {
            let destination = self.plate(column);
            move_liquid(
                self.p20,
                &mut self.summary,
                PLATE_MASTERMIX,
                strip_mastermix,
                destination,
            )?;
            self.p20.blow_out(None);
        }
        self.p20.drop_tip(None);

        self.ctx.comment("Adding samples to PCR plate...");
        for column in 0..self.summary.columns {
            let source = Location::new(self.config.layout.source_plate, Well::top_of_column(column));
            self.add_to_plate(source, column)?;
        }

        if self.config.add_controls {
            self.ctx.comment("Adding controls to PCR plate...");
            let controls = self.strip(Well::top_of_column(STRIP_CONTROL_COLUMN));
            self.add_to_plate(controls, mastermix_columns - 1)?;
        }

        self.ctx.comment("Protocol complete!");
        self.summary.rack_replacements = self.tracker.replacements();
        info!(
            "Station C complete: {} transfers, {} tips, {} rack replacements",
            self.summary.transfers, self.summary.pick_ups, self.summary.rack_replacements
        );
        Ok(self.summary)
    }

    fn tube(&self, well: Well) -> Location {
        Location::new(self.config.layout.tube_block, well)
    }

    fn strip(&self, well: Well) -> Location {
        Location::new(self.config.layout.pcr_strips, well)
    }

    fn plate(&self, column: u8) -> Location {
        Location::new(self.config.layout.pcr_plate, Well::top_of_column(column))
    }

    fn pick_up_p20(&mut self) {
        self.tracker.pick_up(self.ctx, self.p20, TipChannel::P20);
        self.summary.pick_ups += 1;
    }

    fn pick_up_p300(&mut self) {
        self.tracker.pick_up(self.ctx, self.p300, TipChannel::P300);
        self.summary.pick_ups += 1;
    }

    /// Combine the reagents and split the mix into strip column 1
    fn prepare_mastermix(&mut self, mastermix_columns: u8) -> Result<(), StationError> {
        let volumes = mastermix_volumes(mastermix_columns);
        debug!(
            "Mastermix for {} columns: water {}, primers {}, mastermix {}, enzyme {}",
            mastermix_columns, volumes.water, volumes.primers, volumes.mastermix, volumes.enzyme
        );

        self.ctx.comment("Preparing mastermix...");
        let reaction_mix = self.tube(REACTION_MIX_TUBE);
        let components = [
            (WATER_TUBE, volumes.water),
            (PRIMERS_TUBE, volumes.primers),
            (MASTERMIX_TUBE, volumes.mastermix),
            (ENZYME_TUBE, volumes.enzyme),
        ];

        let mut accumulated = Volume::ZERO;
        for (tube, volume) in components {
            let source = self.tube(tube);
            self.pick_up_p300();
            move_liquid(self.p300, &mut self.summary, volume, source, reaction_mix)?;
            accumulated += volume;

            // Water goes in first; nothing to mix yet
            if tube != WATER_TUBE {
                self.p300.mix(10, mix_volume(accumulated), reaction_mix);
            }
            self.p300.blow_out(None);
            self.p300.drop_tip(None);
        }

        self.ctx.comment("Distributing mastermix...");
        self.pick_up_p300();
        let share = volumes.per_strip_well();
        for row in 0..SAMPLES_PER_COLUMN {
            let destination = self.strip(Well::new(row, STRIP_MASTERMIX_COLUMN));
            move_liquid(self.p300, &mut self.summary, share, reaction_mix, destination)?;
            self.p300.blow_out(None);
        }
        self.p300.drop_tip(None);

        Ok(())
    }

    /// Water, positive and negative controls into strip wells F12-H12
    fn add_strip_controls(&mut self) {
        let controls = [
            (WATER_TUBE, 5),
            (POSITIVE_CONTROL_TUBE, 6),
            (NEGATIVE_CONTROL_TUBE, 7),
        ];

        for (tube, row) in controls {
            let source = self.tube(tube);
            let destination = self.strip(Well::new(row, STRIP_CONTROL_COLUMN));

            self.pick_up_p300();
            self.p300.aspirate(CONTROL_VOLUME, source);
            self.p300.dispense(CONTROL_VOLUME, destination);
            self.p300.blow_out(None);
            self.p300.drop_tip(None);
        }
    }

    /// Add one column of template to a mastermix column and mix
    fn add_to_plate(&mut self, source: Location, column: u8) -> Result<(), StationError> {
        let destination = self.plate(column);

        self.pick_up_p20();
        move_liquid(
            self.p20,
            &mut self.summary,
            self.config.sample_volume(),
            source,
            destination,
        )?;
        self.p20.mix(5, PLATE_MIX_VOLUME, destination);
        self.p20.blow_out(None);
        self.p20.drop_tip(None);

        Ok(())
    }
}

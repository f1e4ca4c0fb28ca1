//! Station B: magnetic-bead nucleic-acid cleanup
//!
//! Lysis and bead binding on the magnetic module, three washes, an air dry,
//! then elution into the chilled plate on the temperature block. One
//! 8-channel 300 µL pipette does all liquid handling.
//!
//! Tips come from two places. A rack of single-use tips supplies one tip per
//! reagent addition (A1 lysis, A2 beads, A3-A5 washes). Four further tip sets
//! of one column per sample column are taken in order from the tip-set racks;
//! sets 1 and 2 are returned to their rack between uses.

use core::fmt::Write;

use aliquot_hal::{
    DeckSlot, FlowRates, Location, MagneticModule, Pipette, ProtocolContext, TemperatureModule,
    Volume, Well,
};
use heapless::String;
use log::{debug, info};

use super::mixing::{cross_mix, side_mix, AIR_BUFFER};
use super::{RunSummary, StationError};
use crate::config::StationBConfig;
use crate::transfer::{transfer, TransferRequest};

/// Temperature block set point
const BLOCK_TEMPERATURE_C: i16 = 4;

/// Pipette flow rates for the run (µL/s)
const FLOW_RATES: FlowRates = FlowRates {
    aspirate: 50,
    dispense: 150,
    blow_out: 300,
};

/// Slow aspirate while pulling supernatant off a pellet
const REMOVAL_ASPIRATE_RATE: u16 = 20;

/// Slower still when taking the eluate
const ELUTION_ASPIRATE_RATE: u16 = 10;

/// Volume pulled back from the destination after each full stroke
const CARRY: Volume = Volume::from_ul(10);

/// Stroke size while removing supernatant
const REMOVAL_CAPACITY: Volume = Volume::from_ul(180);

/// Extra volume taken with the first supernatant (bead overage)
const REMOVAL_EXTRA: Volume = Volume::from_ul(40);

/// Supernatant removed after each wash
const WASH_REMOVAL: Volume = Volume::from_ul(450);

/// Pellet side offset (1 mm), alternating per column
const SIDE_OFFSET_X10: i16 = 10;

/// Tips per column of a rack
const TIPS_PER_RACK: u8 = 12;

/// Dispense cycles while resuspending beads in water
const ELUTION_CYCLES: u8 = 15;

/// Held back from each elution mixing stroke
const ELUTION_HOLDBACK: Volume = Volume::from_ul(10);

/// Lysis mastermix per column
const LYSIS_VOLUME: Volume = Volume::from_ul(240);

/// Isopropanol and beads per column
const BEADS_VOLUME: Volume = Volume::from_ul(290);

/// Reservoir wells holding one reagent
///
/// Consecutive sample columns draw from the same well until it has served
/// `columns_per_well` columns.
#[derive(Debug, Clone, Copy)]
struct ReagentWells {
    slot: DeckSlot,
    first_column: u8,
    columns_per_well: u8,
}

impl ReagentWells {
    fn for_column(&self, column: u8) -> Location {
        let well = Well::top_of_column(self.first_column + column / self.columns_per_well);
        Location::new(self.slot, well)
    }
}

/// How a reagent is added to every sample column
#[derive(Debug, Clone, Copy)]
struct Addition {
    volume: Volume,
    capacity: Volume,
    /// Mix repetitions and volume in the reservoir before each column
    premix: Option<(u8, Volume)>,
    /// Dispense height below the well top (mm × 10)
    dispense_z_x10: i16,
    /// Blow-out height below the well top (mm × 10)
    blow_out_z_x10: i16,
}

const LYSIS: Addition = Addition {
    volume: LYSIS_VOLUME,
    capacity: Volume::from_ul(120),
    premix: Some((3, Volume::from_ul(200))),
    dispense_z_x10: -50,
    blow_out_z_x10: -30,
};

const BEADS: Addition = Addition {
    volume: BEADS_VOLUME,
    capacity: Volume::from_ul(145),
    premix: Some((3, Volume::from_ul(200))),
    dispense_z_x10: -50,
    blow_out_z_x10: -30,
};

const WASH: Addition = Addition {
    volume: Volume::from_ul(350),
    capacity: Volume::from_ul(175),
    premix: None,
    dispense_z_x10: -40,
    blow_out_z_x10: -20,
};

/// One wash cycle
struct Wash {
    label: &'static str,
    reagent: ReagentWells,
    mix_repetitions: u8,
    single_tip: Well,
    trash_tips: bool,
}

/// Side-mixing volume during washes
const WASH_MIX_VOLUME: Volume = Volume::from_ul(180);

/// Cross-mixing volume after bead binding
const BINDING_MIX_VOLUME: Volume = Volume::from_ul(160);

/// Station B sequence bound to its host
pub struct StationB<'a, C: ?Sized, P: ?Sized, M: ?Sized, T: ?Sized> {
    config: &'a StationBConfig,
    ctx: &'a mut C,
    pipette: &'a mut P,
    magnet: &'a mut M,
    block: &'a mut T,
    summary: RunSummary,
}

impl<'a, C, P, M, T> StationB<'a, C, P, M, T>
where
    C: ProtocolContext + ?Sized,
    P: Pipette + ?Sized,
    M: MagneticModule + ?Sized,
    T: TemperatureModule + ?Sized,
{
    /// Bind the sequence to a host, rejecting an invalid configuration
    pub fn new(
        config: &'a StationBConfig,
        ctx: &'a mut C,
        pipette: &'a mut P,
        magnet: &'a mut M,
        block: &'a mut T,
    ) -> Result<Self, StationError> {
        config.validate()?;

        Ok(Self {
            config,
            ctx,
            pipette,
            magnet,
            block,
            summary: RunSummary {
                columns: config.columns(),
                ..Default::default()
            },
        })
    }

    /// Run the whole cleanup
    pub fn run(mut self) -> Result<RunSummary, StationError> {
        info!(
            "Station B: {} samples in {} columns, elution {}",
            self.config.num_samples,
            self.summary.columns,
            self.config.elution_volume()
        );

        self.magnet.disengage();
        self.block.set_temperature(BLOCK_TEMPERATURE_C);
        self.pipette.set_flow_rates(FLOW_RATES);

        let reservoir_1 = self.config.layout.reservoir_1;
        let reservoir_2 = self.config.layout.reservoir_2;

        self.ctx.comment("Adding lysis mastermix mixture to samples:");
        let lysis = ReagentWells {
            slot: reservoir_1,
            first_column: 0,
            columns_per_well: 6,
        };
        self.add_reagent(lysis, Well::new(0, 0), LYSIS)?;

        self.ctx.comment("Adding iso + beads to samples:");
        let beads = ReagentWells {
            slot: reservoir_1,
            first_column: 3,
            columns_per_well: 4,
        };
        self.add_reagent(beads, Well::new(0, 1), BEADS)?;

        self.mix_binding();

        self.wait(5, "Incubating for 5 minutes");
        self.engage();
        self.wait(3, "Incubating on magdeck for 3 minutes");

        self.ctx.comment("Removing supernatant:");
        let removal = self.config.starting_volume() + LYSIS_VOLUME + BEADS_VOLUME + REMOVAL_EXTRA;
        for column in 0..self.summary.columns {
            let tip = self.tip(0, column);
            self.pick_up(tip);
            self.remove_supernatant(column, removal)?;
            self.pipette.drop_tip(None);
        }
        self.magnet.disengage();

        let washes = [
            Wash {
                label: "1 Wash Buffer",
                reagent: ReagentWells {
                    slot: reservoir_1,
                    first_column: 7,
                    columns_per_well: 4,
                },
                mix_repetitions: 20,
                single_tip: Well::new(0, 2),
                trash_tips: false,
            },
            Wash {
                label: "2 Ethanol Wash 1",
                reagent: ReagentWells {
                    slot: reservoir_2,
                    first_column: 0,
                    columns_per_well: 4,
                },
                mix_repetitions: 15,
                single_tip: Well::new(0, 3),
                trash_tips: false,
            },
            Wash {
                label: "3 Ethanol Wash 2",
                reagent: ReagentWells {
                    slot: reservoir_2,
                    first_column: 3,
                    columns_per_well: 4,
                },
                mix_repetitions: 15,
                single_tip: Well::new(0, 4),
                trash_tips: true,
            },
        ];
        for wash in &washes {
            self.wash(wash)?;
        }

        self.wait(15, "Allowing beads to air dry for 15 minutes.");

        self.elute();

        self.wait(10, "Incubating at room temp for 10 minutes.");
        self.engage();
        self.wait(2, "Incubating on MagDeck for 2 minutes.");

        self.transfer_eluate();
        self.magnet.disengage();

        self.ctx.comment("Congratulations! The protocol is complete");
        info!(
            "Station B complete: {} transfers, {} tips, {} min waiting",
            self.summary.transfers, self.summary.pick_ups, self.summary.wait_minutes
        );
        Ok(self.summary)
    }

    fn sample(&self, column: u8) -> Location {
        Location::new(self.config.layout.magnet, Well::top_of_column(column))
    }

    fn side(column: u8) -> i16 {
        if column % 2 == 0 {
            SIDE_OFFSET_X10
        } else {
            -SIDE_OFFSET_X10
        }
    }

    /// Tip for a sample column from one of the four tip sets
    fn tip(&self, set: u8, column: u8) -> Location {
        let index = set * self.summary.columns + column;
        // Rack count checked by validate()
        let rack = self.config.layout.tip_racks[usize::from(index / TIPS_PER_RACK)];
        Location::new(rack, Well::top_of_column(index % TIPS_PER_RACK))
    }

    fn single_tip(&self, well: Well) -> Location {
        Location::new(self.config.layout.single_tips, well)
    }

    fn pick_up(&mut self, tip: Location) {
        self.pipette.pick_up_tip(Some(tip));
        self.summary.pick_ups += 1;
    }

    fn wait(&mut self, minutes: u32, message: &str) {
        self.ctx.comment(message);
        self.ctx.delay_minutes(u64::from(minutes));
        self.summary.wait_minutes += minutes;
    }

    fn engage(&mut self) {
        self.magnet.engage(self.config.magnet_height_x10);
    }

    /// Add a reagent to every column with one single-use tip
    fn add_reagent(
        &mut self,
        reagent: ReagentWells,
        tip: Well,
        addition: Addition,
    ) -> Result<(), StationError> {
        self.pick_up(self.single_tip(tip));

        for column in 0..self.summary.columns {
            let source = reagent.for_column(column);
            let well = self.sample(column);

            if let Some((repetitions, volume)) = addition.premix {
                self.pipette.mix(repetitions, volume, source);
            }

            let request = TransferRequest::new(
                addition.volume,
                addition.capacity,
                source,
                well.top(addition.dispense_z_x10),
            )?
            .with_carry(CARRY)?;
            let result = transfer(self.pipette, &request);
            self.summary.record_transfer(&result);

            self.pipette.blow_out(Some(well.top(addition.blow_out_z_x10)));
        }

        self.pipette.drop_tip(None);
        Ok(())
    }

    /// Resuspend beads after binding with tip set 1
    fn mix_binding(&mut self) {
        self.ctx.comment("Mixing samples:");

        for column in 0..self.summary.columns {
            let tip = self.tip(0, column);
            let well = self.sample(column);

            self.pick_up(tip);
            cross_mix(self.pipette, 5, well, BINDING_MIX_VOLUME);
            self.pipette.blow_out(None);
            cross_mix(self.pipette, 5, well, BINDING_MIX_VOLUME);
            self.pipette.aspirate(AIR_BUFFER, well.top(-50));
            self.pipette.drop_tip(Some(tip));
        }
    }

    /// Pull supernatant off the pellet into the waste
    ///
    /// Draws from the side of the well opposite the pellet.
    fn remove_supernatant(&mut self, column: u8, volume: Volume) -> Result<(), StationError> {
        let source = self.sample(column).shifted(-Self::side(column), 0, 5);
        let waste = Location::new(self.config.layout.waste, Well::new(0, 0)).top(0);

        self.pipette.set_aspirate_rate(REMOVAL_ASPIRATE_RATE);
        let request =
            TransferRequest::new(volume, REMOVAL_CAPACITY, source, waste)?.with_carry(CARRY)?;
        let result = transfer(self.pipette, &request);
        self.summary.record_transfer(&result);
        self.pipette.set_aspirate_rate(FLOW_RATES.aspirate);

        debug!(
            "Removed {} from column {} in {} strokes",
            result.delivered(),
            column + 1,
            result.full_strokes + 1
        );
        Ok(())
    }

    fn wash(&mut self, wash: &Wash) -> Result<(), StationError> {
        info!("Wash step {}", wash.label);
        self.comment_wash("Wash Step", wash, " - Adding reagent to samples:");
        self.add_reagent(wash.reagent, wash.single_tip, WASH)?;

        for column in 0..self.summary.columns {
            let tip = self.tip(1, column);
            let well = self.sample(column);
            self.pick_up(tip);
            side_mix(
                self.pipette,
                wash.mix_repetitions,
                well,
                WASH_MIX_VOLUME,
                Self::side(column),
            );
            self.pipette.blow_out(None);
            self.pipette.drop_tip(Some(tip));
        }

        self.engage();
        self.wait(3, "Incubating on MagDeck for 3 minutes.");

        self.comment_wash("Removing supernatant from Wash", wash, ":");
        for column in 0..self.summary.columns {
            let tip = self.tip(1, column);
            self.pick_up(tip);
            self.remove_supernatant(column, WASH_REMOVAL)?;
            if wash.trash_tips {
                self.pipette.drop_tip(None);
            } else {
                self.pipette.drop_tip(Some(tip));
            }
        }
        self.magnet.disengage();

        Ok(())
    }

    fn comment_wash(&mut self, prefix: &str, wash: &Wash, suffix: &str) {
        let mut message: String<64> = String::new();
        let _ = write!(message, "{} {}{}", prefix, wash.label, suffix);
        self.ctx.comment(&message);
    }

    /// Add water and wash it over the pellet side with tip set 3
    fn elute(&mut self) {
        self.ctx.comment("Adding NF-water to wells for elution:");

        let water = Location::new(self.config.layout.reservoir_2, Well::top_of_column(11));
        let elution = self.config.elution_volume();
        let total = elution + AIR_BUFFER;
        let cycle = elution - ELUTION_HOLDBACK;

        for column in 0..self.summary.columns {
            let tip = self.tip(2, column);
            let well = self.sample(column);
            let side = Self::side(column);

            self.pick_up(tip);
            self.pipette.aspirate(AIR_BUFFER, water.top(0));
            self.pipette.aspirate(elution, water);
            for _ in 0..ELUTION_CYCLES {
                self.pipette.dispense(cycle, well.shifted(side, 0, 20));
                self.pipette.aspirate(cycle, well.shifted(side, 0, 5));
            }
            self.pipette.dispense(total, well);
            self.pipette.blow_out(None);
            self.pipette.drop_tip(None);
        }
    }

    /// Move the eluate to the chilled plate with tip set 4
    fn transfer_eluate(&mut self) {
        self.ctx.comment("Transferring elution to final plate:");
        self.pipette.set_aspirate_rate(ELUTION_ASPIRATE_RATE);

        let elution = self.config.elution_volume();
        for column in 0..self.summary.columns {
            let tip = self.tip(3, column);
            let source = self.sample(column).shifted(-Self::side(column), 0, 6);
            let destination = Location::new(self.config.layout.temp_block, Well::top_of_column(column));

            self.pick_up(tip);
            self.pipette.aspirate(elution, source);
            self.pipette.dispense(elution, destination);
            self.pipette.drop_tip(None);
        }
    }
}

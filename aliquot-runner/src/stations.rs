//! Station wiring
//!
//! Builds the logged host for a station, runs the sequence and reports.

use aliquot_core::config::{StationBConfig, StationCConfig};
use aliquot_core::station::{RunSummary, StationB, StationC};
use aliquot_core::tips::{RackCapacities, TipChannel, TipTracker};
use aliquot_hal::Volume;
use aliquot_hal_sim::{FileTipStorage, LoggedBlock, LoggedContext, LoggedMagnet, LoggedPipette};
use anyhow::{anyhow, Result};
use log::{info, warn};

use crate::config::RunSection;

/// Filter tips limit the 300 µL single-channel pipette
const P300_FILTER_TIP_VOLUME: Volume = Volume::from_ul(200);

/// Run Station B on the logged host
pub fn run_station_b(config: &StationBConfig, run: &RunSection) -> Result<RunSummary> {
    let mut ctx = LoggedContext::new(run.simulate, run.interactive);
    let mut m300 = LoggedPipette::multi(
        "P300 multi",
        Volume::from_ul(300),
        config.layout.tip_racks.len() as u32,
    );
    let mut magnet = LoggedMagnet::new();
    let mut block = LoggedBlock::new();

    let summary = StationB::new(config, &mut ctx, &mut m300, &mut magnet, &mut block)
        .and_then(|station| station.run())
        .map_err(|e| anyhow!("Station B stopped: {:?}", e))?;

    log_pipette(&m300);
    log_context(&ctx);
    info!("Magnet raised {} times", magnet.engagements());
    if let Some(height_x10) = magnet.height_x10() {
        warn!("Magnet left engaged at {}.{} mm", height_x10 / 10, height_x10 % 10);
    }
    log_block(&block);
    Ok(summary)
}

/// Run Station C on the logged host
///
/// Tip counts come from the record on live runs with tracking enabled.
/// Counts at the end are reported but not saved.
pub fn run_station_c(config: &StationCConfig, run: &RunSection) -> Result<RunSummary> {
    let mode = run.mode();
    let p20_racks = config.layout.p20_racks.len() as u32;
    let p300_racks = config.layout.p300_racks.len() as u32;

    let mut storage = FileTipStorage::new(&run.tip_record);
    let mut tracker = TipTracker::load(
        mode,
        RackCapacities::for_racks(p20_racks, p300_racks),
        &mut storage,
    );

    let mut ctx = LoggedContext::new(run.simulate, run.interactive);
    let mut m20 = LoggedPipette::multi("P20 multi", Volume::from_ul(20), p20_racks);
    let mut p300 = LoggedPipette::single("P300 single", P300_FILTER_TIP_VOLUME, p300_racks);
    let mut block = LoggedBlock::new();

    let summary = StationC::new(
        config,
        &mut ctx,
        &mut m20,
        &mut p300,
        &mut block,
        &mut tracker,
    )
    .and_then(|station| station.run())
    .map_err(|e| anyhow!("Station C stopped: {:?}", e))?;

    log_pipette(&m20);
    log_pipette(&p300);
    log_context(&ctx);
    log_block(&block);

    let counts = tracker.snapshot();
    info!(
        "Tip counts at end of run: P20 {}/{}, P300 {}/{}",
        counts.p20,
        tracker.counter(TipChannel::P20).capacity,
        counts.p300,
        tracker.counter(TipChannel::P300).capacity
    );
    if mode.uses_persisted_counts() {
        warn!(
            "Tip counts are not written back to {}",
            storage.path().display()
        );
    }

    Ok(summary)
}

fn log_context(ctx: &LoggedContext) {
    info!(
        "{} comments, {} operator pauses, {} s of delays",
        ctx.comments(),
        ctx.pauses(),
        ctx.waited().as_secs()
    );
}

fn log_block(block: &LoggedBlock) {
    if let Some(celsius) = block.target() {
        info!("Temperature block holding {} C", celsius);
    }
}

fn log_pipette(pipette: &LoggedPipette) {
    let totals = pipette.totals();
    info!(
        "{}: {} tips ({} returned, {} trashed), aspirated {}, dispensed {}",
        pipette.name(),
        totals.pick_ups,
        totals.returned,
        totals.trashed,
        totals.aspirated,
        totals.dispensed
    );
    if totals.starved > 0 {
        warn!("{}: {} pick-ups found the racks empty", pipette.name(), totals.starved);
    }
}

//! Capacity-bounded transfer helper
//!
//! While more than one stroke remains, each stroke aspirates the full
//! capacity from the source, dispenses it, then pulls `carry` back from the
//! destination to keep the tip from dripping. The final stroke aspirates
//! what is left and dispenses it together with every carry withdrawn so far.

use aliquot_hal::{Location, Pipette, Volume};
use log::{debug, warn};

/// Errors that can occur when building a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferError {
    /// Nothing to move
    ZeroVolume,
    /// Stroke capacity must be positive
    ZeroCapacity,
    /// Volume plus all returned carry does not fit a [`Volume`]
    Overflow,
}

/// A single liquid move between two locations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRequest {
    volume: Volume,
    capacity: Volume,
    carry: Volume,
    source: Location,
    destination: Location,
}

impl TransferRequest {
    /// Create a transfer with no carry volume
    pub fn new(
        volume: Volume,
        capacity: Volume,
        source: Location,
        destination: Location,
    ) -> Result<Self, TransferError> {
        if volume.is_zero() {
            return Err(TransferError::ZeroVolume);
        }
        if capacity.is_zero() {
            return Err(TransferError::ZeroCapacity);
        }

        Ok(Self {
            volume,
            capacity,
            carry: Volume::ZERO,
            source,
            destination,
        })
    }

    /// Set the carry volume withdrawn after each full stroke
    ///
    /// The final dispense returns every carry, so the volume plus the carry
    /// of all full strokes must stay representable.
    pub fn with_carry(self, carry: Volume) -> Result<Self, TransferError> {
        let request = Self { carry, ..self };
        let returned = u64::from(carry.as_centi_ul()) * u64::from(request.full_strokes());
        if u64::from(self.volume.as_centi_ul()) + returned > u64::from(u32::MAX) {
            return Err(TransferError::Overflow);
        }

        Ok(request)
    }

    /// Total volume to deliver
    pub fn volume(&self) -> Volume {
        self.volume
    }

    /// Per-stroke capacity
    pub fn capacity(&self) -> Volume {
        self.capacity
    }

    /// Carry volume per full stroke
    pub fn carry(&self) -> Volume {
        self.carry
    }

    /// Where liquid is drawn from
    pub fn source(&self) -> Location {
        self.source
    }

    /// Where liquid is delivered
    pub fn destination(&self) -> Location {
        self.destination
    }

    /// Number of full-capacity strokes before the final one
    pub fn full_strokes(&self) -> u32 {
        // Strokes run while more than one capacity remains
        (self.volume.as_centi_ul() - 1) / self.capacity.as_centi_ul()
    }

    /// Volume aspirated by the final stroke (never more than the capacity)
    pub fn final_volume(&self) -> Volume {
        self.volume - self.capacity * self.full_strokes()
    }

    /// Volume dispensed by the final stroke, including returned carry
    pub fn final_dispense(&self) -> Volume {
        self.final_volume() + self.carry * self.full_strokes()
    }

    /// Largest volume held in the tip at any point of the transfer
    pub fn peak_tip_volume(&self) -> Volume {
        let strokes = self.full_strokes();
        if strokes == 0 {
            return self.volume;
        }
        let last_full = self.carry * (strokes - 1) + self.capacity;
        last_full.max(self.final_dispense())
    }

    /// Lazily generate the aspirate/dispense steps of this transfer
    pub fn plan(&self) -> TransferPlan {
        TransferPlan {
            request: *self,
            remaining: self.volume,
            strokes: 0,
            phase: PlanPhase::Aspirate,
        }
    }
}

/// One plunger action of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiquidStep {
    /// Draw liquid into the tip
    Aspirate { volume: Volume, location: Location },
    /// Expel liquid from the tip
    Dispense { volume: Volume, location: Location },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlanPhase {
    Aspirate,
    Dispense,
    Carry,
    FinalDispense,
    Done,
}

/// Iterator over the steps of a [`TransferRequest`]
#[derive(Debug, Clone)]
pub struct TransferPlan {
    request: TransferRequest,
    remaining: Volume,
    strokes: u32,
    phase: PlanPhase,
}

impl Iterator for TransferPlan {
    type Item = LiquidStep;

    fn next(&mut self) -> Option<LiquidStep> {
        let req = &self.request;
        match self.phase {
            PlanPhase::Aspirate => {
                if self.remaining > req.capacity {
                    self.phase = PlanPhase::Dispense;
                    Some(LiquidStep::Aspirate {
                        volume: req.capacity,
                        location: req.source,
                    })
                } else {
                    self.phase = PlanPhase::FinalDispense;
                    Some(LiquidStep::Aspirate {
                        volume: self.remaining,
                        location: req.source,
                    })
                }
            }
            PlanPhase::Dispense => {
                self.phase = PlanPhase::Carry;
                Some(LiquidStep::Dispense {
                    volume: req.capacity,
                    location: req.destination,
                })
            }
            PlanPhase::Carry => {
                self.remaining -= req.capacity;
                self.strokes += 1;
                self.phase = PlanPhase::Aspirate;
                if req.carry.is_zero() {
                    return self.next();
                }
                Some(LiquidStep::Aspirate {
                    volume: req.carry,
                    location: req.destination,
                })
            }
            PlanPhase::FinalDispense => {
                self.phase = PlanPhase::Done;
                Some(LiquidStep::Dispense {
                    volume: self.remaining + req.carry * self.strokes,
                    location: req.destination,
                })
            }
            PlanPhase::Done => None,
        }
    }
}

/// Totals from an executed transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferSummary {
    /// Full-capacity strokes performed
    pub full_strokes: u32,
    /// Everything aspirated, source and carry
    pub aspirated: Volume,
    /// Everything dispensed at the destination
    pub dispensed: Volume,
    /// Carry pulled back out of the destination
    pub withdrawn: Volume,
    /// Largest volume held in the tip
    pub peak: Volume,
}

impl TransferSummary {
    /// Net volume left at the destination
    pub fn delivered(&self) -> Volume {
        self.dispensed - self.withdrawn
    }
}

/// Execute a transfer on a pipette
///
/// The pipette must already hold a tip. Warns (but still proceeds) if the
/// accumulated carry would overfill the tip.
pub fn transfer<P: Pipette + ?Sized>(pipette: &mut P, request: &TransferRequest) -> TransferSummary {
    let peak = request.peak_tip_volume();
    if peak > pipette.max_volume() {
        warn!(
            "Transfer of {} peaks at {}, above pipette capacity {}",
            request.volume(),
            peak,
            pipette.max_volume()
        );
    }

    let mut summary = TransferSummary {
        full_strokes: request.full_strokes(),
        withdrawn: request.carry() * request.full_strokes(),
        peak,
        ..Default::default()
    };

    for step in request.plan() {
        match step {
            LiquidStep::Aspirate { volume, location } => {
                pipette.aspirate(volume, location);
                summary.aspirated += volume;
            }
            LiquidStep::Dispense { volume, location } => {
                pipette.dispense(volume, location);
                summary.dispensed += volume;
            }
        }
    }

    debug!(
        "Transferred {} in {} full strokes (+{} final)",
        summary.delivered(),
        summary.full_strokes,
        request.final_volume()
    );

    summary
}

//! Aliquot Hardware Abstraction Layer
//!
//! This crate defines the traits through which protocol logic talks to the
//! robot-control runtime. The runtime owns labware loading, motion and the
//! physical pipetting primitives; protocol code only ever sees these traits,
//! so the same sequences run against a real robot or a logged dry-run host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (aliquot-runner, etc.)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  aliquot-core (transfers, tips, steps)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  aliquot-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  aliquot-hal- │       │ vendor robot  │
//! │      sim      │       │    runtime    │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`pipette::Pipette`] - Aspirate, dispense, mix and tip handling
//! - [`context::ProtocolContext`] - Simulation flag, operator messages, delays
//! - [`module::MagneticModule`], [`module::TemperatureModule`] - Deck modules
//! - [`storage::TipCountStorage`] - Persistent tip-count record

#![no_std]
#![deny(unsafe_code)]

pub mod context;
pub mod location;
pub mod module;
pub mod pipette;
pub mod storage;
pub mod units;

// Re-export key traits at crate root for convenience
pub use context::ProtocolContext;
pub use location::{DeckSlot, Location, Well, WellPosition};
pub use module::{MagneticModule, TemperatureModule};
pub use pipette::{FlowRates, Pipette};
pub use storage::{StorageError, TipCountStorage};
pub use units::Volume;

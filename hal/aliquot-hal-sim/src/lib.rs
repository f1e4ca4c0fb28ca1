//! Workstation host for protocol dry runs
//!
//! This crate provides `std` implementations of the HAL traits:
//! - Logged pipettes with a tip inventory and running totals
//! - Logged magnetic and temperature modules
//! - A logged protocol context with optional operator prompts
//! - File-backed tip-count storage
//!
//! Every robot command is logged at `info` under the [`LOG_TARGET`] target,
//! so `RUST_LOG=aliquot::host=info` shows the full command stream.

pub mod context;
pub mod file_storage;
pub mod module;
pub mod pipette;

pub use context::LoggedContext;
pub use file_storage::{FileStorageError, FileTipStorage, DEFAULT_RECORD_PATH};
pub use module::{LoggedBlock, LoggedMagnet};
pub use pipette::{LoggedPipette, PipetteTotals};

/// Log target for robot commands
pub const LOG_TARGET: &str = "aliquot::host";

//! Liquid transfers
//!
//! Splits transfers that exceed a single stroke into capacity-bounded
//! chunks, carrying a small air/liquid buffer between strokes so the tip
//! never drips on its way back to the source.

pub mod chunked;

pub use chunked::{transfer, LiquidStep, TransferError, TransferPlan, TransferRequest, TransferSummary};

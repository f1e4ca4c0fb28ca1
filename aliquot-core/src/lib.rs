//! Host-agnostic protocol logic for the extraction and PCR setup stations
//!
//! This crate contains all protocol logic that does not depend on a
//! specific robot runtime:
//!
//! - Capacity-bounded, drip-free transfers
//! - Tip inventory tracking with rack rollover
//! - Station configuration and deck layout types
//! - Station B (bead cleanup) and Station C (PCR setup) sequences

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod station;
pub mod tips;
pub mod transfer;

#[cfg(test)]
pub(crate) mod test_utils;

//! Configuration types
//!
//! Station parameters and deck layouts. With the `serde` feature these
//! deserialize from the runner's TOML file.

pub mod layout;
pub mod types;

pub use layout::*;
pub use types::*;

//! Persisted tip-count record
//!
//! A single line of two comma-separated counts: tips used on the 20 µL
//! pipette, then tips used on the 300 µL pipette. For example `"12, 3\n"`.

use core::str;

use super::tracker::TipChannel;

/// Longest record line the tracker will read
pub const MAX_RECORD_LEN: usize = 64;

/// Errors from decoding a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    /// Record bytes are not valid UTF-8
    InvalidUtf8,
    /// Fewer than two counts present
    MissingField,
    /// A count is not a non-negative integer
    InvalidNumber,
}

/// Tip counts as stored between runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TipCountRecord {
    /// Tips used on the 20 µL pipette
    pub p20: u32,
    /// Tips used on the 300 µL pipette
    pub p300: u32,
}

impl TipCountRecord {
    /// Create a record
    pub const fn new(p20: u32, p300: u32) -> Self {
        Self { p20, p300 }
    }

    /// Count for a channel
    pub fn count(&self, channel: TipChannel) -> u32 {
        match channel {
            TipChannel::P20 => self.p20,
            TipChannel::P300 => self.p300,
        }
    }

    /// Parse the first line of a record
    ///
    /// Whitespace around counts is ignored, as are any fields past the
    /// second.
    pub fn parse(text: &str) -> Result<Self, RecordError> {
        let line = text.lines().next().ok_or(RecordError::MissingField)?;
        let mut fields = line.split(',').map(str::trim);

        let p20 = parse_count(fields.next())?;
        let p300 = parse_count(fields.next())?;

        Ok(Self { p20, p300 })
    }

    /// Parse raw record bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RecordError> {
        let text = str::from_utf8(bytes).map_err(|_| RecordError::InvalidUtf8)?;
        Self::parse(text)
    }
}

fn parse_count(field: Option<&str>) -> Result<u32, RecordError> {
    match field {
        None | Some("") => Err(RecordError::MissingField),
        Some(value) => value.parse().map_err(|_| RecordError::InvalidNumber),
    }
}

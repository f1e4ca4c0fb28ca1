//! Tip-count storage abstraction
//!
//! Provides a trait for the small persisted record that carries tip usage
//! between runs. Implementations decide where the record lives (a file on
//! the robot's data partition, an in-memory buffer in tests). Protocols
//! only ever read the record.

/// Contents written when no record exists yet
///
/// Two counts separated by comma-space: 20 µL pipette, 300 µL pipette.
pub const INITIAL_RECORD: &[u8] = b"0, 0\n";

/// Errors from tip-count storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Underlying I/O operation failed
    Io,
    /// Record not found
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
}

/// Tip-count storage trait
pub trait TipCountStorage {
    /// Create the record with [`INITIAL_RECORD`] if it does not exist
    fn ensure_initialized(&mut self) -> Result<(), StorageError>;

    /// Read the first line of the record into the provided buffer
    ///
    /// Anything after the first newline is not copied.
    ///
    /// # Returns
    /// The number of bytes read, or an error.
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, StorageError>;
}

/// Copy the first line of `data`, newline included, into `buffer`
///
/// Shared by storage implementations that hold the whole record in memory.
pub fn copy_first_line(data: &[u8], buffer: &mut [u8]) -> Result<usize, StorageError> {
    let line = match data.iter().position(|&b| b == b'\n') {
        Some(end) => &data[..=end],
        None => data,
    };
    if buffer.len() < line.len() {
        return Err(StorageError::BufferTooSmall);
    }

    buffer[..line.len()].copy_from_slice(line);
    Ok(line.len())
}

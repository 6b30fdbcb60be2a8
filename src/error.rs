//! Error types for filedb
//!
//! Provides a unified error type for all store operations.

use thiserror::Error;

use crate::format::Region;

/// Result type alias using FileDbError
pub type Result<T> = std::result::Result<T, FileDbError>;

/// Unified error type for filedb operations
#[derive(Debug, Error)]
pub enum FileDbError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("can't read {region}: {source}")]
    Read {
        region: Region,
        #[source]
        source: std::io::Error,
    },

    #[error("can't write {region}: {source}")]
    Write {
        region: Region,
        #[source]
        source: std::io::Error,
    },

    #[error("can't read {region}: expected {expected} bytes, got {actual}")]
    ShortRead {
        region: Region,
        expected: usize,
        actual: usize,
    },

    #[error("can't write {region}: expected {expected} bytes, wrote {actual}")]
    ShortWrite {
        region: Region,
        expected: usize,
        actual: usize,
    },

    // -------------------------------------------------------------------------
    // Validation Errors
    // -------------------------------------------------------------------------
    #[error("key is too long: {len} bytes (max {max})")]
    KeyTooLong { len: usize, max: usize },

    #[error("value is too long: {len} bytes (max {max})")]
    ValueTooLong { len: usize, max: usize },

    // -------------------------------------------------------------------------
    // Capacity Errors
    // -------------------------------------------------------------------------
    #[error("store is full: all {capacity} slots are allocated")]
    StoreFull { capacity: usize },

    #[error("key table overflow: {keys} keys for {capacity} entries")]
    KeyTableOverflow { keys: usize, capacity: usize },

    // -------------------------------------------------------------------------
    // Format Errors
    // -------------------------------------------------------------------------
    #[error("Corrupted store file: {0}")]
    Corruption(String),
}

impl FileDbError {
    /// True for every failure of the underlying file, including short
    /// transfers detected by the store itself.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            FileDbError::Io(_)
                | FileDbError::Read { .. }
                | FileDbError::Write { .. }
                | FileDbError::ShortRead { .. }
                | FileDbError::ShortWrite { .. }
        )
    }
}

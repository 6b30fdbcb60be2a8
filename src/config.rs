//! Configuration for filedb
//!
//! Layout constants shared by every table codec, plus the per-store
//! configuration with sensible defaults.

use std::path::PathBuf;

// =============================================================================
// Layout Constants
// =============================================================================

/// Width of one value cell in bytes
pub const CELL_SIZE: usize = 32;

/// Maximum key length in bytes
pub const KEY_MAX_SIZE: usize = 16;

/// Number of slots tracked by the allocation bitmap
pub const MAX_COUNT: usize = 64;

/// On-disk width of a slot address (u64, little-endian)
pub const ADDRESS_SIZE: usize = 8;

/// On-disk width of the allocation bitmap (u64, big-endian)
pub const ALLOCATION_SIZE: usize = 8;

/// Width of the length prefix used by [`FieldEncoding::LengthPrefixed`]
pub const LENGTH_PREFIX_SIZE: usize = 1;

// =============================================================================
// Store Configuration
// =============================================================================

/// Main configuration for a store instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path of the single backing file
    pub path: PathBuf,

    /// How keys and values are framed inside their fixed-width fields
    pub encoding: FieldEncoding,

    /// What `set` does once every slot is allocated
    pub slot_exhaustion: SlotExhaustion,

    /// What `get` returns for a key that was never set
    pub missing_key: MissingKeyPolicy,
}

/// Framing of key and value fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldEncoding {
    /// Zero-padded fields, trailing zero bytes stripped on read.
    /// Byte-compatible with the original 3592-byte layout.
    ZeroPadded,

    /// One length byte in front of every field; round-trips zero bytes.
    #[default]
    LengthPrefixed,
}

impl FieldEncoding {
    /// Bytes added in front of each key/value field
    pub const fn prefix_len(self) -> usize {
        match self {
            FieldEncoding::ZeroPadded => 0,
            FieldEncoding::LengthPrefixed => LENGTH_PREFIX_SIZE,
        }
    }
}

/// Behaviour of `set` when the bitmap has no clear bit left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotExhaustion {
    /// Fail with `StoreFull` and leave the store untouched
    #[default]
    Reject,

    /// Keep going with the out-of-range address `MAX_COUNT + 1`.
    /// The bitmap is not changed and every overflowing key shares that cell.
    Overflow,
}

/// Behaviour of `get` for a key absent from the key table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingKeyPolicy {
    /// Return `None`
    #[default]
    NotFound,

    /// Return whatever cell 0 holds, as if the key were bound to address 0
    SlotZero,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./filedb.db"),
            encoding: FieldEncoding::default(),
            slot_exhaustion: SlotExhaustion::default(),
            missing_key: MissingKeyPolicy::default(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Zero-padded layout with the full-store and missing-key behaviour of
    /// files produced by the original tooling.
    pub fn legacy(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            encoding: FieldEncoding::ZeroPadded,
            slot_exhaustion: SlotExhaustion::Overflow,
            missing_key: MissingKeyPolicy::SlotZero,
        }
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the backing file path
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set the field encoding
    pub fn encoding(mut self, encoding: FieldEncoding) -> Self {
        self.config.encoding = encoding;
        self
    }

    /// Set the full-store behaviour
    pub fn slot_exhaustion(mut self, policy: SlotExhaustion) -> Self {
        self.config.slot_exhaustion = policy;
        self
    }

    /// Set the missing-key behaviour
    pub fn missing_key(mut self, policy: MissingKeyPolicy) -> Self {
        self.config.missing_key = policy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

//! Format Module
//!
//! Fixed binary layout of a store file.
//!
//! ## File Format (zero-padded encoding)
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ Allocation Bitmap (8 bytes, offset 0)                    │
//! │   u64 big-endian, bit i set = slot at bit i occupied     │
//! ├──────────────────────────────────────────────────────────┤
//! │ Key Table (64 × 24 = 1536 bytes, offset 8)               │
//! │   [Key: 16, zero-padded][Address: u64 LE (8)]            │
//! │   ... one entry per slot, vacant entries all zero ...    │
//! ├──────────────────────────────────────────────────────────┤
//! │ Data Table (64 × 32 = 2048 bytes, offset 1544)           │
//! │   cell for address a at 1544 + a × 32                    │
//! │   [Value: 32, zero-padded]                               │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! With [`FieldEncoding::LengthPrefixed`] each key and value field gains a
//! one byte length in front of its body (entries of 25 bytes, cells of 33).

pub mod allocation;
pub mod data;
pub mod field;
pub mod keys;

use std::fmt;

use crate::config::{
    FieldEncoding, ADDRESS_SIZE, ALLOCATION_SIZE, CELL_SIZE, KEY_MAX_SIZE, MAX_COUNT,
};

pub use allocation::AllocationBitmap;
pub use keys::KeyIndex;

// =============================================================================
// Slot Address
// =============================================================================

/// Position of one value cell in the data table
///
/// Addresses are derived from bitmap positions as `MAX_COUNT - bit`, so the
/// highest bit maps to address 1 and bit 0 maps to address `MAX_COUNT`.
/// Address 0 is never handed out and marks a vacant key-table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SlotAddress(u64);

impl SlotAddress {
    /// Address stored in vacant key-table entries
    pub const VACANT: SlotAddress = SlotAddress(0);

    /// Out-of-range address used when a full store keeps accepting writes
    pub const OVERFLOW: SlotAddress = SlotAddress(MAX_COUNT as u64 + 1);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Address allocated for a bitmap position
    pub const fn from_bit(bit: u32) -> Self {
        Self(MAX_COUNT as u64 - bit as u64)
    }

    /// Bitmap position backing this address, if it has one
    pub fn bit(self) -> Option<u32> {
        if self.0 == 0 || self.0 > MAX_COUNT as u64 {
            return None;
        }
        Some((MAX_COUNT as u64 - self.0) as u32)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub const fn is_vacant(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for SlotAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Regions
// =============================================================================

/// The three regions of a store file, in persistence order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Allocation,
    Keys,
    Data,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Region::Allocation => "allocation",
            Region::Keys => "keys",
            Region::Data => "data",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Layout
// =============================================================================

/// Byte offsets and sizes of every region for a given field encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    encoding: FieldEncoding,
}

impl Layout {
    pub const fn new(encoding: FieldEncoding) -> Self {
        Self { encoding }
    }

    pub const fn encoding(&self) -> FieldEncoding {
        self.encoding
    }

    /// Size of the key field within a key-table entry
    pub const fn key_field_size(&self) -> usize {
        self.encoding.prefix_len() + KEY_MAX_SIZE
    }

    /// Size of one key-table entry: key field + address
    pub const fn key_entry_size(&self) -> usize {
        self.key_field_size() + ADDRESS_SIZE
    }

    pub const fn key_table_offset(&self) -> u64 {
        ALLOCATION_SIZE as u64
    }

    pub const fn key_table_size(&self) -> usize {
        self.key_entry_size() * MAX_COUNT
    }

    /// Size of one data cell
    pub const fn cell_size(&self) -> usize {
        self.encoding.prefix_len() + CELL_SIZE
    }

    pub const fn data_table_offset(&self) -> u64 {
        self.key_table_offset() + self.key_table_size() as u64
    }

    pub const fn data_table_size(&self) -> usize {
        self.cell_size() * MAX_COUNT
    }

    /// File offset of the cell for `address`
    pub const fn cell_offset(&self, address: SlotAddress) -> u64 {
        self.data_table_offset() + address.get() * self.cell_size() as u64
    }

    /// Size of a file whose key table and data table are both fully written
    pub const fn nominal_file_size(&self) -> u64 {
        self.data_table_offset() + self.data_table_size() as u64
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(FieldEncoding::default())
    }
}

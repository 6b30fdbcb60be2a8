//! Allocation bitmap
//!
//! A single u64 persisted big-endian at offset 0. Bit `i` set means the
//! slot at address `MAX_COUNT - i` is occupied. Allocation scans from the
//! highest bit down, so addresses are handed out in ascending order.

use crate::config::{ALLOCATION_SIZE, MAX_COUNT};

use super::SlotAddress;

/// Occupancy bitmap for all slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AllocationBitmap(u64);

impl AllocationBitmap {
    pub const fn new(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u64 {
        self.0
    }

    pub fn from_bytes(bytes: [u8; ALLOCATION_SIZE]) -> Self {
        Self(u64::from_be_bytes(bytes))
    }

    pub fn to_bytes(&self) -> [u8; ALLOCATION_SIZE] {
        self.0.to_be_bytes()
    }

    pub fn is_set(&self, bit: u32) -> bool {
        (self.0 >> bit) & 1 == 1
    }

    /// Whether the slot backing `address` is marked occupied
    pub fn is_allocated(&self, address: SlotAddress) -> bool {
        address.bit().is_some_and(|bit| self.is_set(bit))
    }

    /// Number of occupied slots
    pub fn allocated_count(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_full(&self) -> bool {
        self.allocated_count() == MAX_COUNT
    }

    /// Highest clear bit position, scanning from `MAX_COUNT - 1` down to 0
    pub fn highest_free(&self) -> Option<u32> {
        (0..MAX_COUNT as u32).rev().find(|&bit| !self.is_set(bit))
    }

    /// Claim the highest clear bit and return the address it maps to.
    ///
    /// Returns `None` without changing anything when every bit is set.
    pub fn allocate(&mut self) -> Option<SlotAddress> {
        let bit = self.highest_free()?;
        self.0 |= 1 << bit;
        Some(SlotAddress::from_bit(bit))
    }

    /// Addresses of all occupied slots, ascending
    pub fn addresses(&self) -> impl Iterator<Item = SlotAddress> + '_ {
        (0..MAX_COUNT as u32)
            .rev()
            .filter(|&bit| self.is_set(bit))
            .map(SlotAddress::from_bit)
    }
}

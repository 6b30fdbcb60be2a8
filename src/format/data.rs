//! Data table codec
//!
//! Each value lives in one fixed-size cell at `address * cell_size` from
//! the data table base. Cells are written and read individually; only the
//! cells of indexed addresses are ever touched.

use std::collections::HashMap;

use bytes::BytesMut;

use crate::config::CELL_SIZE;
use crate::error::{FileDbError, Result};

use super::field::{get_field, put_field};
use super::{Layout, SlotAddress};

/// In-memory value table: slot address → value
pub type DataTable = HashMap<SlotAddress, Vec<u8>>;

/// Check a value against the cell width
pub fn validate_value(value: &[u8]) -> Result<()> {
    if value.len() > CELL_SIZE {
        return Err(FileDbError::ValueTooLong {
            len: value.len(),
            max: CELL_SIZE,
        });
    }
    Ok(())
}

/// Encode one value into a full cell
pub fn encode_cell(value: &[u8], layout: &Layout) -> Result<BytesMut> {
    validate_value(value)?;

    let mut buf = BytesMut::with_capacity(layout.cell_size());
    put_field(&mut buf, value, CELL_SIZE, layout.encoding());
    Ok(buf)
}

/// Decode one full cell
pub fn decode_cell(mut cell: &[u8], layout: &Layout) -> Result<Vec<u8>> {
    if cell.len() != layout.cell_size() {
        return Err(FileDbError::Corruption(format!(
            "data cell is {} bytes, expected {}",
            cell.len(),
            layout.cell_size()
        )));
    }
    get_field(&mut cell, CELL_SIZE, layout.encoding())
}

/// Encode every cell of `table`, ordered by address.
///
/// All values are validated before anything is returned, so a rejected
/// value means no cell of the table gets written.
pub fn encode_table(table: &DataTable, layout: &Layout) -> Result<Vec<(SlotAddress, BytesMut)>> {
    let mut cells = table
        .iter()
        .map(|(address, value)| -> Result<(SlotAddress, BytesMut)> {
            Ok((*address, encode_cell(value, layout)?))
        })
        .collect::<Result<Vec<_>>>()?;
    cells.sort_by_key(|(address, _)| *address);
    Ok(cells)
}

//! Key table codec
//!
//! The key table is always written at full width: `MAX_COUNT` entries of
//! `[key field][address: u64 LE]`. Bound keys come first, ordered by
//! address; the remaining entries are all zero. An entry whose address is 0
//! is vacant and is skipped on decode.

use std::collections::HashMap;

use bytes::{Buf, BufMut, BytesMut};

use crate::config::{KEY_MAX_SIZE, MAX_COUNT};
use crate::error::{FileDbError, Result};

use super::field::{get_field, put_field};
use super::{Layout, SlotAddress};

/// In-memory key index: key → slot address
pub type KeyIndex = HashMap<String, SlotAddress>;

/// Check a key against the key field width
pub fn validate_key(key: &str) -> Result<()> {
    if key.len() > KEY_MAX_SIZE {
        return Err(FileDbError::KeyTooLong {
            len: key.len(),
            max: KEY_MAX_SIZE,
        });
    }
    Ok(())
}

/// Encode the whole key table.
///
/// Every key is validated before the buffer is returned, so a failure
/// leaves nothing to write.
pub fn encode(index: &KeyIndex, layout: &Layout) -> Result<BytesMut> {
    if index.len() > MAX_COUNT {
        return Err(FileDbError::KeyTableOverflow {
            keys: index.len(),
            capacity: MAX_COUNT,
        });
    }

    let mut entries: Vec<(&String, &SlotAddress)> = index.iter().collect();
    entries.sort_by(|a, b| (a.1, a.0).cmp(&(b.1, b.0)));

    let mut buf = BytesMut::with_capacity(layout.key_table_size());
    for (key, address) in entries {
        validate_key(key)?;
        put_field(&mut buf, key.as_bytes(), KEY_MAX_SIZE, layout.encoding());
        buf.put_u64_le(address.get());
    }
    buf.put_bytes(0, layout.key_table_size() - buf.len());

    Ok(buf)
}

/// Decode a full key table into a fresh index
pub fn decode(mut buf: &[u8], layout: &Layout) -> Result<KeyIndex> {
    if buf.len() != layout.key_table_size() {
        return Err(FileDbError::Corruption(format!(
            "key table is {} bytes, expected {}",
            buf.len(),
            layout.key_table_size()
        )));
    }

    let mut index = KeyIndex::with_capacity(MAX_COUNT);
    for _ in 0..MAX_COUNT {
        let key = get_field(&mut buf, KEY_MAX_SIZE, layout.encoding())?;
        let address = SlotAddress::new(buf.get_u64_le());

        if address.is_vacant() {
            continue;
        }

        let key = String::from_utf8(key).map_err(|e| {
            FileDbError::Corruption(format!("key bound to {} is not UTF-8: {}", address, e))
        })?;
        index.insert(key, address);
    }

    Ok(index)
}

//! Fixed-width field codec
//!
//! Keys and values are stored in fixed-width fields. Two framings exist:
//!
//! - `ZeroPadded`: the body is padded with zero bytes on write and the
//!   trailing run of zero bytes is stripped on read. Trailing zeros in the
//!   caller's bytes are therefore lost, and "empty" reads back the same as
//!   "all zeros".
//! - `LengthPrefixed`: a one byte length precedes the body, so every byte
//!   sequence that fits round-trips exactly.

use bytes::{Buf, BufMut};

use crate::config::FieldEncoding;
use crate::error::{FileDbError, Result};

/// Append `body` to `buf` as a field of `width` bytes (plus prefix).
///
/// The caller checks `body.len() <= width` first and reports the
/// domain-specific error (`KeyTooLong` / `ValueTooLong`).
pub fn put_field<B: BufMut>(buf: &mut B, body: &[u8], width: usize, encoding: FieldEncoding) {
    debug_assert!(body.len() <= width);
    if encoding == FieldEncoding::LengthPrefixed {
        buf.put_u8(body.len() as u8);
    }
    buf.put_slice(body);
    buf.put_bytes(0, width - body.len());
}

/// Consume one field of `width` bytes (plus prefix) from `buf`.
pub fn get_field<B: Buf>(buf: &mut B, width: usize, encoding: FieldEncoding) -> Result<Vec<u8>> {
    match encoding {
        FieldEncoding::ZeroPadded => {
            let mut body = vec![0u8; width];
            buf.copy_to_slice(&mut body);
            body.truncate(trimmed_len(&body));
            Ok(body)
        }
        FieldEncoding::LengthPrefixed => {
            let len = buf.get_u8() as usize;
            if len > width {
                return Err(FileDbError::Corruption(format!(
                    "field length prefix {} exceeds field width {}",
                    len, width
                )));
            }
            let mut body = vec![0u8; width];
            buf.copy_to_slice(&mut body);
            body.truncate(len);
            Ok(body)
        }
    }
}

/// Length of `bytes` without its trailing run of zero bytes
fn trimmed_len(bytes: &[u8]) -> usize {
    bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1)
}

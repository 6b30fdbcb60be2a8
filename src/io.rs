//! Positional file I/O
//!
//! Reads and writes at explicit offsets so that concurrent readers holding
//! a shared lock never race on a file cursor. A transfer that stops early
//! is reported as `ShortRead`/`ShortWrite`, separate from OS errors.

use std::fs::File;
use std::io::ErrorKind;

#[cfg(unix)]
use std::os::unix::fs::FileExt;
#[cfg(windows)]
use std::os::windows::fs::FileExt;

use crate::error::{FileDbError, Result};
use crate::format::Region;

/// Fill `buf` from `offset`, failing with `ShortRead` at end of file
pub fn read_exact_at(file: &File, region: Region, buf: &mut [u8], offset: u64) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match read_at(file, &mut buf[filled..], offset + filled as u64) {
            Ok(0) => {
                return Err(FileDbError::ShortRead {
                    region,
                    expected: buf.len(),
                    actual: filled,
                })
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(source) => return Err(FileDbError::Read { region, source }),
        }
    }
    tracing::trace!(%region, offset, len = buf.len(), "read");
    Ok(())
}

/// Write all of `buf` at `offset`, failing with `ShortWrite` if the OS
/// stops accepting bytes
pub fn write_all_at(file: &File, region: Region, buf: &[u8], offset: u64) -> Result<()> {
    let mut written = 0;
    while written < buf.len() {
        match write_at(file, &buf[written..], offset + written as u64) {
            Ok(0) => {
                return Err(FileDbError::ShortWrite {
                    region,
                    expected: buf.len(),
                    actual: written,
                })
            }
            Ok(n) => written += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(source) => return Err(FileDbError::Write { region, source }),
        }
    }
    tracing::trace!(%region, offset, len = buf.len(), "wrote");
    Ok(())
}

#[cfg(unix)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> std::io::Result<usize> {
    file.read_at(buf, offset)
}

#[cfg(windows)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> std::io::Result<usize> {
    file.seek_read(buf, offset)
}

#[cfg(unix)]
fn write_at(file: &File, buf: &[u8], offset: u64) -> std::io::Result<usize> {
    file.write_at(buf, offset)
}

#[cfg(windows)]
fn write_at(file: &File, buf: &[u8], offset: u64) -> std::io::Result<usize> {
    file.seek_write(buf, offset)
}

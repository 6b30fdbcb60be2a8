//! Integration tests for filedb
//!
//! These tests verify:
//! - The four-key write/read scenario across a close and reopen
//! - Persistence of allocation state across sessions
//! - The exact byte layout of zero-padded files
//! - Reading a zero-padded file produced outside this crate

use std::fs;
use std::path::{Path, PathBuf};

use filedb::config::{FieldEncoding, MissingKeyPolicy, SlotExhaustion};
use filedb::{Config, FileDbError, SlotAddress, Store};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_path() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("test");
    (temp_dir, path)
}

fn config_for(path: &Path, encoding: FieldEncoding) -> Config {
    Config::builder().path(path).encoding(encoding).build()
}

const FIXTURE: [(&str, &[u8]); 4] = [
    ("key1", b"data"),
    ("key2", b"datadata"),
    ("key3", b"datadatadata"),
    ("key4", b"datadatadatadata"),
];

fn write_fixture(config: Config) {
    let store = Store::open_with_config(config).unwrap();
    for (key, value) in FIXTURE {
        store.set(key, value).unwrap();
    }
    store.close().unwrap();
}

// =============================================================================
// Scenario Tests
// =============================================================================

#[test]
fn test_four_key_store_survives_reopen() {
    for encoding in [FieldEncoding::ZeroPadded, FieldEncoding::LengthPrefixed] {
        let (_temp, path) = setup_temp_path();
        write_fixture(config_for(&path, encoding));

        let store = Store::open_with_config(config_for(&path, encoding)).unwrap();
        for (key, value) in FIXTURE {
            assert_eq!(store.get(key).unwrap(), Some(value.to_vec()), "{:?}", encoding);
        }
        store.close().unwrap();
    }
}

#[test]
fn test_reopen_restores_mirrors() {
    let (_temp, path) = setup_temp_path();
    write_fixture(config_for(&path, FieldEncoding::LengthPrefixed));

    let store = Store::open(&path).unwrap();

    assert_eq!(store.len(), 4);
    assert_eq!(store.allocation().allocated_count(), 4);
    let index = store.key_index();
    for (i, (key, _)) in FIXTURE.iter().enumerate() {
        assert_eq!(index[*key], SlotAddress::new(i as u64 + 1));
    }
}

#[test]
fn test_allocation_continues_after_reopen() {
    let (_temp, path) = setup_temp_path();
    write_fixture(config_for(&path, FieldEncoding::LengthPrefixed));

    let store = Store::open(&path).unwrap();
    store.set("key5", b"more").unwrap();
    store.set("key1", b"changed").unwrap();
    store.close().unwrap();

    let store = Store::open(&path).unwrap();
    let index = store.key_index();
    assert_eq!(index["key5"], SlotAddress::new(5));
    assert_eq!(index["key1"], SlotAddress::new(6));
    assert_eq!(store.allocation().allocated_count(), 6);
    assert_eq!(store.get("key1").unwrap(), Some(b"changed".to_vec()));
    assert_eq!(store.get("key2").unwrap(), Some(b"datadata".to_vec()));
}

#[test]
fn test_leaked_cell_keeps_old_bytes_on_disk() {
    let (_temp, path) = setup_temp_path();
    let store = Store::open(&path).unwrap();
    store.set("key", b"old").unwrap();
    store.set("key", b"new").unwrap();
    store.close().unwrap();

    let store = Store::open(&path).unwrap();
    let layout = *store.layout();
    let bytes = fs::read(&path).unwrap();

    // Slot 1 is unreachable but still holds the first value
    let offset = layout.cell_offset(SlotAddress::new(1)) as usize;
    assert_eq!(&bytes[offset..offset + 4], &[3, b'o', b'l', b'd']);
    assert_eq!(store.get("key").unwrap(), Some(b"new".to_vec()));
}

// =============================================================================
// File Layout Tests
// =============================================================================

#[test]
fn test_zero_padded_byte_layout() {
    let (_temp, path) = setup_temp_path();
    write_fixture(config_for(&path, FieldEncoding::ZeroPadded));

    let bytes = fs::read(&path).unwrap();

    // Bitmap: top four bits, big-endian
    assert_eq!(&bytes[0..8], &[0xf0, 0, 0, 0, 0, 0, 0, 0]);

    // First key entry at 8: 16-byte key, 8-byte LE address
    assert_eq!(&bytes[8..12], b"key1");
    assert!(bytes[12..24].iter().all(|&b| b == 0));
    assert_eq!(&bytes[24..32], &1u64.to_le_bytes());

    // Fourth entry, then vacant entries up to the data table
    assert_eq!(&bytes[80..84], b"key4");
    assert_eq!(&bytes[96..104], &4u64.to_le_bytes());
    assert!(bytes[104..1544].iter().all(|&b| b == 0));

    // Cell 0 untouched, cell 1 at 1544 + 32
    assert!(bytes[1544..1576].iter().all(|&b| b == 0));
    assert_eq!(&bytes[1576..1580], b"data");
    assert!(bytes[1580..1608].iter().all(|&b| b == 0));
    assert_eq!(&bytes[1672..1688], b"datadatadatadata");

    // Data written up to the end of cell 4
    assert_eq!(bytes.len(), 1544 + 5 * 32);
}

#[test]
fn test_reads_hand_built_zero_padded_file() {
    let (_temp, path) = setup_temp_path();

    let mut bytes = vec![0u8; 3592];
    bytes[0..8].copy_from_slice(&((1u64 << 63) | (1u64 << 62)).to_be_bytes());
    bytes[8..13].copy_from_slice(b"alpha");
    bytes[24..32].copy_from_slice(&1u64.to_le_bytes());
    bytes[32..36].copy_from_slice(b"beta");
    bytes[48..56].copy_from_slice(&2u64.to_le_bytes());
    bytes[1576..1581].copy_from_slice(b"first");
    bytes[1608..1614].copy_from_slice(b"second");
    fs::write(&path, &bytes).unwrap();

    let store = Store::open_with_config(Config::legacy(&path)).unwrap();

    assert_eq!(store.len(), 2);
    assert_eq!(store.get("alpha").unwrap(), Some(b"first".to_vec()));
    assert_eq!(store.get("beta").unwrap(), Some(b"second".to_vec()));

    store.set("gamma", b"third").unwrap();
    assert_eq!(store.key_index()["gamma"], SlotAddress::new(3));
    assert_eq!(fs::read(&path).unwrap().len(), 3592);
}

#[test]
fn test_encoding_mismatch_is_detected() {
    let (_temp, path) = setup_temp_path();
    write_fixture(config_for(&path, FieldEncoding::ZeroPadded));

    // "key1" read as a length-prefixed field claims a 107-byte key
    let err = Store::open_with_config(config_for(&path, FieldEncoding::LengthPrefixed)).unwrap_err();

    assert!(matches!(err, FileDbError::Corruption(_)));
}

// =============================================================================
// Legacy Config Tests
// =============================================================================

#[test]
fn test_legacy_config() {
    let config = Config::legacy("test");

    assert_eq!(config.encoding, FieldEncoding::ZeroPadded);
    assert_eq!(config.slot_exhaustion, SlotExhaustion::Overflow);
    assert_eq!(config.missing_key, MissingKeyPolicy::SlotZero);
}

#[test]
fn test_reopened_store_reports_config_and_addresses() {
    let (_temp, path) = setup_temp_path();
    write_fixture(Config::legacy(&path));

    let store = Store::open_with_config(Config::legacy(&path)).unwrap();

    assert_eq!(store.config(), &Config::legacy(&path));
    assert_eq!(store.path(), path.as_path());

    let addresses: Vec<u64> = store.allocation().addresses().map(|a| a.get()).collect();
    let indexed: Vec<u64> = store.key_index().values().map(|a| a.get()).collect();
    assert_eq!(addresses, vec![1, 2, 3, 4]);
    assert_eq!(indexed, addresses);
}

#[test]
fn test_legacy_missing_key_returns_slot_zero() {
    let (_temp, path) = setup_temp_path();
    write_fixture(Config::legacy(&path));

    let store = Store::open_with_config(Config::legacy(&path)).unwrap();

    assert_eq!(store.get("missing").unwrap(), Some(Vec::new()));
    assert_eq!(store.get("key2").unwrap(), Some(b"datadata".to_vec()));
}

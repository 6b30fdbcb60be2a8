//! Store Module
//!
//! The single-file key-value store.
//!
//! ## Responsibilities
//! - Own the backing file and the three in-memory mirrors
//!   (allocation bitmap, key index, value table)
//! - Allocate slots top-down from the bitmap
//! - Persist allocation → keys → data on every `set`
//! - Answer `get` from a fresh read of the key table and data cell

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::Path;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::{Config, MissingKeyPolicy, SlotExhaustion, ALLOCATION_SIZE, MAX_COUNT};
use crate::error::{FileDbError, Result};
use crate::format::data::{self, DataTable};
use crate::format::keys::{self, KeyIndex};
use crate::format::{AllocationBitmap, Layout, Region, SlotAddress};
use crate::io::{read_exact_at, write_all_at};

/// A key-value store backed by one fixed-layout file
///
/// ## Concurrency Model
///
/// One `RwLock` guards the file handle and all mirrors as a unit:
/// - `get` takes the shared lock; concurrent gets use positional reads
/// - `set` and `sync` take the exclusive lock
///
/// There is no inter-process locking. A file must be opened by at most one
/// `Store` at a time.
#[derive(Debug)]
pub struct Store {
    /// Store configuration
    config: Config,

    /// Region offsets for the configured encoding
    layout: Layout,

    /// File handle + mirrors
    inner: RwLock<Inner>,
}

/// State guarded by the store lock
#[derive(Debug)]
struct Inner {
    file: File,
    allocation: AllocationBitmap,
    keys: KeyIndex,
    data: DataTable,
}

impl Store {
    /// Open or create a store at `path` with the default config
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let config = Config::builder().path(path.as_ref()).build();
        Self::open_with_config(config)
    }

    /// Open or create a store with the given config
    ///
    /// A missing file is created empty and nothing is read: the mirrors
    /// start empty and the file stays zero-length until the first `set`.
    /// An existing file is opened read-write and fully synced.
    pub fn open_with_config(config: Config) -> Result<Self> {
        let layout = Layout::new(config.encoding);

        let created = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&config.path);

        match created {
            Ok(file) => {
                info!(path = %config.path.display(), encoding = ?config.encoding, "created store file");
                Ok(Self::with_file(config, layout, file))
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let file = OpenOptions::new().read(true).write(true).open(&config.path)?;
                let store = Self::with_file(config, layout, file);
                store.sync()?;
                info!(
                    path = %store.config.path.display(),
                    keys = store.len(),
                    allocated = store.allocation().allocated_count(),
                    "opened store file"
                );
                Ok(store)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn with_file(config: Config, layout: Layout, file: File) -> Self {
        Self {
            config,
            layout,
            inner: RwLock::new(Inner {
                file,
                allocation: AllocationBitmap::default(),
                keys: KeyIndex::with_capacity(MAX_COUNT),
                data: DataTable::with_capacity(MAX_COUNT),
            }),
        }
    }

    /// Reload allocation, key table and data cells from disk, in that order
    ///
    /// On failure the mirrors may be left partially updated.
    pub fn sync(&self) -> Result<()> {
        let mut inner = self.inner.write();

        inner.allocation = read_allocation(&inner.file)?;
        inner.keys = read_keys(&inner.file, &self.layout)?;
        inner.data = read_data(&inner.file, &self.layout, &inner.keys)?;

        debug!(keys = inner.keys.len(), allocation = inner.allocation.bits(), "synced");
        Ok(())
    }

    /// Get the value bound to `key`
    ///
    /// Always reads the key table and the bound cell from disk; the session
    /// mirrors are not consulted. A key absent from the table yields `None`,
    /// or the contents of cell 0 under [`MissingKeyPolicy::SlotZero`].
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let inner = self.inner.read();

        let index = read_keys(&inner.file, &self.layout)?;
        let address = match index.get(key) {
            Some(&address) => address,
            None => match self.config.missing_key {
                MissingKeyPolicy::NotFound => {
                    debug!(key, "get: not found");
                    return Ok(None);
                }
                MissingKeyPolicy::SlotZero => SlotAddress::VACANT,
            },
        };

        let value = read_cell(&inner.file, &self.layout, address)?;
        debug!(key, %address, len = value.len(), "get");
        Ok(Some(value))
    }

    /// Bind `key` to `value`
    ///
    /// Steps:
    /// 1. Claim the highest clear bitmap bit (address = `MAX_COUNT - bit`)
    /// 2. Bind key → address and address → value in the mirrors
    /// 3. Write allocation, then the key table, then the data cells
    ///
    /// A repeated key gets a fresh slot; its previous slot stays allocated.
    /// Key and value sizes are checked while encoding their tables, after
    /// the mirrors were updated, so a rejected `set` leaves the oversized
    /// entry in memory and every later `set` fails the same way.
    ///
    /// After `KeyTooLong` the key table on disk is still the previous one,
    /// and [`Store::sync`] drops the oversized key. After `ValueTooLong` the
    /// key is already bound on disk to a cell that was never written, so
    /// `sync` and any later open fail with `ShortRead` on the data region.
    pub fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut inner = self.inner.write();

        let address = match inner.allocation.allocate() {
            Some(address) => address,
            None => match self.config.slot_exhaustion {
                SlotExhaustion::Reject => {
                    return Err(FileDbError::StoreFull {
                        capacity: MAX_COUNT,
                    })
                }
                SlotExhaustion::Overflow => {
                    warn!(key, address = %SlotAddress::OVERFLOW, "all slots allocated, writing past the data table");
                    SlotAddress::OVERFLOW
                }
            },
        };

        if let Some(previous) = inner.keys.insert(key.to_owned(), address) {
            debug!(key, %previous, "rebinding key, previous slot stays allocated");
        }
        inner.data.insert(address, value.to_vec());

        inner.write_allocation()?;
        inner.write_keys(&self.layout)?;
        inner.write_data(&self.layout)?;

        debug!(key, %address, len = value.len(), "set");
        Ok(())
    }

    /// Close the store, flushing the file to the OS
    pub fn close(self) -> Result<()> {
        let inner = self.inner.into_inner();
        inner.file.sync_all()?;
        info!(path = %self.config.path.display(), "closed store file");
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the backing file path
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the region layout
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Snapshot of the session's allocation bitmap
    pub fn allocation(&self) -> AllocationBitmap {
        self.inner.read().allocation
    }

    /// Snapshot of the session's key index, sorted by key
    pub fn key_index(&self) -> BTreeMap<String, SlotAddress> {
        self.inner
            .read()
            .keys
            .iter()
            .map(|(key, address)| (key.clone(), *address))
            .collect()
    }

    /// Number of keys in the session's index
    pub fn len(&self) -> usize {
        self.inner.read().keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Inner {
    fn write_allocation(&self) -> Result<()> {
        write_all_at(&self.file, Region::Allocation, &self.allocation.to_bytes(), 0)
    }

    fn write_keys(&self, layout: &Layout) -> Result<()> {
        let table = keys::encode(&self.keys, layout)?;
        write_all_at(&self.file, Region::Keys, &table, layout.key_table_offset())
    }

    fn write_data(&self, layout: &Layout) -> Result<()> {
        for (address, cell) in data::encode_table(&self.data, layout)? {
            write_all_at(&self.file, Region::Data, &cell, layout.cell_offset(address))?;
        }
        Ok(())
    }
}

// =============================================================================
// Region Readers
// =============================================================================

fn read_allocation(file: &File) -> Result<AllocationBitmap> {
    let mut buf = [0u8; ALLOCATION_SIZE];
    read_exact_at(file, Region::Allocation, &mut buf, 0)?;
    Ok(AllocationBitmap::from_bytes(buf))
}

fn read_keys(file: &File, layout: &Layout) -> Result<KeyIndex> {
    let mut buf = vec![0u8; layout.key_table_size()];
    read_exact_at(file, Region::Keys, &mut buf, layout.key_table_offset())?;
    keys::decode(&buf, layout)
}

fn read_cell(file: &File, layout: &Layout, address: SlotAddress) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; layout.cell_size()];
    read_exact_at(file, Region::Data, &mut buf, layout.cell_offset(address))?;
    data::decode_cell(&buf, layout)
}

/// Read the cell of every indexed address into a fresh value table
fn read_data(file: &File, layout: &Layout, index: &KeyIndex) -> Result<DataTable> {
    let mut table = DataTable::with_capacity(index.len());
    for &address in index.values() {
        if !table.contains_key(&address) {
            table.insert(address, read_cell(file, layout, address)?);
        }
    }
    Ok(table)
}

//! # filedb
//!
//! A minimal single-file key-value store with:
//! - A fixed binary layout (allocation bitmap, key table, data cells)
//! - Top-down slot allocation from a 64-bit bitmap
//! - Fixed-size keys (16 bytes) and values (32 bytes)
//! - Multi-reader/single-writer access within one process
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Store                              │
//! │                 (RwLock: get ∥ get, set alone)              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!     ┌─────────────────┼─────────────────┐
//!     │                 │                 │
//!     ▼                 ▼                 ▼
//! ┌──────────┐   ┌─────────────┐   ┌─────────────┐
//! │Allocation│   │  Key Table  │   │ Data Table  │
//! │  Bitmap  │   │ key → slot  │   │ slot → cell │
//! └────┬─────┘   └──────┬──────┘   └──────┬──────┘
//!      │                │                 │
//!      └────────────────┼─────────────────┘
//!                       ▼
//!              ┌─────────────────┐
//!              │  one store file │
//!              └─────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use filedb::Store;
//!
//! let store = Store::open("test.db")?;
//! store.set("key1", b"data")?;
//! assert_eq!(store.get("key1")?, Some(b"data".to_vec()));
//! store.close()?;
//! # Ok::<(), filedb::FileDbError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod format;
pub mod io;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{Config, FieldEncoding, MissingKeyPolicy, SlotExhaustion};
pub use error::{FileDbError, Result};
pub use format::{AllocationBitmap, Layout, Region, SlotAddress};
pub use store::Store;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of filedb
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

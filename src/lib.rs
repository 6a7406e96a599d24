//! # LineStore
//!
//! An embedded, append-only line store with:
//! - Sequential line numbers assigned at append time
//! - A fixed-width offset index for O(1) lookups
//! - Durable appends (both files synced before returning)
//! - In-place polish (rewrite + atomic rename) and backup
//! - Single-writer/multi-reader concurrency model
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Store                               │
//! │            (RwLock: exclusive writes, shared reads)          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ Record Log  │◀─────────│ Offset Index│
//!   │  {path}     │  offset  │ {path}.idx  │
//!   └─────────────┘          └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use linestore::Store;
//!
//! # fn main() -> linestore::Result<()> {
//! let store = Store::open("linestore.db")?;
//! let line = store.set(b"Hello, Line Store!")?;
//! assert_eq!(store.get(line)?, b"Hello, Line Store!");
//! store.close()?;
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod io;
pub mod record;
pub mod index;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{LineStoreError, Result};
pub use config::{StoreConfig, SyncMode};
pub use store::{BackupReport, Line, PolishReport, Store};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of LineStore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Configuration for LineStore
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Default read-side ceiling on a single record's payload (1 MiB)
pub const DEFAULT_MAX_RECORD_LEN: u32 = 1 << 20;

/// Main configuration for a LineStore instance
#[derive(Debug, Clone)]
pub struct StoreConfig {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Path of the data file. Companion files are derived from it:
    ///   {path}          (records)
    ///   {path}.idx      (offset index)
    ///   {path}.backup   (safety copy taken before polish)
    pub path: PathBuf,

    /// Largest payload accepted by `set` and decoded by reads (in bytes)
    pub max_record_len: u32,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// How each mutating call reaches stable storage
    pub sync_mode: SyncMode,
}

/// Sync strategy applied after every write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// `sync_all`: file contents and metadata
    Full,

    /// `sync_data`: file contents and the metadata needed to read them back
    Data,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("linestore.db"),
            max_record_len: DEFAULT_MAX_RECORD_LEN,
            sync_mode: SyncMode::Full,
        }
    }
}

impl StoreConfig {
    /// Create a new config builder
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }
}

/// Builder for StoreConfig
#[derive(Default)]
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    /// Set the data file path
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set the record payload ceiling (in bytes)
    pub fn max_record_len(mut self, len: u32) -> Self {
        self.config.max_record_len = len;
        self
    }

    /// Set the sync strategy
    pub fn sync_mode(mut self, mode: SyncMode) -> Self {
        self.config.sync_mode = mode;
        self
    }

    pub fn build(self) -> StoreConfig {
        self.config
    }
}

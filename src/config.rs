//! Configuration for opening containers
//!
//! Replaces ad-hoc "was this already created?" switches with an explicit
//! [`OpenMode`] chosen by the caller.

use crate::compression::{ChunkCodec, CompressionLevel, CompressionMethod};
use crate::storage::DatasetDefaults;
use crate::types::CreationType;
use std::path::PathBuf;

/// How a container root is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Start from an empty root, discarding existing content
    Create,
    /// Reopen an existing root, fail if missing
    Reopen,
    /// Reopen if present, otherwise create
    OpenOrCreate,
}

impl From<OpenMode> for CreationType {
    fn from(mode: OpenMode) -> Self {
        match mode {
            OpenMode::Create => CreationType::CREATE_OR_OVERWRITE,
            OpenMode::Reopen => CreationType::OPEN,
            OpenMode::OpenOrCreate => CreationType::OPEN_OR_CREATE,
        }
    }
}

/// Main configuration for a container
#[derive(Debug, Clone)]
pub struct StoreConfig {
    // -------------------------------------------------------------------------
    // Storage
    // -------------------------------------------------------------------------
    /// Root location: a directory path, `file://` URL or `mem://name`
    pub root: PathBuf,

    pub open_mode: OpenMode,

    /// Refuse every mutating operation
    pub read_only: bool,

    // -------------------------------------------------------------------------
    // Datasets
    // -------------------------------------------------------------------------
    pub compression: CompressionMethod,

    pub compression_level: CompressionLevel,

    /// Rows per chunk file for datasets created without explicit chunking
    pub chunk_rows: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./geostore_data"),
            open_mode: OpenMode::OpenOrCreate,
            read_only: false,
            compression: CompressionMethod::None,
            compression_level: CompressionLevel::default(),
            chunk_rows: 1000,
        }
    }
}

impl StoreConfig {
    /// Create a new config builder
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }

    /// Root as the URL handed to the I/O layer
    pub fn root_url(&self) -> String {
        self.root.to_string_lossy().into_owned()
    }

    pub fn dataset_defaults(&self) -> DatasetDefaults {
        DatasetDefaults {
            chunk_rows: self.chunk_rows.max(1),
            codec: ChunkCodec::new(self.compression).with_level(self.compression_level),
        }
    }
}

/// Builder for StoreConfig
#[derive(Default)]
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.root = path.into();
        self
    }

    pub fn open_mode(mut self, mode: OpenMode) -> Self {
        self.config.open_mode = mode;
        self
    }

    /// Shorthand for the re-open-vs-create switch used by test setups
    pub fn reopen(self, reopen: bool) -> Self {
        self.open_mode(if reopen {
            OpenMode::OpenOrCreate
        } else {
            OpenMode::Create
        })
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.config.read_only = read_only;
        self
    }

    pub fn compression(mut self, method: CompressionMethod) -> Self {
        self.config.compression = method;
        self
    }

    pub fn compression_level(mut self, level: CompressionLevel) -> Self {
        self.config.compression_level = level;
        self
    }

    pub fn chunk_rows(mut self, rows: usize) -> Self {
        self.config.chunk_rows = rows;
        self
    }

    pub fn build(self) -> StoreConfig {
        self.config
    }
}

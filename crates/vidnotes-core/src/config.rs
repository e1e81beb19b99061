use std::path::{Path, PathBuf};

use crate::constants::DEFAULT_DATA_DIR_NAME;

/// When store mutations reach durable storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistMode {
    /// Write the snapshot after every mutation.
    #[default]
    Immediate,
    /// Mark the store dirty and write on `flush()` or drop.
    Deferred,
}

#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub data_dir: PathBuf,
    pub persist_mode: PersistMode,
}

impl CoreConfig {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            persist_mode: PersistMode::default(),
        }
    }

    pub fn with_persist_mode(mut self, mode: PersistMode) -> Self {
        self.persist_mode = mode;
        self
    }

    /// Platform data directory (e.g. `~/.local/share/vidnotes`), falling back
    /// to a relative directory when the platform has none.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .map(|dir| dir.join(DEFAULT_DATA_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(format!("{}_data", DEFAULT_DATA_DIR_NAME)))
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::new(Self::default_data_dir())
    }
}

//! Link state store: the persisted record of every link this tool manages.
//!
//! The state file is YAML keyed by link name. All I/O goes through the
//! `FileSystem` port so the store works against the real disk and the
//! in-memory filesystem alike.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::link::LinkState;
use crate::ports::FileSystem;

/// Failure to read or write the state file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The file exists but could not be read.
    #[error("failed to read state file {path}: {message}")]
    Read {
        /// State file path.
        path: PathBuf,
        /// Underlying error.
        message: String,
    },
    /// The file is not a valid state document.
    #[error("failed to parse state file {path}: {message}")]
    Parse {
        /// State file path.
        path: PathBuf,
        /// Parser error.
        message: String,
    },
    /// The file could not be written.
    #[error("failed to write state file {path}: {message}")]
    Write {
        /// State file path.
        path: PathBuf,
        /// Underlying error.
        message: String,
    },
}

/// Contents of the state file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateFile {
    /// Persisted links by name.
    #[serde(default)]
    pub links: BTreeMap<String, LinkState>,
}

/// Reads and writes the state file at one path.
pub struct StateStore<'a> {
    fs: &'a dyn FileSystem,
    path: PathBuf,
}

impl<'a> StateStore<'a> {
    /// Creates a store for the state file at `path`.
    #[must_use]
    pub fn new(fs: &'a dyn FileSystem, path: &Path) -> Self {
        Self { fs, path: path.to_path_buf() }
    }

    /// Path of the state file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the state file; a missing file is an empty state.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<StateFile, StoreError> {
        if !self.fs.exists(&self.path) {
            return Ok(StateFile::default());
        }
        let contents = self
            .fs
            .read_to_string(&self.path)
            .map_err(|e| StoreError::Read { path: self.path.clone(), message: e.to_string() })?;
        if contents.trim().is_empty() {
            return Ok(StateFile::default());
        }
        serde_yaml::from_str(&contents)
            .map_err(|e| StoreError::Parse { path: self.path.clone(), message: e.to_string() })
    }

    /// Writes `state` to the state file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, state: &StateFile) -> Result<(), StoreError> {
        let write_error = |message: String| StoreError::Write { path: self.path.clone(), message };
        let yaml = serde_yaml::to_string(state).map_err(|e| write_error(e.to_string()))?;
        self.fs.write(&self.path, &yaml).map_err(|e| write_error(e.to_string()))
    }
}

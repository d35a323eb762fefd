//! Recording session managing per-port cassette recorders.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;

use super::config::cassette_file;
use super::ports;
use super::recorder::CassetteRecorder;

/// Shared handle to one port's recorder.
pub type SharedRecorder = Arc<Mutex<CassetteRecorder>>;

/// Manages per-port `CassetteRecorder` instances for a recording session.
///
/// Each port gets its own recorder writing to a separate cassette file. All
/// cassettes of a session land in one timestamped directory, which can be
/// handed straight to `LABSYNC_REPLAY`.
pub struct RecordingSession {
    /// Recorder for node interactions.
    pub nodes: SharedRecorder,
    /// Recorder for network interactions.
    pub networks: SharedRecorder,
    /// Recorder for topology interactions.
    pub topology: SharedRecorder,
    /// Recorder for capability interactions.
    pub capability: SharedRecorder,
    output_dir: PathBuf,
}

impl RecordingSession {
    /// Starts a session under `<root>/<timestamp>/`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory already exists or cannot be created.
    pub fn new(root: &Path, server: &str) -> Result<Self, String> {
        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let output_dir = root.join(&timestamp);

        if output_dir.exists() {
            return Err(format!("Cassette directory already exists: {}", output_dir.display()));
        }
        std::fs::create_dir_all(&output_dir)
            .map_err(|e| format!("Failed to create cassette directory: {e}"))?;

        let make_recorder = |port: &str| -> SharedRecorder {
            let path = output_dir.join(cassette_file(port));
            Arc::new(Mutex::new(CassetteRecorder::new(path, format!("{timestamp}-{port}"), server)))
        };

        Ok(Self {
            nodes: make_recorder(ports::NODES),
            networks: make_recorder(ports::NETWORKS),
            topology: make_recorder(ports::TOPOLOGY),
            capability: make_recorder(ports::CAPABILITY),
            output_dir,
        })
    }

    /// Directory the cassettes are written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes every port's cassette with what was recorded so far.
    ///
    /// # Errors
    ///
    /// Returns an error if a cassette file cannot be written.
    pub fn save(&self) -> Result<&Path, String> {
        for (port, recorder) in [
            (ports::NODES, &self.nodes),
            (ports::NETWORKS, &self.networks),
            (ports::TOPOLOGY, &self.topology),
            (ports::CAPABILITY, &self.capability),
        ] {
            let guard = recorder.lock().unwrap_or_else(PoisonError::into_inner);
            guard.save().map_err(|e| format!("Failed to write {port} cassette: {e}"))?;
        }
        Ok(&self.output_dir)
    }
}

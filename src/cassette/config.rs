//! Cassette configuration for composable per-port replay.

use std::path::{Path, PathBuf};

use super::format::Cassette;
use super::ports;
use super::replayer::CassetteReplayer;

/// Per-port cassette file paths. Ports without a cassette fail every call
/// during replay with an error naming the port.
#[derive(Debug, Clone, Default)]
pub struct CassetteConfig {
    /// Node port cassette.
    pub nodes: Option<PathBuf>,
    /// Network port cassette.
    pub networks: Option<PathBuf>,
    /// Topology port cassette.
    pub topology: Option<PathBuf>,
    /// Capability port cassette.
    pub capability: Option<PathBuf>,
}

/// Per-port replayers, each with its own interaction stream.
#[allow(missing_docs)]
pub struct PortReplayers {
    pub nodes: Option<CassetteReplayer>,
    pub networks: Option<CassetteReplayer>,
    pub topology: Option<CassetteReplayer>,
    pub capability: Option<CassetteReplayer>,
}

/// File name of a port's cassette inside a recording directory.
#[must_use]
pub fn cassette_file(port: &str) -> String {
    format!("{port}.cassette.yaml")
}

impl CassetteConfig {
    /// Picks up `<port>.cassette.yaml` for every port present in `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` is not a directory.
    pub fn from_dir(dir: &Path) -> Result<Self, String> {
        if !dir.is_dir() {
            return Err(format!("Cassette directory not found: {}", dir.display()));
        }
        let find = |port: &str| Some(dir.join(cassette_file(port))).filter(|p| p.is_file());
        Ok(Self {
            nodes: find(ports::NODES),
            networks: find(ports::NETWORKS),
            topology: find(ports::TOPOLOGY),
            capability: find(ports::CAPABILITY),
        })
    }

    /// Load a single cassette file and create a replayer.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<CassetteReplayer, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
        let cassette: Cassette = serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))?;
        Ok(CassetteReplayer::new(&cassette))
    }

    /// Load all configured per-port cassette files and create replayers.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured cassette file cannot be read or parsed.
    pub fn load_all(&self) -> Result<PortReplayers, String> {
        Ok(PortReplayers {
            nodes: self.nodes.as_deref().map(Self::load).transpose()?,
            networks: self.networks.as_deref().map(Self::load).transpose()?,
            topology: self.topology.as_deref().map(Self::load).transpose()?,
            capability: self.capability.as_deref().map(Self::load).transpose()?,
        })
    }
}

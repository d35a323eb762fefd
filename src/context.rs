//! Service context bundling all port trait objects.

use std::path::Path;

use tracing::{info, warn};

use crate::adapters::live::{EveClient, LiveFileSystem};
use crate::adapters::memory::{MemoryFileSystem, MemoryLab};
use crate::adapters::recording::{
    RecordingCapabilities, RecordingNetworkApi, RecordingNodeApi, RecordingTopologyApi,
};
use crate::adapters::replaying::{
    ReplayingCapabilities, ReplayingNetworkApi, ReplayingNodeApi, ReplayingTopologyApi,
    Unconfigured,
};
use crate::cassette::config::CassetteConfig;
use crate::cassette::ports;
use crate::cassette::session::RecordingSession;
use crate::config::ClientConfig;
use crate::ports::{ApiError, Capabilities, FileSystem, NetworkApi, NodeApi, TopologyApi};

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Constructors wire up
/// different adapter implementations (live, recording, replaying, memory).
pub struct ServiceContext {
    /// Node lookups and interface binding.
    pub nodes: Box<dyn NodeApi>,
    /// Network lifecycle.
    pub networks: Box<dyn NetworkApi>,
    /// Lab topology listing.
    pub topology: Box<dyn TopologyApi>,
    /// Server edition.
    pub capabilities: Box<dyn Capabilities>,
    /// Manifest and state files.
    pub fs: Box<dyn FileSystem>,
    /// Cassettes being recorded; written on drop.
    session: Option<RecordingSession>,
}

impl ServiceContext {
    /// Connects to the lab server described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot be reached or rejects the login.
    pub fn live(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = EveClient::connect(config)?;
        Ok(Self {
            nodes: Box::new(client.clone()),
            networks: Box::new(client.clone()),
            topology: Box::new(client.clone()),
            capabilities: Box::new(client),
            fs: Box::new(LiveFileSystem),
            session: None,
        })
    }

    /// Connects like [`ServiceContext::live`] and records every lab server
    /// call into a fresh cassette directory under `root`.
    ///
    /// Cassettes are written when the context is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette directory cannot be created or the
    /// server cannot be reached.
    pub fn recording(config: &ClientConfig, root: &Path) -> Result<Self, String> {
        let session = RecordingSession::new(root, &config.host)?;
        let client = EveClient::connect(config).map_err(|e| e.to_string())?;
        info!(dir = %session.output_dir().display(), "recording cassettes");
        Ok(Self {
            nodes: Box::new(RecordingNodeApi::new(Box::new(client.clone()), session.nodes.clone())),
            networks: Box::new(RecordingNetworkApi::new(
                Box::new(client.clone()),
                session.networks.clone(),
            )),
            topology: Box::new(RecordingTopologyApi::new(
                Box::new(client.clone()),
                session.topology.clone(),
            )),
            capabilities: Box::new(RecordingCapabilities::new(
                Box::new(client),
                session.capability.clone(),
            )),
            fs: Box::new(LiveFileSystem),
            session: Some(session),
        })
    }

    /// Creates a replaying context from per-port cassette files.
    ///
    /// Ports without a cassette fail every call with [`ApiError::Replay`].
    /// Files still come from the real disk.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured cassette file cannot be read or
    /// parsed.
    pub fn replaying_from(config: &CassetteConfig) -> Result<Self, String> {
        let replayers = config.load_all()?;

        Ok(Self {
            nodes: match replayers.nodes {
                Some(r) => Box::new(ReplayingNodeApi::new(r)),
                None => Box::new(Unconfigured::new(ports::NODES)),
            },
            networks: match replayers.networks {
                Some(r) => Box::new(ReplayingNetworkApi::new(r)),
                None => Box::new(Unconfigured::new(ports::NETWORKS)),
            },
            topology: match replayers.topology {
                Some(r) => Box::new(ReplayingTopologyApi::new(r)),
                None => Box::new(Unconfigured::new(ports::TOPOLOGY)),
            },
            capabilities: match replayers.capability {
                Some(r) => Box::new(ReplayingCapabilities::new(r)),
                None => Box::new(Unconfigured::new(ports::CAPABILITY)),
            },
            fs: Box::new(LiveFileSystem),
            session: None,
        })
    }

    /// Wires every lab port to `lab` and files to a fresh in-memory
    /// filesystem.
    #[must_use]
    pub fn in_memory(lab: &MemoryLab) -> Self {
        Self {
            nodes: Box::new(lab.clone()),
            networks: Box::new(lab.clone()),
            topology: Box::new(lab.clone()),
            capabilities: Box::new(lab.clone()),
            fs: Box::new(MemoryFileSystem::new()),
            session: None,
        }
    }

    /// Replaces the filesystem port.
    #[must_use]
    pub fn with_fs(mut self, fs: Box<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }
}

impl Drop for ServiceContext {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            match session.save() {
                Ok(dir) => info!(dir = %dir.display(), "wrote cassettes"),
                Err(e) => warn!(error = %e, "failed to write cassettes"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::{Cassette, Interaction};
    use crate::link::{Endpoint, LinkDeclaration, LinkReconciler};
    use chrono::Utc;
    use serde_json::json;

    fn write_cassette(path: &Path, interactions: Vec<Interaction>) {
        let cassette = Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            server: "http://lab.local".into(),
            interactions,
        };
        std::fs::write(path, serde_yaml::to_string(&cassette).unwrap()).unwrap();
    }

    fn call(seq: u64, port: &str, method: &str, output: serde_json::Value) -> Interaction {
        Interaction { seq, port: port.into(), method: method.into(), input: json!({}), output }
    }

    #[test]
    fn replaying_context_drives_a_network_link() {
        let dir = std::env::temp_dir().join("labsync_ctx_replay");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        write_cassette(
            &dir.join("nodes.cassette.yaml"),
            vec![call(0, "nodes", "set_interface_network", json!({"Ok": null}))],
        );
        write_cassette(&dir.join("capability.cassette.yaml"), vec![]);

        let ctx = ServiceContext::replaying_from(&CassetteConfig::from_dir(&dir).unwrap()).unwrap();
        let decl = LinkDeclaration {
            lab: "/a.unl".into(),
            source: Endpoint::new(1, "e0"),
            network: Some(5),
            target: None,
            style: None,
        };

        let state = LinkReconciler::new(&ctx).create(&decl).unwrap();

        assert_eq!(state.network_id, Some(5));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unconfigured_ports_fail_with_replay_errors() {
        let ctx = ServiceContext::replaying_from(&CassetteConfig::default()).unwrap();

        let err = ctx.networks.network("/a.unl", 1).unwrap_err();

        assert!(matches!(err, ApiError::Replay(_)));
        assert!(!ctx.capabilities.is_pro());
    }

    #[test]
    fn in_memory_context_shares_the_lab() {
        let lab = MemoryLab::new();
        lab.add_node("/a.unl", 1, "r1", &["e0"]);
        let ctx = ServiceContext::in_memory(&lab);

        assert_eq!(ctx.nodes.node("/a.unl", 1).unwrap().name, "r1");
    }
}

//! Declared and persisted link records.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::style::Style;
use crate::ports::{NetworkId, NodeId};

/// One end of a link: a port on a node.
///
/// A node id of `0` or an empty port marks a field cleared by drift
/// detection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// Node id.
    #[serde(default)]
    pub node: NodeId,
    /// Port label on the node.
    #[serde(default)]
    pub port: String,
}

impl Endpoint {
    /// Creates an endpoint.
    pub fn new(node: NodeId, port: impl Into<String>) -> Self {
        Self { node, port: port.into() }
    }

    /// Returns `true` when the endpoint refers to a node at all.
    #[must_use]
    pub fn is_placed(&self) -> bool {
        self.node != 0
    }

    /// Returns `true` when both the node and the port are known.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.is_placed() && !self.port.is_empty()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {} port {}", self.node, self.port)
    }
}

/// Which end of a link an endpoint is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointRole {
    /// The declared source interface.
    Source,
    /// The declared target interface of a node-to-node link.
    Target,
}

impl fmt::Display for EndpointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Source => "source",
            Self::Target => "target",
        })
    }
}

/// A link as written in a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDeclaration {
    /// Lab file path on the server (for example `/labs/core.unl`).
    pub lab: String,
    /// Source interface.
    pub source: Endpoint,
    /// Target network for a node-to-network link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkId>,
    /// Target interface for a node-to-node link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Endpoint>,
    /// Decoration, honored by Pro servers only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
}

/// A link as last observed on the server, persisted between passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkState {
    /// Lab file path on the server.
    pub lab: String,
    /// Source interface.
    pub source: Endpoint,
    /// Target interface; present exactly for node-to-node links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Endpoint>,
    /// Network in effect. `None` while unresolved (a pass never completed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_id: Option<NetworkId>,
    /// Decoration snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
}

impl LinkState {
    /// Returns `true` when the link owns an implicit network.
    #[must_use]
    pub fn is_node_to_node(&self) -> bool {
        self.target.is_some()
    }

    pub(crate) fn endpoint_mut(&mut self, role: EndpointRole) -> Option<&mut Endpoint> {
        match role {
            EndpointRole::Source => Some(&mut self.source),
            EndpointRole::Target => self.target.as_mut(),
        }
    }
}

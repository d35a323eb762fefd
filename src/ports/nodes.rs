//! Node port for interface lookup and binding.

use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::{NetworkId, NodeId, UNBOUND};
use crate::link::Style;

/// A node as reported by the lab server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Remote-assigned node id.
    pub id: NodeId,
    /// Display name of the node.
    pub name: String,
    /// Ethernet interfaces in index order.
    #[serde(default)]
    pub interfaces: Vec<Interface>,
}

/// A single node interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    /// Port label (for example `e0`).
    pub name: String,
    /// Network the interface is bound to, [`UNBOUND`] when unplugged.
    #[serde(default)]
    pub network_id: NetworkId,
}

impl Interface {
    /// Returns `true` when the interface is plugged into a network.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.network_id != UNBOUND
    }
}

/// An interface together with its position on the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceSlot {
    /// Interface index on the node.
    pub index: usize,
    /// The interface itself.
    pub interface: Interface,
}

/// Reads node interfaces and changes what they are plugged into.
pub trait NodeApi: Send + Sync {
    /// Fetches a node.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the node does not exist, or any
    /// transport/server error.
    fn node(&self, lab: &str, node: NodeId) -> Result<Node, ApiError>;

    /// Looks up an interface by port label.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the node or the port does not exist.
    fn interface(&self, lab: &str, node: NodeId, port: &str) -> Result<InterfaceSlot, ApiError>;

    /// Plugs the interface into `network`, or unplugs it when `network` is
    /// [`UNBOUND`].
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the change.
    fn set_interface_network(
        &self,
        lab: &str,
        node: NodeId,
        port: &str,
        network: NetworkId,
    ) -> Result<(), ApiError>;

    /// Stores link decoration attributes on the interface.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the change.
    fn set_interface_style(
        &self,
        lab: &str,
        node: NodeId,
        port: &str,
        style: &Style,
    ) -> Result<(), ApiError>;
}

//! Errors raised by the link reconciler.

use thiserror::Error;

use super::model::{EndpointRole, LinkState};
use crate::ports::{ApiError, NetworkId, NodeId};

/// Failure of a link reconciliation step.
#[derive(Debug, Error)]
pub enum LinkError {
    /// Source and target are the same node.
    #[error("cannot link node {node} to itself")]
    SelfLink {
        /// The node named on both ends.
        node: NodeId,
    },
    /// Both a target network and a target endpoint were declared.
    #[error("a link targets either a network or a node port, not both")]
    ConflictingTarget,
    /// Neither a target network nor a target endpoint was declared.
    #[error("a link needs a target network or a target node port")]
    MissingTarget,
    /// The declared target network is id 0, which means "unplugged".
    #[error("target network id must not be 0")]
    UnboundNetwork,
    /// An endpoint was declared without a port.
    #[error("{role} port must not be empty")]
    MissingPort {
        /// The endpoint missing its port.
        role: EndpointRole,
    },
    /// A pass finished without a usable network id.
    #[error("lab server reported network id 0 for the link")]
    ZeroNetwork,
    /// A remote operation failed; the pass stopped at that point.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The remote state disagrees with the persisted record in a way that
    /// cannot be repaired locally. `observed` carries the record with the
    /// offending fields cleared.
    #[error("{kind}")]
    Drift {
        /// The persisted record as observed, offending fields cleared.
        observed: Box<LinkState>,
        /// What disagreed.
        kind: DriftKind,
    },
}

impl LinkError {
    /// Returns `true` for declaration errors detected before any remote call.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::SelfLink { .. }
                | Self::ConflictingTarget
                | Self::MissingTarget
                | Self::UnboundNetwork
                | Self::MissingPort { .. }
        )
    }
}

/// Kinds of disagreement between the persisted record and the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriftKind {
    /// The node behind an endpoint was removed.
    #[error("{role} node {node} not found")]
    NodeMissing {
        /// Which endpoint.
        role: EndpointRole,
        /// The missing node.
        node: NodeId,
    },
    /// The port behind an endpoint no longer exists on its node.
    #[error("{role} port {port} not found on node {node}")]
    PortMissing {
        /// Which endpoint.
        role: EndpointRole,
        /// Node that was searched.
        node: NodeId,
        /// The missing port.
        port: String,
    },
    /// The interface is plugged into something other than the link's network.
    #[error("{role} port {port} is not connected to network {network}")]
    PortDetached {
        /// Which endpoint.
        role: EndpointRole,
        /// The detached port.
        port: String,
        /// Network the port should be plugged into.
        network: NetworkId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detached_message_names_port_and_network() {
        let kind = DriftKind::PortDetached {
            role: EndpointRole::Target,
            port: "e1".into(),
            network: 9,
        };
        assert_eq!(kind.to_string(), "target port e1 is not connected to network 9");
    }

    #[test]
    fn validation_classification() {
        assert!(LinkError::SelfLink { node: 1 }.is_validation());
        assert!(LinkError::UnboundNetwork.is_validation());
        assert!(!LinkError::ZeroNetwork.is_validation());
        assert!(!LinkError::Api(ApiError::Transport("x".into())).is_validation());
    }
}

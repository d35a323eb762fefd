//! Replaying adapter for the `NodeApi` port.

use std::sync::Mutex;

use super::replay_result;
use crate::cassette::ports::NODES;
use crate::cassette::replayer::CassetteReplayer;
use crate::link::Style;
use crate::ports::{ApiError, InterfaceSlot, NetworkId, Node, NodeApi, NodeId};

/// Replays recorded node interactions.
pub struct ReplayingNodeApi {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingNodeApi {
    /// Creates an adapter serving calls from `replayer`.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl NodeApi for ReplayingNodeApi {
    fn node(&self, _lab: &str, _node: NodeId) -> Result<Node, ApiError> {
        replay_result(&self.replayer, NODES, "node")
    }

    fn interface(&self, _lab: &str, _node: NodeId, _port: &str) -> Result<InterfaceSlot, ApiError> {
        replay_result(&self.replayer, NODES, "interface")
    }

    fn set_interface_network(
        &self,
        _lab: &str,
        _node: NodeId,
        _port: &str,
        _network: NetworkId,
    ) -> Result<(), ApiError> {
        replay_result(&self.replayer, NODES, "set_interface_network")
    }

    fn set_interface_style(
        &self,
        _lab: &str,
        _node: NodeId,
        _port: &str,
        _style: &Style,
    ) -> Result<(), ApiError> {
        replay_result(&self.replayer, NODES, "set_interface_style")
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use super::*;
    use serde_json::json;

    #[test]
    fn replays_interface_slot() {
        let nodes = ReplayingNodeApi::new(test_support::replayer(&[(
            "nodes",
            "interface",
            json!({"Ok": {"index": 3, "interface": {"name": "e3", "network_id": 8}}}),
        )]));

        let slot = nodes.interface("/a.unl", 1, "e3").unwrap();

        assert_eq!(slot.index, 3);
        assert_eq!(slot.interface.network_id, 8);
    }
}

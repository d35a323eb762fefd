//! Replaying adapters that serve lab server traffic from cassettes.

pub mod capability;
pub mod networks;
pub mod nodes;
pub mod topology;

pub use capability::ReplayingCapabilities;
pub use networks::ReplayingNetworkApi;
pub use nodes::ReplayingNodeApi;
pub use topology::ReplayingTopologyApi;

use std::sync::{Mutex, PoisonError};

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::cassette::replayer::CassetteReplayer;
use crate::link::Style;
use crate::ports::{
    ApiError, Capabilities, InterfaceSlot, Network, NetworkApi, NetworkId, Node, NodeApi, NodeId,
    TopologyApi, TopologyEntry,
};

/// Output of the next recorded interaction for `port::method`.
pub(crate) fn next_output(
    replayer: &Mutex<CassetteReplayer>,
    port: &str,
    method: &str,
) -> Result<serde_json::Value, ApiError> {
    let mut guard = replayer.lock().unwrap_or_else(PoisonError::into_inner);
    guard
        .next_interaction(port, method)
        .map(|interaction| interaction.output.clone())
        .map_err(|e| ApiError::Replay(e.to_string()))
}

/// Replays a recorded `Result`, stored as `{"Ok": v}` or `{"Err": e}`.
pub(crate) fn replay_result<T: DeserializeOwned>(
    replayer: &Mutex<CassetteReplayer>,
    port: &str,
    method: &str,
) -> Result<T, ApiError> {
    let output = next_output(replayer, port, method)?;
    serde_json::from_value::<Result<T, ApiError>>(output)
        .map_err(|e| ApiError::Replay(format!("{port}::{method}: malformed output: {e}")))?
}

/// Stands in for every port that has no cassette; each call fails with an
/// error naming the port.
pub struct Unconfigured {
    port: &'static str,
}

impl Unconfigured {
    /// Creates a stand-in for `port`.
    #[must_use]
    pub fn new(port: &'static str) -> Self {
        Self { port }
    }

    fn fail<T>(&self) -> Result<T, ApiError> {
        Err(ApiError::Replay(format!("no cassette loaded for the {} port", self.port)))
    }
}

impl NodeApi for Unconfigured {
    fn node(&self, _lab: &str, _node: NodeId) -> Result<Node, ApiError> {
        self.fail()
    }

    fn interface(&self, _lab: &str, _node: NodeId, _port: &str) -> Result<InterfaceSlot, ApiError> {
        self.fail()
    }

    fn set_interface_network(
        &self,
        _lab: &str,
        _node: NodeId,
        _port: &str,
        _network: NetworkId,
    ) -> Result<(), ApiError> {
        self.fail()
    }

    fn set_interface_style(
        &self,
        _lab: &str,
        _node: NodeId,
        _port: &str,
        _style: &Style,
    ) -> Result<(), ApiError> {
        self.fail()
    }
}

impl NetworkApi for Unconfigured {
    fn network(&self, _lab: &str, _id: NetworkId) -> Result<Network, ApiError> {
        self.fail()
    }

    fn create_network(&self, _lab: &str, _network: &Network) -> Result<NetworkId, ApiError> {
        self.fail()
    }

    fn update_network(&self, _lab: &str, _network: &Network) -> Result<(), ApiError> {
        self.fail()
    }

    fn delete_network(&self, _lab: &str, _id: NetworkId) -> Result<(), ApiError> {
        self.fail()
    }
}

impl TopologyApi for Unconfigured {
    fn topology(&self, _lab: &str) -> Result<Vec<TopologyEntry>, ApiError> {
        self.fail()
    }
}

impl Capabilities for Unconfigured {
    fn is_pro(&self) -> bool {
        warn!(port = self.port, "no cassette loaded; assuming community edition");
        false
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn replays_ok_and_typed_err() {
        let replayer = Mutex::new(test_support::replayer(&[
            ("networks", "create_network", json!({"Ok": 12})),
            ("networks", "create_network", json!({"Err": {"kind": "not_found", "detail": {"what": "lab /a.unl"}}})),
        ]));

        let first: Result<NetworkId, ApiError> = replay_result(&replayer, "networks", "create_network");
        let second: Result<NetworkId, ApiError> = replay_result(&replayer, "networks", "create_network");

        assert_eq!(first, Ok(12));
        assert_eq!(second, Err(ApiError::not_found("lab /a.unl")));
    }

    #[test]
    fn exhausted_cassette_is_a_replay_error() {
        let replayer = Mutex::new(test_support::replayer(&[]));

        let err = replay_result::<()>(&replayer, "nodes", "node").unwrap_err();

        assert!(matches!(err, ApiError::Replay(_)));
    }

    #[test]
    fn unconfigured_port_names_itself() {
        let err = NetworkApi::network(&Unconfigured::new("networks"), "/a.unl", 1).unwrap_err();
        assert_eq!(err.to_string(), "replay failed: no cassette loaded for the networks port");
    }
}

//! Replaying adapter for the `NetworkApi` port.

use std::sync::Mutex;

use super::replay_result;
use crate::cassette::ports::NETWORKS;
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::{ApiError, Network, NetworkApi, NetworkId};

/// Replays recorded network interactions.
pub struct ReplayingNetworkApi {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingNetworkApi {
    /// Creates an adapter serving calls from `replayer`.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl NetworkApi for ReplayingNetworkApi {
    fn network(&self, _lab: &str, _id: NetworkId) -> Result<Network, ApiError> {
        replay_result(&self.replayer, NETWORKS, "network")
    }

    fn create_network(&self, _lab: &str, _network: &Network) -> Result<NetworkId, ApiError> {
        replay_result(&self.replayer, NETWORKS, "create_network")
    }

    fn update_network(&self, _lab: &str, _network: &Network) -> Result<(), ApiError> {
        replay_result(&self.replayer, NETWORKS, "update_network")
    }

    fn delete_network(&self, _lab: &str, _id: NetworkId) -> Result<(), ApiError> {
        replay_result(&self.replayer, NETWORKS, "delete_network")
    }
}

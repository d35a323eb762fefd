//! Replaying adapter for the `TopologyApi` port.

use std::sync::Mutex;

use super::replay_result;
use crate::cassette::ports::TOPOLOGY;
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::{ApiError, TopologyApi, TopologyEntry};

/// Replays recorded topology listings.
pub struct ReplayingTopologyApi {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingTopologyApi {
    /// Creates an adapter serving calls from `replayer`.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl TopologyApi for ReplayingTopologyApi {
    fn topology(&self, _lab: &str) -> Result<Vec<TopologyEntry>, ApiError> {
        replay_result(&self.replayer, TOPOLOGY, "topology")
    }
}

//! Recording adapter for the `NetworkApi` port.

use serde::Serialize;

use super::record_result;
use crate::cassette::ports::NETWORKS;
use crate::cassette::session::SharedRecorder;
use crate::ports::{ApiError, Network, NetworkApi, NetworkId};

/// Records network interactions while delegating to an inner implementation.
pub struct RecordingNetworkApi {
    inner: Box<dyn NetworkApi>,
    recorder: SharedRecorder,
}

impl RecordingNetworkApi {
    /// Wraps `inner`, recording every call into `recorder`.
    pub fn new(inner: Box<dyn NetworkApi>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct IdInput<'a> {
    lab: &'a str,
    id: NetworkId,
}

#[derive(Serialize)]
struct NetworkInput<'a> {
    lab: &'a str,
    network: &'a Network,
}

impl NetworkApi for RecordingNetworkApi {
    fn network(&self, lab: &str, id: NetworkId) -> Result<Network, ApiError> {
        let result = self.inner.network(lab, id);
        record_result(&self.recorder, NETWORKS, "network", &IdInput { lab, id }, &result);
        result
    }

    fn create_network(&self, lab: &str, network: &Network) -> Result<NetworkId, ApiError> {
        let result = self.inner.create_network(lab, network);
        let input = NetworkInput { lab, network };
        record_result(&self.recorder, NETWORKS, "create_network", &input, &result);
        result
    }

    fn update_network(&self, lab: &str, network: &Network) -> Result<(), ApiError> {
        let result = self.inner.update_network(lab, network);
        let input = NetworkInput { lab, network };
        record_result(&self.recorder, NETWORKS, "update_network", &input, &result);
        result
    }

    fn delete_network(&self, lab: &str, id: NetworkId) -> Result<(), ApiError> {
        let result = self.inner.delete_network(lab, id);
        record_result(&self.recorder, NETWORKS, "delete_network", &IdInput { lab, id }, &result);
        result
    }
}

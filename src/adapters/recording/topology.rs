//! Recording adapter for the `TopologyApi` port.

use serde::Serialize;

use super::record_result;
use crate::cassette::ports::TOPOLOGY;
use crate::cassette::session::SharedRecorder;
use crate::ports::{ApiError, TopologyApi, TopologyEntry};

/// Records topology listings while delegating to an inner implementation.
pub struct RecordingTopologyApi {
    inner: Box<dyn TopologyApi>,
    recorder: SharedRecorder,
}

impl RecordingTopologyApi {
    /// Wraps `inner`, recording every call into `recorder`.
    pub fn new(inner: Box<dyn TopologyApi>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct LabInput<'a> {
    lab: &'a str,
}

impl TopologyApi for RecordingTopologyApi {
    fn topology(&self, lab: &str) -> Result<Vec<TopologyEntry>, ApiError> {
        let result = self.inner.topology(lab);
        record_result(&self.recorder, TOPOLOGY, "topology", &LabInput { lab }, &result);
        result
    }
}

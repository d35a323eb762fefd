//! Recording adapter for the `Capabilities` port.

use serde_json::json;

use super::record_interaction;
use crate::cassette::ports::CAPABILITY;
use crate::cassette::session::SharedRecorder;
use crate::ports::Capabilities;

/// Records edition probes while delegating to an inner implementation.
pub struct RecordingCapabilities {
    inner: Box<dyn Capabilities>,
    recorder: SharedRecorder,
}

impl RecordingCapabilities {
    /// Wraps `inner`, recording every call into `recorder`.
    pub fn new(inner: Box<dyn Capabilities>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

impl Capabilities for RecordingCapabilities {
    fn is_pro(&self) -> bool {
        let pro = self.inner.is_pro();
        record_interaction(&self.recorder, CAPABILITY, "is_pro", &json!({}), &pro);
        pro
    }
}

//! Replaying adapter for the `Capabilities` port.

use std::sync::Mutex;

use tracing::warn;

use super::next_output;
use crate::cassette::ports::CAPABILITY;
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::Capabilities;

/// Replays recorded edition probes.
pub struct ReplayingCapabilities {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingCapabilities {
    /// Creates an adapter serving calls from `replayer`.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl Capabilities for ReplayingCapabilities {
    fn is_pro(&self) -> bool {
        match next_output(&self.replayer, CAPABILITY, "is_pro") {
            Ok(output) => output.as_bool().unwrap_or_else(|| {
                warn!(%output, "capability cassette holds a non-boolean; assuming community edition");
                false
            }),
            Err(err) => {
                warn!(error = %err, "assuming community edition");
                false
            }
        }
    }
}

//! Recording adapters that capture lab server traffic into cassettes.

pub mod capability;
pub mod networks;
pub mod nodes;
pub mod topology;

pub use capability::RecordingCapabilities;
pub use networks::RecordingNetworkApi;
pub use nodes::RecordingNodeApi;
pub use topology::RecordingTopologyApi;

use std::sync::PoisonError;

use serde::Serialize;
use tracing::warn;

use crate::cassette::session::SharedRecorder;

/// Record an interaction with a plain (non-Result) return value.
///
/// Mirror of `replaying::next_output`.
pub(crate) fn record_interaction<I, O>(
    recorder: &SharedRecorder,
    port: &str,
    method: &str,
    input: &I,
    output: &O,
) where
    I: Serialize,
    O: Serialize,
{
    match (serde_json::to_value(input), serde_json::to_value(output)) {
        (Ok(input), Ok(output)) => {
            let mut guard = recorder.lock().unwrap_or_else(PoisonError::into_inner);
            guard.record(port, method, input, output);
        }
        (Err(e), _) | (_, Err(e)) => {
            warn!(port, method, error = %e, "could not record interaction");
        }
    }
}

/// Record a `Result<T, E>` interaction using the Ok/Err JSON convention.
///
/// Mirror of `replaying::replay_result`. `Ok(v)` is stored as `{"Ok": v}`
/// and `Err(e)` as `{"Err": e}`, keeping the error's type so that replay
/// reproduces it exactly.
pub(crate) fn record_result<T, E, I>(
    recorder: &SharedRecorder,
    port: &str,
    method: &str,
    input: &I,
    result: &Result<T, E>,
) where
    T: Serialize,
    E: Serialize,
    I: Serialize,
{
    record_interaction(recorder, port, method, input, result);
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    use crate::cassette::format::Cassette;
    use crate::cassette::recorder::CassetteRecorder;
    use crate::cassette::session::SharedRecorder;

    pub fn recorder(path: &Path) -> SharedRecorder {
        Arc::new(Mutex::new(CassetteRecorder::new(path, "test", "http://lab.local")))
    }

    pub fn finish(recorder: SharedRecorder, path: &Path) -> Cassette {
        let recorder = Arc::try_unwrap(recorder).unwrap().into_inner().unwrap();
        recorder.finish().unwrap();
        serde_yaml::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }
}

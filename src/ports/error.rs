//! Error type shared by the remote lab ports.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by a remote lab operation.
///
/// Serializable so that recorded cassettes replay the exact failure,
/// including the `NotFound` case the reconciler branches on.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ApiError {
    /// The addressed object does not exist on the lab server.
    #[error("{what} not found")]
    NotFound {
        /// Human-readable description of the missing object.
        what: String,
    },
    /// The server answered but refused the request.
    #[error("lab server rejected request ({status}): {message}")]
    Rejected {
        /// HTTP or envelope status code.
        status: u16,
        /// Message reported by the server.
        message: String,
    },
    /// The request never produced a usable response.
    #[error("lab server request failed: {0}")]
    Transport(String),
    /// The response body did not have the expected shape.
    #[error("unexpected lab server response: {0}")]
    Decode(String),
    /// A cassette could not serve the requested interaction.
    #[error("replay failed: {0}")]
    Replay(String),
}

impl ApiError {
    /// Shorthand for a [`ApiError::NotFound`] error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Returns `true` when the addressed object does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

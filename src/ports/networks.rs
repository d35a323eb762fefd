//! Network port for creating, renaming, hiding, and deleting lab networks.

use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::NetworkId;

/// Whether a network shows up as a user-addressable object in the lab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Drawn on the canvas and addressable by users.
    #[default]
    Visible,
    /// Implicit bridge backing a point-to-point link.
    Hidden,
}

impl Visibility {
    /// Wire flag used by the lab server (`"1"` visible, `"0"` hidden).
    #[must_use]
    pub fn as_flag(self) -> &'static str {
        match self {
            Self::Visible => "1",
            Self::Hidden => "0",
        }
    }

    /// Parses the wire flag; anything but `0` counts as visible.
    #[must_use]
    pub fn from_flag(flag: &str) -> Self {
        if flag.trim() == "0" {
            Self::Hidden
        } else {
            Self::Visible
        }
    }
}

/// A lab network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    /// Remote-assigned id, `0` before creation.
    #[serde(default)]
    pub id: NetworkId,
    /// Display name.
    pub name: String,
    /// Network type (for example `bridge`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Canvas visibility.
    #[serde(default)]
    pub visibility: Visibility,
    /// Canvas x position.
    #[serde(default)]
    pub left: i64,
    /// Canvas y position.
    #[serde(default)]
    pub top: i64,
    /// Canvas icon file.
    #[serde(default)]
    pub icon: String,
}

/// Manages networks inside a lab.
pub trait NetworkApi: Send + Sync {
    /// Fetches a network.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the network does not exist.
    fn network(&self, lab: &str, id: NetworkId) -> Result<Network, ApiError>;

    /// Creates a network and returns its assigned id. The `id` field of
    /// `network` is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the network.
    fn create_network(&self, lab: &str, network: &Network) -> Result<NetworkId, ApiError>;

    /// Replaces the attributes of the network identified by `network.id`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the network does not exist.
    fn update_network(&self, lab: &str, network: &Network) -> Result<(), ApiError>;

    /// Deletes a network, unplugging every interface bound to it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the network does not exist.
    fn delete_network(&self, lab: &str, id: NetworkId) -> Result<(), ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_flags() {
        assert_eq!(Visibility::Hidden.as_flag(), "0");
        assert_eq!(Visibility::from_flag("0"), Visibility::Hidden);
        assert_eq!(Visibility::from_flag("1"), Visibility::Visible);
        assert_eq!(Visibility::from_flag(""), Visibility::Visible);
    }
}

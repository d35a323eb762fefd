//! Hidden bridge networks backing node-to-node links.
//!
//! The lab server never connects two interfaces directly; a node-to-node
//! link therefore owns one bridge network that both interfaces plug into.
//! That network is never shared with another link and never shown to users.

use tracing::info;

use super::model::Endpoint;
use crate::ports::{ApiError, Network, NetworkApi, NetworkId, Visibility, UNBOUND};

/// Network type used for implicit networks.
pub const IMPLICIT_NETWORK_TYPE: &str = "bridge";

/// Canvas icon used for implicit networks.
pub const IMPLICIT_NETWORK_ICON: &str = "lan.png";

/// Deterministic name of the implicit network joining two interfaces:
/// `<sourceNode>_<sourceIndex>_<targetNode>_<targetIndex>`.
#[must_use]
pub fn implicit_network_name(
    source: &Endpoint,
    source_index: usize,
    target: &Endpoint,
    target_index: usize,
) -> String {
    format!("{}_{}_{}_{}", source.node, source_index, target.node, target_index)
}

/// Creates, renames, hides, and deletes implicit networks.
pub struct ImplicitNetworks<'a> {
    networks: &'a dyn NetworkApi,
}

impl<'a> ImplicitNetworks<'a> {
    /// Creates a manager over the given network port.
    #[must_use]
    pub fn new(networks: &'a dyn NetworkApi) -> Self {
        Self { networks }
    }

    /// Renames `existing` in place when it is still live, otherwise creates a
    /// fresh bridge network.
    ///
    /// Renaming keeps the bindings already on the network. A fresh network is
    /// registered visible: the server reaps hidden networks that have no
    /// members, so hiding waits for [`ImplicitNetworks::conceal`] once both
    /// interfaces are plugged in.
    ///
    /// # Errors
    ///
    /// Propagates server errors other than `existing` being gone.
    pub fn create_or_update(
        &self,
        lab: &str,
        existing: Option<NetworkId>,
        name: &str,
    ) -> Result<Network, ApiError> {
        let live = match existing.filter(|id| *id != UNBOUND) {
            Some(id) => match self.networks.network(lab, id) {
                Ok(_) => Some(id),
                Err(err) if err.is_not_found() => None,
                Err(err) => return Err(err),
            },
            None => None,
        };

        let mut network = Network {
            id: UNBOUND,
            name: name.to_string(),
            kind: IMPLICIT_NETWORK_TYPE.to_string(),
            visibility: Visibility::Visible,
            left: 0,
            top: 0,
            icon: IMPLICIT_NETWORK_ICON.to_string(),
        };

        if let Some(id) = live {
            network.id = id;
            self.networks.update_network(lab, &network)?;
            info!(lab, network_id = id, name, "renamed implicit network");
        } else {
            network.id = self.networks.create_network(lab, &network)?;
            info!(lab, network_id = network.id, name, "created implicit network");
        }
        Ok(network)
    }

    /// Forces the network hidden so it never surfaces as a user network.
    ///
    /// # Errors
    ///
    /// Propagates the server error unchanged.
    pub fn conceal(&self, lab: &str, network: &mut Network) -> Result<(), ApiError> {
        network.visibility = Visibility::Hidden;
        self.networks.update_network(lab, network)
    }

    /// Deletes the network, which also unplugs both of its interfaces.
    ///
    /// # Errors
    ///
    /// Propagates the server error unchanged.
    pub fn delete(&self, lab: &str, id: NetworkId) -> Result<(), ApiError> {
        self.networks.delete_network(lab, id)?;
        info!(lab, network_id = id, "deleted implicit network");
        Ok(())
    }
}

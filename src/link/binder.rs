//! Single-interface binding, the primitive every link operation builds on.

use tracing::debug;

use super::model::Endpoint;
use crate::ports::{ApiError, NetworkId, NodeApi, UNBOUND};

/// Plugs and unplugs one interface at a time.
pub struct InterfaceBinder<'a> {
    nodes: &'a dyn NodeApi,
}

impl<'a> InterfaceBinder<'a> {
    /// Creates a binder over the given node port.
    #[must_use]
    pub fn new(nodes: &'a dyn NodeApi) -> Self {
        Self { nodes }
    }

    /// Plugs `endpoint` into `network`. Rebinding to the same network is
    /// harmless.
    ///
    /// # Errors
    ///
    /// Propagates the server error unchanged.
    pub fn bind(&self, lab: &str, endpoint: &Endpoint, network: NetworkId) -> Result<(), ApiError> {
        debug!(lab, node = endpoint.node, port = %endpoint.port, network, "binding interface");
        self.nodes.set_interface_network(lab, endpoint.node, &endpoint.port, network)
    }

    /// Unplugs `endpoint`.
    ///
    /// # Errors
    ///
    /// Propagates the server error unchanged.
    pub fn unbind(&self, lab: &str, endpoint: &Endpoint) -> Result<(), ApiError> {
        self.bind(lab, endpoint, UNBOUND)
    }

    /// Unplugs `endpoint` only if it is still plugged into `expected`.
    ///
    /// An interface that was rebound elsewhere belongs to someone else now
    /// and is left alone, as is any interface when the expected network is
    /// unknown. A node or port that no longer exists has nothing to release.
    /// Returns `true` when an unbind was issued.
    ///
    /// # Errors
    ///
    /// Propagates lookup and unbind failures other than not-found.
    pub fn release(
        &self,
        lab: &str,
        endpoint: &Endpoint,
        expected: Option<NetworkId>,
    ) -> Result<bool, ApiError> {
        let Some(expected) = expected.filter(|id| *id != UNBOUND) else {
            debug!(lab, node = endpoint.node, port = %endpoint.port, "no known network; leaving interface");
            return Ok(false);
        };
        if !endpoint.is_complete() {
            return Ok(false);
        }

        let slot = match self.nodes.interface(lab, endpoint.node, &endpoint.port) {
            Ok(slot) => slot,
            Err(err) if err.is_not_found() => {
                debug!(lab, node = endpoint.node, port = %endpoint.port, "interface gone; nothing to release");
                return Ok(false);
            }
            Err(err) => return Err(err),
        };

        if slot.interface.network_id != expected {
            debug!(
                lab,
                node = endpoint.node,
                port = %endpoint.port,
                observed = slot.interface.network_id,
                expected,
                "interface rebound elsewhere; leaving it"
            );
            return Ok(false);
        }

        self.unbind(lab, endpoint)?;
        Ok(true)
    }
}

//! Create, read, update, and delete of links.
//!
//! Every pass is sequential and stops at the first remote failure. Steps are
//! ordered so that an abandoned pass leaves the lab recoverable by the next
//! one: old bindings are released before new ones are made, and an implicit
//! network is hidden only after both of its interfaces are plugged in.

use tracing::{debug, info};

use super::binder::InterfaceBinder;
use super::error::{DriftKind, LinkError};
use super::implicit::{implicit_network_name, ImplicitNetworks};
use super::model::{Endpoint, EndpointRole, LinkDeclaration, LinkState};
use super::resolve::{resolve, ResolvedLink, Shape};
use super::style::StyleSync;
use crate::context::ServiceContext;
use crate::ports::{NetworkApi, NetworkId, NodeApi, UNBOUND};

/// Result of reading a persisted link back from the server.
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    /// The link still exists; the record reflects what was observed.
    Present(LinkState),
    /// The link's network is gone; the record should be dropped and the link
    /// created again.
    Recreate,
}

/// Drives links through their lifecycle against one lab server.
pub struct LinkReconciler<'a> {
    nodes: &'a dyn NodeApi,
    networks: &'a dyn NetworkApi,
    binder: InterfaceBinder<'a>,
    implicit: ImplicitNetworks<'a>,
    styles: StyleSync<'a>,
}

impl<'a> LinkReconciler<'a> {
    /// Creates a reconciler over the ports of `ctx`.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext) -> Self {
        let nodes = ctx.nodes.as_ref();
        let networks = ctx.networks.as_ref();
        Self {
            nodes,
            networks,
            binder: InterfaceBinder::new(nodes),
            implicit: ImplicitNetworks::new(networks),
            styles: StyleSync::new(nodes, ctx.topology.as_ref(), ctx.capabilities.as_ref()),
        }
    }

    /// Realizes a declared link that has no persisted record yet.
    ///
    /// # Errors
    ///
    /// Returns a validation error before touching the server, the first
    /// remote failure, or [`LinkError::ZeroNetwork`].
    pub fn create(&self, decl: &LinkDeclaration) -> Result<LinkState, LinkError> {
        let resolved = resolve(decl)?;
        let network_id = match resolved.shape {
            Shape::NodeToNetwork { network } => self.attach_to_network(&resolved, network, None)?,
            Shape::NodeToNode { target } => self.join_nodes(&resolved, target, None)?,
        };
        info!(lab = %decl.lab, network_id, "created node link");
        self.settle(decl, network_id)
    }

    /// Moves a persisted link to a new declaration.
    ///
    /// # Errors
    ///
    /// Returns a validation error before touching the server, the first
    /// remote failure, or [`LinkError::ZeroNetwork`].
    pub fn update(&self, decl: &LinkDeclaration, prior: &LinkState) -> Result<LinkState, LinkError> {
        let resolved = resolve(decl)?;

        if decl.lab != prior.lab {
            info!(from = %prior.lab, to = %decl.lab, "node link moved labs; replacing");
            self.delete(prior)?;
            return self.create(decl);
        }

        if decl.target.is_some() && !prior.is_node_to_node() && prior.network_id.is_some() {
            info!(lab = %decl.lab, "node link changed from network to node");
        }

        let network_id = match resolved.shape {
            Shape::NodeToNetwork { network } => {
                self.attach_to_network(&resolved, network, Some(prior))?
            }
            Shape::NodeToNode { target } => self.join_nodes(&resolved, target, Some(prior))?,
        };
        info!(lab = %decl.lab, network_id, "updated node link");
        self.settle(decl, network_id)
    }

    /// Reads a persisted link back from the server without changing anything.
    ///
    /// For links into a user network, a source port that was unplugged
    /// externally is cleared silently. For node-to-node links both interfaces
    /// belong to the link, so any disagreement is reported as
    /// [`LinkError::Drift`].
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Drift`] or the first remote failure.
    pub fn read(&self, state: &LinkState) -> Result<Observation, LinkError> {
        let lab = state.lab.as_str();
        let Some(network) = state.network_id.filter(|id| *id != UNBOUND) else {
            debug!(lab, "network unresolved; link must be recreated");
            return Ok(Observation::Recreate);
        };

        match self.networks.network(lab, network) {
            Ok(_) => {}
            Err(err) if err.is_not_found() => {
                info!(lab, network_id = network, "network gone; link must be recreated");
                return Ok(Observation::Recreate);
            }
            Err(err) => return Err(err.into()),
        }

        let mut observed = state.clone();
        if state.is_node_to_node() {
            self.observe_owned(&mut observed, EndpointRole::Source, network)?;
            self.observe_owned(&mut observed, EndpointRole::Target, network)?;
        } else {
            self.observe_shared(&mut observed, network)?;
        }

        if observed.style.is_some() && self.styles.enabled() {
            if let Some(target) = &observed.target {
                observed.style = self.styles.pull(lab, target);
            }
        }
        Ok(Observation::Present(observed))
    }

    /// Tears a persisted link down.
    ///
    /// Node-to-node links delete their implicit network, which unplugs both
    /// interfaces. Links into a user network only unplug the source, and only
    /// if it is still plugged into that network. A record whose network was
    /// never resolved has nothing to tear down.
    ///
    /// # Errors
    ///
    /// Returns the first remote failure.
    pub fn delete(&self, state: &LinkState) -> Result<(), LinkError> {
        let lab = state.lab.as_str();
        let Some(network) = state.network_id.filter(|id| *id != UNBOUND) else {
            debug!(lab, "network unresolved; nothing to delete");
            return Ok(());
        };

        if state.is_node_to_node() {
            self.implicit.delete(lab, network)?;
        } else {
            self.binder.release(lab, &state.source, Some(network))?;
        }
        info!(lab, network_id = network, "deleted node link");
        Ok(())
    }

    fn attach_to_network(
        &self,
        resolved: &ResolvedLink<'_>,
        network: NetworkId,
        prior: Option<&LinkState>,
    ) -> Result<NetworkId, LinkError> {
        let lab = resolved.lab;
        if let Some(prior) = prior {
            self.release_if_moved(lab, &prior.source, resolved.source, prior.network_id)?;
            if prior.is_node_to_node() {
                if let Some(owned) = prior.network_id.filter(|id| *id != UNBOUND) {
                    info!(lab, network_id = owned, "node link changed from node to network");
                    match self.implicit.delete(lab, owned) {
                        Ok(()) => {}
                        Err(err) if err.is_not_found() => {}
                        Err(err) => return Err(err.into()),
                    }
                }
            }
        }

        self.binder.bind(lab, resolved.source, network)?;
        Ok(network)
    }

    fn join_nodes(
        &self,
        resolved: &ResolvedLink<'_>,
        target: &Endpoint,
        prior: Option<&LinkState>,
    ) -> Result<NetworkId, LinkError> {
        let lab = resolved.lab;
        let source = resolved.source;
        // Only a network the link already owned may be reused; a user
        // network it was plugged into is released, never adopted.
        let known = prior.filter(|p| p.is_node_to_node()).and_then(|p| p.network_id);

        if let Some(prior) = prior {
            self.release_if_moved(lab, &prior.source, source, prior.network_id)?;
            if let Some(old_target) = &prior.target {
                self.release_if_moved(lab, old_target, target, prior.network_id)?;
            }
        }

        let source_slot = self.nodes.interface(lab, source.node, &source.port)?;
        let target_slot = self.nodes.interface(lab, target.node, &target.port)?;
        let name = implicit_network_name(source, source_slot.index, target, target_slot.index);

        let mut network = self.implicit.create_or_update(lab, known, &name)?;
        self.binder.bind(lab, source, network.id)?;
        self.binder.bind(lab, target, network.id)?;
        self.implicit.conceal(lab, &mut network)?;
        Ok(network.id)
    }

    fn release_if_moved(
        &self,
        lab: &str,
        old: &Endpoint,
        new: &Endpoint,
        network: Option<NetworkId>,
    ) -> Result<(), LinkError> {
        if old != new && old.is_placed() {
            debug!(lab, from = %old, to = %new, "endpoint moved; releasing old interface");
            self.binder.release(lab, old, network)?;
        }
        Ok(())
    }

    /// Builds the persisted record once the wiring is in place.
    fn settle(&self, decl: &LinkDeclaration, network_id: NetworkId) -> Result<LinkState, LinkError> {
        if network_id == UNBOUND {
            return Err(LinkError::ZeroNetwork);
        }

        let mut state = LinkState {
            lab: decl.lab.clone(),
            source: decl.source.clone(),
            target: decl.target.clone(),
            network_id: Some(network_id),
            style: decl.style.clone(),
        };

        if let Some(target) = &decl.target {
            if self.styles.enabled() {
                if let Some(style) = &decl.style {
                    self.styles.push(&decl.lab, target, style);
                }
                state.style = self.styles.pull(&decl.lab, target);
            }
        }
        Ok(state)
    }

    /// Checks the source of a link into a user network.
    fn observe_shared(&self, observed: &mut LinkState, network: NetworkId) -> Result<(), LinkError> {
        let lab = observed.lab.clone();
        let source = observed.source.clone();

        if let Err(err) = self.nodes.node(&lab, source.node) {
            if !err.is_not_found() {
                return Err(err.into());
            }
            observed.source = Endpoint::default();
            return Err(drift(
                observed,
                DriftKind::NodeMissing { role: EndpointRole::Source, node: source.node },
            ));
        }

        if source.port.is_empty() {
            return Ok(());
        }

        match self.nodes.interface(&lab, source.node, &source.port) {
            Ok(slot) if slot.interface.network_id == network => Ok(()),
            Ok(slot) => {
                info!(
                    lab = %lab,
                    port = %source.port,
                    observed = slot.interface.network_id,
                    network_id = network,
                    "source port unplugged externally; clearing it"
                );
                observed.source.port.clear();
                Ok(())
            }
            Err(err) if err.is_not_found() => {
                observed.source.port.clear();
                Err(drift(
                    observed,
                    DriftKind::PortMissing {
                        role: EndpointRole::Source,
                        node: source.node,
                        port: source.port,
                    },
                ))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Checks one end of a node-to-node link; any disagreement is drift.
    fn observe_owned(
        &self,
        observed: &mut LinkState,
        role: EndpointRole,
        network: NetworkId,
    ) -> Result<(), LinkError> {
        let lab = observed.lab.clone();
        let Some(endpoint) = observed.endpoint_mut(role).map(|e| e.clone()) else {
            return Ok(());
        };

        if let Err(err) = self.nodes.node(&lab, endpoint.node) {
            if !err.is_not_found() {
                return Err(err.into());
            }
            if let Some(e) = observed.endpoint_mut(role) {
                *e = Endpoint::default();
            }
            return Err(drift(observed, DriftKind::NodeMissing { role, node: endpoint.node }));
        }

        let kind = match self.nodes.interface(&lab, endpoint.node, &endpoint.port) {
            Ok(slot) if slot.interface.network_id == network => return Ok(()),
            Ok(_) => DriftKind::PortDetached { role, port: endpoint.port, network },
            Err(err) if err.is_not_found() => {
                DriftKind::PortMissing { role, node: endpoint.node, port: endpoint.port }
            }
            Err(err) => return Err(err.into()),
        };
        if let Some(e) = observed.endpoint_mut(role) {
            e.port.clear();
        }
        Err(drift(observed, kind))
    }
}

fn drift(observed: &LinkState, kind: DriftKind) -> LinkError {
    LinkError::Drift { observed: Box::new(observed.clone()), kind }
}

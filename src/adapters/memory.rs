//! In-memory lab server used to exercise the reconciler without a network.
//!
//! [`MemoryLab`] behaves like the real server where the reconciler cares:
//! interfaces bind to at most one network, binding to a missing network is
//! rejected, deleting a network unplugs its members, and a hidden network is
//! reaped as soon as its last member leaves. Every port call is logged as a
//! [`LabCall`] so tests can assert on what was (and was not) sent.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::link::Style;
use crate::ports::{
    ApiError, Capabilities, FileSystem, Interface, InterfaceSlot, Network, NetworkApi, NetworkId,
    Node, NodeApi, NodeId, TopologyApi, TopologyEntry, Visibility, UNBOUND,
};

/// One port call received by a [`MemoryLab`].
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabCall {
    GetNode { node: NodeId },
    GetInterface { node: NodeId, port: String },
    SetInterfaceNetwork { node: NodeId, port: String, network: NetworkId },
    SetInterfaceStyle { node: NodeId, port: String },
    GetNetwork { network: NetworkId },
    CreateNetwork { name: String },
    UpdateNetwork { network: NetworkId, name: String, visibility: Visibility },
    DeleteNetwork { network: NetworkId },
    Topology,
}

impl LabCall {
    /// Returns `true` for calls that change server state.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::SetInterfaceNetwork { .. }
                | Self::SetInterfaceStyle { .. }
                | Self::CreateNetwork { .. }
                | Self::UpdateNetwork { .. }
                | Self::DeleteNetwork { .. }
        )
    }
}

#[derive(Debug, Clone)]
struct MemoryInterface {
    name: String,
    network_id: NetworkId,
    style: Option<Style>,
}

#[derive(Debug, Clone)]
struct MemoryNode {
    name: String,
    interfaces: Vec<MemoryInterface>,
}

#[derive(Debug, Default)]
struct LabData {
    nodes: BTreeMap<NodeId, MemoryNode>,
    networks: BTreeMap<NetworkId, Network>,
}

impl LabData {
    fn members(&self, network: NetworkId) -> usize {
        self.nodes
            .values()
            .flat_map(|n| &n.interfaces)
            .filter(|i| i.network_id == network)
            .count()
    }

    fn reap_if_abandoned(&mut self, network: NetworkId) {
        if network == UNBOUND || self.members(network) > 0 {
            return;
        }
        if self.networks.get(&network).is_some_and(|n| n.visibility == Visibility::Hidden) {
            self.networks.remove(&network);
        }
    }

    fn interface_mut(
        &mut self,
        node: NodeId,
        port: &str,
    ) -> Result<&mut MemoryInterface, ApiError> {
        self.nodes
            .get_mut(&node)
            .ok_or_else(|| ApiError::not_found(format!("node {node}")))?
            .interfaces
            .iter_mut()
            .find(|i| i.name == port)
            .ok_or_else(|| ApiError::not_found(format!("interface {port} on node {node}")))
    }
}

#[derive(Debug)]
struct State {
    labs: BTreeMap<String, LabData>,
    calls: Vec<LabCall>,
    next_network: NetworkId,
    pro: bool,
}

impl Default for State {
    fn default() -> Self {
        Self { labs: BTreeMap::new(), calls: Vec::new(), next_network: 1, pro: false }
    }
}

impl State {
    fn lab(&mut self, lab: &str) -> &mut LabData {
        self.labs.entry(lab.to_string()).or_default()
    }
}

/// Shared in-memory lab server. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryLab {
    state: Arc<Mutex<State>>,
}

impl MemoryLab {
    /// Creates an empty community-edition server.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the server advertises the Pro edition.
    #[must_use]
    pub fn with_pro(self, pro: bool) -> Self {
        self.lock().pro = pro;
        self
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a node with unplugged interfaces named after `ports`, in index
    /// order.
    pub fn add_node(&self, lab: &str, id: NodeId, name: &str, ports: &[&str]) {
        let node = MemoryNode {
            name: name.to_string(),
            interfaces: ports
                .iter()
                .map(|p| MemoryInterface { name: (*p).to_string(), network_id: UNBOUND, style: None })
                .collect(),
        };
        self.lock().lab(lab).nodes.insert(id, node);
    }

    /// Adds a visible user network and returns its id.
    pub fn add_network(&self, lab: &str, name: &str) -> NetworkId {
        let mut state = self.lock();
        let id = state.next_network;
        state.next_network += 1;
        let network = Network {
            id,
            name: name.to_string(),
            kind: "bridge".to_string(),
            visibility: Visibility::Visible,
            left: 0,
            top: 0,
            icon: "lan.png".to_string(),
        };
        state.lab(lab).networks.insert(id, network);
        id
    }

    /// Network an interface is bound to, or `None` if the interface does not
    /// exist.
    #[must_use]
    pub fn binding(&self, lab: &str, node: NodeId, port: &str) -> Option<NetworkId> {
        self.lock()
            .labs
            .get(lab)?
            .nodes
            .get(&node)?
            .interfaces
            .iter()
            .find(|i| i.name == port)
            .map(|i| i.network_id)
    }

    /// Current copy of a network, if it exists.
    #[must_use]
    pub fn network_snapshot(&self, lab: &str, id: NetworkId) -> Option<Network> {
        self.lock().labs.get(lab)?.networks.get(&id).cloned()
    }

    /// Every network in the lab, in id order.
    #[must_use]
    pub fn networks_in(&self, lab: &str) -> Vec<Network> {
        self.lock()
            .labs
            .get(lab)
            .map(|l| l.networks.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Rebinds an interface the way another user would, without logging a
    /// call.
    ///
    /// # Panics
    ///
    /// Panics if the interface does not exist.
    pub fn bind_out_of_band(&self, lab: &str, node: NodeId, port: &str, network: NetworkId) {
        let mut state = self.lock();
        let data = state.lab(lab);
        let interface = data
            .interface_mut(node, port)
            .unwrap_or_else(|err| panic!("bind_out_of_band: {err}"));
        let previous = std::mem::replace(&mut interface.network_id, network);
        data.reap_if_abandoned(previous);
    }

    /// Deletes a network the way another user would, without logging a call.
    pub fn remove_network_out_of_band(&self, lab: &str, id: NetworkId) {
        let mut state = self.lock();
        let data = state.lab(lab);
        data.networks.remove(&id);
        for interface in data.nodes.values_mut().flat_map(|n| &mut n.interfaces) {
            if interface.network_id == id {
                interface.network_id = UNBOUND;
            }
        }
    }

    /// Deletes a node the way another user would, without logging a call.
    pub fn remove_node_out_of_band(&self, lab: &str, id: NodeId) {
        let mut state = self.lock();
        let data = state.lab(lab);
        if let Some(node) = data.nodes.remove(&id) {
            for interface in node.interfaces {
                data.reap_if_abandoned(interface.network_id);
            }
        }
    }

    /// Calls received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<LabCall> {
        self.lock().calls.clone()
    }

    /// Forgets the calls received so far.
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }
}

impl NodeApi for MemoryLab {
    fn node(&self, lab: &str, node: NodeId) -> Result<Node, ApiError> {
        let mut state = self.lock();
        state.calls.push(LabCall::GetNode { node });
        let found = state
            .lab(lab)
            .nodes
            .get(&node)
            .ok_or_else(|| ApiError::not_found(format!("node {node}")))?;
        Ok(Node {
            id: node,
            name: found.name.clone(),
            interfaces: found
                .interfaces
                .iter()
                .map(|i| Interface { name: i.name.clone(), network_id: i.network_id })
                .collect(),
        })
    }

    fn interface(&self, lab: &str, node: NodeId, port: &str) -> Result<InterfaceSlot, ApiError> {
        let mut state = self.lock();
        state.calls.push(LabCall::GetInterface { node, port: port.to_string() });
        let found = state
            .lab(lab)
            .nodes
            .get(&node)
            .ok_or_else(|| ApiError::not_found(format!("node {node}")))?;
        found
            .interfaces
            .iter()
            .enumerate()
            .find(|(_, i)| i.name == port)
            .map(|(index, i)| InterfaceSlot {
                index,
                interface: Interface { name: i.name.clone(), network_id: i.network_id },
            })
            .ok_or_else(|| ApiError::not_found(format!("interface {port} on node {node}")))
    }

    fn set_interface_network(
        &self,
        lab: &str,
        node: NodeId,
        port: &str,
        network: NetworkId,
    ) -> Result<(), ApiError> {
        let mut state = self.lock();
        state.calls.push(LabCall::SetInterfaceNetwork { node, port: port.to_string(), network });
        let data = state.lab(lab);
        if network != UNBOUND && !data.networks.contains_key(&network) {
            return Err(ApiError::Rejected {
                status: 400,
                message: format!("network {network} does not exist"),
            });
        }
        let interface = data.interface_mut(node, port)?;
        let previous = std::mem::replace(&mut interface.network_id, network);
        if previous != network {
            data.reap_if_abandoned(previous);
        }
        Ok(())
    }

    fn set_interface_style(
        &self,
        lab: &str,
        node: NodeId,
        port: &str,
        style: &Style,
    ) -> Result<(), ApiError> {
        let mut state = self.lock();
        state.calls.push(LabCall::SetInterfaceStyle { node, port: port.to_string() });
        state.lab(lab).interface_mut(node, port)?.style = Some(style.clone());
        Ok(())
    }
}

impl NetworkApi for MemoryLab {
    fn network(&self, lab: &str, id: NetworkId) -> Result<Network, ApiError> {
        let mut state = self.lock();
        state.calls.push(LabCall::GetNetwork { network: id });
        state
            .lab(lab)
            .networks
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("network {id}")))
    }

    fn create_network(&self, lab: &str, network: &Network) -> Result<NetworkId, ApiError> {
        let mut state = self.lock();
        state.calls.push(LabCall::CreateNetwork { name: network.name.clone() });
        let id = state.next_network;
        state.next_network += 1;
        state.lab(lab).networks.insert(id, Network { id, ..network.clone() });
        Ok(id)
    }

    fn update_network(&self, lab: &str, network: &Network) -> Result<(), ApiError> {
        let mut state = self.lock();
        state.calls.push(LabCall::UpdateNetwork {
            network: network.id,
            name: network.name.clone(),
            visibility: network.visibility,
        });
        let stored = state
            .lab(lab)
            .networks
            .get_mut(&network.id)
            .ok_or_else(|| ApiError::not_found(format!("network {}", network.id)))?;
        *stored = network.clone();
        Ok(())
    }

    fn delete_network(&self, lab: &str, id: NetworkId) -> Result<(), ApiError> {
        let mut state = self.lock();
        state.calls.push(LabCall::DeleteNetwork { network: id });
        let data = state.lab(lab);
        if data.networks.remove(&id).is_none() {
            return Err(ApiError::not_found(format!("network {id}")));
        }
        for interface in data.nodes.values_mut().flat_map(|n| &mut n.interfaces) {
            if interface.network_id == id {
                interface.network_id = UNBOUND;
            }
        }
        Ok(())
    }
}

impl TopologyApi for MemoryLab {
    fn topology(&self, lab: &str) -> Result<Vec<TopologyEntry>, ApiError> {
        let mut state = self.lock();
        state.calls.push(LabCall::Topology);
        let data = state.lab(lab);
        let mut entries = Vec::new();
        for (id, node) in &data.nodes {
            for interface in node.interfaces.iter().filter(|i| i.network_id != UNBOUND) {
                let mut entry = TopologyEntry {
                    kind: Some("ethernet".to_string()),
                    source: Some(format!("node{id}")),
                    source_type: Some("node".to_string()),
                    source_label: Some(interface.name.clone()),
                    destination: Some(format!("network{}", interface.network_id)),
                    destination_type: Some("network".to_string()),
                    network_id: Some(interface.network_id.to_string()),
                    ..TopologyEntry::default()
                };
                if let Some(style) = &interface.style {
                    apply_style(&mut entry, style);
                }
                entries.push(entry);
            }
        }
        Ok(entries)
    }
}

/// Renders a stored style the way the server does: every field as a string.
fn apply_style(entry: &mut TopologyEntry, style: &Style) {
    entry.style = Some(style.style.as_str().to_string());
    entry.color = Some(style.color.clone());
    entry.srcpos = Some(style.srcpos.to_string());
    entry.dstpos = Some(style.dstpos.to_string());
    entry.linkstyle = Some(style.linkstyle.as_str().to_string());
    entry.width = Some(style.width.to_string());
    entry.label = Some(style.label.clone());
    entry.labelpos = Some(style.labelpos.to_string());
    entry.stub = Some(style.stub.to_string());
    entry.curviness = Some(style.curviness.to_string());
    entry.beziercurviness = Some(style.beziercurviness.to_string());
    entry.round = Some(style.round.to_string());
    entry.midpoint = Some(style.midpoint.to_string());
}

impl Capabilities for MemoryLab {
    fn is_pro(&self) -> bool {
        self.lock().pro
    }
}

/// In-memory filesystem for exercising the state store.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: Arc<Mutex<BTreeMap<PathBuf, String>>>,
}

impl MemoryFileSystem {
    /// Creates an empty filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn files(&self) -> MutexGuard<'_, BTreeMap<PathBuf, String>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(
        &self,
        path: &Path,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        self.files()
            .get(path)
            .cloned()
            .ok_or_else(|| format!("{}: no such file", path.display()).into())
    }

    fn write(
        &self,
        path: &Path,
        contents: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.files().insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files().contains_key(path)
    }
}

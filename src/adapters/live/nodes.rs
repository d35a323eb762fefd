//! Live adapter for the `NodeApi` port.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use super::client::EveClient;
use crate::link::Style;
use crate::ports::{ApiError, Interface, InterfaceSlot, NetworkId, Node, NodeApi, NodeId, UNBOUND};

#[derive(Deserialize)]
struct NodeBody {
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
struct InterfacesBody {
    #[serde(default)]
    ethernet: Value,
}

#[derive(Deserialize)]
struct EthernetBody {
    #[serde(default)]
    name: String,
    #[serde(default)]
    network_id: Value,
}

/// Ethernet interfaces in index order.
///
/// The server lists them as an array, or as an object keyed by index once
/// some have been removed.
fn parse_ethernet(raw: Value) -> Result<Vec<(usize, Interface)>, ApiError> {
    let decode = |value: Value| -> Result<Interface, ApiError> {
        let body: EthernetBody =
            serde_json::from_value(value).map_err(|e| ApiError::Decode(format!("interface: {e}")))?;
        Ok(Interface { name: body.name, network_id: network_id(&body.network_id) })
    };

    match raw {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => {
            items.into_iter().enumerate().map(|(i, v)| Ok((i, decode(v)?))).collect()
        }
        Value::Object(map) => {
            let mut indexed = BTreeMap::new();
            for (key, value) in map {
                let index: usize = key
                    .parse()
                    .map_err(|_| ApiError::Decode(format!("interface index {key:?}")))?;
                indexed.insert(index, decode(value)?);
            }
            Ok(indexed.into_iter().collect())
        }
        other => Err(ApiError::Decode(format!("unexpected ethernet listing: {other}"))),
    }
}

fn network_id(raw: &Value) -> NetworkId {
    match raw {
        Value::Number(n) => n.as_i64().unwrap_or(UNBOUND),
        Value::String(s) => s.trim().parse().unwrap_or(UNBOUND),
        _ => UNBOUND,
    }
}

impl EveClient {
    fn interfaces(&self, lab: &str, node: NodeId) -> Result<Vec<(usize, Interface)>, ApiError> {
        let url = self.lab_url(lab, &format!("/nodes/{node}/interfaces"));
        let body: InterfacesBody = self.get(url, &format!("node {node}"))?;
        parse_ethernet(body.ethernet)
    }
}

impl NodeApi for EveClient {
    fn node(&self, lab: &str, node: NodeId) -> Result<Node, ApiError> {
        let url = self.lab_url(lab, &format!("/nodes/{node}"));
        let body: NodeBody = self.get(url, &format!("node {node}"))?;
        let interfaces = self.interfaces(lab, node)?.into_iter().map(|(_, i)| i).collect();
        Ok(Node { id: node, name: body.name, interfaces })
    }

    fn interface(&self, lab: &str, node: NodeId, port: &str) -> Result<InterfaceSlot, ApiError> {
        self.interfaces(lab, node)?
            .into_iter()
            .find(|(_, i)| i.name == port)
            .map(|(index, interface)| InterfaceSlot { index, interface })
            .ok_or_else(|| ApiError::not_found(format!("interface {port} on node {node}")))
    }

    fn set_interface_network(
        &self,
        lab: &str,
        node: NodeId,
        port: &str,
        network: NetworkId,
    ) -> Result<(), ApiError> {
        let slot = self.interface(lab, node, port)?;
        let value = if network == UNBOUND { String::new() } else { network.to_string() };
        let body = BTreeMap::from([(slot.index.to_string(), value)]);
        let url = self.lab_url(lab, &format!("/nodes/{node}/interfaces"));
        self.put(url, &body, &format!("interface {port} on node {node}"))
    }

    fn set_interface_style(
        &self,
        lab: &str,
        node: NodeId,
        port: &str,
        style: &Style,
    ) -> Result<(), ApiError> {
        let slot = self.interface(lab, node, port)?;
        let url = self.lab_url(lab, &format!("/nodes/{node}/interfaces/{}", slot.index));
        self.put(url, style, &format!("interface {port} on node {node}"))
    }
}

//! Recording adapter for the `NodeApi` port.

use serde::Serialize;

use super::record_result;
use crate::cassette::ports::NODES;
use crate::cassette::session::SharedRecorder;
use crate::link::Style;
use crate::ports::{ApiError, InterfaceSlot, NetworkId, Node, NodeApi, NodeId};

/// Records node interactions while delegating to an inner implementation.
pub struct RecordingNodeApi {
    inner: Box<dyn NodeApi>,
    recorder: SharedRecorder,
}

impl RecordingNodeApi {
    /// Wraps `inner`, recording every call into `recorder`.
    pub fn new(inner: Box<dyn NodeApi>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct NodeInput<'a> {
    lab: &'a str,
    node: NodeId,
}

#[derive(Serialize)]
struct InterfaceInput<'a> {
    lab: &'a str,
    node: NodeId,
    port: &'a str,
}

#[derive(Serialize)]
struct BindInput<'a> {
    lab: &'a str,
    node: NodeId,
    port: &'a str,
    network: NetworkId,
}

#[derive(Serialize)]
struct StyleInput<'a> {
    lab: &'a str,
    node: NodeId,
    port: &'a str,
    style: &'a Style,
}

impl NodeApi for RecordingNodeApi {
    fn node(&self, lab: &str, node: NodeId) -> Result<Node, ApiError> {
        let result = self.inner.node(lab, node);
        record_result(&self.recorder, NODES, "node", &NodeInput { lab, node }, &result);
        result
    }

    fn interface(&self, lab: &str, node: NodeId, port: &str) -> Result<InterfaceSlot, ApiError> {
        let result = self.inner.interface(lab, node, port);
        let input = InterfaceInput { lab, node, port };
        record_result(&self.recorder, NODES, "interface", &input, &result);
        result
    }

    fn set_interface_network(
        &self,
        lab: &str,
        node: NodeId,
        port: &str,
        network: NetworkId,
    ) -> Result<(), ApiError> {
        let result = self.inner.set_interface_network(lab, node, port, network);
        let input = BindInput { lab, node, port, network };
        record_result(&self.recorder, NODES, "set_interface_network", &input, &result);
        result
    }

    fn set_interface_style(
        &self,
        lab: &str,
        node: NodeId,
        port: &str,
        style: &Style,
    ) -> Result<(), ApiError> {
        let result = self.inner.set_interface_style(lab, node, port, style);
        let input = StyleInput { lab, node, port, style };
        record_result(&self.recorder, NODES, "set_interface_style", &input, &result);
        result
    }
}

//! Link decoration (Pro servers only).
//!
//! Styles are written per interface but can only be read back through the
//! lab-wide topology listing, where every value arrives as an untyped string.
//! [`Style::from_topology`] turns such an entry into a typed record, falling
//! back to the documented default of each field when it is absent or does not
//! parse.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::model::Endpoint;
use crate::ports::{Capabilities, NodeApi, NodeId, TopologyApi, TopologyEntry};

/// Stroke pattern of a link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineStyle {
    /// Continuous line.
    #[default]
    Solid,
    /// Dashed line.
    Dashed,
}

impl LineStyle {
    /// Wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solid => "Solid",
            Self::Dashed => "Dashed",
        }
    }
}

impl FromStr for LineStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Solid" => Ok(Self::Solid),
            "Dashed" => Ok(Self::Dashed),
            other => Err(format!("unknown line style {other:?}")),
        }
    }
}

/// Routing of a link between its endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Connector {
    /// Direct line.
    #[default]
    Straight,
    /// Bezier curve.
    Bezier,
    /// Right-angled segments.
    Flowchart,
    /// State machine arc.
    StateMachine,
}

impl Connector {
    /// Wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Straight => "Straight",
            Self::Bezier => "Bezier",
            Self::Flowchart => "Flowchart",
            Self::StateMachine => "StateMachine",
        }
    }
}

impl FromStr for Connector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Straight" => Ok(Self::Straight),
            "Bezier" => Ok(Self::Bezier),
            "Flowchart" => Ok(Self::Flowchart),
            "StateMachine" => Ok(Self::StateMachine),
            other => Err(format!("unknown connector {other:?}")),
        }
    }
}

/// Decoration attributes of a link.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub style: LineStyle,
    pub color: String,
    pub srcpos: f32,
    pub dstpos: f32,
    pub linkstyle: Connector,
    pub width: i32,
    pub label: String,
    pub labelpos: f32,
    pub stub: i32,
    pub curviness: i32,
    pub beziercurviness: i32,
    pub round: i32,
    pub midpoint: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            style: LineStyle::Solid,
            color: "#3e7089".to_string(),
            srcpos: 0.15,
            dstpos: 0.85,
            linkstyle: Connector::Straight,
            width: 2,
            label: String::new(),
            labelpos: 0.5,
            stub: 0,
            curviness: 10,
            beziercurviness: 150,
            round: 0,
            midpoint: 0.5,
        }
    }
}

impl Style {
    /// Builds a style from a topology entry, field by field.
    #[must_use]
    pub fn from_topology(entry: &TopologyEntry) -> Self {
        let defaults = Self::default();
        Self {
            style: parse_or(entry.style.as_deref(), defaults.style),
            color: entry
                .color
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map_or(defaults.color, str::to_string),
            srcpos: parse_or(entry.srcpos.as_deref(), defaults.srcpos),
            dstpos: parse_or(entry.dstpos.as_deref(), defaults.dstpos),
            linkstyle: parse_or(entry.linkstyle.as_deref(), defaults.linkstyle),
            width: parse_or(entry.width.as_deref(), defaults.width),
            label: entry.label.clone().unwrap_or(defaults.label),
            labelpos: parse_or(entry.labelpos.as_deref(), defaults.labelpos),
            stub: parse_or(entry.stub.as_deref(), defaults.stub),
            curviness: parse_or(entry.curviness.as_deref(), defaults.curviness),
            beziercurviness: parse_or(entry.beziercurviness.as_deref(), defaults.beziercurviness),
            round: parse_or(entry.round.as_deref(), defaults.round),
            midpoint: parse_or(entry.midpoint.as_deref(), defaults.midpoint),
        }
    }
}

fn parse_or<T: FromStr>(raw: Option<&str>, default: T) -> T {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Topology `source` value of a node.
#[must_use]
pub fn topology_source(node: NodeId) -> String {
    format!("node{node}")
}

/// Projects styles onto target interfaces and reads them back.
///
/// Failures are logged and swallowed: decoration never decides whether a
/// link is correctly wired.
pub struct StyleSync<'a> {
    nodes: &'a dyn NodeApi,
    topology: &'a dyn TopologyApi,
    capabilities: &'a dyn Capabilities,
}

impl<'a> StyleSync<'a> {
    /// Creates a synchronizer over the given ports.
    #[must_use]
    pub fn new(
        nodes: &'a dyn NodeApi,
        topology: &'a dyn TopologyApi,
        capabilities: &'a dyn Capabilities,
    ) -> Self {
        Self { nodes, topology, capabilities }
    }

    /// Returns `true` when the server stores styles at all.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.capabilities.is_pro()
    }

    /// Writes `style` onto the target interface.
    pub fn push(&self, lab: &str, target: &Endpoint, style: &Style) {
        match self.nodes.set_interface_style(lab, target.node, &target.port, style) {
            Ok(()) => debug!(lab, node = target.node, port = %target.port, "updated link style"),
            Err(err) => warn!(
                lab,
                node = target.node,
                port = %target.port,
                error = %err,
                "failed to update link style"
            ),
        }
    }

    /// Reads the style of the link ending at `target`.
    ///
    /// Returns `None` when the topology has no entry for that interface,
    /// which is distinct from an entry whose fields all took defaults.
    #[must_use]
    pub fn pull(&self, lab: &str, target: &Endpoint) -> Option<Style> {
        let entries = match self.topology.topology(lab) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(lab, error = %err, "failed to read topology for link style");
                return None;
            }
        };
        let source = topology_source(target.node);
        entries
            .iter()
            .find(|entry| {
                entry.source.as_deref() == Some(source.as_str())
                    && entry.source_label.as_deref() == Some(target.port.as_str())
            })
            .map(Style::from_topology)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryLab;

    const LAB: &str = "/style.unl";

    fn entry(source: &str, label: &str) -> TopologyEntry {
        TopologyEntry {
            source: Some(source.into()),
            source_label: Some(label.into()),
            ..TopologyEntry::default()
        }
    }

    #[test]
    fn absent_fields_take_documented_defaults() {
        let style = Style::from_topology(&entry("node2", "e0"));
        assert_eq!(style, Style::default());
    }

    #[test]
    fn unparsable_fields_take_documented_defaults() {
        let mut e = entry("node2", "e0");
        e.width = Some("wide".into());
        e.srcpos = Some(String::new());
        e.linkstyle = Some("Zigzag".into());
        e.color = Some(" ".into());

        let style = Style::from_topology(&e);

        assert_eq!(style.width, 2);
        assert!((style.srcpos - 0.15).abs() < f32::EPSILON);
        assert_eq!(style.linkstyle, Connector::Straight);
        assert_eq!(style.color, "#3e7089");
    }

    #[test]
    fn string_fields_are_parsed() {
        let mut e = entry("node2", "e0");
        e.style = Some("Dashed".into());
        e.color = Some("#ff0000".into());
        e.width = Some("4".into());
        e.dstpos = Some("0.7".into());
        e.linkstyle = Some("Bezier".into());
        e.label = Some("uplink".into());
        e.beziercurviness = Some("90".into());

        let style = Style::from_topology(&e);

        assert_eq!(style.style, LineStyle::Dashed);
        assert_eq!(style.color, "#ff0000");
        assert_eq!(style.width, 4);
        assert!((style.dstpos - 0.7).abs() < f32::EPSILON);
        assert_eq!(style.linkstyle, Connector::Bezier);
        assert_eq!(style.label, "uplink");
        assert_eq!(style.beziercurviness, 90);
    }

    #[test]
    fn pull_finds_entry_by_target_node_and_port() {
        let lab = MemoryLab::new().with_pro(true);
        lab.add_node(LAB, 1, "r1", &["e0"]);
        lab.add_node(LAB, 2, "r2", &["e0", "e1"]);
        let net = lab.add_network(LAB, "n");
        lab.bind_out_of_band(LAB, 1, "e0", net);
        lab.bind_out_of_band(LAB, 2, "e1", net);
        let sync = StyleSync::new(&lab, &lab, &lab);

        let wanted = Style { width: 5, label: "wan".into(), ..Style::default() };
        sync.push(LAB, &Endpoint::new(2, "e1"), &wanted);

        assert_eq!(sync.pull(LAB, &Endpoint::new(2, "e1")), Some(wanted));
        assert_eq!(sync.pull(LAB, &Endpoint::new(2, "e0")), None);
    }

    #[test]
    fn enabled_follows_capability() {
        let lab = MemoryLab::new();
        assert!(!StyleSync::new(&lab, &lab, &lab).enabled());
        let pro = MemoryLab::new().with_pro(true);
        assert!(StyleSync::new(&pro, &pro, &pro).enabled());
    }
}

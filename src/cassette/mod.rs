//! Cassettes: YAML transcripts of lab server traffic for record and replay.

pub mod config;
pub mod format;
pub mod recorder;
pub mod replayer;
pub mod session;

/// Port names used as cassette file stems and interaction tags.
pub mod ports {
    /// Node lookups and interface changes.
    pub const NODES: &str = "nodes";
    /// Network lookups and changes.
    pub const NETWORKS: &str = "networks";
    /// Topology listing.
    pub const TOPOLOGY: &str = "topology";
    /// Server edition probe.
    pub const CAPABILITY: &str = "capability";

    /// Every recorded port.
    pub const ALL: [&str; 4] = [NODES, NETWORKS, TOPOLOGY, CAPABILITY];
}

//! Port traits defining external boundaries.
//!
//! Each trait represents one slice of the remote lab server the reconciler
//! talks to (nodes, networks, topology listing, capability flags) plus the
//! local filesystem used for manifests and state. Implementations live in
//! `src/adapters/`.

pub mod capability;
pub mod error;
pub mod filesystem;
pub mod networks;
pub mod nodes;
pub mod topology;

pub use capability::Capabilities;
pub use error::ApiError;
pub use filesystem::FileSystem;
pub use networks::{Network, NetworkApi, Visibility};
pub use nodes::{Interface, InterfaceSlot, Node, NodeApi};
pub use topology::{TopologyApi, TopologyEntry};

/// Remote-assigned node identifier.
pub type NodeId = i64;

/// Remote-assigned network identifier.
pub type NetworkId = i64;

/// Network id carried by an interface that is not bound to anything.
pub const UNBOUND: NetworkId = 0;

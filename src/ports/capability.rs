//! Capability port for optional server features.

/// Reports optional features advertised by the lab server.
pub trait Capabilities: Send + Sync {
    /// Returns `true` when the server runs the Pro edition, which is the only
    /// edition that stores per-link decoration styles.
    fn is_pro(&self) -> bool;
}

//! Adapter implementations of the port traits.
//!
//! - `live`: the real lab server over HTTP and the real disk.
//! - `recording`: wraps live adapters and captures traffic into cassettes.
//! - `replaying`: serves captured traffic back without a server.
//! - `memory`: an in-process lab server for tests.

pub mod live;
pub mod memory;
pub mod recording;
pub mod replaying;

//! Whole-manifest passes over the state file: apply, refresh, destroy.
//!
//! Each pass walks links one at a time through the [`LinkReconciler`]
//! and saves the state file after every link that changed, so an aborted
//! pass never loses track of what already exists on the server.
//!
//! [`LinkReconciler`]: crate::link::LinkReconciler

pub mod destroy;
pub mod manifest;
pub mod plan;
pub mod refresh;

pub use destroy::destroy_links;
pub use manifest::Manifest;
pub use plan::{execute_apply, format_actions, plan_apply, LinkAction};
pub use refresh::{refresh_links, RefreshReport};

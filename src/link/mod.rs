//! Link reconciliation engine.
//!
//! A link connects a node interface either to a user-owned network or to
//! another node interface. The lab server only knows interfaces plugged into
//! networks, so node-to-node links are realized through a hidden bridge
//! network owned by the link. The submodules build up from validation
//! ([`resolve`]) through single-interface binding ([`binder`]) and implicit
//! network handling ([`implicit`]) to the [`reconcile`] state machine, with
//! [`style`] syncing the Pro-only decoration metadata.

pub mod binder;
mod error;
pub mod implicit;
mod model;
pub mod reconcile;
pub mod resolve;
pub mod style;

pub use error::{DriftKind, LinkError};
pub use model::{Endpoint, EndpointRole, LinkDeclaration, LinkState};
pub use reconcile::{LinkReconciler, Observation};
pub use resolve::{resolve, ResolvedLink, Shape};
pub use style::{Connector, LineStyle, Style};

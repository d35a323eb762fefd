//! Endpoint validation and shape detection.

use super::error::LinkError;
use super::model::{Endpoint, EndpointRole, LinkDeclaration};
use crate::ports::{NetworkId, UNBOUND};

/// How a link is realized on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape<'a> {
    /// The source interface is plugged straight into a user-owned network.
    NodeToNetwork {
        /// The declared network.
        network: NetworkId,
    },
    /// Both interfaces are plugged into a hidden network owned by the link.
    NodeToNode {
        /// The declared target interface.
        target: &'a Endpoint,
    },
}

/// A declaration that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedLink<'a> {
    /// Lab the link lives in.
    pub lab: &'a str,
    /// Source interface.
    pub source: &'a Endpoint,
    /// Realization shape.
    pub shape: Shape<'a>,
}

/// Validates a declaration and determines its shape.
///
/// Runs before any remote call so that malformed declarations never touch the
/// server.
///
/// # Errors
///
/// Returns a validation [`LinkError`] when both or neither targets are
/// declared, when the target network is id 0, when the link connects a node
/// to itself, or when a port is empty.
pub fn resolve(decl: &LinkDeclaration) -> Result<ResolvedLink<'_>, LinkError> {
    let shape = match (decl.network, decl.target.as_ref()) {
        (Some(_), Some(_)) => return Err(LinkError::ConflictingTarget),
        (None, None) => return Err(LinkError::MissingTarget),
        (Some(UNBOUND), None) => return Err(LinkError::UnboundNetwork),
        (Some(network), None) => Shape::NodeToNetwork { network },
        (None, Some(target)) => {
            if target.node == decl.source.node {
                return Err(LinkError::SelfLink { node: target.node });
            }
            if target.port.is_empty() {
                return Err(LinkError::MissingPort { role: EndpointRole::Target });
            }
            Shape::NodeToNode { target }
        }
    };

    if decl.source.port.is_empty() {
        return Err(LinkError::MissingPort { role: EndpointRole::Source });
    }

    Ok(ResolvedLink { lab: &decl.lab, source: &decl.source, shape })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(network: Option<NetworkId>, target: Option<Endpoint>) -> LinkDeclaration {
        LinkDeclaration {
            lab: "/lab.unl".into(),
            source: Endpoint::new(1, "e0"),
            network,
            target,
            style: None,
        }
    }

    #[test]
    fn network_target_resolves_to_node_to_network() {
        let d = decl(Some(3), None);
        let resolved = resolve(&d).unwrap();
        assert_eq!(resolved.shape, Shape::NodeToNetwork { network: 3 });
        assert_eq!(resolved.lab, "/lab.unl");
    }

    #[test]
    fn endpoint_target_resolves_to_node_to_node() {
        let d = decl(None, Some(Endpoint::new(2, "e0")));
        let resolved = resolve(&d).unwrap();
        assert!(matches!(resolved.shape, Shape::NodeToNode { target } if target.node == 2));
    }

    #[test]
    fn both_targets_conflict() {
        let d = decl(Some(3), Some(Endpoint::new(2, "e0")));
        assert!(matches!(resolve(&d), Err(LinkError::ConflictingTarget)));
    }

    #[test]
    fn missing_target_is_rejected() {
        assert!(matches!(resolve(&decl(None, None)), Err(LinkError::MissingTarget)));
    }

    #[test]
    fn network_zero_is_rejected() {
        assert!(matches!(resolve(&decl(Some(0), None)), Err(LinkError::UnboundNetwork)));
    }

    #[test]
    fn self_link_is_rejected() {
        let d = decl(None, Some(Endpoint::new(1, "e1")));
        assert!(matches!(resolve(&d), Err(LinkError::SelfLink { node: 1 })));
    }

    #[test]
    fn empty_ports_are_rejected() {
        let d = decl(None, Some(Endpoint::new(2, "")));
        assert!(matches!(
            resolve(&d),
            Err(LinkError::MissingPort { role: EndpointRole::Target })
        ));

        let mut d = decl(Some(3), None);
        d.source.port.clear();
        assert!(matches!(
            resolve(&d),
            Err(LinkError::MissingPort { role: EndpointRole::Source })
        ));
    }
}

//! Reading every persisted link back from the server.

use tracing::{info, warn};

use crate::context::ServiceContext;
use crate::link::{LinkError, LinkReconciler, Observation};
use crate::store::{StateFile, StateStore};

/// Outcome of a refresh pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Links that read back unchanged.
    pub unchanged: Vec<String>,
    /// Links whose record was repaired silently.
    pub repaired: Vec<String>,
    /// Links dropped from state because their network is gone; the next
    /// apply creates them again.
    pub dropped: Vec<String>,
    /// Links that drifted, with the reason. Their records hold the
    /// observed state.
    pub drifted: Vec<(String, String)>,
}

impl RefreshReport {
    /// Human-readable summary, one line per link that needs attention.
    #[must_use]
    pub fn render(&self) -> String {
        let mut lines = vec![format!(
            "Refreshed {} link(s): {} unchanged, {} repaired, {} dropped, {} drifted.",
            self.unchanged.len() + self.repaired.len() + self.dropped.len() + self.drifted.len(),
            self.unchanged.len(),
            self.repaired.len(),
            self.dropped.len(),
            self.drifted.len(),
        )];
        lines.extend(self.repaired.iter().map(|name| format!("  REPAIRED {name}")));
        lines.extend(self.dropped.iter().map(|name| format!("  DROPPED {name}")));
        lines.extend(self.drifted.iter().map(|(name, why)| format!("  DRIFTED {name}: {why}")));
        lines.join("\n")
    }
}

/// Reads every persisted link and stores what was observed.
///
/// Drift does not stop the pass; a remote failure does, after saving the
/// links refreshed so far.
///
/// # Errors
///
/// Returns an error naming the link at the first remote failure, or if the
/// state file cannot be written.
pub fn refresh_links(
    ctx: &ServiceContext,
    store: &StateStore<'_>,
    state: &mut StateFile,
) -> Result<RefreshReport, String> {
    let reconciler = LinkReconciler::new(ctx);
    let mut report = RefreshReport::default();
    let names: Vec<String> = state.links.keys().cloned().collect();

    let mut failure = None;
    for name in names {
        let Some(prior) = state.links.get(&name) else { continue };
        match reconciler.read(prior) {
            Ok(Observation::Present(observed)) if observed == *prior => report.unchanged.push(name),
            Ok(Observation::Present(observed)) => {
                info!(link = %name, "link record repaired");
                state.links.insert(name.clone(), observed);
                report.repaired.push(name);
            }
            Ok(Observation::Recreate) => {
                info!(link = %name, "link network gone; dropping record");
                state.links.remove(&name);
                report.dropped.push(name);
            }
            Err(LinkError::Drift { observed, kind }) => {
                warn!(link = %name, drift = %kind, "link drifted");
                state.links.insert(name.clone(), *observed);
                report.drifted.push((name, kind.to_string()));
            }
            Err(err) => {
                failure = Some(format!("link {name}: refresh failed: {err}"));
                break;
            }
        }
    }

    store.save(state).map_err(|e| e.to_string())?;
    match failure {
        Some(message) => Err(message),
        None => Ok(report),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::adapters::memory::MemoryLab;
    use crate::link::{Endpoint, LinkDeclaration};
    use crate::ports::UNBOUND;

    const LAB: &str = "/refresh.unl";

    #[test]
    fn refresh_sorts_links_by_outcome() {
        let lab = MemoryLab::new();
        lab.add_node(LAB, 1, "r1", &["e0", "e1", "e2"]);
        lab.add_node(LAB, 2, "r2", &["e0"]);
        lab.add_node(LAB, 3, "r3", &["e0"]);
        let lan = lab.add_network(LAB, "lan");
        let wan = lab.add_network(LAB, "wan");
        let other = lab.add_network(LAB, "other");
        let ctx = ServiceContext::in_memory(&lab);
        let reconciler = LinkReconciler::new(&ctx);
        let net = |port: &str, network| LinkDeclaration {
            lab: LAB.into(),
            source: Endpoint::new(1, port),
            network: Some(network),
            target: None,
            style: None,
        };

        let mut state = StateFile::default();
        state.links.insert("a-steady".into(), reconciler.create(&net("e0", lan)).unwrap());
        state.links.insert("b-unplugged".into(), reconciler.create(&net("e1", lan)).unwrap());
        state.links.insert("c-gone".into(), reconciler.create(&net("e2", wan)).unwrap());
        let pair = LinkDeclaration {
            lab: LAB.into(),
            source: Endpoint::new(2, "e0"),
            network: None,
            target: Some(Endpoint::new(3, "e0")),
            style: None,
        };
        state.links.insert("d-pair".into(), reconciler.create(&pair).unwrap());
        lab.bind_out_of_band(LAB, 1, "e1", UNBOUND);
        lab.remove_network_out_of_band(LAB, wan);
        lab.bind_out_of_band(LAB, 3, "e0", other);
        let store = StateStore::new(ctx.fs.as_ref(), Path::new("/state.yaml"));

        let report = refresh_links(&ctx, &store, &mut state).unwrap();

        assert_eq!(report.unchanged, vec!["a-steady".to_string()]);
        assert_eq!(report.repaired, vec!["b-unplugged".to_string()]);
        assert_eq!(report.dropped, vec!["c-gone".to_string()]);
        assert_eq!(report.drifted.len(), 1);
        assert_eq!(report.drifted[0].0, "d-pair");
        assert_eq!(state.links["b-unplugged"].source, Endpoint::new(1, ""));
        assert!(!state.links.contains_key("c-gone"));
        assert_eq!(store.load().unwrap(), state);
        assert!(report.render().contains("DRIFTED d-pair"));
    }
}

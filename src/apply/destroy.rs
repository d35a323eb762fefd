//! Tearing persisted links down.

use tracing::info;

use crate::context::ServiceContext;
use crate::link::LinkReconciler;
use crate::store::{StateFile, StateStore};

/// Deletes persisted links, all of them or only `only`, saving the state
/// file after each. Returns the names of the deleted links.
///
/// # Errors
///
/// Returns an error if `only` is not persisted, naming the link at the
/// first remote failure, or if the state file cannot be written.
pub fn destroy_links(
    ctx: &ServiceContext,
    store: &StateStore<'_>,
    state: &mut StateFile,
    only: Option<&str>,
) -> Result<Vec<String>, String> {
    let names: Vec<String> = match only {
        Some(name) if !state.links.contains_key(name) => {
            return Err(format!("link {name} is not in the state file"));
        }
        Some(name) => vec![name.to_string()],
        None => state.links.keys().cloned().collect(),
    };

    let reconciler = LinkReconciler::new(ctx);
    for name in &names {
        if let Some(prior) = state.links.get(name) {
            reconciler.delete(prior).map_err(|e| format!("link {name}: delete failed: {e}"))?;
        }
        state.links.remove(name);
        store.save(state).map_err(|e| e.to_string())?;
        info!(link = %name, "destroyed link");
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::adapters::memory::MemoryLab;
    use crate::link::{Endpoint, LinkDeclaration};
    use crate::ports::UNBOUND;

    const LAB: &str = "/destroy.unl";

    fn setup() -> (MemoryLab, ServiceContext, StateFile) {
        let lab = MemoryLab::new();
        lab.add_node(LAB, 1, "r1", &["e0", "e1"]);
        lab.add_node(LAB, 2, "r2", &["e0", "e1"]);
        let ctx = ServiceContext::in_memory(&lab);
        let mut state = StateFile::default();
        {
            let reconciler = LinkReconciler::new(&ctx);
            for port in ["e0", "e1"] {
                let decl = LinkDeclaration {
                    lab: LAB.into(),
                    source: Endpoint::new(1, port),
                    network: None,
                    target: Some(Endpoint::new(2, port)),
                    style: None,
                };
                state.links.insert(format!("link-{port}"), reconciler.create(&decl).unwrap());
            }
        }
        (lab, ctx, state)
    }

    #[test]
    fn destroy_one_leaves_the_rest() {
        let (lab, ctx, mut state) = setup();
        let store = StateStore::new(ctx.fs.as_ref(), Path::new("/state.yaml"));

        let gone = destroy_links(&ctx, &store, &mut state, Some("link-e0")).unwrap();

        assert_eq!(gone, vec!["link-e0".to_string()]);
        assert_eq!(lab.binding(LAB, 1, "e0"), Some(UNBOUND));
        assert_ne!(lab.binding(LAB, 1, "e1"), Some(UNBOUND));
        assert_eq!(store.load().unwrap().links.len(), 1);
    }

    #[test]
    fn destroy_all_empties_the_lab() {
        let (lab, ctx, mut state) = setup();
        let store = StateStore::new(ctx.fs.as_ref(), Path::new("/state.yaml"));

        destroy_links(&ctx, &store, &mut state, None).unwrap();

        assert!(state.links.is_empty());
        assert!(lab.networks_in(LAB).is_empty());
    }

    #[test]
    fn destroying_unknown_link_is_an_error() {
        let (_lab, ctx, mut state) = setup();
        let store = StateStore::new(ctx.fs.as_ref(), Path::new("/state.yaml"));

        let err = destroy_links(&ctx, &store, &mut state, Some("nope")).unwrap_err();

        assert_eq!(err, "link nope is not in the state file");
    }
}

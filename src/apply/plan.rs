//! Planning and executing an apply pass.

use tracing::info;

use super::manifest::Manifest;
use crate::context::ServiceContext;
use crate::link::{resolve, LinkDeclaration, LinkReconciler, LinkState};
use crate::store::{StateFile, StateStore};

/// What an apply pass will do (or did) for a single link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkAction {
    /// Declared but not in the state file.
    Create {
        /// Link name.
        name: String,
    },
    /// Declared and persisted, but the declaration changed.
    Update {
        /// Link name.
        name: String,
    },
    /// The link moved to another lab; it is torn down and built again.
    Replace {
        /// Link name.
        name: String,
        /// Lab the link lives in now.
        from: String,
        /// Lab it moves to.
        to: String,
    },
    /// Persisted but no longer declared.
    Delete {
        /// Link name.
        name: String,
    },
    /// Persisted exactly as declared.
    Unchanged {
        /// Link name.
        name: String,
    },
}

impl LinkAction {
    /// Name of the link the action applies to.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Create { name }
            | Self::Update { name }
            | Self::Replace { name, .. }
            | Self::Delete { name }
            | Self::Unchanged { name } => name,
        }
    }
}

/// Returns `true` when `state` already realizes `decl`.
///
/// A style that is not declared is never compared; the server keeps
/// whatever it has.
fn is_realized(decl: &LinkDeclaration, state: &LinkState) -> bool {
    state.network_id.is_some()
        && decl.lab == state.lab
        && decl.source == state.source
        && decl.target == state.target
        && (decl.target.is_some() || decl.network == state.network_id)
        && (decl.style.is_none() || decl.style == state.style)
}

/// Plans an apply pass: deletes first (in name order), then every declared
/// link in name order.
///
/// # Errors
///
/// Returns an error naming the first link whose declaration is invalid;
/// nothing is planned in that case.
pub fn plan_apply(manifest: &Manifest, state: &StateFile) -> Result<Vec<LinkAction>, String> {
    for (name, decl) in &manifest.links {
        resolve(decl).map_err(|e| format!("link {name}: {e}"))?;
    }

    let deletes = state
        .links
        .keys()
        .filter(|name| !manifest.links.contains_key(*name))
        .map(|name| LinkAction::Delete { name: name.clone() });

    let upserts = manifest.links.iter().map(|(name, decl)| {
        let name = name.clone();
        match state.links.get(&name) {
            None => LinkAction::Create { name },
            Some(prior) if prior.lab != decl.lab => {
                LinkAction::Replace { name, from: prior.lab.clone(), to: decl.lab.clone() }
            }
            Some(prior) if is_realized(decl, prior) => LinkAction::Unchanged { name },
            Some(_) => LinkAction::Update { name },
        }
    });

    Ok(deletes.chain(upserts).collect())
}

/// Executes planned actions in order, saving the state file after every
/// link that changed.
///
/// # Errors
///
/// Returns an error naming the link at the first failure. Links handled
/// before it stay recorded in the state file.
pub fn execute_apply(
    ctx: &ServiceContext,
    store: &StateStore<'_>,
    manifest: &Manifest,
    state: &mut StateFile,
    actions: &[LinkAction],
) -> Result<(), String> {
    let reconciler = LinkReconciler::new(ctx);

    for action in actions {
        let name = action.name();
        match action {
            LinkAction::Unchanged { .. } => continue,
            LinkAction::Create { .. } => {
                let decl = declaration(manifest, name)?;
                let created =
                    reconciler.create(decl).map_err(|e| format!("link {name}: create failed: {e}"))?;
                state.links.insert(name.to_string(), created);
            }
            LinkAction::Update { .. } | LinkAction::Replace { .. } => {
                let decl = declaration(manifest, name)?;
                let prior = state
                    .links
                    .get(name)
                    .ok_or_else(|| format!("link {name}: no persisted state to update"))?;
                let updated = reconciler
                    .update(decl, prior)
                    .map_err(|e| format!("link {name}: update failed: {e}"))?;
                state.links.insert(name.to_string(), updated);
            }
            LinkAction::Delete { .. } => {
                if let Some(prior) = state.links.get(name) {
                    reconciler.delete(prior).map_err(|e| format!("link {name}: delete failed: {e}"))?;
                }
                state.links.remove(name);
            }
        }
        info!(link = name, "saved link state");
        store.save(state).map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn declaration<'m>(manifest: &'m Manifest, name: &str) -> Result<&'m LinkDeclaration, String> {
    manifest.links.get(name).ok_or_else(|| format!("link {name}: not declared in manifest"))
}

/// Formats actions as a human-readable report.
#[must_use]
pub fn format_actions(actions: &[LinkAction]) -> String {
    if actions.is_empty() {
        return "No links declared.".to_string();
    }

    actions
        .iter()
        .map(|action| match action {
            LinkAction::Create { name } => format!("  CREATE {name}"),
            LinkAction::Update { name } => format!("  UPDATE {name}"),
            LinkAction::Replace { name, from, to } => format!("  REPLACE {name} ({from} -> {to})"),
            LinkAction::Delete { name } => format!("  DELETE {name}"),
            LinkAction::Unchanged { name } => format!("  UNCHANGED {name}"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::adapters::memory::MemoryLab;
    use crate::link::Endpoint;
    use crate::ports::UNBOUND;

    const LAB: &str = "/apply.unl";

    fn manifest(yaml: &str) -> Manifest {
        Manifest::parse(yaml).unwrap()
    }

    fn lab() -> MemoryLab {
        let lab = MemoryLab::new();
        lab.add_node(LAB, 1, "r1", &["e0", "e1"]);
        lab.add_node(LAB, 2, "r2", &["e0", "e1"]);
        lab
    }

    const PAIR: &str = "links:\n  core:\n    lab: /apply.unl\n    source: { node: 1, port: e0 }\n    target: { node: 2, port: e0 }\n";

    #[test]
    fn plan_creates_declared_links() {
        let actions = plan_apply(&manifest(PAIR), &StateFile::default()).unwrap();
        assert_eq!(actions, vec![LinkAction::Create { name: "core".into() }]);
    }

    #[test]
    fn plan_deletes_before_creating() {
        let mut state = StateFile::default();
        state.links.insert(
            "zz-old".into(),
            LinkState {
                lab: LAB.into(),
                source: Endpoint::new(1, "e1"),
                target: None,
                network_id: Some(3),
                style: None,
            },
        );

        let actions = plan_apply(&manifest(PAIR), &state).unwrap();

        assert_eq!(
            actions,
            vec![
                LinkAction::Delete { name: "zz-old".into() },
                LinkAction::Create { name: "core".into() },
            ]
        );
    }

    #[test]
    fn plan_rejects_invalid_declaration_by_name() {
        let bad = "links:\n  loop:\n    lab: /apply.unl\n    source: { node: 1, port: e0 }\n    target: { node: 1, port: e1 }\n";
        let err = plan_apply(&manifest(bad), &StateFile::default()).unwrap_err();
        assert_eq!(err, "link loop: cannot link node 1 to itself");
    }

    #[test]
    fn plan_detects_lab_move_as_replace() {
        let mut state = StateFile::default();
        state.links.insert(
            "core".into(),
            LinkState {
                lab: "/old.unl".into(),
                source: Endpoint::new(1, "e0"),
                target: Some(Endpoint::new(2, "e0")),
                network_id: Some(9),
                style: None,
            },
        );

        let actions = plan_apply(&manifest(PAIR), &state).unwrap();

        assert!(matches!(&actions[0], LinkAction::Replace { from, .. } if from == "/old.unl"));
    }

    #[test]
    fn apply_then_replan_is_unchanged_and_port_move_is_update() {
        let lab = lab();
        let ctx = ServiceContext::in_memory(&lab);
        let store = StateStore::new(ctx.fs.as_ref(), Path::new("/state.yaml"));
        let mut state = StateFile::default();
        let first = manifest(PAIR);

        let actions = plan_apply(&first, &state).unwrap();
        execute_apply(&ctx, &store, &first, &mut state, &actions).unwrap();

        assert_eq!(store.load().unwrap(), state);
        assert_eq!(
            plan_apply(&first, &state).unwrap(),
            vec![LinkAction::Unchanged { name: "core".into() }]
        );

        let moved = manifest(&PAIR.replace("node: 1, port: e0", "node: 1, port: e1"));
        let actions = plan_apply(&moved, &state).unwrap();
        assert_eq!(actions, vec![LinkAction::Update { name: "core".into() }]);
        execute_apply(&ctx, &store, &moved, &mut state, &actions).unwrap();

        let network = state.links["core"].network_id;
        assert_eq!(lab.binding(LAB, 1, "e0"), Some(UNBOUND));
        assert_eq!(lab.binding(LAB, 1, "e1"), network);
    }

    #[test]
    fn apply_of_empty_manifest_tears_everything_down() {
        let lab = lab();
        let ctx = ServiceContext::in_memory(&lab);
        let store = StateStore::new(ctx.fs.as_ref(), Path::new("/state.yaml"));
        let mut state = StateFile::default();
        let first = manifest(PAIR);
        let actions = plan_apply(&first, &state).unwrap();
        execute_apply(&ctx, &store, &first, &mut state, &actions).unwrap();

        let empty = Manifest::default();
        let actions = plan_apply(&empty, &state).unwrap();
        execute_apply(&ctx, &store, &empty, &mut state, &actions).unwrap();

        assert!(state.links.is_empty());
        assert!(lab.networks_in(LAB).is_empty());
        assert!(store.load().unwrap().links.is_empty());
    }

    #[test]
    fn failure_keeps_links_done_so_far() {
        let lab = lab();
        let ctx = ServiceContext::in_memory(&lab);
        let store = StateStore::new(ctx.fs.as_ref(), Path::new("/state.yaml"));
        let mut state = StateFile::default();
        let two = manifest(&format!(
            "{PAIR}  zz-broken:\n    lab: /apply.unl\n    source: {{ node: 1, port: e1 }}\n    target: {{ node: 7, port: e0 }}\n"
        ));

        let actions = plan_apply(&two, &state).unwrap();
        let err = execute_apply(&ctx, &store, &two, &mut state, &actions).unwrap_err();

        assert!(err.starts_with("link zz-broken: create failed"));
        let saved = store.load().unwrap();
        assert!(saved.links.contains_key("core"));
        assert!(!saved.links.contains_key("zz-broken"));
    }

    #[test]
    fn format_actions_shows_all_types() {
        let output = format_actions(&[
            LinkAction::Create { name: "a".into() },
            LinkAction::Update { name: "b".into() },
            LinkAction::Replace { name: "c".into(), from: "/x.unl".into(), to: "/y.unl".into() },
            LinkAction::Delete { name: "d".into() },
            LinkAction::Unchanged { name: "e".into() },
        ]);
        assert!(output.contains("CREATE a"));
        assert!(output.contains("UPDATE b"));
        assert!(output.contains("REPLACE c (/x.unl -> /y.unl)"));
        assert!(output.contains("DELETE d"));
        assert!(output.contains("UNCHANGED e"));
        assert_eq!(format_actions(&[]), "No links declared.");
    }
}

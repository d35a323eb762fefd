//! `labsync refresh` command.

use std::path::Path;

use crate::apply::refresh_links;
use crate::context::ServiceContext;
use crate::store::StateStore;

/// Re-reads every persisted link and prints what changed.
///
/// Drifted links are reported and make the command fail, after their
/// observed state has been saved.
///
/// # Errors
///
/// Returns an error string if the state file cannot be loaded or saved, a
/// remote call fails, or any link drifted.
pub fn run_with_context(ctx: &ServiceContext, state: &Path) -> Result<(), String> {
    let store = StateStore::new(ctx.fs.as_ref(), state);
    let mut current = store.load().map_err(|e| e.to_string())?;
    if current.links.is_empty() {
        println!("No links in state.");
        return Ok(());
    }

    let report = refresh_links(ctx, &store, &mut current)?;
    println!("{}", report.render());
    if report.drifted.is_empty() {
        Ok(())
    } else {
        Err(format!("{} link(s) drifted; run apply to repair them", report.drifted.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryLab;
    use crate::link::{Endpoint, LinkDeclaration, LinkReconciler};

    #[test]
    fn drift_fails_the_command_but_saves_state() {
        let lab = MemoryLab::new();
        lab.add_node("/cmd.unl", 1, "r1", &["e0"]);
        lab.add_node("/cmd.unl", 2, "r2", &["e0"]);
        let ctx = ServiceContext::in_memory(&lab);
        let store = StateStore::new(ctx.fs.as_ref(), Path::new("/state.yaml"));
        let mut state = store.load().unwrap();
        let decl = LinkDeclaration {
            lab: "/cmd.unl".into(),
            source: Endpoint::new(1, "e0"),
            network: None,
            target: Some(Endpoint::new(2, "e0")),
            style: None,
        };
        state.links.insert("core".into(), LinkReconciler::new(&ctx).create(&decl).unwrap());
        store.save(&state).unwrap();
        lab.remove_node_out_of_band("/cmd.unl", 2);

        let err = run_with_context(&ctx, Path::new("/state.yaml")).unwrap_err();

        assert!(err.contains("1 link(s) drifted"));
        let saved = store.load().unwrap();
        assert_eq!(saved.links["core"].target, Some(Endpoint::default()));
    }

    #[test]
    fn empty_state_is_a_no_op() {
        let ctx = ServiceContext::in_memory(&MemoryLab::new());
        assert!(run_with_context(&ctx, Path::new("/state.yaml")).is_ok());
    }
}

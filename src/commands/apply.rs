//! `labsync apply` command.

use std::path::Path;

use crate::adapters::live::LiveFileSystem;
use crate::apply::{execute_apply, format_actions, plan_apply, LinkAction, Manifest};
use crate::context::ServiceContext;
use crate::ports::FileSystem;
use crate::store::StateStore;

/// Prints the plan for `manifest` without connecting to the lab.
///
/// # Errors
///
/// Returns an error string if the manifest or state file cannot be loaded,
/// or a declaration is invalid.
pub fn preview(manifest: &Path, state: &Path) -> Result<(), String> {
    let actions = plan(&LiveFileSystem, manifest, state)?.1;
    println!("Dry run, planned actions:");
    println!("{}", format_actions(&actions));
    Ok(())
}

/// Plans and executes `manifest` against the lab behind `ctx`.
///
/// # Errors
///
/// Returns an error string naming the failing link; links handled before
/// it are already saved to the state file.
pub fn run_with_context(ctx: &ServiceContext, manifest: &Path, state: &Path) -> Result<(), String> {
    let (declared, actions) = plan(ctx.fs.as_ref(), manifest, state)?;
    if actions.iter().all(|a| matches!(a, LinkAction::Unchanged { .. })) {
        println!("Nothing to do.");
        return Ok(());
    }

    let store = StateStore::new(ctx.fs.as_ref(), state);
    let mut current = store.load().map_err(|e| e.to_string())?;
    execute_apply(ctx, &store, &declared, &mut current, &actions)?;
    println!("Apply complete:");
    println!("{}", format_actions(&actions));
    Ok(())
}

fn plan(
    fs: &dyn FileSystem,
    manifest: &Path,
    state: &Path,
) -> Result<(Manifest, Vec<LinkAction>), String> {
    let declared = Manifest::load(fs, manifest)?;
    let current = StateStore::new(fs, state).load().map_err(|e| e.to_string())?;
    let actions = plan_apply(&declared, &current)?;
    Ok((declared, actions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryLab;

    const MANIFEST: &str = "links:\n  core:\n    lab: /cmd.unl\n    source: { node: 1, port: e0 }\n    target: { node: 2, port: e0 }\n";

    fn context() -> (MemoryLab, ServiceContext) {
        let lab = MemoryLab::new();
        lab.add_node("/cmd.unl", 1, "r1", &["e0"]);
        lab.add_node("/cmd.unl", 2, "r2", &["e0"]);
        let ctx = ServiceContext::in_memory(&lab);
        ctx.fs.write(Path::new("/links.yaml"), MANIFEST).unwrap();
        (lab, ctx)
    }

    #[test]
    fn apply_records_state_and_is_idempotent() {
        let (lab, ctx) = context();
        let state = Path::new("/state.yaml");

        run_with_context(&ctx, Path::new("/links.yaml"), state).unwrap();
        let saved = StateStore::new(ctx.fs.as_ref(), state).load().unwrap();
        assert!(saved.links["core"].network_id.is_some());

        lab.clear_calls();
        run_with_context(&ctx, Path::new("/links.yaml"), state).unwrap();
        assert!(lab.calls().is_empty());
    }

    #[test]
    fn missing_manifest_is_an_error() {
        let (_lab, ctx) = context();
        let err =
            run_with_context(&ctx, Path::new("/nope.yaml"), Path::new("/state.yaml")).unwrap_err();
        assert!(err.contains("/nope.yaml"));
    }
}

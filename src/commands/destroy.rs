//! `labsync destroy` command.

use std::path::Path;

use crate::apply::destroy_links;
use crate::context::ServiceContext;
use crate::store::StateStore;

/// Tears down every persisted link, or only `link`.
///
/// # Errors
///
/// Returns an error string if the state file cannot be loaded or saved,
/// `link` is unknown, or a remote call fails.
pub fn run_with_context(ctx: &ServiceContext, state: &Path, link: Option<&str>) -> Result<(), String> {
    let store = StateStore::new(ctx.fs.as_ref(), state);
    let mut current = store.load().map_err(|e| e.to_string())?;
    let destroyed = destroy_links(ctx, &store, &mut current, link)?;
    if destroyed.is_empty() {
        println!("No links in state.");
    } else {
        println!("Destroyed:");
        for name in &destroyed {
            println!("  {name}");
        }
    }
    Ok(())
}

//! `labsync topology` command.

use crate::context::ServiceContext;
use crate::ports::{TopologyApi, TopologyEntry};

/// Prints every connection the lab server reports for `lab`.
///
/// # Errors
///
/// Returns an error string if the listing cannot be fetched.
pub fn run_with_context(ctx: &ServiceContext, lab: &str) -> Result<(), String> {
    let entries = ctx.topology.topology(lab).map_err(|e| format!("Failed to list topology: {e}"))?;
    println!("{}", render(lab, &entries));
    Ok(())
}

fn render(lab: &str, entries: &[TopologyEntry]) -> String {
    if entries.is_empty() {
        return format!("No connections in {lab}.");
    }

    let field = |v: &Option<String>| v.clone().unwrap_or_else(|| "?".to_string());
    entries
        .iter()
        .map(|e| {
            let mut line = format!(
                "{} {}:{} -> {}:{} (network {})",
                field(&e.kind),
                field(&e.source),
                field(&e.source_label),
                field(&e.destination),
                field(&e.destination_label),
                field(&e.network_id),
            );
            if let Some(label) = e.label.as_deref().filter(|l| !l.is_empty()) {
                line.push_str(&format!(" \"{label}\""));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

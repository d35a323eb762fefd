//! `labsync show` command.

use std::path::Path;

use crate::adapters::live::LiveFileSystem;
use crate::store::{StateFile, StateStore};

/// Prints the persisted links. Needs no lab server.
///
/// # Errors
///
/// Returns an error string if the state file cannot be read or parsed.
pub fn run(state: &Path) -> Result<(), String> {
    let current = StateStore::new(&LiveFileSystem, state).load().map_err(|e| e.to_string())?;
    println!("{}", render(&current));
    Ok(())
}

fn render(state: &StateFile) -> String {
    if state.links.is_empty() {
        return "No links in state.".to_string();
    }

    let mut lines = vec![format!("{:<20} {:<24} {:<12} {:<12} {}", "NAME", "LAB", "SOURCE", "TARGET", "NETWORK")];
    for (name, link) in &state.links {
        let target = link
            .target
            .as_ref()
            .map_or_else(|| "-".to_string(), |t| format!("{}/{}", t.node, t.port));
        let network = link.network_id.map_or_else(|| "-".to_string(), |id| id.to_string());
        lines.push(format!(
            "{name:<20} {:<24} {:<12} {target:<12} {network}",
            link.lab,
            format!("{}/{}", link.source.node, link.source.port),
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::{Endpoint, LinkState};

    #[test]
    fn renders_one_row_per_link() {
        let mut state = StateFile::default();
        state.links.insert(
            "uplink".into(),
            LinkState {
                lab: "/dc.unl".into(),
                source: Endpoint::new(3, "e1"),
                target: None,
                network_id: Some(4),
                style: None,
            },
        );

        let output = render(&state);

        let row = output.lines().nth(1).unwrap();
        assert!(row.starts_with("uplink"));
        assert!(row.contains("3/e1"));
        assert!(row.trim_end().ends_with('4'));
    }

    #[test]
    fn empty_state_says_so() {
        assert_eq!(render(&StateFile::default()), "No links in state.");
    }
}

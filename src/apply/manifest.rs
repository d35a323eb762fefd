//! Declarative link manifests.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::link::LinkDeclaration;
use crate::ports::FileSystem;

/// Every link the user wants, by name.
///
/// ```yaml
/// links:
///   core:
///     lab: /dc/core.unl
///     source: { node: 1, port: e0 }
///     target: { node: 2, port: e0 }
///   uplink:
///     lab: /dc/core.unl
///     source: { node: 3, port: e1 }
///     network: 4
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Declared links by name.
    #[serde(default)]
    pub links: BTreeMap<String, LinkDeclaration>,
}

impl Manifest {
    /// Parses a manifest from YAML.
    ///
    /// # Errors
    ///
    /// Returns the parser error.
    pub fn parse(yaml: &str) -> Result<Self, String> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| e.to_string())
    }

    /// Reads and parses the manifest at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error naming the file if it cannot be read or parsed.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self, String> {
        let contents = fs
            .read_to_string(path)
            .map_err(|e| format!("Failed to read manifest {}: {e}", path.display()))?;
        Self::parse(&contents).map_err(|e| format!("Failed to parse manifest {}: {e}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::{Endpoint, LineStyle};

    #[test]
    fn parses_both_link_shapes_and_style() {
        let manifest = Manifest::parse(
            "links:\n  core:\n    lab: /dc.unl\n    source: { node: 1, port: e0 }\n    target: { node: 2, port: e0 }\n    style: { style: Dashed, width: 3 }\n  uplink:\n    lab: /dc.unl\n    source: { node: 3, port: e1 }\n    network: 4\n",
        )
        .unwrap();

        let core = &manifest.links["core"];
        assert_eq!(core.target, Some(Endpoint::new(2, "e0")));
        let style = core.style.as_ref().unwrap();
        assert_eq!(style.style, LineStyle::Dashed);
        assert_eq!(style.width, 3);
        assert_eq!(style.color, "#3e7089");
        assert_eq!(manifest.links["uplink"].network, Some(4));
    }

    #[test]
    fn unknown_top_level_keys_are_rejected() {
        assert!(Manifest::parse("link: {}\n").is_err());
    }

    #[test]
    fn empty_manifest_declares_nothing() {
        assert!(Manifest::parse("").unwrap().links.is_empty());
    }
}

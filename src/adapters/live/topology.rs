//! Live adapter for the `TopologyApi` port.

use serde_json::Value;

use super::client::EveClient;
use crate::ports::{ApiError, TopologyApi, TopologyEntry};

/// The listing is an array, or an object keyed by position on some server
/// versions.
fn parse_topology(raw: Value) -> Result<Vec<TopologyEntry>, ApiError> {
    let items = match raw {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        other => return Err(ApiError::Decode(format!("unexpected topology listing: {other}"))),
    };
    items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item).map_err(|e| ApiError::Decode(format!("topology: {e}")))
        })
        .collect()
}

impl TopologyApi for EveClient {
    fn topology(&self, lab: &str) -> Result<Vec<TopologyEntry>, ApiError> {
        let url = self.lab_url(lab, "/topology");
        let raw: Value = self.get(url, &format!("lab {lab}"))?;
        parse_topology(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mixed_scalar_fields_become_strings() {
        let entries = parse_topology(json!([{
            "type": "ethernet",
            "source": "node2",
            "source_label": "e1",
            "network_id": 5,
            "width": "3",
            "srcpos": 0.2,
            "label": null
        }]))
        .unwrap();

        let entry = &entries[0];
        assert_eq!(entry.network_id.as_deref(), Some("5"));
        assert_eq!(entry.width.as_deref(), Some("3"));
        assert_eq!(entry.srcpos.as_deref(), Some("0.2"));
        assert_eq!(entry.label, None);
    }

    #[test]
    fn empty_lab_has_no_entries() {
        assert!(parse_topology(Value::Null).unwrap().is_empty());
        assert!(parse_topology(json!({})).unwrap().is_empty());
    }
}

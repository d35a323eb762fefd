//! Live adapter for the `NetworkApi` port.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::client::EveClient;
use crate::ports::{ApiError, Network, NetworkApi, NetworkId, Visibility};

/// Network attributes as the server reads and writes them.
#[derive(Serialize)]
struct NetworkBody<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    name: &'a str,
    left: i64,
    top: i64,
    icon: &'a str,
    visibility: &'a str,
}

impl<'a> From<&'a Network> for NetworkBody<'a> {
    fn from(network: &'a Network) -> Self {
        Self {
            kind: &network.kind,
            name: &network.name,
            left: network.left,
            top: network.top,
            icon: &network.icon,
            visibility: network.visibility.as_flag(),
        }
    }
}

#[derive(Deserialize)]
struct NetworkReply {
    #[serde(default)]
    name: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    left: Value,
    #[serde(default)]
    top: Value,
    #[serde(default)]
    icon: String,
    #[serde(default)]
    visibility: Value,
}

#[derive(Deserialize)]
struct Created {
    id: Value,
}

fn integer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn network_from_reply(id: NetworkId, reply: NetworkReply) -> Network {
    let visibility = match &reply.visibility {
        Value::Null => Visibility::Visible,
        Value::String(s) => Visibility::from_flag(s),
        other => Visibility::from_flag(&other.to_string()),
    };
    Network {
        id,
        name: reply.name,
        kind: reply.kind,
        visibility,
        left: integer(&reply.left).unwrap_or_default(),
        top: integer(&reply.top).unwrap_or_default(),
        icon: reply.icon,
    }
}

impl NetworkApi for EveClient {
    fn network(&self, lab: &str, id: NetworkId) -> Result<Network, ApiError> {
        let url = self.lab_url(lab, &format!("/networks/{id}"));
        let reply: NetworkReply = self.get(url, &format!("network {id}"))?;
        Ok(network_from_reply(id, reply))
    }

    fn create_network(&self, lab: &str, network: &Network) -> Result<NetworkId, ApiError> {
        let url = self.lab_url(lab, "/networks");
        let created: Created =
            self.post(url, &NetworkBody::from(network), &format!("network {}", network.name))?;
        integer(&created.id)
            .ok_or_else(|| ApiError::Decode(format!("network id {}", created.id)))
    }

    fn update_network(&self, lab: &str, network: &Network) -> Result<(), ApiError> {
        let url = self.lab_url(lab, &format!("/networks/{}", network.id));
        self.put(url, &NetworkBody::from(network), &format!("network {}", network.id))
    }

    fn delete_network(&self, lab: &str, id: NetworkId) -> Result<(), ApiError> {
        let url = self.lab_url(lab, &format!("/networks/{id}"));
        self.delete(url, &format!("network {id}"))
    }
}

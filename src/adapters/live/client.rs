//! Blocking HTTP client for the lab server REST API.

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::ports::{ApiError, Capabilities};

/// Authenticated session against one lab server.
///
/// The session cookie lives in the client's cookie store, so clones share
/// the login.
#[derive(Debug, Clone)]
pub struct EveClient {
    http: Client,
    base: String,
    pro: bool,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    html5: &'a str,
}

/// Response wrapper used by every API endpoint.
#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    code: Value,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Value,
}

#[derive(Deserialize)]
struct Status {
    #[serde(default)]
    version: String,
}

impl EveClient {
    /// Logs in and probes the server edition.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable or rejects the login.
    pub fn connect(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let mut client = Self { http, base: config.host.clone(), pro: false };

        let login = LoginRequest {
            username: &config.username,
            password: &config.password,
            html5: "0",
        };
        let url = format!("{}/api/auth/login", client.base);
        let _: Value = client.send(client.http.post(url).json(&login), "login")?;
        debug!(host = %client.base, user = %config.username, "logged in");

        client.pro = client.probe_pro();
        Ok(client)
    }

    fn probe_pro(&self) -> bool {
        let url = format!("{}/api/status", self.base);
        match self.send::<Status>(self.http.get(url), "server status") {
            Ok(status) => {
                let pro = status.version.to_ascii_lowercase().contains("pro");
                debug!(version = %status.version, pro, "probed server edition");
                pro
            }
            Err(err) => {
                warn!(error = %err, "could not read server status; assuming community edition");
                false
            }
        }
    }

    /// URL of `path` inside `lab`.
    pub(crate) fn lab_url(&self, lab: &str, path: &str) -> String {
        format!("{}/api/labs/{}{path}", self.base, lab.trim_start_matches('/'))
    }

    pub(crate) fn get<T: DeserializeOwned>(&self, url: String, what: &str) -> Result<T, ApiError> {
        self.send(self.http.get(url), what)
    }

    pub(crate) fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        url: String,
        body: &B,
        what: &str,
    ) -> Result<T, ApiError> {
        self.send(self.http.post(url).json(body), what)
    }

    pub(crate) fn put<B: Serialize>(&self, url: String, body: &B, what: &str) -> Result<(), ApiError> {
        let _: Value = self.send(self.http.put(url).json(body), what)?;
        Ok(())
    }

    pub(crate) fn delete(&self, url: String, what: &str) -> Result<(), ApiError> {
        let _: Value = self.send(self.http.delete(url), what)?;
        Ok(())
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T, ApiError> {
        let response = request.send().map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response.text().map_err(|e| ApiError::Transport(e.to_string()))?;
        decode(status, &body, what)
    }
}

impl Capabilities for EveClient {
    fn is_pro(&self) -> bool {
        self.pro
    }
}

/// Unwraps the response envelope of a request about `what`.
fn decode<T: DeserializeOwned>(status: StatusCode, body: &str, what: &str) -> Result<T, ApiError> {
    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::not_found(what));
    }

    let envelope: Option<Envelope> = serde_json::from_str(body).ok();
    if !status.is_success() {
        let message = envelope.map_or_else(|| body.trim().to_string(), |e| e.message);
        return Err(ApiError::Rejected { status: status.as_u16(), message });
    }

    let envelope =
        envelope.ok_or_else(|| ApiError::Decode(format!("{what}: response is not an envelope")))?;
    match envelope_code(&envelope.code) {
        Some(404) => return Err(ApiError::not_found(what)),
        Some(code) if code >= 400 => {
            return Err(ApiError::Rejected { status: code, message: envelope.message });
        }
        _ => {}
    }
    serde_json::from_value(envelope.data).map_err(|e| ApiError::Decode(format!("{what}: {e}")))
}

/// The envelope `code` arrives as a number or a numeric string.
fn envelope_code(code: &Value) -> Option<u16> {
    match code {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_404_is_not_found() {
        let err = decode::<Value>(StatusCode::NOT_FOUND, "", "network 3").unwrap_err();
        assert_eq!(err, ApiError::not_found("network 3"));
    }

    #[test]
    fn envelope_404_is_not_found() {
        let body = r#"{"code":"404","status":"fail","message":"Network not found"}"#;
        let err = decode::<Value>(StatusCode::OK, body, "network 3").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn error_status_carries_server_message() {
        let body = r#"{"code":400,"status":"fail","message":"Invalid network"}"#;
        let err = decode::<Value>(StatusCode::BAD_REQUEST, body, "bind").unwrap_err();
        assert_eq!(err, ApiError::Rejected { status: 400, message: "Invalid network".into() });
    }

    #[test]
    fn data_is_unwrapped() {
        let body = r#"{"code":201,"status":"success","message":"ok","data":{"id":7}}"#;
        let data: Value = decode(StatusCode::CREATED, body, "create network").unwrap();
        assert_eq!(data["id"], 7);
    }

    #[test]
    fn non_json_success_is_a_decode_error() {
        let err = decode::<Value>(StatusCode::OK, "<html>", "topology").unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}

//! remote::creoson
//!
//! Creoson implementation of [`AutomationClient`] over HTTP/JSON.
//!
//! # Wire Format
//!
//! Every call is a `POST` of a JSON envelope to the server URL:
//!
//! ```text
//! {"sessionId": "...", "command": "file", "function": "open", "data": {...}}
//! ```
//!
//! and every response carries a status block:
//!
//! ```text
//! {"status": {"error": false}, "sessionId": "...", "data": {...}}
//! {"status": {"error": true, "message": "No file found"}}
//! ```
//!
//! A `status.error` of `true` maps to [`RemoteError::Server`]; transport
//! failures map to [`RemoteError::Network`]; bodies that do not match the
//! envelope map to [`RemoteError::Protocol`].
//!
//! # Example
//!
//! ```ignore
//! use modelctl::remote::creoson::CreosonClient;
//! use modelctl::remote::AutomationClient;
//!
//! let client = CreosonClient::new("http://localhost:9056/creoson");
//! let session = client.connect().await?;
//! let running = client.is_host_running(&session).await?;
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::traits::{AutomationClient, OpenRequest, RemoteError, SessionId, StartOptions};

/// Default Creoson endpoint.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:9056/creoson";

/// Creoson HTTP client.
#[derive(Debug, Clone)]
pub struct CreosonClient {
    /// HTTP client for making requests
    client: Client,
    /// Full endpoint URL
    url: String,
}

/// Outgoing request envelope.
#[derive(Debug, Serialize)]
struct RequestEnvelope<'a> {
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
    command: &'a str,
    function: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

/// Incoming response envelope.
#[derive(Debug, Deserialize)]
struct ResponseEnvelope {
    status: ResponseStatus,
    #[serde(rename = "sessionId", default)]
    session_id: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ResponseStatus {
    error: bool,
    #[serde(default)]
    message: Option<String>,
}

impl CreosonClient {
    /// Create a client for the given endpoint URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    /// Get the endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one request and unwrap the status block.
    async fn call(
        &self,
        session: Option<&SessionId>,
        command: &str,
        function: &str,
        data: Option<Value>,
    ) -> Result<ResponseEnvelope, RemoteError> {
        let envelope = RequestEnvelope {
            session_id: session.map(SessionId::as_str),
            command,
            function,
            data,
        };

        tracing::debug!(command, function, "creoson request");

        let response = self
            .client
            .post(&self.url)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(command, function, %status, "creoson http failure");
            return Err(RemoteError::Network(format!("HTTP {}", status.as_u16())));
        }

        let body: ResponseEnvelope = response
            .json()
            .await
            .map_err(|e| RemoteError::Protocol(format!("failed to parse response: {}", e)))?;

        if body.status.error {
            let message = body
                .status
                .message
                .clone()
                .unwrap_or_else(|| format!("{}/{} failed", command, function));
            tracing::debug!(command, function, %message, "creoson reported error");
            return Err(RemoteError::Server(message));
        }

        tracing::debug!(command, function, "creoson ok");
        Ok(body)
    }

    /// Send a session-scoped request and return its `data` block.
    async fn call_data(
        &self,
        session: &SessionId,
        command: &str,
        function: &str,
        data: Value,
    ) -> Result<Value, RemoteError> {
        let body = self.call(Some(session), command, function, Some(data)).await?;
        Ok(body.data.unwrap_or(Value::Null))
    }
}

/// Pull a boolean field out of a response `data` block.
fn bool_field(data: &Value, field: &str) -> Result<bool, RemoteError> {
    data.get(field)
        .and_then(Value::as_bool)
        .ok_or_else(|| RemoteError::Protocol(format!("missing boolean field '{}'", field)))
}

#[async_trait]
impl AutomationClient for CreosonClient {
    fn name(&self) -> &'static str {
        "creoson"
    }

    async fn connect(&self) -> Result<SessionId, RemoteError> {
        let body = self.call(None, "connection", "connect", None).await?;
        body.session_id
            .map(SessionId::new)
            .ok_or_else(|| RemoteError::Protocol("connect returned no sessionId".into()))
    }

    async fn declare_compatibility_mode(
        &self,
        session: &SessionId,
        version: u32,
    ) -> Result<(), RemoteError> {
        self.call_data(
            session,
            "creo",
            "set_creo_version",
            json!({ "version": version }),
        )
        .await?;
        Ok(())
    }

    async fn is_host_running(&self, session: &SessionId) -> Result<bool, RemoteError> {
        let data = self
            .call_data(session, "connection", "is_creo_running", json!({}))
            .await?;
        bool_field(&data, "running")
    }

    async fn start_host(
        &self,
        session: &SessionId,
        options: StartOptions,
    ) -> Result<(), RemoteError> {
        self.call_data(
            session,
            "connection",
            "start_creo",
            json!({
                "start_dir": options.start_dir,
                "start_command": options.start_command,
                "retries": options.retries,
                "use_desktop": options.use_desktop,
            }),
        )
        .await?;
        Ok(())
    }

    async fn set_working_directory(
        &self,
        session: &SessionId,
        path: &str,
    ) -> Result<bool, RemoteError> {
        match self
            .call_data(session, "creo", "cd", json!({ "dirname": path }))
            .await
        {
            Ok(_) => Ok(true),
            Err(RemoteError::Server(message)) => {
                tracing::debug!(path, %message, "working directory rejected");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn file_is_loaded(&self, session: &SessionId, name: &str) -> Result<bool, RemoteError> {
        let data = self
            .call_data(session, "file", "exists", json!({ "file": name }))
            .await?;
        bool_field(&data, "exists")
    }

    async fn open_file(
        &self,
        session: &SessionId,
        request: OpenRequest,
    ) -> Result<(), RemoteError> {
        let mut data = json!({
            "file": request.file,
            "display": request.display,
            "activate": request.display,
        });
        if let Some(dirname) = request.dirname {
            data["dirname"] = Value::String(dirname);
        }
        self.call_data(session, "file", "open", data).await?;
        Ok(())
    }

    async fn set_dimension(
        &self,
        session: &SessionId,
        file: &str,
        name: &str,
        value: f64,
    ) -> Result<(), RemoteError> {
        self.call_data(
            session,
            "dimension",
            "set",
            json!({ "file": file, "name": name, "value": value }),
        )
        .await?;
        Ok(())
    }

    async fn set_parameter(
        &self,
        session: &SessionId,
        file: &str,
        name: &str,
        value: &str,
    ) -> Result<(), RemoteError> {
        self.call_data(
            session,
            "parameter",
            "set",
            json!({
                "file": file,
                "name": name,
                "value": value,
                "type": "STRING",
                "no_create": false,
            }),
        )
        .await?;
        Ok(())
    }

    async fn regenerate(&self, session: &SessionId, file: &str) -> Result<(), RemoteError> {
        self.call_data(session, "file", "regenerate", json!({ "file": file }))
            .await?;
        Ok(())
    }

    async fn list_materials(
        &self,
        session: &SessionId,
        file: &str,
    ) -> Result<Vec<String>, RemoteError> {
        let data = self
            .call_data(session, "file", "list_materials", json!({ "file": file }))
            .await?;
        match data.get("materials") {
            // The server omits the field when a model has no materials.
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(v) => serde_json::from_value(v.clone())
                .map_err(|e| RemoteError::Protocol(format!("bad materials list: {}", e))),
        }
    }

    async fn set_current_material(
        &self,
        session: &SessionId,
        file: &str,
        material: &str,
    ) -> Result<(), RemoteError> {
        self.call_data(
            session,
            "file",
            "set_cur_material",
            json!({ "file": file, "material": material }),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_omits_missing_session() {
        let envelope = RequestEnvelope {
            session_id: None,
            command: "connection",
            function: "connect",
            data: None,
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json, json!({"command": "connection", "function": "connect"}));
    }

    #[test]
    fn envelope_includes_session_and_data() {
        let envelope = RequestEnvelope {
            session_id: Some("123"),
            command: "creo",
            function: "cd",
            data: Some(json!({"dirname": "D:/work"})),
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["sessionId"], "123");
        assert_eq!(json["data"]["dirname"], "D:/work");
    }

    #[test]
    fn response_parses_error_without_message() {
        let body: ResponseEnvelope = serde_json::from_str(r#"{"status":{"error":true}}"#).unwrap();
        assert!(body.status.error);
        assert!(body.status.message.is_none());
        assert!(body.session_id.is_none());
    }

    #[test]
    fn bool_field_missing_is_protocol_error() {
        let err = bool_field(&json!({}), "running").unwrap_err();
        assert!(matches!(err, RemoteError::Protocol(_)));
        assert!(bool_field(&json!({"running": true}), "running").unwrap());
    }
}

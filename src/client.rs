use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderValue, USER_AGENT};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::request::QueryRequest;

/// Result of one successful query round trip: the query-specific payload
/// plus the envelope metadata, kept apart so callers can show duration and
/// timestamp without them leaking into the renderable data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryReply {
    pub query: String,
    pub data: Value,
    pub timestamp: String,
    pub duration: String,
    pub summary: Option<String>,
}

/// Liveness of the API service. A failed probe is "unknown", not "down";
/// the health endpoint is opportunistic and never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Up,
    Unknown,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized: the API rejected the supplied username or password")]
    Unauthorized,
    #[error("cannot reach the API service; check the URL and that the service is running")]
    Transport(#[source] reqwest::Error),
    #[error("{message}")]
    Application { code: i64, message: String },
    #[error("could not decode the API response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    query: String,
    data: Value,
    #[serde(default)]
    timestamp: String,
    #[serde(default)]
    duration: String,
    #[serde(default)]
    summary: Option<String>,
}

#[derive(Debug)]
pub struct ApiClient {
    base_url: Url,
    http: Client,
    username: String,
    password: String,
}

impl ApiClient {
    pub fn new(base_url: &str, username: &str, password: &str) -> Result<Self> {
        let parsed = Url::parse(base_url).context("parsing API base URL")?;
        let http = Client::builder()
            .user_agent(HeaderValue::from_static("oltctl/0.1"))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            base_url: parsed,
            http,
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// Executes one query round trip. Exactly one POST, no retries; the
    /// caller decides what a failure means for its result slot.
    pub fn execute(&self, request: &QueryRequest) -> Result<QueryReply, ApiError> {
        let url = self
            .base_url
            .join("api/v1/query")
            .map_err(|_| ApiError::Application {
                code: 0,
                message: "invalid API base URL".to_string(),
            })?;

        log::debug!("POST {} query={}", url, request.query);

        let response = self
            .http
            .post(url)
            .basic_auth(&self.username, Some(&self.password))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(USER_AGENT, HeaderValue::from_static("oltctl/0.1"))
            .json(request)
            .send()
            .map_err(ApiError::Transport)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }

        let body = response.text().map_err(ApiError::Transport)?;
        let envelope: Value = serde_json::from_str(&body)?;

        let code = envelope.get("code").and_then(Value::as_i64).unwrap_or(0);
        if code != 200 {
            let message = envelope
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| "query failed".to_string());
            return Err(ApiError::Application { code, message });
        }

        let payload: Payload =
            serde_json::from_value(envelope.get("data").cloned().unwrap_or(Value::Null))?;

        Ok(QueryReply {
            query: payload.query,
            data: payload.data,
            timestamp: payload.timestamp,
            duration: payload.duration,
            summary: payload.summary,
        })
    }

    /// Probes `GET /health`. Any failure, transport or HTTP, reads as
    /// `Unknown`.
    pub fn health(&self) -> Health {
        let Ok(url) = self.base_url.join("health") else {
            return Health::Unknown;
        };
        match self.http.get(url).send() {
            Ok(resp) if resp.status().is_success() => Health::Up,
            _ => Health::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{ConnectionContext, DeviceModel, QueryParams, build};
    use httpmock::prelude::*;
    use serde_json::json;

    fn request() -> QueryRequest {
        let ctx = ConnectionContext {
            host: "10.0.0.1".into(),
            port: 161,
            community: "public".into(),
            model: DeviceModel::C320,
            username: "admin".into(),
            password: "secret".into(),
        };
        build(&ctx, "onu_list", &QueryParams::default())
    }

    #[test]
    fn sends_basic_auth_and_unwraps_envelope() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v1/query")
                // base64("admin:secret")
                .header("authorization", "Basic YWRtaW46c2VjcmV0")
                .json_body_partial(r#"{"query": "onu_list", "board": 1, "pon": 1}"#);
            then.status(200).json_body(json!({
                "code": 200,
                "status": "OK",
                "data": {
                    "query": "onu_list",
                    "data": [{"onu_id": 1, "name": "Home-A"}],
                    "timestamp": "2024-01-01T00:00:00Z",
                    "duration": "12ms"
                }
            }));
        });

        let client = ApiClient::new(&server.base_url(), "admin", "secret").unwrap();
        let reply = client.execute(&request()).unwrap();

        mock.assert();
        assert_eq!(reply.duration, "12ms");
        assert_eq!(reply.timestamp, "2024-01-01T00:00:00Z");
        assert_eq!(reply.data[0]["name"], "Home-A");
        assert_eq!(reply.summary, None);
    }

    #[test]
    fn http_401_is_an_authentication_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v1/query");
            then.status(401)
                .json_body(json!({"code": 200, "status": "looks fine"}));
        });

        let client = ApiClient::new(&server.base_url(), "admin", "wrong").unwrap();
        let err = client.execute(&request()).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[test]
    fn application_error_surfaces_server_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v1/query");
            then.status(200).json_body(json!({
                "code": 500,
                "status": "error",
                "message": "SNMP timeout on 10.0.0.1"
            }));
        });

        let client = ApiClient::new(&server.base_url(), "admin", "secret").unwrap();
        match client.execute(&request()).unwrap_err() {
            ApiError::Application { code, message } => {
                assert_eq!(code, 500);
                assert_eq!(message, "SNMP timeout on 10.0.0.1");
            }
            other => panic!("expected application error, got {other:?}"),
        }
    }

    #[test]
    fn application_error_without_message_gets_generic_text() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v1/query");
            then.status(200).json_body(json!({"code": 422, "status": "error"}));
        });

        let client = ApiClient::new(&server.base_url(), "admin", "secret").unwrap();
        match client.execute(&request()).unwrap_err() {
            ApiError::Application { message, .. } => assert_eq!(message, "query failed"),
            other => panic!("expected application error, got {other:?}"),
        }
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        // Nothing listens on port 1 in the test environment, so the
        // connection is refused.
        let client = ApiClient::new("http://127.0.0.1:1", "admin", "secret").unwrap();
        let err = client.execute(&request()).unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert!(err.to_string().contains("cannot reach"));
    }

    #[test]
    fn query_round_trip_renders_a_classified_row() {
        use crate::format::Tone;
        use crate::render::{self, Rendered};

        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v1/query");
            then.status(200).json_body(json!({
                "code": 200,
                "status": "OK",
                "data": {
                    "query": "onu_list",
                    "data": [{"onu_id": 1, "name": "Home-A", "status": "Online", "rx_power": "-15.3"}],
                    "duration": "12ms",
                    "timestamp": "2024-01-01T00:00:00Z"
                }
            }));
        });

        let client = ApiClient::new(&server.base_url(), "admin", "secret").unwrap();
        let reply = client.execute(&request()).unwrap();
        let rendered = render::render("onu_list", &reply.data);

        let Rendered::Table { rows, .. } = rendered else {
            panic!("expected a table");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0].text, "1");
        assert_eq!(rows[0][1].text, "Home-A");
        assert_eq!(rows[0][4].text, "-15.30 dBm");
        assert_eq!(rows[0][4].tone, Tone::Positive);
        assert_eq!(rows[0][5].tone, Tone::Positive);
    }

    #[test]
    fn health_probe_distinguishes_up_from_unknown() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/health");
            then.status(200).body("ok");
        });

        let client = ApiClient::new(&server.base_url(), "", "").unwrap();
        assert_eq!(client.health(), Health::Up);

        let dead = ApiClient::new("http://127.0.0.1:1", "", "").unwrap();
        assert_eq!(dead.health(), Health::Unknown);
    }
}

//! GraphQL transport for the GitHub API
//!
//! Uses ureq (sync HTTP); the whole pipeline is single-threaded and blocking.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Request-level failures. All of them are considered transient by discovery.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("GraphQL error: {0}")]
    Graphql(String),
}

/// Executes one GraphQL document and returns its `data` member.
pub trait GraphqlTransport {
    fn execute(&self, query: &str, variables: &Value) -> Result<Value, TransportError>;
}

impl<T: GraphqlTransport + ?Sized> GraphqlTransport for &T {
    fn execute(&self, query: &str, variables: &Value) -> Result<Value, TransportError> {
        (**self).execute(query, variables)
    }
}

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: &'a Value,
}

#[derive(Deserialize)]
struct GraphqlResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphqlErrorEntry>,
}

#[derive(Deserialize)]
struct GraphqlErrorEntry {
    message: String,
}

/// Bearer-token authenticated transport over `ureq`
pub struct UreqTransport {
    endpoint: String,
    token: String,
    agent: ureq::Agent,
}

fn make_agent(timeout: Duration) -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false) // Status codes are mapped to TransportError below
        .timeout_global(Some(timeout))
        .build()
        .new_agent()
}

impl UreqTransport {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
            agent: make_agent(timeout),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl GraphqlTransport for UreqTransport {
    fn execute(&self, query: &str, variables: &Value) -> Result<Value, TransportError> {
        let body = GraphqlRequest { query, variables };

        let response = self
            .agent
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("Authorization", &format!("bearer {}", self.token))
            .header("User-Agent", concat!("ck-harvest/", env!("CARGO_PKG_VERSION")))
            .send_json(&body)
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let message = response.into_body().read_to_string().unwrap_or_default();
            return Err(TransportError::Status { status, message });
        }

        let resp: GraphqlResponse = response
            .into_body()
            .read_json()
            .map_err(|e| TransportError::Parse(e.to_string()))?;

        decode_response(resp)
    }
}

fn decode_response(resp: GraphqlResponse) -> Result<Value, TransportError> {
    if !resp.errors.is_empty() {
        let messages: Vec<_> = resp.errors.into_iter().map(|e| e.message).collect();
        return Err(TransportError::Graphql(messages.join("; ")));
    }
    resp.data
        .ok_or_else(|| TransportError::Parse("response has no data".to_string()))
}

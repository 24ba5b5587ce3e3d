//! Reqwest-based HTTP transport.
//!
//! The manager talks to a [`Transport`] so tests can swap the network for a
//! canned reply; [`HttpTransport`] is the real one.

use crate::config::AuthConfig;
use crate::protocol::request::ApiRequest;
use crate::AuthError;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use tracing::debug;

/// Raw HTTP reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,

    /// Raw response body.
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Reply with a status and UTF-8 body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into().into_bytes(),
        }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body text for the interpreter.
    ///
    /// Error statuses still carry the server's JSON verdict, so only an
    /// error status with nothing in the body is treated as a transport
    /// failure.
    pub fn body_text(&self) -> Result<&str, AuthError> {
        let text = std::str::from_utf8(&self.body)
            .map_err(|e| AuthError::MalformedResponse(format!("Invalid UTF-8 in body: {}", e)))?;
        if !self.is_success() && text.trim().is_empty() {
            return Err(AuthError::Transport(format!(
                "Server returned error code {} with no error details",
                self.status
            )));
        }
        Ok(text)
    }
}

/// Performs one blocking POST.
pub trait Transport: Send + Sync {
    /// Send `request` and return whatever the server answered.
    fn post(&self, request: &ApiRequest) -> Result<ApiResponse, AuthError>;
}

/// Transport over a shared `reqwest` blocking client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    user_agent: String,
}

impl HttpTransport {
    /// Build the client once; it is reused for every call.
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AuthError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            user_agent: build_user_agent(config),
        })
    }

    /// User-Agent sent with every request.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl Transport for HttpTransport {
    fn post(&self, request: &ApiRequest) -> Result<ApiResponse, AuthError> {
        let mut builder = self
            .client
            .post(&request.url)
            .header(USER_AGENT, &self.user_agent)
            .header(CONTENT_TYPE, request.content_type)
            .header(ACCEPT, "application/json");
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .body(request.body.clone())
            .send()
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|e| AuthError::Transport(format!("Failed to read body: {}", e)))?
            .to_vec();

        debug!(kind = ?request.kind, status, bytes = body.len(), "Licensing API replied");
        Ok(ApiResponse { status, body })
    }
}

/// Build a User-Agent string from config.
///
/// Format: `<product>/authlink-<crate version> <app>/<app version>`
pub fn build_user_agent(config: &AuthConfig) -> String {
    format!(
        "{}/authlink-{} {}/{}",
        config.user_agent_product,
        env!("CARGO_PKG_VERSION"),
        config.identity.name,
        config.identity.version
    )
}

//! HTTP transport abstraction.
//!
//! The retry wrapper and the Gemini client only need "POST this JSON, give me
//! the status and body back", so that is all the `Transport` trait exposes.
//! `HttpTransport` is the reqwest-backed implementation; tests swap in stubs.

use async_trait::async_trait;
use std::time::Duration;

/// A JSON POST request.
#[derive(Clone)]
pub struct HttpRequest {
    pub url: String,
    /// Query parameters; may carry secrets, so never logged
    pub query: Vec<(String, String)>,
    pub body: serde_json::Value,
}

impl std::fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<&str> = self.query.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("HttpRequest")
            .field("url", &self.url)
            .field("query_keys", &keys)
            .finish_non_exhaustive()
    }
}

/// A fully-read HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }
}

/// A failure below the HTTP layer: timeout, refused or reset connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFault(pub String);

impl std::fmt::Display for TransportFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Anything that can carry a JSON POST.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Arc<dyn Transport>` so tests can inject stubs).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, request: &HttpRequest) -> Result<HttpResponse, TransportFault>;
}

/// reqwest-backed transport with a per-attempt timeout.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, request: &HttpRequest) -> Result<HttpResponse, TransportFault> {
        let resp = self
            .client
            .post(&request.url)
            .query(&request.query)
            .timeout(self.timeout)
            .json(&request.body)
            .send()
            .await
            // reqwest errors embed the full URL, key included
            .map_err(|e| TransportFault(describe_reqwest_error(&e.without_url())))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| TransportFault(describe_reqwest_error(&e.without_url())))?;

        Ok(HttpResponse { status, body })
    }
}

fn describe_reqwest_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out: {e}")
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        format!("request failed: {e}")
    }
}

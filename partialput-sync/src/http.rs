//! HTTP transport over reqwest.
//!
//! Bodies travel as JSON. Relative request URLs are resolved against the
//! configured base URL; absolute `http(s)://` URLs are used as given.

use crate::error::{SyncError, SyncResult};
use crate::transport::{Method, SyncRequest, Transport};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde_json::Value;
use tracing::debug;

/// Sends sync requests as JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Creates a transport with a default client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Uses a preconfigured client (timeouts, default headers, auth).
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// The URL relative request paths are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            url.trim_start_matches('/')
        )
    }
}

fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Create => reqwest::Method::POST,
        Method::Read => reqwest::Method::GET,
        Method::Update => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: SyncRequest) -> SyncResult<Value> {
        let endpoint = self.endpoint(&request.url);
        debug!(method = request.method.http_verb(), %endpoint, "sending request");

        let mut builder = self
            .client
            .request(http_method(request.method), &endpoint)
            .header(ACCEPT, "application/json");
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;

        if !status.is_success() {
            let body = serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
            return Err(SyncError::Http {
                status: status.as_u16(),
                body,
            });
        }

        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

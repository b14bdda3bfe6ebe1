/*
[INPUT]:  HTTP configuration (base URLs, timeouts)
[OUTPUT]: Configured reqwest client ready for auth and ledger calls
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::http::{Result, WalletError};

/// Default base URL for the platform auth API
const API_BASE_URL: &str = "http://127.0.0.1:8080";
/// Default base URL for the ledger API
const LEDGER_BASE_URL: &str = "http://127.0.0.1:8080";

/// Header carrying a per-request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Upper bound for auth calls; submissions use the transaction timeout instead
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// HTTP client for the platform auth API and the ledger API
#[derive(Debug, Clone)]
pub struct PlatformClient {
    http_client: Client,
    api_base_url: Url,
    ledger_base_url: Url,
}

impl PlatformClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::with_config_and_base_urls(config, API_BASE_URL, LEDGER_BASE_URL)
    }

    /// Create a new client with custom configuration and base URLs
    pub fn with_config_and_base_urls(
        config: ClientConfig,
        api_base_url: &str,
        ledger_base_url: &str,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| WalletError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            api_base_url: parse_base_url(api_base_url)?,
            ledger_base_url: parse_base_url(ledger_base_url)?,
        })
    }

    pub fn api_base_url(&self) -> &Url {
        &self.api_base_url
    }

    pub fn ledger_base_url(&self) -> &Url {
        &self.ledger_base_url
    }

    /// Build request builder for auth endpoints
    pub(crate) fn api_request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        let url = self.api_base_url.join(endpoint.trim_start_matches('/'))?;
        Ok(self.http_client.request(method, url))
    }

    /// Build request builder for ledger endpoints
    pub(crate) fn ledger_request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        let url = self.ledger_base_url.join(endpoint.trim_start_matches('/'))?;
        Ok(self.http_client.request(method, url))
    }

    /// Send a request and return status plus body text.
    ///
    /// Transport failures become [`WalletError::Network`] here so raw reqwest
    /// errors never leave the HTTP layer.
    pub(crate) async fn send_raw(&self, builder: RequestBuilder) -> Result<(StatusCode, String)> {
        let request_id = Uuid::new_v4().to_string();
        let response = builder
            .header(REQUEST_ID_HEADER, &request_id)
            .send()
            .await
            .map_err(|e| {
                warn!(%request_id, error = %e, "request failed");
                WalletError::Network(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WalletError::Network(format!("failed to read response body: {e}")))?;

        debug!(%request_id, status = status.as_u16(), "response received");
        Ok((status, body))
    }

    /// Send a request and decode a 2xx JSON body into `T`
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let (status, body) = self.send_raw(builder).await?;
        if !status.is_success() {
            return Err(WalletError::server_error(status, extract_detail(status, &body)));
        }
        serde_json::from_str(&body)
            .map_err(|e| WalletError::InvalidResponse(format!("unexpected response body: {e}")))
    }
}

/// Pull a human-readable detail out of an error body.
///
/// Looks at `detail`, `message`, `error` and `errorDetail`; falls back to the
/// raw body, then to the status reason.
pub fn extract_detail(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for field in ["detail", "message", "error", "errorDetail"] {
            match value.get(field) {
                Some(serde_json::Value::String(s)) if !s.is_empty() => return s.clone(),
                Some(serde_json::Value::String(_)) | Some(serde_json::Value::Null) | None => {}
                Some(other) => return other.to_string(),
            }
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_string()
}

/// Parse a base URL so that endpoints resolve below its path.
///
/// `https://host/api` becomes `https://host/api/`; without the trailing
/// slash `join` would replace the last segment.
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

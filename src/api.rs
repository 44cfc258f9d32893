//! REST client for the admin dashboard backend.
//!
//! Every dashboard page reads and mutates data through this client. It owns
//! URL normalization, connect-string decoding, auth headers, and the mapping
//! from transport and HTTP failures to user-facing messages. Page
//! controllers never see it directly; they consume the adapters at the
//! bottom of this module through the collaborator contracts.

use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use crate::collab::{CollectionSource, EntityUpdate, Page, RowDelete};
use crate::models::OrderStatus;
use crate::query::ListQuery;
use crate::vocab::Weekday;

/// Default timeout for API requests (30 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout used specifically for the lightweight connectivity test.
const CONNECTIVITY_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// URL normalisation
// ---------------------------------------------------------------------------

/// Normalise the dashboard backend URL:
/// - strip trailing slashes
/// - strip a trailing `/api` segment
/// - ensure a scheme is present (https, or http for localhost)
pub fn normalize_base_url(url: &str) -> String {
    let mut url = url.trim().to_string();

    // Ensure scheme
    if !url.starts_with("http://") && !url.starts_with("https://") {
        if url.starts_with("localhost") || url.starts_with("127.0.0.1") {
            url = format!("http://{url}");
        } else {
            url = format!("https://{url}");
        }
    }

    // Strip trailing slashes
    while url.ends_with('/') {
        url.pop();
    }

    // Strip trailing /api
    if url.ends_with("/api") {
        url.truncate(url.len() - 4);
    }

    // Strip trailing slashes again (in case "/api/" was present)
    while url.ends_with('/') {
        url.pop();
    }

    url
}

// ---------------------------------------------------------------------------
// Connect strings
// ---------------------------------------------------------------------------

/// Decoded workstation pairing string issued by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectInfo {
    pub url: String,
    pub api_key: String,
    pub workstation_id: Option<String>,
}

fn decode_connect_payload(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') {
        return serde_json::from_str::<Value>(trimmed).ok();
    }

    let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.starts_with('{') {
        return serde_json::from_str::<Value>(&compact).ok();
    }
    if compact.len() < 20 {
        return None;
    }

    let base64 = compact.replace('-', "+").replace('_', "/");
    let padded = format!(
        "{}{}",
        base64,
        "=".repeat((4usize.wrapping_sub(base64.len() % 4)) % 4)
    );
    let decoded = BASE64_STANDARD.decode(padded).ok()?;
    serde_json::from_slice::<Value>(&decoded).ok()
}

/// Parse a pairing string: plain JSON or base64url-encoded JSON with
/// `{ "url": ..., "key": ..., "wid": ... }`.
pub fn decode_connect_string(raw: &str) -> Option<ConnectInfo> {
    let payload = decode_connect_payload(raw)?;
    let url = payload
        .get("url")
        .and_then(Value::as_str)
        .map(normalize_base_url)
        .filter(|s| !s.is_empty())?;
    let api_key = payload
        .get("key")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())?;
    let workstation_id = payload
        .get("wid")
        .or_else(|| payload.get("workstationId"))
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    Some(ConnectInfo {
        url,
        api_key,
        workstation_id,
    })
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Transport and HTTP failures, rendered as the messages the dashboard
/// shows its operators.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Cannot reach the dashboard backend at {0}")]
    Unreachable(String),
    #[error("Connection to {0} timed out")]
    Timeout(String),
    #[error("Invalid backend URL: {0}")]
    BadUrl(String),
    #[error("Network error communicating with {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{0}")]
    Http(String),
    #[error("Invalid JSON from the dashboard backend: {0}")]
    BadJson(#[from] serde_json::Error),
    #[error("Failed to create HTTP client: {0}")]
    Client(reqwest::Error),
}

fn transport_error(url: &str, err: reqwest::Error) -> ApiError {
    if err.is_connect() {
        return ApiError::Unreachable(url.to_string());
    }
    if err.is_timeout() {
        return ApiError::Timeout(url.to_string());
    }
    if err.is_builder() {
        return ApiError::BadUrl(url.to_string());
    }
    ApiError::Network {
        url: url.to_string(),
        source: err,
    }
}

/// Convert an HTTP status code into a user-friendly message.
fn status_error(status: StatusCode) -> String {
    match status.as_u16() {
        401 => "API key is invalid or expired".to_string(),
        403 => "Workstation not authorized".to_string(),
        404 => "Backend endpoint not found".to_string(),
        s if s >= 500 => format!("Dashboard server error (HTTP {s})"),
        s => format!("Unexpected response from the dashboard backend (HTTP {s})"),
    }
}

// ---------------------------------------------------------------------------
// Connectivity test
// ---------------------------------------------------------------------------

/// Result of a connectivity test.
#[derive(Debug, serde::Serialize)]
pub struct ConnectivityResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Authenticated HTTP client for the dashboard backend.
pub struct AdminClient {
    base_url: String,
    api_key: String,
    workstation_id: String,
    http: Client,
}

impl AdminClient {
    pub fn new(base_url: &str, api_key: &str, workstation_id: &str) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(ApiError::Client)?;
        Ok(Self {
            base_url: normalize_base_url(base_url),
            api_key: api_key.trim().to_string(),
            workstation_id: workstation_id.trim().to_string(),
            http,
        })
    }

    /// Build a client from a dashboard pairing string.
    pub fn from_connect_string(raw: &str) -> Result<Self, ApiError> {
        let info = decode_connect_string(raw)
            .ok_or_else(|| ApiError::BadUrl("unrecognized connect string".to_string()))?;
        Self::new(
            &info.url,
            &info.api_key,
            info.workstation_id.as_deref().unwrap_or(""),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Test connectivity with a lightweight health-check.
    pub async fn test_connectivity(&self) -> ConnectivityResult {
        let health_url = format!("{}/api/health", self.base_url);
        let client = match Client::builder().timeout(CONNECTIVITY_TIMEOUT).build() {
            Ok(c) => c,
            Err(e) => {
                return ConnectivityResult {
                    success: false,
                    latency_ms: None,
                    error: Some(format!("Failed to create HTTP client: {e}")),
                };
            }
        };

        let start = Instant::now();
        let resp = match client
            .get(&health_url)
            .header("X-Admin-API-Key", &self.api_key)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                return ConnectivityResult {
                    success: false,
                    latency_ms: None,
                    error: Some(transport_error(&self.base_url, e).to_string()),
                };
            }
        };

        let latency = start.elapsed().as_millis() as u64;
        let status = resp.status();
        if status.is_success() {
            info!(latency_ms = latency, "connectivity test passed");
            ConnectivityResult {
                success: true,
                latency_ms: Some(latency),
                error: None,
            }
        } else {
            ConnectivityResult {
                success: false,
                latency_ms: Some(latency),
                error: Some(status_error(status)),
            }
        }
    }

    /// Perform an authenticated request. `path` includes the leading slash,
    /// e.g. `/api/admin/special-items`.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let full_url = format!("{}{path}", self.base_url);

        let mut req = self
            .http
            .request(method, &full_url)
            .header("X-Admin-API-Key", &self.api_key)
            .header("Content-Type", "application/json");
        if !self.workstation_id.is_empty() {
            req = req.header("x-workstation-id", &self.workstation_id);
        }
        if let Some(b) = body {
            req = req.json(b);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| transport_error(&self.base_url, e))?;
        let status = resp.status();

        if !status.is_success() {
            // Preserve validation details so the single error toast says why.
            let body_text = resp.text().await.unwrap_or_default();
            let detail = if let Ok(json) = serde_json::from_str::<Value>(&body_text) {
                let message = json
                    .get("error")
                    .or_else(|| json.get("message"))
                    .and_then(Value::as_str)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| status_error(status));
                let details = json.get("details").or_else(|| json.get("errors")).cloned();
                if let Some(details) = details {
                    format!("{message} (HTTP {}): {}", status.as_u16(), details)
                } else if !body_text.trim().is_empty() && body_text.trim() != message {
                    format!("{message} (HTTP {}): {}", status.as_u16(), body_text.trim())
                } else {
                    format!("{message} (HTTP {})", status.as_u16())
                }
            } else if !body_text.trim().is_empty() {
                format!(
                    "{} (HTTP {}): {}",
                    status_error(status),
                    status.as_u16(),
                    body_text.trim()
                )
            } else {
                format!("{} (HTTP {})", status_error(status), status.as_u16())
            };
            warn!(path, status = status.as_u16(), "backend request failed");
            return Err(ApiError::Http(detail));
        }

        // Return the JSON body, or null for empty 204 responses.
        let body_text = resp.text().await.unwrap_or_default();
        if body_text.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body_text)?)
    }

    /// Fetch one page of a list endpoint. Accepts both the bare page shape
    /// `{ items, total, page, pages }` and the `{ data: ... }` wrapper some
    /// backend routes still use.
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &ListQuery,
    ) -> Result<Page<T>, ApiError> {
        let resp = self.send(Method::GET, &query.to_path(path), None).await?;
        let payload = if resp.get("items").is_some() {
            resp
        } else if let Some(data) = resp.get("data").filter(|d| d.get("items").is_some()) {
            data.clone()
        } else {
            resp
        };
        Ok(serde_json::from_value(payload)?)
    }
}

// ---------------------------------------------------------------------------
// Collaborator adapters
// ---------------------------------------------------------------------------

/// Read adapter for one list endpoint.
pub struct RestCollection<T> {
    client: Arc<AdminClient>,
    path: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> RestCollection<T> {
    pub fn new(client: Arc<AdminClient>, path: &'static str) -> Self {
        Self {
            client,
            path,
            _marker: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> CollectionSource<T> for RestCollection<T> {
    async fn fetch(&self, query: &ListQuery) -> Result<Page<T>, String> {
        self.client
            .get_page(self.path, query)
            .await
            .map_err(|e| e.to_string())
    }
}

/// PATCHes one boolean field on a record (`is_available`, `is_banned`).
pub struct RestFlagUpdate {
    client: Arc<AdminClient>,
    path: &'static str,
    field: &'static str,
}

impl RestFlagUpdate {
    pub fn new(client: Arc<AdminClient>, path: &'static str, field: &'static str) -> Self {
        Self {
            client,
            path,
            field,
        }
    }
}

impl EntityUpdate<bool> for RestFlagUpdate {
    async fn update(&self, id: &str, value: bool) -> Result<(), String> {
        let mut fields = serde_json::Map::new();
        fields.insert(self.field.to_string(), Value::Bool(value));
        let body = Value::Object(fields);
        self.client
            .send(Method::PATCH, &format!("{}/{id}", self.path), Some(&body))
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

/// PATCHes an order's status.
pub struct RestStatusUpdate {
    client: Arc<AdminClient>,
    path: &'static str,
}

impl RestStatusUpdate {
    pub fn new(client: Arc<AdminClient>, path: &'static str) -> Self {
        Self { client, path }
    }
}

impl EntityUpdate<OrderStatus> for RestStatusUpdate {
    async fn update(&self, id: &str, value: OrderStatus) -> Result<(), String> {
        let body = serde_json::json!({ "status": value.as_str() });
        self.client
            .send(Method::PATCH, &format!("{}/{id}", self.path), Some(&body))
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

/// PATCHes a special item's promotion days. Days go over the wire sorted in
/// calendar order so payloads are stable.
pub struct RestDaysUpdate {
    client: Arc<AdminClient>,
    path: &'static str,
}

impl RestDaysUpdate {
    pub fn new(client: Arc<AdminClient>, path: &'static str) -> Self {
        Self { client, path }
    }
}

impl EntityUpdate<HashSet<Weekday>> for RestDaysUpdate {
    async fn update(&self, id: &str, value: HashSet<Weekday>) -> Result<(), String> {
        let mut days: Vec<Weekday> = value.into_iter().collect();
        days.sort();
        let codes: Vec<&str> = days.iter().map(Weekday::as_str).collect();
        let body = serde_json::json!({ "days": codes });
        self.client
            .send(Method::PATCH, &format!("{}/{id}", self.path), Some(&body))
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

/// DELETEs one record.
pub struct RestDelete {
    client: Arc<AdminClient>,
    path: &'static str,
}

impl RestDelete {
    pub fn new(client: Arc<AdminClient>, path: &'static str) -> Self {
        Self { client, path }
    }
}

impl RowDelete for RestDelete {
    async fn delete(&self, id: &str) -> Result<(), String> {
        self.client
            .send(Method::DELETE, &format!("{}/{id}", self.path), None)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

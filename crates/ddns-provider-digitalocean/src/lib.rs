// # DigitalOcean DNS Provider
//
// This crate provides a DigitalOcean DNS provider implementation for the DDNS system.
//
// - ✅ One request per call (list follows pagination)
// - ✅ Full error propagation to the caller (next tick is the retry)
// - ✅ HTTP timeout configured (30 seconds)
// - ✅ Specific error handling for HTTP status codes (401, 403, 404, 429, 5xx)
// - ❌ NO retry, backoff or caching
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
// - Construction fails if the token is empty
//
// ## API Reference
//
// - DigitalOcean API v2: https://docs.digitalocean.com/reference/api/
// - List records:   GET  `/v2/domains/:domain/records?page=N&per_page=M`
// - Create record:  POST `/v2/domains/:domain/records`
// - Update record:  PUT  `/v2/domains/:domain/records/:id`

use async_trait::async_trait;
use ddns_core::traits::{DnsProvider, DnsRecord, RecordRequest};
use ddns_core::{Error, Result};
use serde::Deserialize;
use std::time::Duration;

/// DigitalOcean API base URL
const DIGITALOCEAN_API_BASE: &str = "https://api.digitalocean.com";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Records requested per list page (API maximum)
const PAGE_SIZE: u32 = 200;

/// Upper bound on pages followed for a single domain
const MAX_PAGES: u32 = 100;

#[derive(Deserialize)]
struct ListRecordsResponse {
    domain_records: Vec<DnsRecord>,
    #[serde(default)]
    links: Links,
}

#[derive(Default, Deserialize)]
struct Links {
    #[serde(default)]
    pages: Option<Pages>,
}

#[derive(Deserialize)]
struct Pages {
    #[serde(default)]
    next: Option<String>,
}

#[derive(Deserialize)]
struct RecordResponse {
    domain_record: DnsRecord,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// DigitalOcean DNS provider
///
/// Stateless and single-shot; safe to share across tasks.
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API token.
pub struct DigitalOceanProvider {
    /// DigitalOcean personal access token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API base URL (overridable for tests)
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for DigitalOceanProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigitalOceanProvider")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl DigitalOceanProvider {
    /// Create a new DigitalOcean provider
    ///
    /// # Parameters
    ///
    /// - `api_token`: Personal access token with write scope on domains
    ///
    /// # Security
    ///
    /// The API token will NEVER be logged or displayed in error messages.
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_token, DIGITALOCEAN_API_BASE)
    }

    /// Create a provider talking to a different API endpoint
    pub fn with_base_url(
        api_token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("DigitalOcean API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn records_url(&self, domain: &str) -> String {
        format!("{}/v2/domains/{}/records", self.base_url, domain)
    }

    /// Send a request with auth headers and map transport errors
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| Error::http(format!("DigitalOcean request failed: {}", e)))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::status_error(response).await)
        }
    }

    /// Map an unsuccessful response to a specific error
    async fn status_error(response: reqwest::Response) -> Error {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());

        // DigitalOcean errors look like {"id": "not_found", "message": "..."}
        let detail = match serde_json::from_str::<ApiError>(&body) {
            Ok(ApiError {
                message: Some(message),
                id,
            }) => match id {
                Some(id) => format!("{} ({})", message, id),
                None => message,
            },
            _ => body,
        };

        match status.as_u16() {
            401 | 403 => Error::auth(format!(
                "Invalid API token or insufficient permissions. Status: {} - {}",
                status, detail
            )),
            404 => Error::not_found(format!("{} - {}", status, detail)),
            429 => Error::rate_limited(format!(
                "Rate limit exceeded. Please retry later. Status: {}",
                status
            )),
            500..=599 => Error::provider(
                "digitalocean",
                format!("DigitalOcean server error (transient): {} - {}", status, detail),
            ),
            _ => Error::provider(
                "digitalocean",
                format!("Request failed: {} - {}", status, detail),
            ),
        }
    }
}

#[async_trait]
impl DnsProvider for DigitalOceanProvider {
    async fn list_records(&self, domain: &str) -> Result<Vec<DnsRecord>> {
        let url = self.records_url(domain);
        let mut records = Vec::new();

        for page in 1..=MAX_PAGES {
            tracing::debug!("Listing records for {} (page {})", domain, page);

            let response = self
                .send(
                    self.client
                        .get(&url)
                        .query(&[("page", page), ("per_page", PAGE_SIZE)]),
                )
                .await?;

            let body: ListRecordsResponse = response.json().await.map_err(|e| {
                Error::provider("digitalocean", format!("Failed to parse response: {}", e))
            })?;

            records.extend(body.domain_records);

            let has_next = body.links.pages.and_then(|p| p.next).is_some();
            if !has_next {
                return Ok(records);
            }
        }

        tracing::warn!(
            "Stopped listing {} after {} pages; later records are not considered",
            domain,
            MAX_PAGES
        );
        Ok(records)
    }

    async fn create_record(&self, domain: &str, request: &RecordRequest) -> Result<DnsRecord> {
        tracing::debug!(
            "Creating {} record {} under {}",
            request.record_type,
            request.name,
            domain
        );

        let response = self
            .send(self.client.post(self.records_url(domain)).json(request))
            .await?;

        let body: RecordResponse = response.json().await.map_err(|e| {
            Error::provider("digitalocean", format!("Failed to parse response: {}", e))
        })?;

        Ok(body.domain_record)
    }

    async fn edit_record(
        &self,
        domain: &str,
        id: u64,
        request: &RecordRequest,
    ) -> Result<DnsRecord> {
        tracing::debug!("Editing record {} under {}", id, domain);

        let url = format!("{}/{}", self.records_url(domain), id);
        let response = self.send(self.client.put(url).json(request)).await?;

        let body: RecordResponse = response.json().await.map_err(|e| {
            Error::provider("digitalocean", format!("Failed to parse response: {}", e))
        })?;

        Ok(body.domain_record)
    }

    fn provider_name(&self) -> &'static str {
        "digitalocean"
    }
}

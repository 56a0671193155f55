// # HTTP IP Resolver
//
// This crate provides an HTTP-based IP resolver for the DDNS system.
//
// ## Architecture
//
// Issues one GET against a plaintext "what is my IP" service (e.g.,
// api.ipify.org, icanhazip.com) and returns the response body. The engine
// calls it once per tick; there is no caching and no background polling.
//
// The body is passed through verbatim. Services that append a newline
// will have it carried into the record data, so pick a source that
// returns the bare address.

use async_trait::async_trait;
use ddns_core::traits::IpResolver;
use ddns_core::{Error, Result};
use std::time::Duration;

/// Default request timeout for IP lookups
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP-based public IP resolver
#[derive(Debug, Clone)]
pub struct HttpIpResolver {
    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpResolver {
    /// Create a new HTTP IP resolver
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_HTTP_TIMEOUT)
    }

    /// Create with a custom request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl IpResolver for HttpIpResolver {
    async fn resolve(&self, source: &str) -> Result<String> {
        tracing::debug!("Fetching public IP from {}", source);

        let response = self
            .client
            .get(source)
            .send()
            .await
            .map_err(|e| Error::resolution(source, format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::resolution(
                source,
                format!("Received {} from {}", status.as_u16(), source),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| Error::resolution(source, format!("Failed to read response: {}", e)))
    }
}

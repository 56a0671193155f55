// # DNS Provider Trait
//
// Defines the interface the reconciler uses to read and write DNS records.
//
// ## Implementations
//
// - DigitalOcean: `ddns-provider-digitalocean` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::traits::{DnsProvider, RecordRequest};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let records = provider.list_records("example.com").await?;
//     if records.iter().all(|r| r.name != "home") {
//         provider
//             .create_record("example.com", &RecordRequest::a("home", "1.2.3.4"))
//             .await?;
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The only record type this system manages
pub const RECORD_TYPE_A: &str = "A";

/// A DNS record as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider-assigned record id
    pub id: u64,
    /// Record type ("A", "AAAA", "MX", ...)
    #[serde(rename = "type")]
    pub record_type: String,
    /// Host label relative to the domain (e.g., "home")
    pub name: String,
    /// Record value; an IPv4 address for A records
    pub data: String,
    /// Time-to-live, if reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

/// Body of a create or edit call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRequest {
    /// Record type
    #[serde(rename = "type")]
    pub record_type: String,
    /// Host label relative to the domain
    pub name: String,
    /// Record value
    pub data: String,
}

impl RecordRequest {
    /// Build an A record request pointing `name` at `ip`
    pub fn a(name: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            record_type: RECORD_TYPE_A.to_string(),
            name: name.into(),
            data: ip.into(),
        }
    }
}

/// Trait for DNS provider implementations
///
/// An authenticated handle to a DNS-hosting API. The reconciler shares one
/// instance across every concurrent reconciliation task, so implementations
/// must be `Send + Sync` and hold no per-call mutable state.
///
/// # Contract
///
/// - One API round-trip per call (pagination aside); no retry or backoff.
///   The next tick is the retry.
/// - No caching of records between calls; the reconciler re-reads state
///   before every write.
/// - Never log or display the API token.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List every record of `domain`
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<DnsRecord>)`: All records in provider order
    /// - `Err(Error)`: If the domain is unknown or the request failed
    async fn list_records(&self, domain: &str) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Create a new record under `domain`
    async fn create_record(
        &self,
        domain: &str,
        request: &RecordRequest,
    ) -> Result<DnsRecord, crate::Error>;

    /// Replace the record `id` under `domain`
    async fn edit_record(
        &self,
        domain: &str,
        id: u64,
        request: &RecordRequest,
    ) -> Result<DnsRecord, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

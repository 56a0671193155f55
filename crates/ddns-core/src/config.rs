//! Configuration types for the DDNS system
//!
//! The configuration is a YAML document loaded once at startup:
//!
//! ```yaml
//! token: "dop_v1_..."
//! source: "https://api.ipify.org"
//! interval: 300
//! records:
//!   - domain: example.com
//!     subdomains: [home, vpn]
//! ```
//!
//! After loading it is never mutated; the daemon wraps it in an `Arc` and
//! hands it to the engine.

use serde::Deserialize;
use std::path::Path;

/// Main DDNS configuration
#[derive(Clone, Deserialize)]
pub struct DdnsConfig {
    /// Provider API token
    /// ⚠️ NEVER log this value
    pub token: String,

    /// URL returning the caller's public IP as the whole response body
    pub source: String,

    /// Seconds between reconciliation ticks
    pub interval: u64,

    /// Domains and the subdomains to keep pointed at the current IP
    #[serde(default)]
    pub records: Vec<DomainSpec>,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for DdnsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DdnsConfig")
            .field("token", &"<REDACTED>")
            .field("source", &self.source)
            .field("interval", &self.interval)
            .field("records", &self.records)
            .finish()
    }
}

impl DdnsConfig {
    /// Read, parse and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, crate::Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::config(format!(
                "Error reading config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml_str(&text)
    }

    /// Parse and validate an in-memory YAML document
    pub fn from_yaml_str(text: &str) -> Result<Self, crate::Error> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.token.is_empty() {
            return Err(crate::Error::config("token cannot be empty"));
        }

        if self.source.is_empty() {
            return Err(crate::Error::config("source URL cannot be empty"));
        }

        if !self.source.starts_with("https://") && !self.source.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "source must use HTTP or HTTPS scheme. Got: {}",
                self.source
            )));
        }

        if self.interval == 0 {
            return Err(crate::Error::config("interval must be >= 1 second"));
        }

        for spec in &self.records {
            spec.validate()?;
        }

        Ok(())
    }

    /// Flatten the configured records into ordered (domain, subdomain) pairs
    pub fn targets(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.records.iter().flat_map(|spec| {
            spec.subdomains
                .iter()
                .map(move |subdomain| (spec.domain.as_str(), subdomain.as_str()))
        })
    }

    /// Number of (domain, subdomain) pairs reconciled on every tick
    pub fn target_count(&self) -> usize {
        self.records.iter().map(|spec| spec.subdomains.len()).sum()
    }
}

/// One domain and the subdomain labels kept pointed at the current IP
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DomainSpec {
    /// Domain name as known to the provider (e.g., "example.com")
    pub domain: String,

    /// Host labels under the domain (e.g., "home", "vpn")
    #[serde(default)]
    pub subdomains: Vec<String>,
}

impl DomainSpec {
    /// Create a new domain spec
    pub fn new<I, S>(domain: impl Into<String>, subdomains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            domain: domain.into(),
            subdomains: subdomains.into_iter().map(Into::into).collect(),
        }
    }

    fn validate(&self) -> Result<(), crate::Error> {
        if self.domain.is_empty() {
            return Err(crate::Error::config("record domain cannot be empty"));
        }

        if self.subdomains.iter().any(|s| s.is_empty()) {
            return Err(crate::Error::config(format!(
                "empty subdomain label under {}",
                self.domain
            )));
        }

        Ok(())
    }
}

//! Error types for the DDNS system
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS system
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// YAML deserialization errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The public IP could not be determined
    #[error("IP resolution failed for {url}: {reason}")]
    Resolution {
        /// IP source URL that was queried
        url: String,
        /// Underlying cause (transport error or HTTP status)
        reason: String,
    },

    /// HTTP transport errors (from provider APIs)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Domain or record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an IP resolution error
    pub fn resolution(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resolution {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_error_names_url_and_cause() {
        let err = Error::resolution("https://ip.example", "Received 503");
        let msg = err.to_string();
        assert!(msg.contains("https://ip.example"));
        assert!(msg.contains("503"));
    }

    #[test]
    fn yaml_errors_convert_with_question_mark() {
        fn parse(text: &str) -> Result<serde_yaml::Value> {
            Ok(serde_yaml::from_str(text)?)
        }

        let err = parse("interval: [unclosed").unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
        assert!(err.to_string().starts_with("YAML error"));
    }
}

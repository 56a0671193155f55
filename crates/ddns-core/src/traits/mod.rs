//! Core traits for the DDNS system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpResolver`]: Discover the caller's current public IP
//! - [`DnsProvider`]: List, create and edit DNS records via a provider API

pub mod ip_resolver;
pub mod dns_provider;

pub use ip_resolver::IpResolver;
pub use dns_provider::{DnsProvider, DnsRecord, RECORD_TYPE_A, RecordRequest};

// # IP Resolver Trait
//
// Defines the interface for discovering the caller's current public IP.
//
// ## Implementations
//
// - HTTP plaintext endpoint: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpResolver;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let resolver = /* IpResolver implementation */;
//     let ip = resolver.resolve("https://api.ipify.org").await?;
//     println!("public IP: {}", ip);
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Trait for IP resolver implementations
///
/// A resolver is stateless: the same source may be queried any number of
/// times and every call hits the network. The engine calls it exactly once
/// per tick.
///
/// The returned string is the source's response body as-is. No trimming or
/// address validation happens here; whatever the source returns is what
/// gets compared against, and written to, the DNS records.
#[async_trait]
pub trait IpResolver: Send + Sync {
    /// Fetch the current public IP from `source`
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The full response body
    /// - `Err(Error::Resolution)`: Transport failure or non-2xx status
    async fn resolve(&self, source: &str) -> Result<String, crate::Error>;
}

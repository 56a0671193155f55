// # ddns-core
//
// Core library for the periodic DDNS reconciliation loop.
//
// ## Architecture Overview
//
// This library provides the core functionality for dynamic DNS updates:
// - **IpResolver**: Trait for discovering the current public IP
// - **DnsProvider**: Trait for listing, creating and editing DNS records
// - **reconcile**: Converges one (domain, subdomain) pair on the desired IP
// - **DdnsEngine**: Timer-driven loop that resolves once per tick and fans
//   the IP out to concurrent reconciliations
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from HTTP implementations
// 2. **Stateless**: All state lives in the provider; nothing is cached across ticks
// 3. **Library-First**: All core functionality can be used as a library
// 4. **Idempotency**: Every reconciliation re-reads before it writes

pub mod traits;
pub mod reconciler;
pub mod engine;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use config::{DdnsConfig, DomainSpec};
pub use engine::{BackoffPolicy, DdnsEngine, EngineEvent, FixedInterval, TickSummary};
pub use error::{Error, Result};
pub use reconciler::{ReconcileOutcome, ReconcileStage, ReconciliationTarget, reconcile};
pub use traits::{DnsProvider, DnsRecord, IpResolver, RecordRequest};

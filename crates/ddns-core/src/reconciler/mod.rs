//! Per-record reconciliation
//!
//! One call converges one (domain, subdomain) pair on the desired IP:
//!
//! 1. List the domain's records
//! 2. Find the first record whose name equals the subdomain
//! 3. Same data → nothing to do
//! 4. Different data → edit that record by id
//! 5. No match → create an A record
//!
//! Failures never propagate. They come back as [`ReconcileOutcome::Failed`]
//! and are logged here, so one broken domain cannot affect its siblings.
//! The next tick is the retry.

use crate::traits::{DnsProvider, RecordRequest};
use tracing::{debug, info, warn};

/// One (domain, subdomain, desired IP) triple, built fresh every tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationTarget {
    /// Domain as known to the provider
    pub domain: String,
    /// Host label under the domain
    pub subdomain: String,
    /// IP resolved for the current tick
    pub ip: String,
}

impl ReconciliationTarget {
    /// Create a new target
    pub fn new(
        domain: impl Into<String>,
        subdomain: impl Into<String>,
        ip: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            subdomain: subdomain.into(),
            ip: ip.into(),
        }
    }

    /// Fully-qualified name, for log lines
    pub fn fqdn(&self) -> String {
        format!("{}.{}", self.subdomain, self.domain)
    }
}

/// Provider call that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileStage {
    /// Listing the domain's records
    List,
    /// Creating a missing record
    Create,
    /// Editing a stale record
    Edit,
}

impl std::fmt::Display for ReconcileStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconcileStage::List => f.write_str("list"),
            ReconcileStage::Create => f.write_str("create"),
            ReconcileStage::Edit => f.write_str("edit"),
        }
    }
}

/// Result of reconciling one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Record already pointed at the desired IP (no write issued)
    Unchanged {
        /// Id of the matching record
        record_id: u64,
    },
    /// No record existed; one was created
    Created {
        /// Id assigned by the provider
        record_id: u64,
    },
    /// A stale record was edited in place
    Updated {
        /// Id of the edited record
        record_id: u64,
        /// Data value before the edit
        previous: String,
    },
    /// A provider call failed; nothing further was attempted
    Failed {
        /// Which call failed
        stage: ReconcileStage,
        /// Rendered error
        error: String,
    },
}

impl ReconcileOutcome {
    /// Whether the provider was written to
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Created { .. } | Self::Updated { .. })
    }

    /// Whether a provider call failed
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Converge one target on its desired IP
///
/// Makes one list call, then at most one create or edit call.
pub async fn reconcile(
    provider: &dyn DnsProvider,
    target: &ReconciliationTarget,
) -> ReconcileOutcome {
    let records = match provider.list_records(&target.domain).await {
        Ok(records) => records,
        Err(e) => {
            warn!(
                domain = %target.domain,
                subdomain = %target.subdomain,
                ip = %target.ip,
                "Error getting records for {} from {}: {}",
                target.domain,
                provider.provider_name(),
                e
            );
            return ReconcileOutcome::Failed {
                stage: ReconcileStage::List,
                error: e.to_string(),
            };
        }
    };

    let mut candidates = records.iter().filter(|r| r.name == target.subdomain);
    let existing = candidates.next();

    // First match wins; surface the ambiguity when the provider holds more.
    let extra = candidates.count();
    if extra > 0 {
        warn!(
            domain = %target.domain,
            subdomain = %target.subdomain,
            "Found {} records named {}, only the first (id {}) is reconciled",
            extra + 1,
            target.fqdn(),
            existing.map(|r| r.id).unwrap_or_default()
        );
    }

    let request = RecordRequest::a(&target.subdomain, &target.ip);

    match existing {
        Some(record) if record.data == target.ip => {
            debug!("{} already points at {}", target.fqdn(), target.ip);
            ReconcileOutcome::Unchanged {
                record_id: record.id,
            }
        }
        Some(record) => match provider.edit_record(&target.domain, record.id, &request).await {
            Ok(_) => {
                info!(
                    "Updated {} with IP address {} (was {})",
                    target.fqdn(),
                    target.ip,
                    record.data
                );
                ReconcileOutcome::Updated {
                    record_id: record.id,
                    previous: record.data.clone(),
                }
            }
            Err(e) => {
                warn!(
                    domain = %target.domain,
                    subdomain = %target.subdomain,
                    ip = %target.ip,
                    "Error updating record {} for {}: {}",
                    record.id,
                    target.fqdn(),
                    e
                );
                ReconcileOutcome::Failed {
                    stage: ReconcileStage::Edit,
                    error: e.to_string(),
                }
            }
        },
        None => {
            info!(
                "Could not find record for {} - creating one with IP {}",
                target.fqdn(),
                target.ip
            );
            match provider.create_record(&target.domain, &request).await {
                Ok(created) => {
                    info!("Created {} -> {} (id {})", target.fqdn(), target.ip, created.id);
                    ReconcileOutcome::Created {
                        record_id: created.id,
                    }
                }
                Err(e) => {
                    warn!(
                        domain = %target.domain,
                        subdomain = %target.subdomain,
                        ip = %target.ip,
                        "Error creating record for {}: {}",
                        target.fqdn(),
                        e
                    );
                    ReconcileOutcome::Failed {
                        stage: ReconcileStage::Create,
                        error: e.to_string(),
                    }
                }
            }
        }
    }
}

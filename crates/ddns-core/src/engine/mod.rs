//! Core DDNS engine
//!
//! The DdnsEngine is the polling driver. Every tick it:
//! - Resolves the current public IP once via IpResolver
//! - Fans the IP out to one reconciliation task per (domain, subdomain)
//! - Sleeps for the configured interval, without waiting on those tasks
//!
//! ## Architecture
//!
//! ```text
//!  ┌─────────────┐    ip     ┌──────────────┐
//!  │ IpResolver  │──────────▶│  DdnsEngine  │── EngineEvent ──▶ (monitoring)
//!  └─────────────┘           └──────────────┘
//!                                   │ spawn (per tick)
//!                                   ▼
//!                           ┌───────────────┐
//!                           │  supervisor   │── TickSummary
//!                           │   (JoinSet)   │
//!                           └───────────────┘
//!                          │        │        │
//!                          ▼        ▼        ▼
//!                      reconcile reconcile reconcile ──▶ DnsProvider
//! ```
//!
//! ## Tick Flow
//!
//! 1. Resolve the IP; on failure log, emit `ResolutionFailed`, sleep
//!    (per [`BackoffPolicy`]) and try again next tick
//! 2. Spawn a supervisor owning one task per target
//! 3. Sleep for the interval; the supervisor finishes on its own and emits
//!    `TickCompleted` with the aggregate outcome

use crate::config::DdnsConfig;
use crate::error::Result;
use crate::reconciler::{ReconcileOutcome, ReconciliationTarget, reconcile};
use crate::traits::{DnsProvider, IpResolver};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

/// Capacity of the engine event channel
///
/// When full, new events are dropped with a warning.
pub const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Events emitted by the DdnsEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine started
    Started {
        targets: usize,
        interval_secs: u64,
    },

    /// IP resolution failed; no reconciliation this tick
    ResolutionFailed {
        error: String,
        consecutive_failures: u32,
    },

    /// Reconciliation tasks for a tick were spawned
    TickLaunched {
        tick: u64,
        ip: String,
        targets: usize,
    },

    /// Every reconciliation task of a tick has finished
    TickCompleted(TickSummary),

    /// Engine stopped
    Stopped {
        reason: String,
    },
}

/// Aggregate outcome of one tick's reconciliations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Tick number, starting at 1
    pub tick: u64,
    /// IP every target of this tick was reconciled against
    pub ip: String,
    /// Records already correct
    pub unchanged: usize,
    /// Records created
    pub created: usize,
    /// Records edited
    pub updated: usize,
    /// Targets whose provider calls failed
    pub failed: usize,
}

impl TickSummary {
    fn new(tick: u64, ip: impl Into<String>) -> Self {
        Self {
            tick,
            ip: ip.into(),
            ..Self::default()
        }
    }

    fn record(&mut self, outcome: &ReconcileOutcome) {
        match outcome {
            ReconcileOutcome::Unchanged { .. } => self.unchanged += 1,
            ReconcileOutcome::Created { .. } => self.created += 1,
            ReconcileOutcome::Updated { .. } => self.updated += 1,
            ReconcileOutcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Total number of targets accounted for
    pub fn total(&self) -> usize {
        self.unchanged + self.created + self.updated + self.failed
    }
}

/// Decides how long to sleep after a failed IP resolution
///
/// This is the extension point for backoff or alerting on persistent
/// failure. The default, [`FixedInterval`], keeps the plain polling
/// cadence.
pub trait BackoffPolicy: Send + Sync {
    /// Delay before the next tick
    ///
    /// # Parameters
    ///
    /// - `interval`: The configured polling interval
    /// - `consecutive_failures`: Failures in a row, including this one (>= 1)
    fn next_delay(&self, interval: Duration, consecutive_failures: u32) -> Duration;
}

/// Retry on the next regular tick, whatever the failure count
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedInterval;

impl BackoffPolicy for FixedInterval {
    fn next_delay(&self, interval: Duration, _consecutive_failures: u32) -> Duration {
        interval
    }
}

/// Core DDNS engine
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`]
/// 2. Start with [`DdnsEngine::run()`], which never returns on its own
/// 3. The process is stopped externally
///
/// Embedders and tests can use [`DdnsEngine::run_until()`] to end the loop,
/// or drive single ticks with [`DdnsEngine::tick()`].
///
/// ## Concurrency
///
/// The loop itself is a single task. Reconciliation tasks share the provider
/// through an `Arc` and run unbounded in width; a slow task from one tick may
/// still be running when the next tick starts.
pub struct DdnsEngine {
    /// Immutable configuration
    config: Arc<DdnsConfig>,

    /// IP resolver, called once per tick
    resolver: Box<dyn IpResolver>,

    /// DNS provider shared by all reconciliation tasks
    provider: Arc<dyn DnsProvider>,

    /// Delay policy after resolution failures
    backoff: Box<dyn BackoffPolicy>,

    /// Ticks started so far
    ticks: AtomicU64,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// # Parameters
    ///
    /// - `config`: Validated configuration
    /// - `resolver`: IP resolver implementation
    /// - `provider`: DNS provider implementation
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        config: Arc<DdnsConfig>,
        resolver: Box<dyn IpResolver>,
        provider: Arc<dyn DnsProvider>,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let engine = Self {
            config,
            resolver,
            provider,
            backoff: Box::new(FixedInterval),
            ticks: AtomicU64::new(0),
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Replace the delay policy applied after resolution failures
    pub fn with_backoff(mut self, backoff: Box<dyn BackoffPolicy>) -> Self {
        self.backoff = backoff;
        self
    }

    /// Polling interval
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.config.interval)
    }

    /// Run the engine forever
    pub async fn run(&self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Run the polling loop until `shutdown` resolves
    ///
    /// Reconciliation tasks already spawned are not cancelled; they run to
    /// completion on the runtime.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        info!(
            "Performing Dynamic DNS every {} seconds for {} record(s)...",
            self.config.interval,
            self.config.target_count()
        );
        self.emit_event(EngineEvent::Started {
            targets: self.config.target_count(),
            interval_secs: self.config.interval,
        });

        tokio::pin!(shutdown);
        let mut consecutive_failures: u32 = 0;

        loop {
            let delay = match self.tick().await {
                Ok(_supervisor) => {
                    consecutive_failures = 0;
                    self.interval()
                }
                Err(e) => {
                    consecutive_failures = consecutive_failures.saturating_add(1);
                    warn!("Error getting public IP address: {}", e);
                    self.emit_event(EngineEvent::ResolutionFailed {
                        error: e.to_string(),
                        consecutive_failures,
                    });
                    self.backoff.next_delay(self.interval(), consecutive_failures)
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    self.emit_event(EngineEvent::Stopped {
                        reason: "Shutdown signal".to_string(),
                    });
                    return Ok(());
                }
            }
        }
    }

    /// Run one tick: resolve the IP and launch reconciliation
    ///
    /// Returns as soon as the tasks are spawned. The handle resolves to the
    /// tick's summary once every task has finished; dropping it detaches
    /// the supervisor without cancelling anything.
    ///
    /// # Returns
    ///
    /// - `Ok(JoinHandle<TickSummary>)`: Fan-out launched
    /// - `Err(Error)`: IP resolution failed; no provider call was made
    pub async fn tick(&self) -> Result<JoinHandle<TickSummary>> {
        let ip = self.resolver.resolve(&self.config.source).await?;
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst) + 1;

        let targets: Vec<ReconciliationTarget> = self
            .config
            .targets()
            .map(|(domain, subdomain)| ReconciliationTarget::new(domain, subdomain, ip.as_str()))
            .collect();

        debug!("Tick {}: reconciling {} record(s) against {}", tick, targets.len(), ip);
        self.emit_event(EngineEvent::TickLaunched {
            tick,
            ip: ip.clone(),
            targets: targets.len(),
        });

        let mut tasks = JoinSet::new();
        for target in targets {
            let provider = Arc::clone(&self.provider);
            tasks.spawn(async move { reconcile(provider.as_ref(), &target).await });
        }

        let event_tx = self.event_tx.clone();
        Ok(tokio::spawn(async move {
            let mut summary = TickSummary::new(tick, ip);
            let mut noteworthy = false;

            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok(outcome) => {
                        noteworthy |= outcome.is_write() || outcome.is_failure();
                        summary.record(&outcome);
                    }
                    Err(e) => {
                        error!("Reconciliation task for tick {} aborted: {}", tick, e);
                        noteworthy = true;
                        summary.failed += 1;
                    }
                }
            }

            if noteworthy {
                info!(
                    "Tick {} done for {}: {} created, {} updated, {} unchanged, {} failed",
                    summary.tick,
                    summary.ip,
                    summary.created,
                    summary.updated,
                    summary.unchanged,
                    summary.failed
                );
            } else {
                debug!(
                    "Tick {} done: all {} record(s) already point at {}",
                    summary.tick, summary.unchanged, summary.ip
                );
            }

            send_event(&event_tx, EngineEvent::TickCompleted(summary.clone()));
            summary
        }))
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        send_event(&self.event_tx, event);
    }
}

fn send_event(tx: &mpsc::Sender<EngineEvent>, event: EngineEvent) {
    match tx.try_send(event) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(_)) => {
            warn!("Event channel full, dropping event");
        }
        // Nobody is listening
        Err(mpsc::error::TrySendError::Closed(_)) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_outcomes() {
        let mut summary = TickSummary::new(3, "1.2.3.4");
        summary.record(&ReconcileOutcome::Created { record_id: 1 });
        summary.record(&ReconcileOutcome::Unchanged { record_id: 2 });
        summary.record(&ReconcileOutcome::Failed {
            stage: crate::reconciler::ReconcileStage::List,
            error: "boom".to_string(),
        });

        assert_eq!(summary.tick, 3);
        assert_eq!(summary.created, 1);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn test_fixed_interval_ignores_failure_count() {
        let interval = Duration::from_secs(60);
        assert_eq!(FixedInterval.next_delay(interval, 1), interval);
        assert_eq!(FixedInterval.next_delay(interval, 50), interval);
    }
}

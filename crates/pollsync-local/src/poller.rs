//! Periodic snapshot reconciliation.
//!
//! A `Poller` repeatedly fetches a full snapshot and reconciles a shared store
//! against it. It is the fallback for sources that cannot push change
//! notifications: every cycle rebuilds the correct membership from scratch, so
//! missed or reordered changes heal on the next tick.
//!
//! Cycles never overlap. The wait between cycles is measured from the end of
//! the previous cycle, so a cycle slower than the period delays the next one
//! rather than stacking up.

use std::any::Any;
use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use pollsync_core::{reconcile, Fetcher, Store, SyncError, SyncStats};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

/// Observable state of a poller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PollStatus {
    /// Cycles attempted so far (successful or not)
    pub cycles: u64,
    /// Cycles abandoned because the fetch failed or panicked
    pub failures: u64,
    /// Failures since the last successful sync
    pub consecutive_failures: u64,
    /// Unix timestamp of the last successful sync
    pub last_synced_at: Option<i64>,
    /// Last error message, cleared by the next successful sync
    pub last_error: Option<String>,
    /// Counts from the last successful sync
    pub last_stats: Option<SyncStats>,
}

/// Keeps a store in sync with periodically fetched snapshots.
///
/// The store is shared: other readers and writers may hold the same `Arc`.
/// Polling makes most sense when everyone else treats the store as read-only,
/// since any foreign write is overwritten or deleted by the next cycle.
pub struct Poller<T, F> {
    fetcher: F,
    period: Duration,
    store: Arc<dyn Store<T>>,
    status: watch::Sender<PollStatus>,
    _object: PhantomData<fn() -> T>,
}

impl<T, F> Poller<T, F>
where
    T: Send + 'static,
    F: Fetcher<T> + 'static,
{
    /// Create a poller that syncs `store` from `fetcher` every `period`.
    ///
    /// Fails if `period` is zero.
    pub fn new(fetcher: F, period: Duration, store: Arc<dyn Store<T>>) -> Result<Self, SyncError> {
        if period.is_zero() {
            return Err(SyncError::InvalidConfig(
                "polling period must be greater than zero".to_string(),
            ));
        }

        let (status, _) = watch::channel(PollStatus::default());
        Ok(Self {
            fetcher,
            period,
            store,
            status,
            _object: PhantomData,
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn store(&self) -> &Arc<dyn Store<T>> {
        &self.store
    }

    pub fn status(&self) -> PollStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PollStatus> {
        self.status.subscribe()
    }

    /// Run one fetch + reconcile cycle.
    ///
    /// A failed fetch leaves the store untouched; the error is logged, recorded
    /// in the status and returned. Panics in the fetch or the diff are caught
    /// and reported as `SyncError::Panicked`.
    #[instrument(skip(self), level = "debug")]
    pub async fn poll_once(&self) -> Result<SyncStats, SyncError> {
        let result = self.run_cycle().await;

        match &result {
            Ok(stats) => {
                debug!(
                    listed = stats.listed,
                    added = stats.added,
                    updated = stats.updated,
                    deleted = stats.deleted,
                    "Synced store with snapshot"
                );
                self.status.send_modify(|status| {
                    status.cycles += 1;
                    status.consecutive_failures = 0;
                    status.last_synced_at = Some(chrono::Utc::now().timestamp());
                    status.last_error = None;
                    status.last_stats = Some(*stats);
                });
            }
            Err(e) => {
                error!("Failed to list: {}", e);
                self.status.send_modify(|status| {
                    status.cycles += 1;
                    status.failures += 1;
                    status.consecutive_failures += 1;
                    status.last_error = Some(e.to_string());
                });
            }
        }

        result
    }

    async fn run_cycle(&self) -> Result<SyncStats, SyncError> {
        let snapshot = AssertUnwindSafe(self.fetcher.fetch())
            .catch_unwind()
            .await
            .map_err(|panic| SyncError::Panicked(panic_message(&*panic)))??;

        // No await point past this line: a stop can never interrupt a half-applied diff.
        std::panic::catch_unwind(AssertUnwindSafe(|| {
            reconcile(&*self.store, &snapshot)
        }))
        .map_err(|panic| SyncError::Panicked(panic_message(&*panic)))
    }

    /// Spawn the polling loop on the current tokio runtime and return at once.
    ///
    /// The first cycle starts immediately. Dropping the returned handle
    /// detaches the loop; call `PollerHandle::stop` to end it.
    pub fn start(self) -> PollerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let status = self.subscribe();
        let period = self.period;

        let task = tokio::spawn(async move {
            info!("Poller started (period {:?})", period);
            loop {
                tokio::select! {
                    biased;
                    _ = stopped(&mut shutdown_rx) => break,
                    _ = self.poll_once() => {}
                }

                tokio::select! {
                    biased;
                    _ = stopped(&mut shutdown_rx) => break,
                    _ = tokio::time::sleep(period) => {}
                }
            }
            info!("Poller stopped");
        });

        PollerHandle {
            shutdown: shutdown_tx,
            status,
            task,
        }
    }
}

/// Resolves once shutdown is requested. Never resolves if the handle was dropped.
async fn stopped(shutdown_rx: &mut watch::Receiver<bool>) {
    if shutdown_rx.wait_for(|&stop| stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Handle to a running poller.
pub struct PollerHandle {
    shutdown: watch::Sender<bool>,
    status: watch::Receiver<PollStatus>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn status(&self) -> PollStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PollStatus> {
        self.status.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the loop and wait for it to exit.
    ///
    /// An in-flight fetch is dropped; the store keeps whatever the last
    /// completed cycle wrote.
    pub async fn stop(self) -> Result<(), SyncError> {
        let _ = self.shutdown.send(true);
        self.task
            .await
            .map_err(|e| SyncError::Task(format!("poller task failed: {}", e)))
    }
}

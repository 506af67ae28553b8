//! The message-correlated dispatch layer.
//!
//! The dispatcher is the only owner of the pending-request table and the
//! worker handle. Every request gets a fresh correlation id, a oneshot
//! resolution channel registered under that id, and an independent timeout.
//! A router task drains the worker's reply channel and resolves pending
//! entries purely by id — completion order never matters.
//!
//! Lifecycle: the worker is created lazily on first use. If it terminates
//! without acknowledging a shutdown, every outstanding request is rejected
//! with the fault, the table is cleared and the next `send` starts a fresh
//! worker with a fresh table.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use appraise_core::{CalculationOutput, CalculationParameters};

use crate::error::{EngineError, EngineResult};
use crate::protocol::{CalculationRequest, CorrelationId, WorkerMessage, WorkerReply};
use crate::worker;

/// A registered request awaiting its result.
struct PendingRequest {
    resolve: oneshot::Sender<EngineResult<CalculationOutput>>,
    issued_at: Instant,
}

type PendingTable = Arc<DashMap<CorrelationId, PendingRequest>>;

/// Handle to one worker generation.
struct WorkerLink {
    request_tx: channel::Sender<WorkerMessage>,
    pending: PendingTable,
    router: tokio::task::JoinHandle<()>,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[derive(Default)]
struct Counters {
    total: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    timed_out: AtomicU64,
}

/// Observability snapshot of the dispatcher. Never used for control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchStatus {
    /// Whether a worker is currently alive.
    pub started: bool,
    /// Requests awaiting a result right now.
    pub pending_count: usize,
    /// Requests issued over the dispatcher's lifetime.
    pub total_requests: u64,
    /// Requests that resolved successfully.
    pub completed: u64,
    /// Requests that resolved with a failure.
    pub failed: u64,
    /// Requests whose timeout elapsed first.
    pub timed_out: u64,
}

/// The message-correlated dispatcher.
pub struct Dispatcher {
    default_timeout: Duration,
    link: Arc<Mutex<Option<WorkerLink>>>,
    counters: Arc<Counters>,
}

impl Dispatcher {
    /// Creates a dispatcher; the worker itself starts lazily.
    #[must_use]
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            default_timeout,
            link: Arc::new(Mutex::new(None)),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Ensures the worker is running.
    ///
    /// Idempotent: an already-running worker is reused. The router task is
    /// spawned on the ambient Tokio runtime, hence the async signature.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ExecutionContextUnavailable`] when the worker
    /// thread cannot be spawned.
    pub async fn start(&self) -> EngineResult<()> {
        self.ensure_started().map(|_| ())
    }

    /// Dispatches one calculation and suspends the caller until its result,
    /// failure, or timeout.
    ///
    /// A timed-out request is unregistered immediately; its late-arriving
    /// result, if any, is discarded by the router with no observable
    /// effect.
    pub async fn send(
        &self,
        params: CalculationParameters,
        timeout: Option<Duration>,
    ) -> EngineResult<CalculationOutput> {
        let (request_tx, pending) = self.ensure_started()?;

        let id = CorrelationId::new();
        let (resolve_tx, resolve_rx) = oneshot::channel();
        pending.insert(
            id,
            PendingRequest {
                resolve: resolve_tx,
                issued_at: Instant::now(),
            },
        );
        self.counters.total.fetch_add(1, Ordering::Relaxed);

        let request = CalculationRequest { id, params };
        debug!(%id, kind = %request.params.kind(), "dispatching calculation");

        if request_tx.send(WorkerMessage::Calculate(request)).is_err() {
            pending.remove(&id);
            self.counters.failed.fetch_add(1, Ordering::Relaxed);
            return Err(EngineError::ExecutionContextCrashed(
                "request channel closed".into(),
            ));
        }

        let timeout_dur = timeout.unwrap_or(self.default_timeout);
        match tokio::time::timeout(timeout_dur, resolve_rx).await {
            Ok(Ok(Ok(output))) => {
                self.counters.completed.fetch_add(1, Ordering::Relaxed);
                Ok(output)
            }
            Ok(Ok(Err(error))) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                Err(error)
            }
            Ok(Err(_closed)) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                Err(EngineError::ExecutionContextCrashed(
                    "result channel closed before resolution".into(),
                ))
            }
            Err(_elapsed) => {
                pending.remove(&id);
                self.counters.timed_out.fetch_add(1, Ordering::Relaxed);
                Err(EngineError::Timeout {
                    timeout_ms: timeout_dur.as_millis() as u64,
                })
            }
        }
    }

    /// Returns the observability snapshot.
    #[must_use]
    pub fn status(&self) -> DispatchStatus {
        let guard = self.link.lock();
        DispatchStatus {
            started: guard.is_some(),
            pending_count: guard.as_ref().map_or(0, |l| l.pending.len()),
            total_requests: self.counters.total.load(Ordering::Relaxed),
            completed: self.counters.completed.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            timed_out: self.counters.timed_out.load(Ordering::Relaxed),
        }
    }

    /// Terminates the worker: sends the cleanup signal, awaits its
    /// acknowledgment, rejects anything still outstanding and joins the
    /// thread. A no-op when already shut down; a later `send` starts a
    /// fresh worker.
    pub async fn shutdown(&self) {
        let taken = self.link.lock().take();
        let Some(link) = taken else {
            debug!("shutdown: no worker running");
            return;
        };

        info!("shutting down execution context");
        let WorkerLink {
            request_tx,
            pending: _,
            router,
            mut thread,
        } = link;

        // A crashed worker has already severed the channel; the router has
        // then already finished
        let _ = request_tx.send(WorkerMessage::Shutdown);
        let _ = router.await;

        if let Some(handle) = thread.take() {
            let _ = tokio::task::spawn_blocking(move || handle.join()).await;
        }
        info!("execution context stopped");
    }

    fn ensure_started(&self) -> EngineResult<(channel::Sender<WorkerMessage>, PendingTable)> {
        let mut guard = self.link.lock();
        if let Some(link) = guard.as_ref() {
            return Ok((link.request_tx.clone(), link.pending.clone()));
        }

        let (request_tx, request_rx) = channel::unbounded();
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();

        let thread = worker::spawn(request_rx, reply_tx)
            .map_err(|e| EngineError::ExecutionContextUnavailable(e.to_string()))?;

        let pending: PendingTable = Arc::new(DashMap::new());
        let router = tokio::spawn(route_replies(
            reply_rx,
            pending.clone(),
            self.link.clone(),
        ));

        info!("execution context started");
        *guard = Some(WorkerLink {
            request_tx: request_tx.clone(),
            pending: pending.clone(),
            router,
            thread: Some(thread),
        });
        Ok((request_tx, pending))
    }
}

/// Drains worker replies, resolving pending entries by correlation id.
///
/// Ends on shutdown acknowledgment or when the reply channel is severed;
/// the latter is a crash, which rejects every outstanding request and
/// clears the worker slot so the next `send` recreates it.
async fn route_replies(
    mut replies: mpsc::UnboundedReceiver<WorkerReply>,
    pending: PendingTable,
    link: Arc<Mutex<Option<WorkerLink>>>,
) {
    while let Some(reply) = replies.recv().await {
        match reply {
            WorkerReply::Result(result) => match pending.remove(&result.id) {
                Some((_, entry)) => {
                    let outcome = result.outcome.map_err(EngineError::CalculationFailed);
                    // The receiver may be gone (timed-out caller); either
                    // way the entry is already unregistered
                    let _ = entry.resolve.send(outcome);
                }
                None => {
                    debug!(id = %result.id, "discarding result for unregistered correlation id");
                }
            },
            WorkerReply::ShutdownAck => {
                reject_all(&pending, || EngineError::ShuttingDown);
                return;
            }
        }
    }

    warn!("worker terminated unexpectedly; rejecting outstanding requests");
    reject_all(&pending, || {
        EngineError::ExecutionContextCrashed("worker thread terminated unexpectedly".into())
    });

    // Clear the slot only if it still refers to this generation
    let mut guard = link.lock();
    if let Some(current) = guard.as_ref() {
        if Arc::ptr_eq(&current.pending, &pending) {
            *guard = None;
        }
    }
}

fn reject_all(pending: &DashMap<CorrelationId, PendingRequest>, error: impl Fn() -> EngineError) {
    let ids: Vec<CorrelationId> = pending.iter().map(|entry| *entry.key()).collect();
    for id in ids {
        if let Some((_, entry)) = pending.remove(&id) {
            debug!(%id, pending_for = ?entry.issued_at.elapsed(), "rejecting outstanding request");
            let _ = entry.resolve.send(Err(error()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appraise_core::{CashFlowSeries, NpvParams, PaybackParams};

    fn npv_params() -> CalculationParameters {
        CalculationParameters::Npv(NpvParams {
            cash_flows: CashFlowSeries::new(vec![100.0, 100.0, 100.0]).unwrap(),
            discount_rate: 0.1,
            initial_investment: 200.0,
        })
    }

    #[tokio::test]
    async fn test_lazy_start_and_send() {
        let dispatcher = Dispatcher::new(Duration::from_secs(5));
        assert!(!dispatcher.status().started);

        let output = dispatcher.send(npv_params(), None).await.unwrap();
        assert!(matches!(output, CalculationOutput::Npv(_)));
        assert!(dispatcher.status().started);

        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let dispatcher = Dispatcher::new(Duration::from_secs(5));
        dispatcher.start().await.unwrap();
        dispatcher.start().await.unwrap();
        assert!(dispatcher.status().started);
        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_failure_is_per_request() {
        let dispatcher = Dispatcher::new(Duration::from_secs(5));

        let bad = CalculationParameters::PaybackPeriod(PaybackParams {
            cash_flows: CashFlowSeries::new(vec![100.0]).unwrap(),
            initial_investment: f64::NAN,
        });
        let error = dispatcher.send(bad, None).await.unwrap_err();
        assert!(matches!(error, EngineError::CalculationFailed(_)));

        // The worker survives a failed calculation
        let output = dispatcher.send(npv_params(), None).await.unwrap();
        assert!(matches!(output, CalculationOutput::Npv(_)));

        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_timeout_unregisters_and_late_result_is_discarded() {
        let dispatcher = Dispatcher::new(Duration::from_secs(5));

        // A zero timeout elapses before the router can possibly resolve
        let error = dispatcher
            .send(npv_params(), Some(Duration::ZERO))
            .await
            .unwrap_err();
        assert!(error.is_timeout());

        let status = dispatcher.status();
        assert_eq!(status.timed_out, 1);
        assert_eq!(status.pending_count, 0);

        // The worker's late reply for the unregistered id must not disturb
        // subsequent traffic
        let output = dispatcher.send(npv_params(), None).await.unwrap();
        assert!(matches!(output, CalculationOutput::Npv(_)));
        assert_eq!(dispatcher.status().completed, 1);

        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent_and_restartable() {
        let dispatcher = Dispatcher::new(Duration::from_secs(5));
        dispatcher.send(npv_params(), None).await.unwrap();

        dispatcher.shutdown().await;
        assert!(!dispatcher.status().started);
        dispatcher.shutdown().await;

        // Lazy start brings up a fresh worker
        let output = dispatcher.send(npv_params(), None).await.unwrap();
        assert!(matches!(output, CalculationOutput::Npv(_)));
        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_status_counters() {
        let dispatcher = Dispatcher::new(Duration::from_secs(5));

        dispatcher.send(npv_params(), None).await.unwrap();
        dispatcher.send(npv_params(), None).await.unwrap();
        let bad = CalculationParameters::PaybackPeriod(PaybackParams {
            cash_flows: CashFlowSeries::new(vec![100.0]).unwrap(),
            initial_investment: f64::INFINITY,
        });
        let _ = dispatcher.send(bad, None).await;

        let status = dispatcher.status();
        assert_eq!(status.total_requests, 3);
        assert_eq!(status.completed, 2);
        assert_eq!(status.failed, 1);
        assert_eq!(status.timed_out, 0);

        dispatcher.shutdown().await;
    }
}

//! Bounded-concurrency task runner shared by the enumeration probes.
//!
//! Every candidate is probed exactly once with at most `concurrency` probes in
//! flight. Completions are collected in whatever order they arrive; the
//! progress counter is bumped once per candidate no matter how the probe ends
//! (result, no result, or panic).

use crate::core::error::{Result, ScanError};
use crate::core::models::{ModuleKind, ScanEvent, StatusLevel};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Semaphore, mpsc};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// One kind of network check, applied to one candidate at a time.
///
/// Returning `None` means "not interesting": refused connections, timeouts,
/// NXDOMAIN and the like all end up there instead of being raised.
pub trait Probe: Send + Sync + 'static {
    type Candidate: Send + 'static;
    type Output: Display + Send + 'static;

    fn probe(&self, candidate: Self::Candidate) -> impl Future<Output = Option<Self::Output>> + Send;
}

/// Optional sender for live scan events. Send failures are ignored.
#[derive(Debug, Clone, Default)]
pub struct EventSink(Option<mpsc::UnboundedSender<ScanEvent>>);

impl EventSink {
    pub fn new(tx: mpsc::UnboundedSender<ScanEvent>) -> Self {
        Self(Some(tx))
    }

    pub fn disabled() -> Self {
        Self(None)
    }

    pub fn emit(&self, event: ScanEvent) {
        if let Some(tx) = &self.0 {
            let _ = tx.send(event);
        }
    }

    pub fn status(&self, module: ModuleKind, level: StatusLevel, message: impl Into<String>) {
        self.emit(ScanEvent::Status { module, level, message: message.into() });
    }

    pub fn found(&self, module: ModuleKind, message: impl Into<String>) {
        self.emit(ScanEvent::Found { module, message: message.into() });
    }
}

/// Shared handles every module receives: the event side channel and the
/// cancellation token.
#[derive(Debug, Clone, Default)]
pub struct ScanContext {
    pub events: EventSink,
    pub cancel: CancellationToken,
}

impl ScanContext {
    pub fn new(events: EventSink, cancel: CancellationToken) -> Self {
        Self { events, cancel }
    }

    /// A context with no listener and a token nobody cancels.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[derive(Debug, Clone, Default)]
struct ProgressCounter(Arc<AtomicUsize>);

impl ProgressCounter {
    fn increment(&self) -> usize {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn get(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }
}

// Counts the candidate when the task is torn down, including on unwind.
struct CompletionGuard(ProgressCounter);

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.0.increment();
    }
}

/// What a bounded run produced. `results` has no particular order.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome<T> {
    pub results: Vec<T>,
    pub total: usize,
    pub processed: usize,
    pub cancelled: bool,
}

impl<T> RunOutcome<T> {
    pub fn empty() -> Self {
        Self { results: Vec::new(), total: 0, processed: 0, cancelled: false }
    }
}

/// Runs a [`Probe`] over a candidate list with a concurrency cap.
#[derive(Debug, Clone)]
pub struct TaskRunner {
    module: ModuleKind,
    concurrency: usize,
    ctx: ScanContext,
}

impl TaskRunner {
    pub fn new(module: ModuleKind, concurrency: usize, ctx: &ScanContext) -> Result<Self> {
        if concurrency == 0 {
            return Err(ScanError::InvalidConcurrency(concurrency));
        }
        Ok(Self { module, concurrency, ctx: ctx.clone() })
    }

    pub fn module(&self) -> ModuleKind {
        self.module
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Probes every candidate and waits for all of them before returning.
    ///
    /// - A permit is taken from a `Semaphore` before each task is spawned, so no
    ///   more than `concurrency` probes are ever in flight.
    /// - Finished tasks are reaped while submission is still going on, which
    ///   keeps the live progress moving.
    /// - On cancellation no further candidates are submitted; in-flight probes
    ///   resolve as "not interesting" and are drained before returning.
    pub async fn run<P: Probe>(&self, probe: Arc<P>, candidates: Vec<P::Candidate>) -> RunOutcome<P::Output> {
        let total = candidates.len();
        let progress = ProgressCounter::default();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut set = JoinSet::new();
        let mut results = Vec::new();
        let mut cancelled = false;

        info!(module = %self.module, total, concurrency = self.concurrency, "Starting bounded run.");

        for candidate in candidates {
            let permit = tokio::select! {
                biased;
                _ = self.ctx.cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(p) => p,
                    Err(_) => {
                        cancelled = true;
                        break;
                    }
                },
            };

            let probe = Arc::clone(&probe);
            let cancel = self.ctx.cancel.clone();
            let guard = CompletionGuard(progress.clone());
            set.spawn(async move {
                let _permit = permit;
                let _guard = guard;
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    outcome = probe.probe(candidate) => outcome,
                }
            });

            while let Some(joined) = set.try_join_next() {
                self.collect(joined, &progress, total, &mut results);
            }
        }

        while let Some(joined) = set.join_next().await {
            self.collect(joined, &progress, total, &mut results);
        }

        cancelled = cancelled || self.ctx.is_cancelled();
        let processed = progress.get();
        if cancelled {
            warn!(module = %self.module, processed, total, "Run cancelled before all candidates were probed.");
        } else {
            info!(module = %self.module, processed, found = results.len(), "Bounded run finished.");
        }

        RunOutcome { results, total, processed, cancelled }
    }

    fn collect<T: Display>(
        &self,
        joined: std::result::Result<Option<T>, JoinError>,
        progress: &ProgressCounter,
        total: usize,
        results: &mut Vec<T>,
    ) {
        match joined {
            Ok(Some(output)) => {
                debug!(module = %self.module, result = %output, "Interesting result.");
                self.ctx.events.found(self.module, output.to_string());
                results.push(output);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(module = %self.module, error = %e, "Probe task failed, candidate skipped.");
            }
        }
        self.ctx.events.emit(ScanEvent::Progress { module: self.module, processed: progress.get(), total });
    }
}

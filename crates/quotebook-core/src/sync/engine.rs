//! Sync cycle driver: single-flight fetch/merge plus the periodic timer.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::{MergeReport, RemoteSource, SyncError, SyncResult};
use crate::clock::Clock;
use crate::models::Quote;
use crate::services::QuoteBook;
use crate::state::SyncPhase;
use crate::storage::SnapshotStorage;

/// How a requested sync cycle ended.
#[derive(Debug)]
pub enum SyncOutcome {
    /// Remote quotes were merged
    Completed(MergeReport),
    /// Another cycle was already running; this request was dropped
    Skipped,
    /// The engine was stopped before the merge; the result was thrown away
    Discarded,
    /// Fetch or store failure; local state is unchanged
    Failed(SyncError),
}

impl SyncOutcome {
    pub const fn report(&self) -> Option<&MergeReport> {
        match self {
            Self::Completed(report) => Some(report),
            _ => None,
        }
    }
}

/// Reconciles a [`QuoteBook`] with a [`RemoteSource`].
///
/// At most one cycle runs at a time: a cycle requested while another is
/// fetching or merging returns [`SyncOutcome::Skipped`]. The book lock is only
/// taken for the merge, never across the network fetch.
pub struct SyncEngine<R> {
    remote: R,
    clock: Arc<dyn Clock>,
    phase: AtomicU8,
    epoch: AtomicU64,
}

/// Resets the phase to idle however the cycle ends, including cancellation.
struct PhaseGuard<'a>(&'a AtomicU8);

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.0.store(SyncPhase::Idle.as_u8(), Ordering::SeqCst);
    }
}

impl<R: RemoteSource> SyncEngine<R> {
    pub fn new(remote: R, clock: Arc<dyn Clock>) -> Self {
        Self {
            remote,
            clock,
            phase: AtomicU8::new(SyncPhase::Idle.as_u8()),
            epoch: AtomicU64::new(0),
        }
    }

    pub const fn remote(&self) -> &R {
        &self.remote
    }

    pub fn phase(&self) -> SyncPhase {
        SyncPhase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    /// Fetch remote records and map them into quotes stamped with the fetch time.
    pub async fn fetch_remote(&self) -> SyncResult<Vec<Quote>> {
        let records = self.remote.fetch_records().await?;
        let fetched_at = self.clock.now_millis();
        let total = records.len();

        let quotes = records
            .into_iter()
            .filter_map(|record| record.into_quote(fetched_at))
            .collect::<Vec<_>>();
        if quotes.len() < total {
            tracing::debug!(
                "Ignored {} remote records without id or text",
                total - quotes.len()
            );
        }
        Ok(quotes)
    }

    /// Run one fetch/merge cycle against `book`.
    pub async fn sync_now<S: SnapshotStorage>(&self, book: &Mutex<QuoteBook<S>>) -> SyncOutcome {
        if self
            .phase
            .compare_exchange(
                SyncPhase::Idle.as_u8(),
                SyncPhase::Fetching.as_u8(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            tracing::debug!("Sync already in progress; skipping");
            return SyncOutcome::Skipped;
        }
        let _guard = PhaseGuard(&self.phase);
        let epoch = self.epoch.load(Ordering::SeqCst);

        let remote = match self.fetch_remote().await {
            Ok(remote) => remote,
            Err(error) => {
                tracing::warn!("Sync fetch failed, will retry next cycle: {error}");
                return SyncOutcome::Failed(error);
            }
        };

        if self.epoch.load(Ordering::SeqCst) != epoch {
            tracing::debug!("Sync stopped during fetch; discarding {} quotes", remote.len());
            return SyncOutcome::Discarded;
        }

        self.phase
            .store(SyncPhase::Merging.as_u8(), Ordering::SeqCst);
        let mut book = book.lock().await;
        if self.epoch.load(Ordering::SeqCst) != epoch {
            tracing::debug!(
                "Sync stopped while waiting for the book; discarding {} quotes",
                remote.len()
            );
            return SyncOutcome::Discarded;
        }
        match book.apply_remote(remote) {
            Ok(report) => SyncOutcome::Completed(report),
            Err(error) => {
                tracing::warn!("Failed to persist merged quotes: {error}");
                SyncOutcome::Failed(SyncError::Store(error))
            }
        }
    }

    /// Send a newly created quote to the remote source.
    ///
    /// Best effort: failures are logged and never retried. Returns whether the
    /// push succeeded.
    pub async fn push_local(&self, quote: &Quote) -> bool {
        match self.remote.push_quote(quote).await {
            Ok(()) => {
                tracing::debug!(id = ?quote.id, "Pushed quote to remote");
                true
            }
            Err(error) => {
                tracing::warn!("Failed to push quote to remote: {error}");
                false
            }
        }
    }

    /// Invalidate any cycle that has not merged yet so its result is discarded.
    pub fn stop(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }
}

impl<R: RemoteSource + 'static> SyncEngine<R> {
    /// Start syncing `book` every `interval` until the returned handle is stopped.
    ///
    /// The first cycle starts immediately. Each tick runs its cycle in its own
    /// task, so a tick arriving while a slow cycle is still running is dropped
    /// by the single-flight guard.
    pub fn spawn_periodic<S>(
        self: &Arc<Self>,
        book: Arc<Mutex<QuoteBook<S>>>,
        interval: Duration,
    ) -> SyncHandle
    where
        S: SnapshotStorage + Send + 'static,
    {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let engine = Arc::clone(self);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let engine = Arc::clone(&engine);
                        let book = Arc::clone(&book);
                        tokio::spawn(async move {
                            if let SyncOutcome::Completed(report) = engine.sync_now(&book).await {
                                tracing::debug!(
                                    "Periodic sync merged {} new and {} updated quotes",
                                    report.added,
                                    report.overwritten
                                );
                            }
                        });
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            engine.stop();
                            break;
                        }
                    }
                }
            }
            tracing::debug!("Periodic sync stopped");
        });

        SyncHandle { shutdown, task }
    }
}

/// Handle to a running periodic sync.
pub struct SyncHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SyncHandle {
    /// Stop the timer; an in-flight fetch finishes but its result is dropped.
    pub async fn stop(self) {
        if self.shutdown.send(true).is_err() {
            tracing::debug!("Periodic sync already finished");
        }
        if let Err(error) = self.task.await {
            tracing::warn!("Periodic sync task ended abnormally: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::QuoteId;
    use crate::storage::{MemoryStorage, QUOTES_KEY};
    use crate::sync::RemoteRecord;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use tokio::sync::Notify;

    #[derive(Default)]
    struct FakeRemote {
        records: std::sync::Mutex<Vec<RemoteRecord>>,
        fail_fetch: AtomicBool,
        fail_push: AtomicBool,
        gate: Option<Arc<Notify>>,
        fetches: AtomicUsize,
        pushed: std::sync::Mutex<Vec<Quote>>,
    }

    impl FakeRemote {
        fn with_records(records: Vec<RemoteRecord>) -> Self {
            Self {
                records: std::sync::Mutex::new(records),
                ..Self::default()
            }
        }

        fn gated(mut self, gate: Arc<Notify>) -> Self {
            self.gate = Some(gate);
            self
        }
    }

    impl RemoteSource for FakeRemote {
        async fn fetch_records(&self) -> SyncResult<Vec<RemoteRecord>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail_fetch.load(Ordering::SeqCst) {
                return Err(SyncError::RemoteFetch("connection refused".to_string()));
            }
            Ok(self.records.lock().unwrap().clone())
        }

        async fn push_quote(&self, quote: &Quote) -> SyncResult<()> {
            if self.fail_push.load(Ordering::SeqCst) {
                return Err(SyncError::RemotePush("HTTP 500".to_string()));
            }
            self.pushed.lock().unwrap().push(quote.clone());
            Ok(())
        }
    }

    fn record(id: i64, title: &str) -> RemoteRecord {
        RemoteRecord {
            id: Some(QuoteId::Int(id)),
            title: Some(title.to_string()),
            ..RemoteRecord::default()
        }
    }

    fn book_with(raw: &str, clock: &ManualClock) -> Arc<Mutex<QuoteBook<MemoryStorage>>> {
        let storage = MemoryStorage::new();
        storage.write(QUOTES_KEY, raw).unwrap();
        Arc::new(Mutex::new(QuoteBook::open_with_clock(
            storage,
            Arc::new(clock.clone()),
        )))
    }

    async fn wait_for_phase<R: RemoteSource>(engine: &SyncEngine<R>, phase: SyncPhase) {
        while engine.phase() != phase {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn fetch_remote_maps_records_with_fetch_time() {
        let clock = ManualClock::new(5_000);
        let remote = FakeRemote::with_records(vec![
            record(1, "one"),
            RemoteRecord::default(),
            record(2, "two"),
        ]);
        let engine = SyncEngine::new(remote, Arc::new(clock));

        let quotes = engine.fetch_remote().await.unwrap();
        assert_eq!(
            quotes,
            vec![
                Quote::new("one")
                    .with_id(1)
                    .with_category("Server")
                    .with_updated_at(5_000),
                Quote::new("two")
                    .with_id(2)
                    .with_category("Server")
                    .with_updated_at(5_000),
            ]
        );
    }

    #[tokio::test]
    async fn sync_now_overwrites_older_local_quote() {
        let clock = ManualClock::new(20);
        let book = book_with(r#"[{"id":1,"text":"A","updatedAt":10}]"#, &clock);
        let engine = SyncEngine::new(
            FakeRemote::with_records(vec![record(1, "B")]),
            Arc::new(clock),
        );

        let outcome = engine.sync_now(&book).await;
        let report = outcome.report().expect("cycle should complete");
        assert!(report.has_conflicts());
        assert_eq!(book.lock().await.quotes()[0].text, "B");
        assert_eq!(engine.phase(), SyncPhase::Idle);
    }

    #[tokio::test]
    async fn sync_now_keeps_newer_local_quote() {
        let clock = ManualClock::new(5);
        let book = book_with(r#"[{"id":1,"text":"A","updatedAt":10}]"#, &clock);
        let engine = SyncEngine::new(
            FakeRemote::with_records(vec![record(1, "B")]),
            Arc::new(clock),
        );

        let outcome = engine.sync_now(&book).await;
        assert!(!outcome.report().unwrap().has_conflicts());
        assert_eq!(book.lock().await.quotes()[0].text, "A");
    }

    #[tokio::test]
    async fn fetch_failure_leaves_book_untouched() {
        let clock = ManualClock::new(100);
        let book = book_with(r#"[{"id":1,"text":"A","updatedAt":10}]"#, &clock);
        let remote = FakeRemote::with_records(vec![record(1, "B")]);
        remote.fail_fetch.store(true, Ordering::SeqCst);
        let engine = SyncEngine::new(remote, Arc::new(clock));

        let outcome = engine.sync_now(&book).await;
        assert!(matches!(
            outcome,
            SyncOutcome::Failed(SyncError::RemoteFetch(_))
        ));
        assert_eq!(book.lock().await.quotes()[0].text, "A");
        assert_eq!(engine.phase(), SyncPhase::Idle);

        // Next cycle retries.
        engine.remote().fail_fetch.store(false, Ordering::SeqCst);
        assert!(engine.sync_now(&book).await.report().is_some());
    }

    #[tokio::test]
    async fn overlapping_cycle_is_skipped() {
        let clock = ManualClock::new(100);
        let book = book_with("[]", &clock);
        let gate = Arc::new(Notify::new());
        let engine = Arc::new(SyncEngine::new(
            FakeRemote::with_records(vec![record(1, "one")]).gated(Arc::clone(&gate)),
            Arc::new(clock),
        ));

        let first = {
            let engine = Arc::clone(&engine);
            let book = Arc::clone(&book);
            tokio::spawn(async move { engine.sync_now(&book).await })
        };
        wait_for_phase(&engine, SyncPhase::Fetching).await;

        assert!(matches!(engine.sync_now(&book).await, SyncOutcome::Skipped));

        gate.notify_one();
        let outcome = first.await.unwrap();
        assert_eq!(outcome.report().unwrap().added, 1);
        assert_eq!(engine.remote().fetches.load(Ordering::SeqCst), 1);
        assert_eq!(book.lock().await.quotes().len(), 1);
    }

    #[tokio::test]
    async fn stop_discards_in_flight_result() {
        let clock = ManualClock::new(100);
        let book = book_with("[]", &clock);
        let gate = Arc::new(Notify::new());
        let engine = Arc::new(SyncEngine::new(
            FakeRemote::with_records(vec![record(1, "one")]).gated(Arc::clone(&gate)),
            Arc::new(clock),
        ));

        let cycle = {
            let engine = Arc::clone(&engine);
            let book = Arc::clone(&book);
            tokio::spawn(async move { engine.sync_now(&book).await })
        };
        wait_for_phase(&engine, SyncPhase::Fetching).await;

        engine.stop();
        gate.notify_one();

        assert!(matches!(cycle.await.unwrap(), SyncOutcome::Discarded));
        assert!(book.lock().await.quotes().is_empty());
        assert_eq!(engine.phase(), SyncPhase::Idle);
    }

    #[tokio::test]
    async fn stop_while_waiting_for_book_discards_result() {
        let clock = ManualClock::new(100);
        let book = book_with("[]", &clock);
        let engine = Arc::new(SyncEngine::new(
            FakeRemote::with_records(vec![record(1, "one")]),
            Arc::new(clock),
        ));

        let held = book.lock().await;
        let cycle = {
            let engine = Arc::clone(&engine);
            let book = Arc::clone(&book);
            tokio::spawn(async move { engine.sync_now(&book).await })
        };
        wait_for_phase(&engine, SyncPhase::Merging).await;

        engine.stop();
        drop(held);

        assert!(matches!(cycle.await.unwrap(), SyncOutcome::Discarded));
        assert!(book.lock().await.quotes().is_empty());
        assert_eq!(engine.phase(), SyncPhase::Idle);
    }

    #[tokio::test]
    async fn push_local_is_best_effort() {
        let engine = SyncEngine::new(FakeRemote::default(), Arc::new(ManualClock::new(0)));
        let quote = Quote::new("Local").with_id(1);

        assert!(engine.push_local(&quote).await);
        assert_eq!(engine.remote().pushed.lock().unwrap().len(), 1);

        engine.remote().fail_push.store(true, Ordering::SeqCst);
        assert!(!engine.push_local(&quote).await);
        assert_eq!(engine.remote().pushed.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_sync_runs_on_interval_until_stopped() {
        let clock = ManualClock::new(100);
        let book = book_with("[]", &clock);
        let engine = Arc::new(SyncEngine::new(
            FakeRemote::with_records(vec![record(1, "one")]),
            Arc::new(clock),
        ));

        let handle = engine.spawn_periodic(Arc::clone(&book), Duration::from_secs(30));
        tokio::time::sleep(Duration::from_secs(65)).await;
        handle.stop().await;

        assert_eq!(engine.remote().fetches.load(Ordering::SeqCst), 3);
        assert_eq!(book.lock().await.quotes().len(), 1);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(engine.remote().fetches.load(Ordering::SeqCst), 3);
    }
}

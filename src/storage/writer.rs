//! Background mirror of in-memory state into a `KeyValueStore`.
//!
//! Mutations commit in memory first, then enqueue a full snapshot here. A
//! single task drains the queue in FIFO order, so a slow earlier write can
//! never land after a later one for the same key.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, oneshot};

use super::kv::KeyValueStore;

// ============================================================================
// Commands
// ============================================================================

enum Command {
    Write(PendingWrite),
    Flush(oneshot::Sender<()>),
}

/// A queued whole-collection snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingWrite {
    key: &'static str,
    value: String,
}

// ============================================================================
// Status
// ============================================================================

/// Outcome counters for the mirror, readable at any time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistenceStatus {
    /// Writes that reached the adapter successfully.
    pub writes: u64,
    /// Writes the adapter rejected (or that could not be queued).
    pub failures: u64,
    /// Message of the most recent failure.
    pub last_error: Option<String>,
}

impl PersistenceStatus {
    pub fn is_healthy(&self) -> bool {
        self.failures == 0
    }
}

#[derive(Debug, Default)]
struct StatusCell {
    writes: AtomicU64,
    failures: AtomicU64,
    last_error: Mutex<Option<String>>,
}

impl StatusCell {
    fn record_failure(&self, message: String) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_error.lock() {
            *last = Some(message);
        }
    }

    fn snapshot(&self) -> PersistenceStatus {
        PersistenceStatus {
            writes: self.writes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            last_error: self.last_error.lock().ok().and_then(|e| e.clone()),
        }
    }
}

// ============================================================================
// PersistQueue
// ============================================================================

/// Handle for enqueueing snapshot writes. Enqueueing never blocks.
pub struct PersistQueue {
    tx: mpsc::UnboundedSender<Command>,
    status: Arc<StatusCell>,
}

impl PersistQueue {
    /// Spawn the writer task on the current tokio runtime.
    pub fn spawn(store: Arc<dyn KeyValueStore>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let status = Arc::new(StatusCell::default());
        tokio::spawn(run_writer(store, rx, Arc::clone(&status)));
        Self { tx, status }
    }

    /// Queue a full snapshot for `key`.
    pub fn set(&self, key: &'static str, value: String) {
        self.send(Command::Write(PendingWrite { key, value }));
    }

    /// Wait until every write queued before this call has been attempted.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(ack_tx)).is_err() {
            return;
        }
        let _ = ack_rx.await;
    }

    pub fn status(&self) -> PersistenceStatus {
        self.status.snapshot()
    }

    fn send(&self, command: Command) {
        if self.tx.send(command).is_err() {
            tracing::warn!("Persistence writer has stopped; change kept in memory only");
            self.status
                .record_failure("persistence writer stopped".to_string());
        }
    }
}

// ============================================================================
// Writer Task
// ============================================================================

async fn run_writer(
    store: Arc<dyn KeyValueStore>,
    mut rx: mpsc::UnboundedReceiver<Command>,
    status: Arc<StatusCell>,
) {
    let mut seq: u64 = 0;
    let mut pending: Vec<PendingWrite> = Vec::new();

    while let Some(first) = rx.recv().await {
        // Drain whatever is already queued so bursts coalesce.
        let mut batch = vec![first];
        while let Ok(next) = rx.try_recv() {
            batch.push(next);
        }

        for command in batch {
            match command {
                Command::Write(write) => pending.push(write),
                Command::Flush(ack) => {
                    apply(&*store, coalesce(std::mem::take(&mut pending)), &mut seq, &status).await;
                    let _ = ack.send(());
                }
            }
        }
        apply(&*store, coalesce(std::mem::take(&mut pending)), &mut seq, &status).await;
    }
    tracing::debug!(writes = seq, "Persistence writer stopped");
}

async fn apply(
    store: &dyn KeyValueStore,
    writes: Vec<PendingWrite>,
    seq: &mut u64,
    status: &StatusCell,
) {
    for write in writes {
        *seq += 1;
        match store.set(write.key, &write.value).await {
            Ok(()) => {
                status.writes.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(key = write.key, seq = *seq, "Persisted snapshot");
            }
            Err(e) => {
                tracing::warn!(key = write.key, seq = *seq, error = %e, "Failed to persist snapshot");
                status.record_failure(format!("{}: {}", write.key, e));
            }
        }
    }
}

/// Collapse runs of consecutive writes to one key into the newest value.
///
/// Writes are whole snapshots, so dropping a superseded value inside a run
/// still leaves the mirror at a state the program actually passed through.
/// Writes are never reordered across keys: an article snapshot queued before
/// a draft removal is always written first.
fn coalesce(writes: Vec<PendingWrite>) -> Vec<PendingWrite> {
    let mut out: Vec<PendingWrite> = Vec::with_capacity(writes.len());
    for write in writes {
        match out.last_mut() {
            Some(last) if last.key == write.key => last.value = write.value,
            _ => out.push(write),
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================

//! FIFO retry queue drained while connectivity is available.
//!
//! A drain pass handles at most the tasks present when it started, so a
//! failure requeued at the tail waits for the next pass. Only one pass runs
//! at a time; overlapping requests return immediately with `skipped` set.
//! Tasks enqueued under the same key keep their relative order: once one of
//! them fails in a pass, the later ones are held back without running.

use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::config::SyncQueueConfig;
use super::task::{
    task_fn, DeadLetter, ExecutionOutcome, QueuedTask, SyncTask, TaskExecution,
};
use crate::errors::DomainResult;
use crate::services::background::{spawn_periodic, BackgroundHandle};
use crate::services::traits::ConnectivityProbe;

/// Summary of one drain pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub processed: usize,
    pub failed: usize,
    pub dead_lettered: usize,
    /// Not run because an earlier task with the same key failed
    pub held: usize,
    pub remaining: usize,
    /// Another pass was already running
    pub skipped: bool,
    /// Connectivity dropped before the pass finished
    pub interrupted: bool,
}

pub struct SyncQueue {
    pending: Mutex<VecDeque<QueuedTask>>,
    dead: Mutex<VecDeque<DeadLetter>>,
    history: Mutex<VecDeque<TaskExecution>>,
    syncing: AtomicBool,
    next_id: AtomicU64,
    connectivity: Arc<dyn ConnectivityProbe>,
    config: SyncQueueConfig,
}

/// Clears the syncing flag when a pass ends, including on panic
struct PassGuard<'a>(&'a AtomicBool);

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl SyncQueue {
    pub fn new(connectivity: Arc<dyn ConnectivityProbe>, config: SyncQueueConfig) -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            dead: Mutex::new(VecDeque::new()),
            history: Mutex::new(VecDeque::new()),
            syncing: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
            connectivity,
            config,
        }
    }

    pub fn config(&self) -> &SyncQueueConfig {
        &self.config
    }

    /// Appends a task to the tail; returns its id
    pub fn enqueue(&self, description: impl Into<String>, task: Arc<dyn SyncTask>) -> u64 {
        self.push(None, description.into(), task)
    }

    /// Appends a task ordered after every queued task with the same key
    pub fn enqueue_keyed(
        &self,
        key: impl Into<String>,
        description: impl Into<String>,
        task: Arc<dyn SyncTask>,
    ) -> u64 {
        self.push(Some(key.into()), description.into(), task)
    }

    fn push(&self, key: Option<String>, description: String, task: Arc<dyn SyncTask>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut pending = lock(&self.pending);
        pending.push_back(QueuedTask {
            id,
            description: description.clone(),
            key,
            attempts: 0,
            last_error: None,
            enqueued_at: Utc::now(),
            task,
        });
        info!(
            task_id = id,
            queued = pending.len(),
            "Queued for sync: {}",
            description
        );
        id
    }

    /// Appends a closure-backed task
    pub fn enqueue_fn<F, Fut>(&self, description: impl Into<String>, f: F) -> u64
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DomainResult<()>> + Send + 'static,
    {
        self.enqueue(description, Arc::new(task_fn(f)))
    }

    /// Appends a closure-backed task under an ordering key
    pub fn enqueue_keyed_fn<F, Fut>(
        &self,
        key: impl Into<String>,
        description: impl Into<String>,
        f: F,
    ) -> u64
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DomainResult<()>> + Send + 'static,
    {
        self.enqueue_keyed(key, description, Arc::new(task_fn(f)))
    }

    pub fn len(&self) -> usize {
        lock(&self.pending).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.pending).is_empty()
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::Acquire)
    }

    /// Snapshot of the queued tasks, head first
    pub fn pending(&self) -> Vec<QueuedTask> {
        lock(&self.pending).iter().cloned().collect()
    }

    pub fn dead_letters(&self) -> Vec<DeadLetter> {
        lock(&self.dead).iter().cloned().collect()
    }

    /// Recent executions, oldest first
    pub fn history(&self) -> Vec<TaskExecution> {
        lock(&self.history).iter().cloned().collect()
    }

    /// Drops every queued task; returns how many were dropped
    pub fn clear(&self) -> usize {
        let mut pending = lock(&self.pending);
        let dropped = pending.len();
        pending.clear();
        if dropped > 0 {
            warn!(dropped, "Sync queue cleared");
        }
        dropped
    }

    /// Runs one drain pass
    pub async fn drain(&self) -> DrainReport {
        if self
            .syncing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Sync already in progress");
            return DrainReport {
                remaining: self.len(),
                skipped: true,
                ..DrainReport::default()
            };
        }
        let _pass = PassGuard(&self.syncing);

        let budget = self.len();
        let mut report = DrainReport::default();
        let mut blocked: HashSet<String> = HashSet::new();
        if budget > 0 {
            info!(queued = budget, "Starting sync pass");
        }

        for _ in 0..budget {
            if !self.connectivity.is_available() {
                warn!("Connectivity lost, sync pass interrupted");
                report.interrupted = true;
                break;
            }
            let next = lock(&self.pending).pop_front();
            let Some(mut task) = next else {
                break;
            };

            if task.key.as_ref().is_some_and(|k| blocked.contains(k)) {
                debug!(task_id = task.id, "Held behind an earlier failure: {}", task.description);
                lock(&self.pending).push_back(task);
                report.held += 1;
                continue;
            }

            task.attempts += 1;
            match task.task.run().await {
                Ok(()) => {
                    debug!(task_id = task.id, attempt = task.attempts, "Synced: {}", task.description);
                    self.record(&task, ExecutionOutcome::Succeeded);
                    report.processed += 1;
                }
                Err(e) => {
                    let message = e.to_string();
                    task.last_error = Some(message.clone());
                    let exhausted =
                        self.config.max_attempts > 0 && task.attempts >= self.config.max_attempts;

                    if exhausted || !e.is_retryable() {
                        error!(
                            task_id = task.id,
                            attempts = task.attempts,
                            error = %message,
                            "Sync task abandoned: {}",
                            task.description
                        );
                        self.record(
                            &task,
                            ExecutionOutcome::DeadLettered {
                                error: message.clone(),
                            },
                        );
                        self.bury(DeadLetter {
                            id: task.id,
                            description: task.description,
                            attempts: task.attempts,
                            error: message,
                            dead_at: Utc::now(),
                        });
                        report.dead_lettered += 1;
                    } else {
                        warn!(
                            task_id = task.id,
                            attempt = task.attempts,
                            error = %message,
                            "Sync task failed, requeued: {}",
                            task.description
                        );
                        self.record(&task, ExecutionOutcome::Requeued { error: message });
                        if let Some(key) = &task.key {
                            blocked.insert(key.clone());
                        }
                        lock(&self.pending).push_back(task);
                        report.failed += 1;
                    }
                }
            }
        }

        report.remaining = self.len();
        if budget > 0 {
            info!(
                processed = report.processed,
                failed = report.failed,
                held = report.held,
                dead_lettered = report.dead_lettered,
                remaining = report.remaining,
                "Sync pass finished"
            );
        }
        report
    }

    /// Drains now instead of waiting for the next tick
    pub async fn force_sync(&self) -> DrainReport {
        if !self.connectivity.is_available() {
            warn!(queued = self.len(), "Cannot sync while offline");
            return DrainReport {
                remaining: self.len(),
                interrupted: true,
                ..DrainReport::default()
            };
        }
        info!("Forcing sync");
        self.drain().await
    }

    /// Drains on every tick while online and non-empty.
    /// Returns `None` when the queue is configured as disabled.
    pub fn start_background_task(self: Arc<Self>) -> Option<BackgroundHandle> {
        if !self.config.enabled {
            warn!("Background sync is disabled");
            return None;
        }

        let interval = self.config.interval;
        Some(spawn_periodic("sync-queue", interval, move || {
            let queue = Arc::clone(&self);
            async move {
                if queue.is_empty() || !queue.connectivity.is_available() {
                    return;
                }
                queue.drain().await;
            }
        }))
    }

    fn bury(&self, letter: DeadLetter) {
        let mut dead = lock(&self.dead);
        dead.push_back(letter);
        while dead.len() > self.config.dead_letter_limit {
            dead.pop_front();
        }
    }

    fn record(&self, task: &QueuedTask, outcome: ExecutionOutcome) {
        let mut history = lock(&self.history);
        history.push_back(TaskExecution {
            task_id: task.id,
            description: task.description.clone(),
            attempt: task.attempts,
            outcome,
            at: Utc::now(),
        });
        while history.len() > self.config.history_limit {
            history.pop_front();
        }
    }
}

impl std::fmt::Debug for SyncQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncQueue")
            .field("pending", &self.len())
            .field("dead_letters", &lock(&self.dead).len())
            .field("syncing", &self.is_syncing())
            .finish()
    }
}

//! Deferred work items and their execution records.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::DomainResult;

/// A deferred mutation; should be safe to run more than once
#[async_trait]
pub trait SyncTask: Send + Sync {
    async fn run(&self) -> DomainResult<()>;
}

/// Adapts a closure returning a future into a [`SyncTask`]
pub struct FnTask<F>(F);

pub fn task_fn<F, Fut>(f: F) -> FnTask<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = DomainResult<()>> + Send,
{
    FnTask(f)
}

#[async_trait]
impl<F, Fut> SyncTask for FnTask<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = DomainResult<()>> + Send,
{
    async fn run(&self) -> DomainResult<()> {
        (self.0)().await
    }
}

/// A task waiting in the queue
#[derive(Clone)]
pub struct QueuedTask {
    pub id: u64,
    pub description: String,
    /// Tasks sharing a key run in enqueue order; a failure holds back the rest
    pub key: Option<String>,
    pub attempts: u32,
    pub last_error: Option<String>,
    pub enqueued_at: DateTime<Utc>,
    pub(crate) task: Arc<dyn SyncTask>,
}

impl std::fmt::Debug for QueuedTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueuedTask")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("key", &self.key)
            .field("attempts", &self.attempts)
            .field("last_error", &self.last_error)
            .finish()
    }
}

/// A task that was given up on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadLetter {
    pub id: u64,
    pub description: String,
    pub attempts: u32,
    pub error: String,
    pub dead_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Succeeded,
    /// Failed and went back to the tail of the queue
    Requeued { error: String },
    DeadLettered { error: String },
}

/// One run of one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskExecution {
    pub task_id: u64,
    pub description: String,
    pub attempt: u32,
    pub outcome: ExecutionOutcome,
    pub at: DateTime<Utc>,
}

impl TaskExecution {
    pub fn succeeded(&self) -> bool {
        self.outcome == ExecutionOutcome::Succeeded
    }
}

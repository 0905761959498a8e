//! Offline sync queue: deferred mutations drained when connectivity returns.

pub mod config;
pub mod queue;
pub mod task;

pub use config::SyncQueueConfig;
pub use queue::{DrainReport, SyncQueue};
pub use task::{task_fn, DeadLetter, ExecutionOutcome, FnTask, QueuedTask, SyncTask, TaskExecution};

//! Periodic background tasks with an explicit stop handle.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Handle to a running periodic task
#[derive(Debug)]
pub struct BackgroundHandle {
    name: &'static str,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl BackgroundHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Signals shutdown and waits for the current tick to finish
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!(task = self.name, error = %e, "Background task ended abnormally");
        }
    }
}

/// Runs `tick` every `period`, first after one full period
pub fn spawn_periodic<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> BackgroundHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let (shutdown, mut stopped) = watch::channel(false);

    let task = tokio::spawn(async move {
        info!(
            task = name,
            period_secs = period.as_secs_f64(),
            "Background task started"
        );
        let mut timer = tokio::time::interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        timer.tick().await;

        loop {
            tokio::select! {
                _ = timer.tick() => tick().await,
                changed = stopped.changed() => {
                    if changed.is_err() || *stopped.borrow() {
                        break;
                    }
                }
            }
        }
        info!(task = name, "Background task stopped");
    });

    BackgroundHandle {
        name,
        shutdown,
        task,
    }
}

//! Network availability monitor.
//!
//! Holds the process-wide connectivity flag that services consult before
//! touching the store. Transitions are logged once: a warning when the
//! connection is lost and an info line when it comes back.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use hb_core::services::ConnectivityProbe;

/// Bounds for a randomly sized simulated outage
const MIN_OUTAGE_SECS: u64 = 10;
const MAX_OUTAGE_SECS: u64 = 30;

#[derive(Debug)]
pub struct NetworkMonitor {
    available: AtomicBool,
}

impl NetworkMonitor {
    pub fn new(available: bool) -> Self {
        Self {
            available: AtomicBool::new(available),
        }
    }

    pub fn set_available(&self, available: bool) {
        let previous = self.available.swap(available, Ordering::SeqCst);
        match (previous, available) {
            (true, false) => warn!("Network connection lost, switching to offline mode"),
            (false, true) => info!("Network connection restored"),
            _ => {}
        }
    }

    /// Takes the network down now and brings it back after `duration`
    pub fn simulate_outage(self: &Arc<Self>, duration: Duration) -> JoinHandle<()> {
        self.set_available(false);
        info!(secs = duration.as_secs(), "Simulating network outage");

        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            monitor.set_available(true);
        })
    }

    /// Outage lasting a random 10 to 30 seconds
    pub fn simulate_random_outage(self: &Arc<Self>) -> JoinHandle<()> {
        let secs = rand::thread_rng().gen_range(MIN_OUTAGE_SECS..=MAX_OUTAGE_SECS);
        self.simulate_outage(Duration::from_secs(secs))
    }
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConnectivityProbe for NetworkMonitor {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}

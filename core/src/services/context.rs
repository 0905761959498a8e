//! Collaborators shared by every service.

use std::sync::Arc;

use super::clock::{Clock, SystemClock};
use super::support::{NoopNotifier, SwitchableConnectivity};
use super::traits::{ConnectivityProbe, Notifier};

#[derive(Clone)]
pub struct ServiceContext {
    pub connectivity: Arc<dyn ConnectivityProbe>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
}

impl ServiceContext {
    pub fn new(
        connectivity: Arc<dyn ConnectivityProbe>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            connectivity,
            notifier,
            clock,
        }
    }

    /// Always online, silent, wall clock
    pub fn standalone() -> Self {
        Self::new(
            Arc::new(SwitchableConnectivity::online()),
            Arc::new(NoopNotifier),
            Arc::new(SystemClock),
        )
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_available()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("online", &self.is_online())
            .field("now", &self.clock.now())
            .finish()
    }
}

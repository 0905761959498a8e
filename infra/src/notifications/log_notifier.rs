//! Notifier that writes every message to the log.

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use hb_core::services::Notifier;

#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_client(&self, client_id: Uuid, message: &str) {
        info!(target: "notifications", recipient = "client", %client_id, "{}", message);
    }

    async fn notify_manager(&self, manager_id: Uuid, message: &str) {
        info!(target: "notifications", recipient = "manager", %manager_id, "{}", message);
    }
}

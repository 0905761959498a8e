//! Collaborator traits the services depend on.

use async_trait::async_trait;
use uuid::Uuid;

/// Answers whether the backing store can currently be reached
pub trait ConnectivityProbe: Send + Sync {
    fn is_available(&self) -> bool;
}

/// Fire-and-forget user notifications; delivery is not guaranteed
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_client(&self, client_id: Uuid, message: &str);

    async fn notify_manager(&self, manager_id: Uuid, message: &str);
}

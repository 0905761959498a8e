//! Simple collaborator implementations for tests and embedded setups.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use super::traits::{ConnectivityProbe, Notifier};

/// Connectivity flag flipped by hand
#[derive(Debug)]
pub struct SwitchableConnectivity {
    available: AtomicBool,
}

impl SwitchableConnectivity {
    pub fn new(available: bool) -> Self {
        Self {
            available: AtomicBool::new(available),
        }
    }

    pub fn online() -> Self {
        Self::new(true)
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

impl Default for SwitchableConnectivity {
    fn default() -> Self {
        Self::online()
    }
}

impl ConnectivityProbe for SwitchableConnectivity {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    Client(Uuid),
    Manager(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub recipient: Recipient,
    pub message: String,
}

/// Keeps every notification it is asked to send
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    /// Messages sent to one recipient, in order
    pub fn sent_to(&self, recipient: Recipient) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|n| n.recipient == recipient)
            .map(|n| n.message.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.sent.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_client(&self, client_id: Uuid, message: &str) {
        self.lock().push(Notification {
            recipient: Recipient::Client(client_id),
            message: message.to_string(),
        });
    }

    async fn notify_manager(&self, manager_id: Uuid, message: &str) {
        self.lock().push(Notification {
            recipient: Recipient::Manager(manager_id),
            message: message.to_string(),
        });
    }
}

/// Drops every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify_client(&self, _client_id: Uuid, _message: &str) {}

    async fn notify_manager(&self, _manager_id: Uuid, _message: &str) {}
}

//! In-memory audit trail used by tests and embedded setups.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

use super::AuditTrail;
use crate::domain::entities::{AuditEntry, AuditEvent};
use crate::errors::DomainError;

/// Keeps entries in a vector; can be told to fail for error-path tests
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditTrail {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MemoryAuditTrail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether appends should fail
    pub fn set_should_fail(&self, should_fail: bool) {
        *lock(&self.should_fail) = should_fail;
    }

    /// All entries recorded so far
    pub fn entries(&self) -> Vec<AuditEntry> {
        lock(&self.entries).clone()
    }

    /// Entries with the given event type
    pub fn entries_of(&self, event: AuditEvent) -> Vec<AuditEntry> {
        lock(&self.entries)
            .iter()
            .filter(|e| e.event == event)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        lock(&self.entries).clear();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl AuditTrail for MemoryAuditTrail {
    async fn append(&self, entries: &[AuditEntry]) -> Result<(), DomainError> {
        if *lock(&self.should_fail) {
            return Err(DomainError::Internal {
                message: "Audit trail unavailable".to_string(),
            });
        }
        lock(&self.entries).extend_from_slice(entries);
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<AuditEntry>, DomainError> {
        let entries = lock(&self.entries);
        let start = entries.len().saturating_sub(limit);
        Ok(entries[start..].to_vec())
    }
}

//! In-memory persistence for tests and embedded use.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::{LedgerPersistence, LedgerStore};
use crate::domain::{Collection, Ledger};
use crate::errors::DomainError;
use crate::repositories::audit::NoOpAuditTrail;

/// Entity store that keeps everything in memory
pub type InMemoryEntityStore = LedgerStore<MemoryPersistence>;

impl LedgerStore<MemoryPersistence> {
    /// Empty store with no durability and no audit trail
    pub fn in_memory() -> Self {
        LedgerStore::new(
            Ledger::new(),
            MemoryPersistence::new(),
            Arc::new(NoOpAuditTrail::new()),
        )
    }
}

/// Records which collections each flush touched; can be told to fail
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    flushes: Arc<Mutex<Vec<BTreeSet<Collection>>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether flushes should fail
    pub fn set_should_fail(&self, should_fail: bool) {
        *lock(&self.should_fail) = should_fail;
    }

    /// Collections touched by each successful flush, in order
    pub fn flushes(&self) -> Vec<BTreeSet<Collection>> {
        lock(&self.flushes).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl LedgerPersistence for MemoryPersistence {
    async fn flush(&self, _ledger: &Ledger, touched: &BTreeSet<Collection>) -> Result<(), DomainError> {
        if *lock(&self.should_fail) {
            return Err(DomainError::persistence("simulated flush failure"));
        }
        lock(&self.flushes).push(touched.clone());
        Ok(())
    }
}

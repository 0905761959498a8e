//! No-op implementation of AuditTrail for when an audit record is not needed

use async_trait::async_trait;

use super::AuditTrail;
use crate::domain::entities::AuditEntry;
use crate::errors::DomainError;

/// Discards every entry
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpAuditTrail;

impl NoOpAuditTrail {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditTrail for NoOpAuditTrail {
    async fn append(&self, _entries: &[AuditEntry]) -> Result<(), DomainError> {
        Ok(())
    }

    async fn recent(&self, _limit: usize) -> Result<Vec<AuditEntry>, DomainError> {
        Ok(Vec::new())
    }
}

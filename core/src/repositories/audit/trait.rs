//! Audit trail trait defining the append-only record of store mutations.

use async_trait::async_trait;

use crate::domain::entities::AuditEntry;
use crate::errors::DomainError;

/// Append-only record of every committed store mutation
///
/// Implementations must not reorder entries. Callers treat a failed append
/// as non-fatal: the mutation it describes is already durable.
#[async_trait]
pub trait AuditTrail: Send + Sync {
    /// Append entries in the order given
    async fn append(&self, entries: &[AuditEntry]) -> Result<(), DomainError>;

    /// The most recent `limit` entries, oldest first
    async fn recent(&self, limit: usize) -> Result<Vec<AuditEntry>, DomainError>;
}

//! JSON-file persistence for the ledger.
//!
//! Each collection lives in `<data_dir>/<collection>.json` as an object keyed
//! by id. A flush rewrites only the touched documents in two phases: every
//! document is written to a temporary file first, and the originals are
//! replaced by renames only once all of those writes succeeded.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use uuid::Uuid;

use hb_core::domain::{Collection, Ledger};
use hb_core::errors::DomainError;
use hb_core::repositories::{AuditTrail, LedgerPersistence, LedgerStore};
use hb_shared::StorageConfig;

use super::audit_log::FileAuditTrail;
use crate::errors::InfrastructureError;

/// Entity store persisted as JSON documents
pub type FileEntityStore = LedgerStore<JsonDocuments>;

#[derive(Debug, Clone)]
pub struct JsonDocuments {
    data_dir: PathBuf,
    pretty: bool,
}

impl JsonDocuments {
    pub fn new(data_dir: impl Into<PathBuf>, pretty: bool) -> Self {
        Self {
            data_dir: data_dir.into(),
            pretty,
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.data_dir, config.pretty)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn document_path(&self, collection: Collection) -> PathBuf {
        self.data_dir.join(format!("{}.json", collection.name()))
    }

    /// Reads every document; missing files are empty collections
    pub async fn load(&self) -> Result<Ledger, InfrastructureError> {
        tokio::fs::create_dir_all(&self.data_dir).await?;

        let users = self.read_document(Collection::Users).await?;
        let hostels = self.read_document(Collection::Hostels).await?;
        let rooms = self.read_document(Collection::Rooms).await?;
        let bookings = self.read_document(Collection::Bookings).await?;
        let reviews = self.read_document(Collection::Reviews).await?;

        let (ledger, repaired) = Ledger::from_parts(users, hostels, rooms, bookings, reviews);
        if !repaired.is_empty() {
            warn!(
                rooms = repaired.len(),
                "Room availability disagreed with bookings and was repaired"
            );
            self.write_document(&ledger, Collection::Rooms).await?;
        }

        let stats = ledger.stats();
        info!(
            data_dir = %self.data_dir.display(),
            users = stats.users,
            hostels = stats.hostels,
            rooms = stats.rooms,
            bookings = stats.bookings,
            reviews = stats.reviews,
            "Documents loaded"
        );
        Ok(ledger)
    }

    async fn read_document<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Result<BTreeMap<Uuid, T>, InfrastructureError> {
        let path = self.document_path(collection);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No document yet");
                Ok(BTreeMap::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write_document(
        &self,
        ledger: &Ledger,
        collection: Collection,
    ) -> Result<(), InfrastructureError> {
        let tmp = self.stage_document(ledger, collection).await?;
        tokio::fs::rename(&tmp, self.document_path(collection)).await?;
        Ok(())
    }

    /// Writes a document next to its final path; returns the temporary path
    async fn stage_document(
        &self,
        ledger: &Ledger,
        collection: Collection,
    ) -> Result<PathBuf, InfrastructureError> {
        let document = ledger.to_document(collection)?;
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(&document)?
        } else {
            serde_json::to_vec(&document)?
        };

        let tmp = self.document_path(collection).with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        Ok(tmp)
    }

    async fn discard(staged: &[(Collection, PathBuf)]) {
        for (_, tmp) in staged {
            if let Err(e) = tokio::fs::remove_file(tmp).await {
                debug!(path = %tmp.display(), error = %e, "Could not remove staged document");
            }
        }
    }
}

#[async_trait]
impl LedgerPersistence for JsonDocuments {
    async fn flush(&self, ledger: &Ledger, touched: &BTreeSet<Collection>) -> Result<(), DomainError> {
        let mut staged = Vec::with_capacity(touched.len());
        for collection in touched {
            match self.stage_document(ledger, *collection).await {
                Ok(tmp) => staged.push((*collection, tmp)),
                Err(e) => {
                    Self::discard(&staged).await;
                    return Err(e.into());
                }
            }
        }

        for (collection, tmp) in &staged {
            tokio::fs::rename(tmp, self.document_path(*collection))
                .await
                .map_err(InfrastructureError::from)?;
        }
        Ok(())
    }
}

/// Opens the file-backed store and its audit log under `config.data_dir`
pub async fn open_file_store(
    config: &StorageConfig,
) -> Result<(Arc<FileEntityStore>, Arc<FileAuditTrail>), InfrastructureError> {
    let documents = JsonDocuments::from_config(config);
    let ledger = documents.load().await?;
    let audit = Arc::new(FileAuditTrail::new(config.audit_log_path()));

    let store = LedgerStore::new(ledger, documents, audit.clone() as Arc<dyn AuditTrail>)
        .with_slow_write_threshold(Duration::from_millis(config.slow_write_warn_ms));
    Ok((Arc::new(store), audit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hb_core::domain::entities::User;

    #[tokio::test]
    async fn test_missing_documents_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        let documents = JsonDocuments::new(dir.path().join("fresh"), true);
        let ledger = tokio_test::assert_ok!(documents.load().await);
        assert_eq!(ledger.stats().users, 0);
        assert!(dir.path().join("fresh").is_dir());
    }

    #[tokio::test]
    async fn test_flush_writes_only_touched_documents() {
        let dir = tempfile::tempdir().unwrap();
        let documents = JsonDocuments::new(dir.path(), false);
        let mut ledger = Ledger::new();
        ledger
            .put_user(User::new_manager("m@hostel.ua", "+380501112233", "secret1", chrono::Utc::now()))
            .unwrap();

        let touched = BTreeSet::from([Collection::Users]);
        tokio_test::assert_ok!(documents.flush(&ledger, &touched).await);

        assert!(documents.document_path(Collection::Users).exists());
        assert!(!documents.document_path(Collection::Bookings).exists());
        assert!(!dir.path().join("users.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_failed_flush_replaces_no_document() {
        let dir = tempfile::tempdir().unwrap();
        let documents = JsonDocuments::new(dir.path(), false);
        let mut ledger = Ledger::new();
        ledger
            .put_user(User::new_manager("m@hostel.ua", "+380501112233", "secret1", chrono::Utc::now()))
            .unwrap();
        tokio_test::assert_ok!(documents.flush(&ledger, &BTreeSet::from([Collection::Users])).await);
        let before = std::fs::read_to_string(documents.document_path(Collection::Users)).unwrap();

        ledger
            .put_user(User::new_manager("n@hostel.ua", "+380501112244", "secret2", chrono::Utc::now()))
            .unwrap();
        // a directory in the way makes staging the bookings document fail
        std::fs::create_dir(dir.path().join("bookings.json.tmp")).unwrap();
        let touched = BTreeSet::from([Collection::Users, Collection::Bookings]);
        tokio_test::assert_err!(documents.flush(&ledger, &touched).await);

        let after = std::fs::read_to_string(documents.document_path(Collection::Users)).unwrap();
        assert_eq!(before, after);
        assert!(!dir.path().join("users.json.tmp").exists());
        assert!(!documents.document_path(Collection::Bookings).exists());
    }

    #[tokio::test]
    async fn test_corrupt_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("rooms.json"), "{ not json").unwrap();
        let err = JsonDocuments::new(dir.path(), true).load().await.unwrap_err();
        assert!(matches!(err, InfrastructureError::Serialization(_)));
    }
}

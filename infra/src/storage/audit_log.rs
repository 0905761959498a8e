//! Append-only text audit log.
//!
//! One line per entry: `<rfc3339 timestamp> - <EVENT> <entity id>: <description>`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use hb_core::domain::entities::AuditEntry;
use hb_core::errors::DomainError;
use hb_core::repositories::AuditTrail;

use crate::errors::InfrastructureError;

pub struct FileAuditTrail {
    path: PathBuf,
    // Serializes appends so entries from one batch stay contiguous
    write_lock: Mutex<()>,
}

impl FileAuditTrail {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every parseable entry in the log, oldest first
    pub async fn read_all(&self) -> Result<Vec<AuditEntry>, InfrastructureError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            match AuditEntry::parse_line(line) {
                Some(entry) => entries.push(entry),
                None => debug!(line, "Skipping unparseable audit line"),
            }
        }
        Ok(entries)
    }

    async fn write_lines(&self, entries: &[AuditEntry]) -> Result<(), InfrastructureError> {
        let mut buffer = String::new();
        for entry in entries {
            buffer.push_str(&entry.to_line());
            buffer.push('\n');
        }

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(buffer.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl AuditTrail for FileAuditTrail {
    async fn append(&self, entries: &[AuditEntry]) -> Result<(), DomainError> {
        if entries.is_empty() {
            return Ok(());
        }
        self.write_lines(entries).await.map_err(DomainError::from)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<AuditEntry>, DomainError> {
        let mut entries = self.read_all().await?;
        let skip = entries.len().saturating_sub(limit);
        Ok(entries.split_off(skip))
    }
}

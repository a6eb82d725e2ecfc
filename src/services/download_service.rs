//! DownloadService ties the record lookup, the storage backend and MIME
//! guessing together. Handlers only turn its `Download` into a response.

use crate::services::{
    mime,
    record_service::{RecordError, RecordSelector, RecordService},
    storage_service::{Storage, StorageError},
};
use bytes::Bytes;
use sqlx::SqlitePool;
use std::{io, sync::Arc};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to read `{name}`: {source}")]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// A file ready to be sent as an attachment.
#[derive(Debug, Clone)]
pub struct Download {
    /// Last path segment of the stored name.
    pub file_name: String,
    pub content_type: String,
    pub body: Bytes,
}

/// Shared handler state. The storage backend is injected here; nothing
/// reaches for a process-wide default.
#[derive(Clone)]
pub struct DownloadService<S> {
    pub records: RecordService,
    pub storage: S,
    pub selector: RecordSelector,
}

impl<S: Storage> DownloadService<S> {
    pub fn new(db: Arc<SqlitePool>, storage: S, selector: RecordSelector) -> Self {
        Self {
            records: RecordService::new(db),
            storage,
            selector,
        }
    }

    /// Resolve the configured record and load its file into memory.
    pub async fn fetch_download(&self) -> Result<Download, DownloadError> {
        let record = self.records.fetch(self.selector).await?;
        let path = record.file_path().ok_or(RecordError::NoFile(record.id))?;
        debug!("record {} references {}", record.id, path);

        let file = self.storage.open(path).await?;
        let name = file.name.clone();
        let body = file
            .read_all()
            .await
            .map_err(|source| DownloadError::Read {
                name: name.clone(),
                source,
            })?;

        Ok(Download {
            file_name: base_name(&name).to_string(),
            content_type: mime::content_type_for(&name),
            body,
        })
    }
}

/// Last `/`-separated segment of a storage name.
fn base_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

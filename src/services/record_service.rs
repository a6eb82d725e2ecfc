//! Lookup of the download record in SQLite.

use crate::models::record::DownloadRecord;
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("no download record is configured")]
    NotFound,
    #[error("download record `{0}` not found")]
    IdNotFound(Uuid),
    #[error("expected exactly one download record, found several")]
    MultipleRecords,
    #[error("download record `{0}` has no file attached")]
    NoFile(Uuid),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type RecordResult<T> = Result<T, RecordError>;

/// Which record the download handler serves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecordSelector {
    /// The table must hold exactly one record.
    #[default]
    Single,
    /// A specific record, named in configuration.
    ById(Uuid),
}

impl From<Option<Uuid>> for RecordSelector {
    fn from(id: Option<Uuid>) -> Self {
        id.map_or(Self::Single, Self::ById)
    }
}

#[derive(Clone)]
pub struct RecordService {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

impl RecordService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    pub async fn fetch(&self, selector: RecordSelector) -> RecordResult<DownloadRecord> {
        match selector {
            RecordSelector::Single => self.fetch_single().await,
            RecordSelector::ById(id) => self.fetch_by_id(id).await,
        }
    }

    /// Fetch the only record in the table.
    ///
    /// Reads at most two rows so that an ambiguous table is reported
    /// instead of one row being picked arbitrarily.
    pub async fn fetch_single(&self) -> RecordResult<DownloadRecord> {
        let mut rows = sqlx::query_as::<_, DownloadRecord>(
            "SELECT id, file_path, created_at FROM download_records LIMIT 2",
        )
        .fetch_all(&*self.db)
        .await?;

        match rows.len() {
            0 => Err(RecordError::NotFound),
            1 => Ok(rows.remove(0)),
            _ => Err(RecordError::MultipleRecords),
        }
    }

    pub async fn fetch_by_id(&self, id: Uuid) -> RecordResult<DownloadRecord> {
        sqlx::query_as::<_, DownloadRecord>(
            "SELECT id, file_path, created_at FROM download_records WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => RecordError::IdNotFound(id),
            other => RecordError::Sqlx(other),
        })
    }

    /// Insert a record pointing at `file_path` in storage.
    pub async fn register(&self, file_path: Option<&str>) -> RecordResult<DownloadRecord> {
        let record = sqlx::query_as::<_, DownloadRecord>(
            "INSERT INTO download_records (id, file_path, created_at)
             VALUES (?, ?, ?)
             RETURNING id, file_path, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(file_path)
        .bind(Utc::now())
        .fetch_one(&*self.db)
        .await?;

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;

    async fn service() -> RecordService {
        RecordService::new(Arc::new(memory_pool().await))
    }

    #[tokio::test]
    async fn single_with_empty_table_is_not_found() {
        let svc = service().await;
        assert!(matches!(svc.fetch_single().await, Err(RecordError::NotFound)));
    }

    #[tokio::test]
    async fn single_returns_the_only_record() {
        let svc = service().await;
        let created = svc.register(Some("uploads/report.csv")).await.unwrap();

        let fetched = svc.fetch(RecordSelector::Single).await.unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.file_path(), Some("uploads/report.csv"));
    }

    #[tokio::test]
    async fn single_rejects_ambiguous_table() {
        let svc = service().await;
        svc.register(Some("a.csv")).await.unwrap();
        svc.register(Some("b.csv")).await.unwrap();

        assert!(matches!(
            svc.fetch(RecordSelector::Single).await,
            Err(RecordError::MultipleRecords)
        ));
    }

    #[tokio::test]
    async fn by_id_picks_the_named_record() {
        let svc = service().await;
        svc.register(Some("a.csv")).await.unwrap();
        let wanted = svc.register(Some("b.csv")).await.unwrap();

        let fetched = svc.fetch(RecordSelector::ById(wanted.id)).await.unwrap();
        assert_eq!(fetched.file_path(), Some("b.csv"));

        let missing = Uuid::new_v4();
        assert!(matches!(
            svc.fetch(RecordSelector::ById(missing)).await,
            Err(RecordError::IdNotFound(id)) if id == missing
        ));
    }

    #[test]
    fn selector_from_optional_id() {
        let id = Uuid::new_v4();
        assert_eq!(RecordSelector::from(None), RecordSelector::Single);
        assert_eq!(RecordSelector::from(Some(id)), RecordSelector::ById(id));
    }
}

//! Represents the record that points at the downloadable file.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A download record stored in `download_records`.
///
/// The record itself carries no payload; `file_path` addresses the file in
/// the configured storage backend.
#[derive(Clone, FromRow, Debug)]
pub struct DownloadRecord {
    /// Internal UUID for DB indexing.
    pub id: Uuid,

    /// Storage path of the uploaded file. `None` when nothing was uploaded.
    pub file_path: Option<String>,

    /// When this record was registered.
    pub created_at: DateTime<Utc>,
}

impl DownloadRecord {
    /// The referenced storage path, treating an empty string as absent.
    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref().filter(|path| !path.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(file_path: Option<&str>) -> DownloadRecord {
        DownloadRecord {
            id: Uuid::new_v4(),
            file_path: file_path.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_file_path_counts_as_missing() {
        assert_eq!(record(Some("exports/report.csv")).file_path(), Some("exports/report.csv"));
        assert_eq!(record(Some("")).file_path(), None);
        assert_eq!(record(None).file_path(), None);
    }
}

use crate::services::{
    download_service::DownloadError, record_service::RecordError, storage_service::StorageError,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<DownloadError> for AppError {
    fn from(err: DownloadError) -> Self {
        tracing::error!("download failed: {}", err);
        match err {
            DownloadError::Storage(StorageError::FileNotFound(_)) => {
                AppError::not_found(err.to_string())
            }
            DownloadError::Record(RecordError::Sqlx(_)) => {
                AppError::internal("database error while looking up download record")
            }
            _ => AppError::internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn missing_file_maps_to_404() {
        let err: AppError = DownloadError::Storage(StorageError::FileNotFound("a.csv".into())).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "file `a.csv` not found in storage");
    }

    #[test]
    fn lookup_and_io_failures_map_to_500() {
        let cases = [
            DownloadError::Record(RecordError::NotFound),
            DownloadError::Record(RecordError::MultipleRecords),
            DownloadError::Storage(StorageError::InvalidPath("../x".into())),
            DownloadError::Read {
                name: "a.csv".into(),
                source: io::Error::other("disk gone"),
            },
        ];
        for case in cases {
            let err: AppError = case.into();
            assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn database_details_are_not_leaked() {
        let err: AppError = DownloadError::Record(RecordError::Sqlx(sqlx::Error::PoolClosed)).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("pool"));
    }
}

//! src/services/storage_service.rs
//!
//! Storage backends that resolve a stored path to file bytes. The download
//! service only sees the `Storage` trait; `LocalStorage` is the on-disk
//! implementation rooted at `base_path`.

use bytes::Bytes;
use std::{
    future::Future,
    io::{self, ErrorKind},
    path::PathBuf,
    pin::Pin,
};
use thiserror::Error;
use tokio::{
    fs::{self, File},
    io::{AsyncRead, AsyncReadExt},
};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("file `{0}` not found in storage")]
    FileNotFound(String),
    #[error("invalid storage path `{0}`")]
    InvalidPath(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

const MAX_PATH_LEN: usize = 1024;

/// An opened file handed out by a storage backend.
///
/// The underlying handle lives exactly as long as this value. `read_all`
/// consumes it, so the handle is released once the bytes are read or the
/// read fails.
pub struct StoredFile {
    /// Name the backend stored the file under (the path passed to `open`).
    pub name: String,
    reader: Pin<Box<dyn AsyncRead + Send>>,
}

impl StoredFile {
    pub fn new(name: impl Into<String>, reader: impl AsyncRead + Send + 'static) -> Self {
        Self {
            name: name.into(),
            reader: Box::pin(reader),
        }
    }

    /// Read the whole payload into memory.
    pub async fn read_all(mut self) -> io::Result<Bytes> {
        let mut buf = Vec::new();
        self.reader.read_to_end(&mut buf).await?;
        Ok(Bytes::from(buf))
    }
}

/// A read-only storage backend.
pub trait Storage: Clone + Send + Sync + 'static {
    /// Open the file stored under `path` for reading.
    fn open(&self, path: &str) -> impl Future<Output = StorageResult<StoredFile>> + Send;

    /// Cheap readiness probe used by `/readyz`.
    fn probe(&self) -> impl Future<Output = StorageResult<()>> + Send;
}

/// Filesystem storage rooted at `base_path`.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    /// Base directory on disk where uploaded files live.
    pub base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Basic path validation to avoid trivial traversal vectors.
    ///
    /// Rejects paths that are empty, begin with `/`, have a `..` segment, or
    /// carry backslashes, NULs or other control bytes. Dots inside a file
    /// name (`report..v2.csv`) are fine.
    fn ensure_path_safe(&self, path: &str) -> StorageResult<()> {
        let invalid = || StorageError::InvalidPath(path.to_string());
        if path.is_empty() || path.len() > MAX_PATH_LEN {
            return Err(invalid());
        }
        if path.starts_with('/') || path.split('/').any(|segment| segment == "..") {
            return Err(invalid());
        }
        if path
            .bytes()
            .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0')
        {
            return Err(invalid());
        }
        Ok(())
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let mut full = self.base_path.clone();
        full.push(path);
        full
    }
}

impl Storage for LocalStorage {
    async fn open(&self, path: &str) -> StorageResult<StoredFile> {
        self.ensure_path_safe(path)?;
        let full = self.resolve(path);
        debug!("opening {}", full.display());

        let file = File::open(&full).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                StorageError::FileNotFound(path.to_string())
            } else {
                StorageError::Io(err)
            }
        })?;

        Ok(StoredFile::new(path, file))
    }

    /// Write, read back and delete a temp file under `base_path`.
    async fn probe(&self) -> StorageResult<()> {
        let tmp_path = self.base_path.join(format!(".readyz-{}", Uuid::new_v4()));
        fs::write(&tmp_path, b"readyz").await?;

        let read = fs::read(&tmp_path).await;
        if let Err(err) = fs::remove_file(&tmp_path).await {
            debug!("could not remove probe file {}: {}", tmp_path.display(), err);
        }

        if read? != b"readyz" {
            return Err(StorageError::Io(io::Error::new(
                ErrorKind::InvalidData,
                "probe file content mismatch",
            )));
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn storage_with(path: &str, contents: &[u8]) -> (TempDir, LocalStorage) {
        let dir = TempDir::new().unwrap();
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).await.unwrap();
        fs::write(&full, contents).await.unwrap();
        let storage = LocalStorage::new(dir.path());
        (dir, storage)
    }

    #[tokio::test]
    async fn open_reads_nested_file() {
        let (_dir, storage) = storage_with("uploads/report.csv", b"a,b,c\n1,2,3").await;

        let file = storage.open("uploads/report.csv").await.unwrap();
        assert_eq!(file.name, "uploads/report.csv");
        assert_eq!(file.read_all().await.unwrap(), Bytes::from_static(b"a,b,c\n1,2,3"));
    }

    #[tokio::test]
    async fn open_missing_file_is_not_found() {
        let (_dir, storage) = storage_with("present.txt", b"x").await;

        let err = storage.open("absent.txt").await.err().unwrap();
        assert!(matches!(err, StorageError::FileNotFound(ref p) if p == "absent.txt"));
    }

    #[tokio::test]
    async fn open_rejects_traversal_and_absolute_paths() {
        let (_dir, storage) = storage_with("present.txt", b"x").await;

        for path in ["", "/etc/passwd", "../secret", "a/../../b", "a\\b", "a\nb"] {
            let err = storage.open(path).await.err().unwrap();
            assert!(
                matches!(err, StorageError::InvalidPath(_)),
                "expected InvalidPath for {path:?}, got {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn open_allows_double_dots_inside_names() {
        let (_dir, storage) = storage_with("exports/report..v2.csv", b"a,b").await;

        let file = storage.open("exports/report..v2.csv").await.unwrap();
        assert_eq!(file.read_all().await.unwrap(), Bytes::from_static(b"a,b"));
        assert!(matches!(
            storage.open("exports/..").await,
            Err(StorageError::InvalidPath(_))
        ));
    }

    #[tokio::test]
    async fn probe_leaves_no_files_behind() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage.probe().await.unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn probe_fails_when_base_path_is_missing() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().join("does-not-exist"));

        assert!(matches!(storage.probe().await, Err(StorageError::Io(_))));
    }
}

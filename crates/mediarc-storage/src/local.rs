//! Local filesystem storage rooted at a configured directory.

use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Instant;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncSeek, AsyncWriteExt};

use crate::error::{StorageError, StorageResult};
use crate::receiver::UploadReceiver;

/// Local filesystem storage implementation
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
    receiver: UploadReceiver,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/mediarc/media")
    /// * `chunk_size` - Fixed chunk size used for streamed uploads
    pub async fn new(base_path: impl Into<PathBuf>, chunk_size: usize) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            receiver: UploadReceiver::new(chunk_size),
        })
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// Keys must be relative and must not contain path traversal sequences
    /// that could escape the base storage directory.
    pub fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty() {
            return Err(StorageError::InvalidKey(
                "Storage key cannot be empty".to_string(),
            ));
        }

        if storage_key.contains("..") || storage_key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        Ok(self.base_path.join(storage_key))
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write an in-memory buffer to a storage key.
    pub async fn upload(&self, storage_key: &str, data: Vec<u8>) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(())
    }

    /// Stream a reader to a storage key through the size-limited receiver.
    /// Returns the number of bytes written.
    pub async fn receive_stream<R>(
        &self,
        storage_key: &str,
        reader: &mut R,
        max_size: u64,
    ) -> StorageResult<u64>
    where
        R: AsyncRead + AsyncSeek + Send + Unpin,
    {
        let path = self.key_to_path(storage_key)?;
        self.receiver.store(reader, &path, max_size).await
    }

    pub async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(storage_key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Ok(data)
    }

    pub async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            "Local storage delete successful"
        );

        Ok(())
    }

    pub async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    pub async fn content_length(&self, storage_key: &str) -> StorageResult<u64> {
        let path = self.key_to_path(storage_key)?;
        let meta = fs::metadata(&path)
            .await
            .map_err(|_| StorageError::NotFound(storage_key.to_string()))?;
        Ok(meta.len())
    }

    /// Stream a stored file as chunks (for serving large files).
    pub async fn download_stream(
        &self,
        storage_key: &str,
    ) -> StorageResult<Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>> {
        let path = self.key_to_path(storage_key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }

        let file = fs::File::open(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to open file {}: {}", path.display(), e))
        })?;

        let reader = tokio_util::io::ReaderStream::new(file);

        let stream = reader.map(|result| {
            result.map_err(|e| StorageError::DownloadFailed(format!("Failed to read chunk: {}", e)))
        });

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::io::Cursor;
    use tempfile::tempdir;

    async fn storage(dir: &Path) -> LocalStorage {
        LocalStorage::new(dir, 4 * 1024).await.unwrap()
    }

    #[tokio::test]
    async fn test_upload_download_round_trip() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let data = b"test data".to_vec();
        storage
            .upload("uploads/1/files/test.txt", data.clone())
            .await
            .unwrap();

        let downloaded = storage.download("uploads/1/files/test.txt").await.unwrap();
        assert_eq!(data, downloaded);
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = storage.download("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete("../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.exists("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_delete_nonexistent_is_ok() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        assert!(storage.delete("nonexistent/file.txt").await.is_ok());
    }

    #[tokio::test]
    async fn test_exists_and_content_length() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        storage
            .upload("uploads/1/exists.txt", b"abcd".to_vec())
            .await
            .unwrap();

        assert!(storage.exists("uploads/1/exists.txt").await.unwrap());
        assert!(!storage.exists("uploads/1/missing.txt").await.unwrap());
        assert_eq!(
            storage.content_length("uploads/1/exists.txt").await.unwrap(),
            4
        );
    }

    #[tokio::test]
    async fn test_receive_stream_enforces_limit() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let mut reader = Cursor::new(vec![0u8; 100]);
        let err = storage
            .receive_stream("uploads/1/files/big.bin", &mut reader, 50)
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::PayloadTooLarge { limit: 50 }));
        assert!(!storage.exists("uploads/1/files/big.bin").await.unwrap());
    }

    #[tokio::test]
    async fn test_receive_stream_reports_bytes_written() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let data = b"stream test data".to_vec();
        let mut reader = Cursor::new(data.clone());

        let written = storage
            .receive_stream("uploads/1/files/stream.bin", &mut reader, 1024)
            .await
            .unwrap();

        assert_eq!(written, data.len() as u64);
        assert_eq!(
            storage.download("uploads/1/files/stream.bin").await.unwrap(),
            data
        );
    }

    #[tokio::test]
    async fn test_download_stream() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let data = b"stream download test".to_vec();
        storage
            .upload("uploads/1/files/dl.bin", data.clone())
            .await
            .unwrap();

        let mut stream = storage.download_stream("uploads/1/files/dl.bin").await.unwrap();
        let mut downloaded = Vec::new();
        while let Some(chunk) = stream.next().await {
            downloaded.extend_from_slice(&chunk.unwrap());
        }

        assert_eq!(data, downloaded);
    }
}

//! Chunked streaming upload receiver.
//!
//! Streams an incoming reader to a destination file in fixed-size chunks
//! while enforcing a per-file size limit. The limit is checked after every
//! chunk is read and before it is written, so the on-disk partial never
//! exceeds the limit. The partial file is deleted on every failure path.

use std::path::Path;
use std::time::Instant;

use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt, AsyncWriteExt};

use crate::error::{StorageError, StorageResult};

/// Streams named byte sources to disk with a configured chunk size.
#[derive(Clone, Debug)]
pub struct UploadReceiver {
    chunk_size: usize,
}

impl UploadReceiver {
    /// `chunk_size` is a configuration constant (`UPLOAD_CHUNK_SIZE_BYTES`),
    /// not derived from the stream.
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size }
    }

    /// Stream `reader` to `destination`, enforcing `max_size`.
    ///
    /// The reader is rewound to its start first, since callers may already
    /// have inspected it (content sniffing, thumbnail source selection).
    /// Parent directories are created if absent. Returns the exact number of
    /// bytes written.
    pub async fn store<R>(
        &self,
        reader: &mut R,
        destination: &Path,
        max_size: u64,
    ) -> StorageResult<u64>
    where
        R: AsyncRead + AsyncSeek + Send + Unpin,
    {
        let start = Instant::now();

        reader
            .rewind()
            .await
            .map_err(|e| StorageError::UploadFailed(format!("Failed to rewind source: {}", e)))?;

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await?;
        }

        let result = self.copy_chunked(reader, destination, max_size).await;

        if result.is_err() {
            // Partial artifact must not survive any failure.
            let _ = fs::remove_file(destination).await;
            return result;
        }

        let bytes_written = result?;
        tracing::info!(
            path = %destination.display(),
            size_bytes = bytes_written,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Streamed upload to disk"
        );

        Ok(bytes_written)
    }

    async fn copy_chunked<R>(
        &self,
        reader: &mut R,
        destination: &Path,
        max_size: u64,
    ) -> StorageResult<u64>
    where
        R: AsyncRead + Send + Unpin,
    {
        let mut file = fs::File::create(destination).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to create file {}: {}",
                destination.display(),
                e
            ))
        })?;

        let mut buf = vec![0u8; self.chunk_size];
        let mut total: u64 = 0;

        loop {
            let n = reader
                .read(&mut buf)
                .await
                .map_err(|e| StorageError::UploadFailed(format!("Failed to read chunk: {}", e)))?;
            if n == 0 {
                break;
            }

            total += n as u64;
            if total > max_size {
                return Err(StorageError::PayloadTooLarge { limit: max_size });
            }

            file.write_all(&buf[..n]).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to write file {}: {}",
                    destination.display(),
                    e
                ))
            })?;
        }

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to sync file {}: {}",
                destination.display(),
                e
            ))
        })?;

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn receiver() -> UploadReceiver {
        UploadReceiver::new(4)
    }

    #[tokio::test]
    async fn test_store_under_limit() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("files/out.bin");
        let data = b"hello chunked world".to_vec();
        let mut reader = Cursor::new(data.clone());

        let written = receiver().store(&mut reader, &dest, 1024).await.unwrap();

        assert_eq!(written, data.len() as u64);
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_store_exactly_at_limit() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("out.bin");
        let data = vec![7u8; 16];
        let mut reader = Cursor::new(data.clone());

        let written = receiver().store(&mut reader, &dest, 16).await.unwrap();

        assert_eq!(written, 16);
        assert_eq!(tokio::fs::metadata(&dest).await.unwrap().len(), 16);
    }

    #[tokio::test]
    async fn test_store_over_limit_deletes_partial() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("out.bin");
        let data = vec![7u8; 64];
        let mut reader = Cursor::new(data);

        let err = receiver().store(&mut reader, &dest, 10).await.unwrap_err();

        assert!(matches!(err, StorageError::PayloadTooLarge { limit: 10 }));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_store_rewinds_consumed_reader() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("out.bin");
        let data = b"0123456789".to_vec();
        let mut reader = Cursor::new(data.clone());

        // Simulate an upstream sniff that consumed part of the stream.
        let mut sniff = [0u8; 4];
        reader.read_exact(&mut sniff).await.unwrap();

        let written = receiver().store(&mut reader, &dest, 1024).await.unwrap();

        assert_eq!(written, data.len() as u64);
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_store_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("a/b/c/out.bin");
        let mut reader = Cursor::new(b"x".to_vec());

        receiver().store(&mut reader, &dest, 1024).await.unwrap();

        assert!(dest.exists());
    }

    #[tokio::test]
    async fn test_store_empty_stream() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("empty.bin");
        let mut reader = Cursor::new(Vec::new());

        let written = receiver().store(&mut reader, &dest, 1024).await.unwrap();

        assert_eq!(written, 0);
        assert!(dest.exists());
    }

    #[tokio::test]
    async fn test_limit_caught_before_final_chunk_lands() {
        // 9 bytes with chunk size 4 and limit 8: the third chunk pushes the
        // total over the limit and must never reach the file.
        let dir = tempdir().unwrap();
        let dest = dir.path().join("out.bin");
        let mut reader = Cursor::new(vec![1u8; 9]);

        let err = receiver().store(&mut reader, &dest, 8).await.unwrap_err();

        assert!(matches!(err, StorageError::PayloadTooLarge { .. }));
        assert!(!dest.exists());
    }
}

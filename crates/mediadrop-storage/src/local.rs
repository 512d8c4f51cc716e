use crate::error::{StorageError, StorageResult};
use crate::names::{NameAllocator, TimestampRandomAllocator};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use mediadrop_core::FileListingEntry;
use std::fmt::Display;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// How many fresh names to try before giving up on an exclusive create.
const MAX_NAME_ATTEMPTS: usize = 8;

/// A file that has been fully written to the upload directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub original_name: String,
    pub filename: String,
    pub size: u64,
    pub path: PathBuf,
}

/// The single flat directory holding every uploaded file
#[derive(Clone)]
pub struct UploadDirectory {
    base_path: PathBuf,
    allocator: Arc<dyn NameAllocator>,
}

impl UploadDirectory {
    /// Create the directory (and missing ancestors) if absent.
    ///
    /// Idempotent: an existing directory is reused as is.
    ///
    /// # Arguments
    /// * `base_path` - Directory for stored files (e.g., "./uploads")
    pub async fn ensure(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path)
            .await
            .map_err(|source| StorageError::DirectoryUncreatable {
                path: base_path.clone(),
                source,
            })?;

        Ok(UploadDirectory {
            base_path,
            allocator: Arc::new(TimestampRandomAllocator),
        })
    }

    /// Replace the filename allocation strategy
    pub fn with_allocator(mut self, allocator: Arc<dyn NameAllocator>) -> Self {
        self.allocator = allocator;
        self
    }

    pub fn path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a stored filename to its path, refusing anything that is not a
    /// single plain segment directly inside the upload directory.
    fn name_to_path(&self, filename: &str) -> StorageResult<PathBuf> {
        let mut components = Path::new(filename).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(segment)), None)
                if segment == filename && !filename.contains('\\') =>
            {
                Ok(self.base_path.join(filename))
            }
            _ => Err(StorageError::InvalidName(filename.to_string())),
        }
    }

    /// Allocate a name and create its file exclusively, retrying on collision.
    async fn create_unique(&self, original_name: &str) -> StorageResult<(String, PathBuf, fs::File)> {
        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let filename = self.allocator.allocate(original_name);
            let path = self.name_to_path(&filename)?;

            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => return Ok((filename, path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::warn!(
                        filename = %filename,
                        attempt,
                        "Allocated filename already exists, drawing a new one"
                    );
                }
                Err(e) => {
                    return Err(StorageError::WriteFailed(format!(
                        "Failed to create file {}: {}",
                        path.display(),
                        e
                    )))
                }
            }
        }

        Err(StorageError::NamesExhausted(MAX_NAME_ATTEMPTS))
    }

    /// Stream one upload to a newly allocated file.
    ///
    /// The running size is checked against `max_bytes` before every chunk is
    /// written. On any failure the partially written file is removed, so a
    /// rejected upload never leaves anything behind.
    pub async fn store_stream<S, E>(
        &self,
        original_name: &str,
        stream: S,
        max_bytes: u64,
    ) -> StorageResult<StoredFile>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Display,
    {
        let start = std::time::Instant::now();
        let (filename, path, mut file) = self.create_unique(original_name).await?;

        let written = write_chunks(&mut file, &path, stream, max_bytes).await;
        let result = match written {
            Ok(size) => stamp_completed(file, &path).await.map(|()| size),
            Err(e) => {
                drop(file);
                Err(e)
            }
        };

        let size = match result {
            Ok(size) => size,
            Err(e) => {
                if let Err(remove_err) = fs::remove_file(&path).await {
                    tracing::error!(
                        path = %path.display(),
                        error = %remove_err,
                        "Failed to remove partial upload"
                    );
                }
                return Err(e);
            }
        };

        tracing::info!(
            path = %path.display(),
            original_name = %original_name,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Stored upload"
        );

        Ok(StoredFile {
            original_name: original_name.to_string(),
            filename,
            size,
            path,
        })
    }

    /// Remove a stored file. Missing files are not an error.
    pub async fn discard(&self, filename: &str) -> StorageResult<()> {
        let path = self.name_to_path(filename)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Discarded stored file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::IoError(e)),
        }
    }

    /// List regular files, most recently modified first.
    ///
    /// Entries that vanish between enumeration and stat are skipped. Stored
    /// files carry their completion time at full clock precision, so uploads
    /// finished back to back still order correctly. Equal timestamps (files
    /// placed by hand on a coarse filesystem) fall back to descending name
    /// order.
    pub async fn list(&self) -> StorageResult<Vec<FileListingEntry>> {
        let unreadable = |source: std::io::Error| StorageError::DirectoryUnreadable {
            path: self.base_path.clone(),
            source,
        };

        let mut dir = fs::read_dir(&self.base_path).await.map_err(unreadable)?;
        let mut files = Vec::new();

        while let Some(entry) = dir.next_entry().await.map_err(unreadable)? {
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(unreadable(e)),
            };

            if !metadata.is_file() {
                continue;
            }

            let modified = metadata.modified().map_err(unreadable)?;

            files.push(FileListingEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                size: metadata.len(),
                uploaded_at: DateTime::<Utc>::from(modified),
            });
        }

        files.sort_by(|a, b| {
            b.uploaded_at
                .cmp(&a.uploaded_at)
                .then_with(|| b.name.cmp(&a.name))
        });

        Ok(files)
    }

    /// Check that the directory can still be enumerated
    pub async fn check_readable(&self) -> StorageResult<()> {
        fs::read_dir(&self.base_path)
            .await
            .map(|_| ())
            .map_err(|source| StorageError::DirectoryUnreadable {
                path: self.base_path.clone(),
                source,
            })
    }
}

async fn write_chunks<S, E>(
    file: &mut fs::File,
    path: &Path,
    stream: S,
    max_bytes: u64,
) -> StorageResult<u64>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
{
    let mut stream = std::pin::pin!(stream);
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| StorageError::StreamFailed(e.to_string()))?;

        written = written.saturating_add(chunk.len() as u64);
        if written > max_bytes {
            return Err(StorageError::FileTooLarge {
                limit_bytes: max_bytes,
            });
        }

        file.write_all(&chunk).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;
    }

    file.flush().await.map_err(|e| {
        StorageError::WriteFailed(format!("Failed to flush file {}: {}", path.display(), e))
    })?;
    file.sync_all().await.map_err(|e| {
        StorageError::WriteFailed(format!("Failed to sync file {}: {}", path.display(), e))
    })?;

    Ok(written)
}

/// Set the modification time from the system clock. The filesystem's own
/// timestamp comes from a coarse kernel clock and repeats across writes a few
/// milliseconds apart.
async fn stamp_completed(file: fs::File, path: &Path) -> StorageResult<()> {
    let file = file.into_std().await;
    file.set_modified(SystemTime::now()).map_err(|e| {
        StorageError::WriteFailed(format!(
            "Failed to set modification time on {}: {}",
            path.display(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, SystemTime};
    use tempfile::tempdir;

    fn chunks(parts: &[&'static [u8]]) -> impl Stream<Item = Result<Bytes, std::io::Error>> {
        stream::iter(
            parts
                .iter()
                .map(|p| Ok(Bytes::from_static(p)))
                .collect::<Vec<_>>(),
        )
    }

    /// Returns the same name for the first `repeats` calls, then unique ones.
    struct FixedThenUnique {
        repeats: usize,
        calls: AtomicUsize,
    }

    impl NameAllocator for FixedThenUnique {
        fn allocate(&self, original_name: &str) -> String {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.repeats {
                format!("fixed-{}", original_name)
            } else {
                format!("{}-{}", n, original_name)
            }
        }
    }

    struct Traversing;

    impl NameAllocator for Traversing {
        fn allocate(&self, original_name: &str) -> String {
            format!("../{}", original_name)
        }
    }

    #[tokio::test]
    async fn test_ensure_is_idempotent() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("uploads");

        UploadDirectory::ensure(&nested).await.unwrap();
        assert!(nested.is_dir());

        let storage = UploadDirectory::ensure(&nested).await.unwrap();
        assert_eq!(storage.path(), nested.as_path());
    }

    #[tokio::test]
    async fn test_ensure_fails_when_path_is_a_file() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();

        let result = UploadDirectory::ensure(&blocker).await;
        assert!(matches!(
            result,
            Err(StorageError::DirectoryUncreatable { .. })
        ));
    }

    #[tokio::test]
    async fn test_store_stream_writes_all_chunks() {
        let dir = tempdir().unwrap();
        let storage = UploadDirectory::ensure(dir.path()).await.unwrap();

        let stored = storage
            .store_stream("notes.txt", chunks(&[b"hello ", b"world"]), 1024)
            .await
            .unwrap();

        assert_eq!(stored.original_name, "notes.txt");
        assert!(stored.filename.ends_with("-notes.txt"));
        assert_eq!(stored.size, 11);
        assert_eq!(stored.path, dir.path().join(&stored.filename));
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"hello world");
    }

    #[tokio::test]
    async fn test_store_stream_accepts_exact_limit() {
        let dir = tempdir().unwrap();
        let storage = UploadDirectory::ensure(dir.path()).await.unwrap();

        let stored = storage
            .store_stream("exact.bin", chunks(&[b"12345", b"678"]), 8)
            .await
            .unwrap();
        assert_eq!(stored.size, 8);
    }

    #[tokio::test]
    async fn test_store_stream_rejects_oversize_and_cleans_up() {
        let dir = tempdir().unwrap();
        let storage = UploadDirectory::ensure(dir.path()).await.unwrap();

        let result = storage
            .store_stream("big.bin", chunks(&[b"12345", b"6789"]), 8)
            .await;

        assert!(matches!(
            result,
            Err(StorageError::FileTooLarge { limit_bytes: 8 })
        ));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_store_stream_cleans_up_on_stream_error() {
        let dir = tempdir().unwrap();
        let storage = UploadDirectory::ensure(dir.path()).await.unwrap();

        let failing = stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(std::io::Error::new(ErrorKind::ConnectionReset, "client went away")),
        ]);

        let result = storage.store_stream("broken.bin", failing, 1024).await;
        match result {
            Err(StorageError::StreamFailed(msg)) => assert!(msg.contains("client went away")),
            other => panic!("Expected StreamFailed, got {:?}", other.map(|f| f.filename)),
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_store_stream_sanitizes_traversal_names() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("uploads");
        let storage = UploadDirectory::ensure(&root).await.unwrap();

        let stored = storage
            .store_stream("../../escape.txt", chunks(&[b"x"]), 1024)
            .await
            .unwrap();

        assert_eq!(stored.original_name, "../../escape.txt");
        assert!(stored.filename.ends_with("-escape.txt"));
        assert_eq!(stored.path.parent().unwrap(), root.as_path());
        assert!(!dir.path().join("escape.txt").exists());
    }

    #[tokio::test]
    async fn test_store_stream_retries_on_collision() {
        let dir = tempdir().unwrap();
        let storage = UploadDirectory::ensure(dir.path())
            .await
            .unwrap()
            .with_allocator(Arc::new(FixedThenUnique {
                repeats: 2,
                calls: AtomicUsize::new(0),
            }));

        let first = storage
            .store_stream("a.txt", chunks(&[b"first"]), 1024)
            .await
            .unwrap();
        assert_eq!(first.filename, "fixed-a.txt");

        let second = storage
            .store_stream("a.txt", chunks(&[b"second"]), 1024)
            .await
            .unwrap();
        assert_eq!(second.filename, "2-a.txt");
        assert_eq!(std::fs::read(&first.path).unwrap(), b"first");
        assert_eq!(std::fs::read(&second.path).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_store_stream_gives_up_after_repeated_collisions() {
        let dir = tempdir().unwrap();
        let storage = UploadDirectory::ensure(dir.path())
            .await
            .unwrap()
            .with_allocator(Arc::new(FixedThenUnique {
                repeats: usize::MAX,
                calls: AtomicUsize::new(0),
            }));

        storage
            .store_stream("a.txt", chunks(&[b"one"]), 1024)
            .await
            .unwrap();
        let result = storage.store_stream("a.txt", chunks(&[b"two"]), 1024).await;

        assert!(matches!(result, Err(StorageError::NamesExhausted(_))));
        assert_eq!(std::fs::read(dir.path().join("fixed-a.txt")).unwrap(), b"one");
    }

    #[tokio::test]
    async fn test_allocator_output_must_be_single_segment() {
        let dir = tempdir().unwrap();
        let storage = UploadDirectory::ensure(dir.path().join("uploads"))
            .await
            .unwrap()
            .with_allocator(Arc::new(Traversing));

        let result = storage.store_stream("x.txt", chunks(&[b"x"]), 1024).await;
        assert!(matches!(result, Err(StorageError::InvalidName(_))));
        assert!(!dir.path().join("x.txt").exists());
    }

    #[tokio::test]
    async fn test_discard_rejects_paths_and_ignores_missing() {
        let dir = tempdir().unwrap();
        let storage = UploadDirectory::ensure(dir.path()).await.unwrap();

        assert!(storage.discard("never-written.txt").await.is_ok());
        assert!(matches!(
            storage.discard("../etc/passwd").await,
            Err(StorageError::InvalidName(_))
        ));
        assert!(matches!(
            storage.discard("/etc/passwd").await,
            Err(StorageError::InvalidName(_))
        ));

        let stored = storage
            .store_stream("gone.txt", chunks(&[b"bye"]), 1024)
            .await
            .unwrap();
        storage.discard(&stored.filename).await.unwrap();
        assert!(!stored.path.exists());
    }

    #[tokio::test]
    async fn test_list_empty_directory() {
        let dir = tempdir().unwrap();
        let storage = UploadDirectory::ensure(dir.path()).await.unwrap();
        assert!(storage.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_sorted_newest_first() {
        let dir = tempdir().unwrap();
        let storage = UploadDirectory::ensure(dir.path()).await.unwrap();

        let older = storage
            .store_stream("a.txt", chunks(&[b"aaa"]), 1024)
            .await
            .unwrap();
        let newer = storage
            .store_stream("b.txt", chunks(&[b"bb"]), 1024)
            .await
            .unwrap();

        let an_hour_ago = SystemTime::now() - Duration::from_secs(3600);
        std::fs::File::options()
            .write(true)
            .open(&older.path)
            .unwrap()
            .set_modified(an_hour_ago)
            .unwrap();

        let listing = storage.list().await.unwrap();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].name, newer.filename);
        assert_eq!(listing[0].size, 2);
        assert_eq!(listing[1].name, older.filename);
        assert_eq!(listing[1].size, 3);
        assert!(listing[0].uploaded_at > listing[1].uploaded_at);
    }

    #[tokio::test]
    async fn test_list_orders_back_to_back_stores() {
        let dir = tempdir().unwrap();
        let storage = UploadDirectory::ensure(dir.path()).await.unwrap();

        for _ in 0..20 {
            let first = storage
                .store_stream("a.txt", chunks(&[b"a"]), 1024)
                .await
                .unwrap();
            let second = storage
                .store_stream("b.txt", chunks(&[b"b"]), 1024)
                .await
                .unwrap();

            let listing = storage.list().await.unwrap();
            assert_eq!(listing[0].name, second.filename);
            assert_eq!(listing[1].name, first.filename);
            assert!(listing[0].uploaded_at > listing[1].uploaded_at);
        }
    }

    #[tokio::test]
    async fn test_list_skips_directories() {
        let dir = tempdir().unwrap();
        let storage = UploadDirectory::ensure(dir.path()).await.unwrap();
        std::fs::create_dir(dir.path().join("manual-subdir")).unwrap();
        std::fs::write(dir.path().join("loose.txt"), b"1").unwrap();

        let listing = storage.list().await.unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].name, "loose.txt");
    }

    #[tokio::test]
    async fn test_list_fails_when_directory_removed() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("uploads");
        let storage = UploadDirectory::ensure(&root).await.unwrap();
        std::fs::remove_dir_all(&root).unwrap();

        assert!(matches!(
            storage.list().await,
            Err(StorageError::DirectoryUnreadable { .. })
        ));
        assert!(storage.check_readable().await.is_err());
    }
}

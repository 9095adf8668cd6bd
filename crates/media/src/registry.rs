use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use {
    async_trait::async_trait,
    tokio::io::AsyncWriteExt,
    tracing::{debug, warn},
    uuid::Uuid,
};

use hostbridge_config::StorageConfig;

use crate::mime::MimeType;

// ── Handle and traits ────────────────────────────────────────────────────────

/// Handle to one allocated storage record. Created at the start of a save
/// call and discarded by its end, never shared across calls.
#[derive(Debug, Clone)]
pub struct RecordHandle {
    pub id: Uuid,
    /// Where bytes land while the record is pending.
    pub staging: PathBuf,
    /// Final, externally visible location.
    pub destination: PathBuf,
}

/// Open destination for one record's byte stream.
#[async_trait]
pub trait MediaWriter: Send {
    async fn write_all(&mut self, bytes: &[u8]) -> std::io::Result<()>;
    async fn shutdown(&mut self) -> std::io::Result<()>;
}

/// Platform media registry. `allocate` and `open` return `None` for the
/// expected could-not-acquire-resource failures; only errors raised after a
/// writer was obtained are exceptional.
#[async_trait]
pub trait MediaRegistry: Send + Sync {
    /// Allocate a pending record under `{pictures}/{album}/{name}`.
    async fn allocate(&self, name: &str, mime: MimeType, album: &str) -> Option<RecordHandle>;

    /// Open the allocated record for writing.
    async fn open(&self, handle: &RecordHandle) -> Option<Box<dyn MediaWriter>>;

    /// Clear the pending flag, making the record visible to gallery readers.
    async fn finalize(&self, handle: &RecordHandle) -> std::io::Result<()>;
}

/// Pick the storage backend once at startup from the capability flag.
pub fn select_registry(storage: &StorageConfig) -> Arc<dyn MediaRegistry> {
    if storage.scoped {
        debug!(root = %storage.pictures_dir.display(), "using scoped gallery storage");
        Arc::new(ScopedRegistry::new(storage.pictures_dir.clone()))
    } else {
        debug!(root = %storage.pictures_dir.display(), "scoped storage unavailable, writing directly");
        Arc::new(DirectRegistry::new(storage.pictures_dir.clone()))
    }
}

// ── Filesystem writer ────────────────────────────────────────────────────────

struct FileWriter {
    file: tokio::fs::File,
}

#[async_trait]
impl MediaWriter for FileWriter {
    async fn write_all(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.file.write_all(bytes).await
    }

    async fn shutdown(&mut self) -> std::io::Result<()> {
        self.file.flush().await?;
        self.file.sync_all().await
    }
}

// ── Scoped backend ───────────────────────────────────────────────────────────

/// Scoped-storage backend: bytes go to a hidden staging file and the record
/// becomes visible only when finalize renames it into place. No partial byte
/// sequence is ever exposed under the destination name.
pub struct ScopedRegistry {
    root: PathBuf,
}

impl ScopedRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl MediaRegistry for ScopedRegistry {
    async fn allocate(&self, name: &str, mime: MimeType, album: &str) -> Option<RecordHandle> {
        let dir = self.root.join(album);
        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            warn!(album, error = %e, "could not allocate gallery record");
            return None;
        }
        let id = Uuid::new_v4();
        debug!(name, %mime, album, %id, "allocated pending gallery record");
        Some(RecordHandle {
            id,
            staging: dir.join(format!(".pending-{id}")),
            destination: dir.join(name),
        })
    }

    async fn open(&self, handle: &RecordHandle) -> Option<Box<dyn MediaWriter>> {
        match tokio::fs::File::create(&handle.staging).await {
            Ok(file) => Some(Box::new(FileWriter { file })),
            Err(e) => {
                warn!(staging = %handle.staging.display(), error = %e, "could not open gallery record");
                None
            },
        }
    }

    async fn finalize(&self, handle: &RecordHandle) -> std::io::Result<()> {
        tokio::fs::rename(&handle.staging, &handle.destination).await
    }
}

// ── Direct backend ───────────────────────────────────────────────────────────

/// Legacy backend for platforms without scoped storage: writes straight to
/// the destination with no pending stage, so the record is visible as soon
/// as bytes hit the disk.
pub struct DirectRegistry {
    root: PathBuf,
}

impl DirectRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl MediaRegistry for DirectRegistry {
    async fn allocate(&self, name: &str, mime: MimeType, album: &str) -> Option<RecordHandle> {
        let dir = self.root.join(album);
        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            warn!(album, error = %e, "could not allocate gallery record");
            return None;
        }
        let destination = dir.join(name);
        debug!(name, %mime, album, "allocated direct gallery record");
        Some(RecordHandle {
            id: Uuid::new_v4(),
            staging: destination.clone(),
            destination,
        })
    }

    async fn open(&self, handle: &RecordHandle) -> Option<Box<dyn MediaWriter>> {
        match tokio::fs::File::create(&handle.destination).await {
            Ok(file) => Some(Box::new(FileWriter { file })),
            Err(e) => {
                warn!(destination = %handle.destination.display(), error = %e, "could not open gallery record");
                None
            },
        }
    }

    async fn finalize(&self, _handle: &RecordHandle) -> std::io::Result<()> {
        Ok(())
    }
}

// ── In-memory backend ────────────────────────────────────────────────────────

/// One record held by [`MemoryRegistry`].
#[derive(Debug, Clone)]
pub struct MemoryRecord {
    pub name: String,
    pub mime: MimeType,
    pub album: String,
    pub pending: bool,
    pub written: bool,
    pub bytes: Vec<u8>,
    /// Pending flag as observed while the byte stream was being written.
    pub pending_during_write: Option<bool>,
}

type RecordMap = Arc<Mutex<HashMap<Uuid, MemoryRecord>>>;

/// In-memory registry for tests and standalone runs. Each failure path of
/// the save state machine can be triggered independently.
#[derive(Default)]
pub struct MemoryRegistry {
    records: RecordMap,
    fail_allocate: AtomicBool,
    fail_open: AtomicBool,
    fail_write: AtomicBool,
}

impl MemoryRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_allocate(&self, fail: bool) {
        self.fail_allocate.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_open(&self, fail: bool) {
        self.fail_open.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_write(&self, fail: bool) {
        self.fail_write.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of all records, allocation order not guaranteed.
    #[must_use]
    pub fn records(&self) -> Vec<MemoryRecord> {
        self.records
            .lock()
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn record(&self, id: Uuid) -> Option<MemoryRecord> {
        self.records
            .lock()
            .ok()
            .and_then(|records| records.get(&id).cloned())
    }
}

struct MemoryWriter {
    id: Uuid,
    records: RecordMap,
    fail: bool,
}

#[async_trait]
impl MediaWriter for MemoryWriter {
    async fn write_all(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        if self.fail {
            return Err(std::io::Error::other("simulated write failure"));
        }
        let mut records = self
            .records
            .lock()
            .map_err(|_| std::io::Error::other("record map poisoned"))?;
        if let Some(record) = records.get_mut(&self.id) {
            record.pending_during_write = Some(record.pending);
            record.bytes.extend_from_slice(bytes);
            record.written = true;
        }
        Ok(())
    }

    async fn shutdown(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl MediaRegistry for MemoryRegistry {
    async fn allocate(&self, name: &str, mime: MimeType, album: &str) -> Option<RecordHandle> {
        if self.fail_allocate.load(Ordering::SeqCst) {
            return None;
        }
        let id = Uuid::new_v4();
        let mut records = self.records.lock().ok()?;
        records.insert(id, MemoryRecord {
            name: name.to_string(),
            mime,
            album: album.to_string(),
            pending: true,
            written: false,
            bytes: Vec::new(),
            pending_during_write: None,
        });
        let path = PathBuf::from(format!("mem://{album}/{name}"));
        Some(RecordHandle {
            id,
            staging: path.clone(),
            destination: path,
        })
    }

    async fn open(&self, handle: &RecordHandle) -> Option<Box<dyn MediaWriter>> {
        if self.fail_open.load(Ordering::SeqCst) {
            return None;
        }
        Some(Box::new(MemoryWriter {
            id: handle.id,
            records: self.records.clone(),
            fail: self.fail_write.load(Ordering::SeqCst),
        }))
    }

    async fn finalize(&self, handle: &RecordHandle) -> std::io::Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| std::io::Error::other("record map poisoned"))?;
        match records.get_mut(&handle.id) {
            Some(record) => {
                record.pending = false;
                Ok(())
            },
            None => Err(std::io::Error::other("unknown record handle")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scoped_registry_hides_bytes_until_finalize() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ScopedRegistry::new(dir.path());

        let handle = registry
            .allocate("shot.png", MimeType::Png, "Stuff")
            .await
            .unwrap();
        let mut writer = registry.open(&handle).await.unwrap();
        writer.write_all(b"pixels").await.unwrap();
        writer.shutdown().await.unwrap();

        // Staged but not yet visible under the destination name.
        assert!(handle.staging.exists());
        assert!(!handle.destination.exists());

        registry.finalize(&handle).await.unwrap();
        assert!(!handle.staging.exists());
        assert_eq!(std::fs::read(&handle.destination).unwrap(), b"pixels");
    }

    #[tokio::test]
    async fn scoped_allocate_fails_when_album_dir_cannot_be_created() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the album directory should go.
        std::fs::write(dir.path().join("Stuff"), b"in the way").unwrap();

        let registry = ScopedRegistry::new(dir.path());
        let handle = registry.allocate("shot.jpg", MimeType::Jpeg, "Stuff").await;
        assert!(handle.is_none());
    }

    #[tokio::test]
    async fn direct_registry_is_visible_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let registry = DirectRegistry::new(dir.path());

        let handle = registry
            .allocate("legacy.jpg", MimeType::Jpeg, "Camera")
            .await
            .unwrap();
        assert_eq!(handle.staging, handle.destination);

        let mut writer = registry.open(&handle).await.unwrap();
        writer.write_all(b"raw").await.unwrap();
        writer.shutdown().await.unwrap();
        registry.finalize(&handle).await.unwrap();

        assert_eq!(std::fs::read(&handle.destination).unwrap(), b"raw");
    }

    #[test]
    fn select_registry_honors_capability_flag() {
        let scoped = StorageConfig {
            scoped: true,
            ..StorageConfig::default()
        };
        let legacy = StorageConfig {
            scoped: false,
            ..StorageConfig::default()
        };
        // Just exercise both arms; backends carry no observable type info
        // beyond their behavior, checked above.
        let _ = select_registry(&scoped);
        let _ = select_registry(&legacy);
    }
}

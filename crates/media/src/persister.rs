use std::sync::Arc;

use tracing::{debug, warn};

use hostbridge_config::StorageConfig;

use crate::{
    error::{Error, Result},
    mime::MimeType,
    registry::MediaRegistry,
};

/// Naming defaults applied when a save request carries none, injected at
/// construction from config.
#[derive(Debug, Clone)]
pub struct SaveDefaults {
    pub name: String,
    pub album: String,
}

impl From<&StorageConfig> for SaveDefaults {
    fn from(storage: &StorageConfig) -> Self {
        Self {
            name: storage.default_name.clone(),
            album: storage.default_album.clone(),
        }
    }
}

/// One gallery save as received over the command channel. `bytes` presence
/// is enforced upstream, before this type exists.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub bytes: Vec<u8>,
    pub name: Option<String>,
    pub album: Option<String>,
}

/// Persists image bytes into the shared gallery through the platform
/// registry. Stateless across calls; every save allocates, writes, and
/// finalizes its own record.
pub struct MediaPersister {
    registry: Arc<dyn MediaRegistry>,
    defaults: SaveDefaults,
}

impl MediaPersister {
    pub fn new(registry: Arc<dyn MediaRegistry>, defaults: SaveDefaults) -> Self {
        Self { registry, defaults }
    }

    /// Run one save through the record state machine.
    ///
    /// `Ok(false)` covers the expected acquisition failures (no handle, no
    /// writer); errors after a writer was obtained propagate as [`Error`].
    /// A record is visible to gallery readers only once finalize has cleared
    /// its pending flag, never mid-write.
    pub async fn save(&self, request: SaveRequest) -> Result<bool> {
        let name = request.name.as_deref().unwrap_or(&self.defaults.name);
        let album = request.album.as_deref().unwrap_or(&self.defaults.album);
        let mime = MimeType::from_name(name);

        let Some(handle) = self.registry.allocate(name, mime, album).await else {
            warn!(name, album, "gallery record allocation failed");
            return Ok(false);
        };

        let Some(mut writer) = self.registry.open(&handle).await else {
            // The unwritten record stays behind unfinalized; it is never
            // made visible.
            warn!(name, album, "gallery record could not be opened");
            return Ok(false);
        };

        writer
            .write_all(&request.bytes)
            .await
            .map_err(|e| Error::external("write gallery record", e))?;
        writer
            .shutdown()
            .await
            .map_err(|e| Error::external("flush gallery record", e))?;

        self.registry
            .finalize(&handle)
            .await
            .map_err(|e| Error::external("finalize gallery record", e))?;

        debug!(name, %mime, album, bytes = request.bytes.len(), "gallery record finalized");
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::registry::MemoryRegistry;

    fn persister(registry: &Arc<MemoryRegistry>) -> MediaPersister {
        MediaPersister::new(registry.clone(), SaveDefaults {
            name: "image.jpg".into(),
            album: "Stuff".into(),
        })
    }

    fn request(bytes: &[u8]) -> SaveRequest {
        SaveRequest {
            bytes: bytes.to_vec(),
            name: None,
            album: None,
        }
    }

    #[tokio::test]
    async fn save_finalizes_record_and_reports_true() {
        let registry = Arc::new(MemoryRegistry::new());
        let saved = persister(&registry).save(request(b"abc")).await.unwrap();
        assert!(saved);

        let records = registry.records();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.name, "image.jpg");
        assert_eq!(record.album, "Stuff");
        assert_eq!(record.bytes, b"abc");
        assert!(record.written);
        assert!(!record.pending, "record must be visible after success");
        assert_eq!(
            record.pending_during_write,
            Some(true),
            "record must stay pending through the write window"
        );
    }

    #[tokio::test]
    async fn defaults_apply_when_name_and_album_are_absent() {
        let registry = Arc::new(MemoryRegistry::new());
        let saved = persister(&registry)
            .save(SaveRequest {
                bytes: b"x".to_vec(),
                name: Some("pic.PNG".into()),
                album: None,
            })
            .await
            .unwrap();
        assert!(saved);

        let record = &registry.records()[0];
        assert_eq!(record.name, "pic.PNG");
        assert_eq!(record.mime, MimeType::Png);
        assert_eq!(record.album, "Stuff");
    }

    #[tokio::test]
    async fn allocation_failure_is_false_not_an_error() {
        let registry = Arc::new(MemoryRegistry::new());
        registry.set_fail_allocate(true);

        let saved = persister(&registry).save(request(b"abc")).await.unwrap();
        assert!(!saved);
        assert!(registry.records().is_empty());
    }

    #[tokio::test]
    async fn open_failure_is_false_and_leaves_record_pending() {
        let registry = Arc::new(MemoryRegistry::new());
        registry.set_fail_open(true);

        let saved = persister(&registry).save(request(b"abc")).await.unwrap();
        assert!(!saved);

        // The allocated record stays behind, never finalized.
        let records = registry.records();
        assert_eq!(records.len(), 1);
        assert!(records[0].pending);
        assert!(!records[0].written);
    }

    #[tokio::test]
    async fn write_failure_propagates_as_error() {
        let registry = Arc::new(MemoryRegistry::new());
        registry.set_fail_write(true);

        let err = persister(&registry).save(request(b"abc")).await.unwrap_err();
        assert!(err.to_string().contains("write gallery record"));

        // Failed artifact: allocated but never made visible.
        let records = registry.records();
        assert_eq!(records.len(), 1);
        assert!(records[0].pending);
    }
}

//! Gallery persistence: MIME resolution, storage-record allocation, and the
//! pending → written → finalized write path.
//!
//! The platform media registry is abstracted behind [`MediaRegistry`] with two
//! real backends chosen once at startup: scoped storage (staged write, record
//! invisible until finalized) and direct filesystem writes for platforms
//! without scoped-storage support.

pub mod error;
pub mod mime;
pub mod persister;
pub mod registry;

pub use {
    error::{Error, Result},
    mime::MimeType,
    persister::{MediaPersister, SaveDefaults, SaveRequest},
    registry::{
        DirectRegistry, MediaRegistry, MediaWriter, MemoryRegistry, RecordHandle, ScopedRegistry,
        select_registry,
    },
};

use std::sync::Arc;

use hostbridge_config::BridgeConfig;
use hostbridge_logging::{LogForwarder, LogSink, TracingSink};
use hostbridge_media::{MediaPersister, MediaRegistry, SaveDefaults, select_registry};

/// Shared state handed to every method handler. Holds the configured
/// collaborators; no cross-call mutable state lives here.
pub struct ChannelState {
    pub config: BridgeConfig,
    pub log: LogForwarder,
    pub media: MediaPersister,
}

impl ChannelState {
    /// Wire the bridge with explicit collaborators.
    pub fn new(
        config: BridgeConfig,
        sink: Arc<dyn LogSink>,
        registry: Arc<dyn MediaRegistry>,
    ) -> Self {
        let log = LogForwarder::new(sink, config.logging.default_tag.clone());
        let media = MediaPersister::new(registry, SaveDefaults::from(&config.storage));
        Self { config, log, media }
    }

    /// Wire the bridge with platform defaults: `tracing` as the log sink and
    /// the storage backend picked from the config capability flag.
    #[must_use]
    pub fn with_platform_defaults(config: BridgeConfig) -> Self {
        let registry = select_registry(&config.storage);
        Self::new(config, Arc::new(TracingSink), registry)
    }
}

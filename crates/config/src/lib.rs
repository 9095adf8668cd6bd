//! Configuration schema and loading for the hostbridge command bridge.
//!
//! Config files: `hostbridge.toml` or `hostbridge.json`, searched in `./`
//! then the user config dir. Every field has a default, so the bridge runs
//! with no config file at all.

pub mod loader;
pub mod schema;

pub use {
    loader::{discover_and_load, load_config},
    schema::{BridgeConfig, ChannelConfig, LoggingConfig, StorageConfig},
};

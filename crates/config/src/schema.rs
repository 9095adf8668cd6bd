use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level bridge configuration. Every field is defaulted, so a missing or
/// partial config file is never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub channel: ChannelConfig,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
}

/// Command channel identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Channel identifier announced to the UI layer.
    pub name: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            name: hostbridge_protocol::DEFAULT_CHANNEL.to_string(),
        }
    }
}

/// Log forwarding defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Tag applied to forwarded records that carry none of their own.
    #[serde(rename = "defaultTag")]
    pub default_tag: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_tag: "FlutterLog".to_string(),
        }
    }
}

/// Gallery storage backend selection and write defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Whether the platform supports scoped gallery storage. Selects the
    /// registry backend once at startup.
    pub scoped: bool,
    /// Root of the public pictures tree. Albums are subdirectories.
    #[serde(rename = "picturesDir")]
    pub pictures_dir: PathBuf,
    /// File name used when a save request carries none.
    #[serde(rename = "defaultName")]
    pub default_name: String,
    /// Album used when a save request carries none.
    #[serde(rename = "defaultAlbum")]
    pub default_album: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            scoped: true,
            pictures_dir: default_pictures_dir(),
            default_name: "image.jpg".to_string(),
            default_album: "Stuff".to_string(),
        }
    }
}

/// Platform pictures directory, falling back to a relative `Pictures/`.
fn default_pictures_dir() -> PathBuf {
    directories::UserDirs::new()
        .and_then(|dirs| dirs.picture_dir().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("Pictures"))
}

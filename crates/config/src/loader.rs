use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::schema::BridgeConfig;

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["hostbridge.toml", "hostbridge.json"];

/// Load config from the given path. Format is chosen by extension: `.json`
/// parses as JSON, anything else as TOML.
pub fn load_config(path: &Path) -> anyhow::Result<BridgeConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    parse_config(&raw, path)
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<BridgeConfig> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(raw)
            .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))
    } else {
        toml::from_str(raw).map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))
    }
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./hostbridge.{toml,json}` (project-local)
/// 2. `~/.config/hostbridge/hostbridge.{toml,json}` (user-global)
///
/// Returns `BridgeConfig::default()` if no config file is found.
pub fn discover_and_load() -> BridgeConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    BridgeConfig::default()
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    // Project-local
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    // User-global
    if let Some(dirs) = directories::ProjectDirs::from("", "", "hostbridge") {
        for name in CONFIG_FILENAMES {
            let p = dirs.config_dir().join(name);
            if p.exists() {
                return Some(p);
            }
        }
    }

    None
}

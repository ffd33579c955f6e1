//! # Instance configuration.
//!
//! Provides [`Config`], the settings shared by every instance of the application.
//!
//! Config is used in two ways:
//! 1. **Instance creation**: `Instance::builder(config)`
//! 2. **File storage placement**: `FileStorage::from_config(&config)`
//!
//! ## Sentinel values
//! - `data_dir = None` → platform data directory (see [`Config::resolved_data_dir`])

use std::path::PathBuf;

/// Storage key and channel name used by every instance unless overridden.
pub const DEFAULT_NAME: &str = "torn-chain";

/// Global configuration for an instance.
///
/// ## Field semantics
/// - `storage_key`: slot holding the serialized document
/// - `channel_name`: broadcast channel shared by all instances
/// - `data_dir`: directory used by file-backed storage
///
/// ## Notes
/// All instances that should observe each other must agree on `storage_key` and
/// `channel_name`. Neither is meant to vary per session.
#[derive(Clone, Debug)]
pub struct Config {
    /// Key of the persistent slot holding the document.
    pub storage_key: String,

    /// Name of the cross-instance broadcast channel.
    pub channel_name: String,

    /// Directory for file-backed storage.
    ///
    /// `None` means `<platform data dir>/tabsync`.
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Returns the directory file-backed storage should use.
    ///
    /// Falls back to the current directory when the platform has no data dir.
    pub fn resolved_data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .map(|d| d.join("tabsync"))
                .unwrap_or_else(|| PathBuf::from(".tabsync")),
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `storage_key = "torn-chain"`
    /// - `channel_name = "torn-chain"`
    /// - `data_dir = None`
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_NAME.to_string(),
            channel_name: DEFAULT_NAME.to_string(),
            data_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_share_one_name() {
        let cfg = Config::default();
        assert_eq!(cfg.storage_key, "torn-chain");
        assert_eq!(cfg.channel_name, cfg.storage_key);
        assert!(cfg.data_dir.is_none());
    }

    #[test]
    fn explicit_data_dir_wins() {
        let cfg = Config {
            data_dir: Some(PathBuf::from("/tmp/somewhere")),
            ..Config::default()
        };
        assert_eq!(cfg.resolved_data_dir(), PathBuf::from("/tmp/somewhere"));
    }
}

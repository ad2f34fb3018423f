//! JSON file configuration adapter.
//!
//! Implements [`ConfigPort`] over a single JSON document on the host file
//! system.  Missing fields fall back to [`RobotConfig::default`], so a
//! file only needs the values being tuned:
//!
//! ```json
//! { "lookout_ms": 6000, "beacon": { "enter": 650, "exit": 450, "polarity": "ActiveHigh" } }
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::RobotConfig;

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<RobotConfig, ConfigError> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::NotFound,
            _ => {
                warn!("config read {}: {}", self.path.display(), e);
                ConfigError::IoError
            }
        })?;
        let config: RobotConfig = serde_json::from_str(&text).map_err(|e| {
            warn!("config parse {}: {}", self.path.display(), e);
            ConfigError::Corrupted
        })?;
        config.validate()?;
        info!("config loaded from {}", self.path.display());
        Ok(config)
    }

    fn save(&self, config: &RobotConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let text = serde_json::to_string_pretty(config).map_err(|_| ConfigError::Corrupted)?;
        std::fs::write(&self.path, text).map_err(|e| {
            warn!("config write {}: {}", self.path.display(), e);
            ConfigError::IoError
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("towerbot-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn missing_file_is_not_found() {
        let file = JsonConfigFile::new(scratch("missing"));
        assert_eq!(file.load(), Err(ConfigError::NotFound));
    }

    #[test]
    fn save_then_load() {
        let path = scratch("roundtrip");
        let file = JsonConfigFile::new(&path);
        let config = RobotConfig {
            lookout_ms: 4321,
            ..RobotConfig::default()
        };
        file.save(&config).unwrap();
        assert_eq!(file.load().unwrap(), config);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn partial_document_fills_defaults() {
        let path = scratch("partial");
        std::fs::write(&path, r#"{ "spin_ms": 3000 }"#).unwrap();
        let config = JsonConfigFile::new(&path).load().unwrap();
        assert_eq!(config.spin_ms, 3000);
        assert_eq!(config.lookout_ms, RobotConfig::default().lookout_ms);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn garbage_is_corrupted() {
        let path = scratch("garbage");
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(JsonConfigFile::new(&path).load(), Err(ConfigError::Corrupted));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn invalid_values_rejected_both_ways() {
        let path = scratch("invalid");
        std::fs::write(&path, r#"{ "escape_ms": 0 }"#).unwrap();
        let file = JsonConfigFile::new(&path);
        assert!(matches!(file.load(), Err(ConfigError::ValidationFailed(_))));

        let bad = RobotConfig {
            escape_ms: 0,
            ..RobotConfig::default()
        };
        assert!(matches!(file.save(&bad), Err(ConfigError::ValidationFailed(_))));
        let _ = std::fs::remove_file(path);
    }
}

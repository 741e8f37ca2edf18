//! JSON file configuration store.
//!
//! Implements [`ConfigPort`] over a single JSON document on the host
//! filesystem.  Every field is range-checked before it is written.

use std::io::ErrorKind;
use std::path::PathBuf;

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::MaintenanceConfig;

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<MaintenanceConfig, ConfigError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(ConfigError::NotFound),
            Err(e) => {
                warn!("Config read {:?} failed: {}", self.path, e);
                return Err(ConfigError::IoError);
            }
        };

        let config: MaintenanceConfig =
            serde_json::from_slice(&bytes).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        info!("Config loaded from {:?}", self.path);
        Ok(config)
    }

    fn save(&self, config: &MaintenanceConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let bytes = serde_json::to_vec_pretty(config).map_err(|_| ConfigError::IoError)?;
        std::fs::write(&self.path, bytes).map_err(|e| {
            warn!("Config write {:?} failed: {}", self.path, e);
            ConfigError::IoError
        })?;
        info!("Config saved to {:?}", self.path);
        Ok(())
    }
}

//! Configuration document persistence.
//!
//! The JSON file on disk is the source of truth. It is re-read on every sync
//! cycle and rewritten only when an endpoint is registered through the API.

use crate::error::MonitorError;
use apiwatch_common::config::MonitorConfig;
use apiwatch_common::types::Endpoint;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

/// Where the monitor reads its endpoint list from.
pub trait ConfigSource: Send + Sync {
    /// Read and parse the current document.
    fn load(&self) -> Result<MonitorConfig, MonitorError>;

    /// Append an endpoint and persist the document.
    ///
    /// Fails with [`MonitorError::DuplicateName`] without writing anything when
    /// the name is already present.
    fn append_endpoint(&self, endpoint: Endpoint) -> Result<MonitorConfig, MonitorError>;

    /// Human readable location, used in logs.
    fn describe(&self) -> String;
}

/// Manages the JSON configuration file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Create a store for the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the configuration file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the document atomically (temporary file + rename).
    pub fn save(&self, config: &MonitorConfig) -> Result<(), MonitorError> {
        let content = config.to_json_pretty()?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(|e| self.write_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.write_error(e))?;
        Ok(())
    }

    fn write_error(&self, e: std::io::Error) -> MonitorError {
        MonitorError::ConfigWrite(format!("{}: {}", self.path.display(), e))
    }
}

impl ConfigSource for JsonFileStore {
    fn load(&self) -> Result<MonitorConfig, MonitorError> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| MonitorError::ConfigLoad(format!("{}: {}", self.path.display(), e)))?;
        MonitorConfig::from_json_str(&content)
            .map_err(|e| MonitorError::ConfigLoad(format!("{}: {}", self.path.display(), e)))
    }

    fn append_endpoint(&self, endpoint: Endpoint) -> Result<MonitorConfig, MonitorError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut config = self.load()?;
        if config.contains(&endpoint.name) {
            return Err(MonitorError::DuplicateName(endpoint.name));
        }

        let name = endpoint.name.clone();
        config.endpoints.push(endpoint);
        self.save(&config)?;

        info!(
            endpoint = %name,
            path = %self.path.display(),
            total = config.endpoints.len(),
            "Endpoint appended to configuration"
        );
        Ok(config)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

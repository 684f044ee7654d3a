//! Configuration Management
//!
//! Persists the grid connection used by the CLI between invocations.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5000;

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Grid host
    #[serde(default)]
    pub host: Option<String>,
    /// Grid REST port
    #[serde(default)]
    pub port: Option<u16>,
    /// Connect over https
    #[serde(default)]
    pub secure: Option<bool>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("synergos").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load from `path`; a missing or unreadable file yields the defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        match Self::config_path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get effective host (CLI > config > default)
    pub fn effective_host(&self, cli: Option<&str>) -> String {
        cli.map(str::to_string)
            .or_else(|| self.host.clone())
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
    }

    /// Get effective port (CLI > config > default)
    pub fn effective_port(&self, cli: Option<u16>) -> u16 {
        cli.or(self.port).unwrap_or(DEFAULT_PORT)
    }

    /// Get effective scheme (CLI > config > plain http)
    pub fn effective_secure(&self, cli: Option<bool>) -> bool {
        cli.or(self.secure).unwrap_or(false)
    }

    /// Merge the given overrides and save
    pub fn update(&mut self, host: Option<String>, port: Option<u16>, secure: Option<bool>) -> Result<()> {
        if host.is_some() {
            self.host = host;
        }
        if port.is_some() {
            self.port = port;
        }
        if secure.is_some() {
            self.secure = secure;
        }
        self.save()
    }
}

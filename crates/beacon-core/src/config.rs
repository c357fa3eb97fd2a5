//! Configuration system for Beacon.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $BEACON_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/beacon/config.toml
//!   3. ~/.config/beacon/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::wire::{ANNOUNCE_BASE_SECS, ANNOUNCE_JITTER_SECS, HELLO_PORT, MAX_NEIGHBORS};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BeaconConfig {
    pub network: NetworkConfig,
    pub neighbors: NeighborConfig,
    pub announce: AnnounceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Network interface name. Empty = must be passed on the command line.
    pub interface: String,
    /// UDP port for hello datagrams. 0 = default port.
    pub port: u16,
    /// This node's id, printed as x.y. 0 = derived from the process id.
    pub node_id: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NeighborConfig {
    /// Neighbor table capacity. Zero is a configuration fault — the daemon
    /// refuses to start rather than run with a table that cannot admit
    /// anything.
    pub max_neighbors: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnounceConfig {
    /// Fixed base interval between hellos, in seconds.
    pub base_secs: u64,
    /// Upper bound on the random jitter added per interval, in seconds.
    pub jitter_secs: u64,
    /// Greeting carried in each hello. Logged by receivers, nothing more.
    pub message: String,
    /// Advertised link metric. Higher is stronger.
    pub rssi: i16,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            neighbors: NeighborConfig::default(),
            announce: AnnounceConfig::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            interface: String::new(),
            port: 0,
            node_id: 0,
        }
    }
}

impl Default for NeighborConfig {
    fn default() -> Self {
        Self {
            max_neighbors: MAX_NEIGHBORS,
        }
    }
}

impl Default for AnnounceConfig {
    fn default() -> Self {
        Self {
            base_secs: ANNOUNCE_BASE_SECS,
            jitter_secs: ANNOUNCE_JITTER_SECS,
            message: "Hello".to_string(),
            rssi: -60,
        }
    }
}

impl NetworkConfig {
    /// The effective hello port.
    pub fn hello_port(&self) -> u16 {
        if self.port == 0 {
            HELLO_PORT
        } else {
            self.port
        }
    }
}

// ── Path helpers ─────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("beacon")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
}

// ── Loading ──────────────────────────────────────────────────────────────────

impl BeaconConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadFailed(path.clone(), e))?;
            toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.clone(), e))?
        } else {
            BeaconConfig::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("BEACON_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&BeaconConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text)
                .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Apply BEACON_* env var overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("BEACON_NETWORK__INTERFACE") {
            self.network.interface = v;
        }
        if let Ok(v) = std::env::var("BEACON_NETWORK__PORT") {
            if let Ok(p) = v.parse() {
                self.network.port = p;
            }
        }
        if let Ok(v) = std::env::var("BEACON_NETWORK__NODE_ID") {
            if let Ok(id) = v.parse() {
                self.network.node_id = id;
            }
        }
        if let Ok(v) = std::env::var("BEACON_NEIGHBORS__MAX_NEIGHBORS") {
            if let Ok(n) = v.parse() {
                self.neighbors.max_neighbors = n;
            }
        }
        if let Ok(v) = std::env::var("BEACON_ANNOUNCE__MESSAGE") {
            self.announce.message = v;
        }
        if let Ok(v) = std::env::var("BEACON_ANNOUNCE__RSSI") {
            if let Ok(r) = v.parse() {
                self.announce.rssi = r;
            }
        }
    }
}

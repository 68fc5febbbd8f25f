//! Configuration management
//!
//! This module handles loading and managing configuration from:
//! - Command-line arguments
//! - Environment variables
//! - Configuration files (TOML)
//! - Defaults

use crate::error::{Error, Result};
use crate::indexer::ConflictPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub indexer: IndexerConfig,

    #[serde(default)]
    pub bitcoin: BitcoinConfig,

    #[serde(default)]
    pub spaced: SpacedConfig,

    #[serde(default)]
    pub rpc: RpcConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Indexing run settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// First block height to process
    #[serde(default = "default_start_height")]
    pub start_height: u64,

    /// Last block height to process (defaults to the chain tip)
    pub end_height: Option<u64>,

    /// Policy for records arriving after a terminal action
    #[serde(default)]
    pub conflict_policy: ConflictPolicy,

    /// Seconds between polls in watch mode
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

/// Bitcoin Core RPC configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BitcoinConfig {
    #[serde(default = "default_bitcoin_url")]
    pub url: String,

    /// RPC user
    pub user: Option<String>,

    /// RPC password
    pub password: Option<String>,
}

/// spaced RPC configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpacedConfig {
    #[serde(default = "default_spaced_url")]
    pub url: String,
}

/// Shared RPC client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum number of retries for transport failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions

/// Spaces protocol activation height on testnet4
fn default_start_height() -> u64 {
    2_865_460
}

fn default_poll_interval() -> u64 {
    30
}

fn default_bitcoin_url() -> String {
    "http://localhost:18332".to_string()
}

fn default_spaced_url() -> String {
    "http://localhost:22221".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

// Default implementations

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            start_height: default_start_height(),
            end_height: None,
            conflict_policy: ConflictPolicy::default(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl Default for BitcoinConfig {
    fn default() -> Self {
        Self {
            url: default_bitcoin_url(),
            user: None,
            password: None,
        }
    }
}

impl Default for SpacedConfig {
    fn default() -> Self {
        Self {
            url: default_spaced_url(),
        }
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let contents = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config file {:?}: {}", path, e)))?;

        Ok(config)
    }

    /// Load configuration from default locations
    ///
    /// Searches in order:
    /// 1. ./config.toml
    /// 2. ~/.spaces-indexer/config.toml
    /// 3. /etc/spaces-indexer/config.toml
    pub fn load() -> Result<Self> {
        let mut paths = vec![PathBuf::from("config.toml")];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".spaces-indexer").join("config.toml"));
        }
        paths.push(PathBuf::from("/etc/spaces-indexer/config.toml"));

        for path in paths {
            if path.exists() {
                tracing::info!("Loading config from {:?}", path);
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Bitcoin RPC credentials from config, falling back to environment
    ///
    /// Returns `None` when neither source provides both user and password.
    pub fn bitcoin_credentials(&self) -> Option<(String, String)> {
        let user = self
            .bitcoin
            .user
            .clone()
            .or_else(|| std::env::var("BITCOIN_RPC_USER").ok());
        let password = self
            .bitcoin
            .password
            .clone()
            .or_else(|| std::env::var("BITCOIN_RPC_PASSWORD").ok());

        match (user, password) {
            (Some(user), Some(password)) => Some((user, password)),
            (Some(_), None) | (None, Some(_)) => {
                tracing::warn!("Incomplete Bitcoin RPC credentials, connecting without auth");
                None
            }
            (None, None) => None,
        }
    }
}

//! Server configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use wizard_core::{HeartbeatConfig, SessionConfig};
use wizard_runner::RunnerConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub heartbeat: HeartbeatSettings,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl AppConfig {
    /// Settings handed to the session
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            heartbeat: self.heartbeat.to_heartbeat_config(),
            runner: self.runner.clone(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory with the browser UI, served as fallback
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
    /// Command started once the server listens; `%u` becomes the server URL
    #[serde(default)]
    pub exec_wrapper: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
            exec_wrapper: None,
        }
    }
}

impl ServerConfig {
    /// URL the local browser should open
    pub fn local_url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }

    /// Exec wrapper command with `%u` substituted
    pub fn wrapper_command(&self) -> Option<String> {
        self.exec_wrapper
            .as_deref()
            .map(str::trim)
            .filter(|cmd| !cmd.is_empty())
            .map(|cmd| cmd.replace("%u", &self.local_url()))
    }
}

/// Heartbeat supervision (seconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_check_interval_secs() -> u64 {
    5
}

impl Default for HeartbeatSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            check_interval_secs: default_check_interval_secs(),
        }
    }
}

impl HeartbeatSettings {
    pub fn to_heartbeat_config(&self) -> HeartbeatConfig {
        HeartbeatConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            // A zero period would make tokio's interval panic.
            check_interval: Duration::from_secs(self.check_interval_secs.max(1)),
        }
    }
}

/// Action catalog location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("config/actions.toml")
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

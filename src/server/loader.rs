//! Configuration loading
//!
//! Handles loading configuration from embedded defaults, files, and environment.

use super::config::AppConfig;
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

/// Load configuration from files and environment
pub fn load_config() -> Result<AppConfig> {
    let profile = std::env::var("WIZARD_ENV").unwrap_or_else(|_| "development".to_string());

    let config = Config::builder()
        // 1. Embedded defaults
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        // 2. External overrides (optional)
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{profile}")).required(false))
        .add_source(File::with_name("config/local").required(false))
        // 3. Environment variables, e.g. WIZARD_SERVER__PORT
        .add_source(
            Environment::with_prefix("WIZARD")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_defaults_deserialize() {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert!(config.server.exec_wrapper.is_none());
        assert_eq!(config.heartbeat.timeout_secs, 10);
        assert_eq!(config.heartbeat.check_interval_secs, 5);
        assert_eq!(config.runner.shell, "bash");
        assert_eq!(config.runner.terminal_program, "ptyxis");
        assert_eq!(config.runner.terminal_args, vec!["-s", "--"]);
        assert_eq!(config.runner.read_buffer_size, 1024);
        assert_eq!(config.catalog.path.to_str(), Some("config/actions.toml"));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(
                "[server]\nport = 8088\n[runner]\nterminal_program = \"kgx\"\n",
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 8088);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.runner.terminal_program, "kgx");
        assert_eq!(config.runner.shell, "bash");
    }
}

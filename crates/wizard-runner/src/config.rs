//! Runner configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Interpreter line prepended to scripts that don't carry one
pub const DEFAULT_SHEBANG: &str = "#!/bin/bash";

/// Settings shared by the detached and attached strategies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Interpreter used for attached runs (`<shell> -c <script>`)
    #[serde(default = "default_shell")]
    pub shell: String,
    /// Terminal emulator for detached runs
    #[serde(default = "default_terminal_program")]
    pub terminal_program: String,
    /// Arguments placed before the script path
    #[serde(default = "default_terminal_args")]
    pub terminal_args: Vec<String>,
    /// Where detached scripts are written (OS temp dir when unset)
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
    /// PTY read buffer size in bytes
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,
    /// TERM exported to attached processes
    #[serde(default = "default_term")]
    pub term: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            shell: default_shell(),
            terminal_program: default_terminal_program(),
            terminal_args: default_terminal_args(),
            scratch_dir: None,
            read_buffer_size: default_read_buffer_size(),
            term: default_term(),
        }
    }
}

impl RunnerConfig {
    /// Directory that receives detached script files
    #[must_use]
    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

fn default_shell() -> String {
    "bash".to_string()
}

fn default_terminal_program() -> String {
    "ptyxis".to_string()
}

fn default_terminal_args() -> Vec<String> {
    vec!["-s".to_string(), "--".to_string()]
}

fn default_read_buffer_size() -> usize {
    1024
}

fn default_term() -> String {
    "xterm-256color".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunnerConfig::default();
        assert_eq!(config.shell, "bash");
        assert_eq!(config.terminal_program, "ptyxis");
        assert_eq!(config.terminal_args, vec!["-s", "--"]);
        assert_eq!(config.read_buffer_size, 1024);
        assert_eq!(config.scratch_dir(), std::env::temp_dir());
    }

    #[test]
    fn test_partial_deserialize() {
        let config: RunnerConfig =
            serde_json::from_str(r#"{"terminal_program":"xterm","terminal_args":["-e"]}"#).unwrap();
        assert_eq!(config.terminal_program, "xterm");
        assert_eq!(config.terminal_args, vec!["-e"]);
        assert_eq!(config.shell, "bash");
    }
}

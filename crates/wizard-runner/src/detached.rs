//! Detached execution: run a script in its own terminal window
//!
//! The script is written to a uniquely named temporary file, marked
//! executable and handed to an external terminal emulator. The call blocks
//! until the terminal session ends. The temporary file is removed on every
//! exit path.

use crate::config::{RunnerConfig, DEFAULT_SHEBANG};
use crate::error::{Error, Result};
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::TempPath;
use tokio::process::Command;
use tracing::{debug, info, warn};

const SCRIPT_PREFIX: &str = "wizard-";
const SCRIPT_SUFFIX: &str = ".sh";

/// Normalize a script body for standalone execution.
///
/// Surrounding whitespace is trimmed and a default interpreter line is
/// prepended when the body has none.
#[must_use]
pub fn prepare_script(script: &str) -> String {
    let body = script.trim();
    if body.starts_with("#!") {
        body.to_string()
    } else {
        debug!("Adding default interpreter line");
        format!("{}\n{}", DEFAULT_SHEBANG, body)
    }
}

/// Runs scripts inside an external terminal emulator.
#[derive(Debug, Clone)]
pub struct DetachedRunner {
    config: RunnerConfig,
}

impl DetachedRunner {
    /// Create a runner with the given configuration
    #[must_use]
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Run `script` in a terminal window and wait for it to close.
    pub async fn run(&self, script: &str) -> Result<()> {
        let body = prepare_script(script);
        let path = persist_script(&self.config.scratch_dir(), &body)?;
        info!(path = %path.display(), "Executing temporary script");

        let result = self.launch(&path).await;

        let shown = path.display().to_string();
        match path.close() {
            Ok(()) => debug!(path = %shown, "Temporary script removed"),
            Err(e) => warn!(path = %shown, error = %e, "Failed to remove temporary script"),
        }

        result
    }

    async fn launch(&self, script_path: &Path) -> Result<()> {
        let program = &self.config.terminal_program;
        let status = Command::new(program)
            .args(&self.config.terminal_args)
            .arg(script_path)
            .status()
            .await
            .map_err(|source| Error::TerminalLaunch {
                program: program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::TerminalExit(status))
        }
    }
}

/// Write `body` to a fresh executable file under `dir`.
///
/// The returned path deletes the file when dropped, so an error in any later
/// step leaves nothing behind.
fn persist_script(dir: &Path, body: &str) -> Result<TempPath> {
    let mut file = tempfile::Builder::new()
        .prefix(SCRIPT_PREFIX)
        .suffix(SCRIPT_SUFFIX)
        .tempfile_in(dir)
        .map_err(Error::TempFile)?;

    file.write_all(body.as_bytes()).map_err(Error::TempFile)?;
    file.flush().map_err(Error::TempFile)?;

    // Close the write handle before exec, or the kernel refuses with ETXTBSY.
    let path = file.into_temp_path();
    debug!(path = %path.display(), "Temporary script created");

    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .map_err(Error::Permissions)?;

    Ok(path)
}

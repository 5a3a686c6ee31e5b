//! Tunnel configuration files.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::DaemonError;

const CONFIG_PREFIX: &str = "wg_conf";
const CONFIG_SUFFIX: &str = ".conf";

/// Write a wg-quick configuration to a new `wg_conf*.conf` file.
///
/// The file is created in `dir`, or the OS temp directory when `None`, and
/// is kept on disk: the tunnel service reads it after this call returns.
///
/// # Errors
///
/// Returns `DaemonError::TunnelConfig` if the file cannot be created or
/// written.
pub fn write_config_file(contents: &str, dir: Option<&Path>) -> Result<PathBuf, DaemonError> {
    let dir = dir
        .map(Path::to_path_buf)
        .unwrap_or_else(std::env::temp_dir);

    let mut file = tempfile::Builder::new()
        .prefix(CONFIG_PREFIX)
        .suffix(CONFIG_SUFFIX)
        .tempfile_in(&dir)
        .map_err(config_error)?;

    file.write_all(contents.as_bytes()).map_err(config_error)?;
    file.flush().map_err(config_error)?;

    let (_, path) = file.keep().map_err(|e| config_error(e.error))?;

    debug!(path = %path.display(), bytes = contents.len(), "Wrote tunnel config");
    Ok(path)
}

fn config_error(e: std::io::Error) -> DaemonError {
    DaemonError::TunnelConfig {
        message: format!("Could not write wireguard config: {}", e),
    }
}

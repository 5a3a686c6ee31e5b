//! Tunnel service command line.

use std::path::{Path, PathBuf};

use crate::error::DaemonError;

/// Command line the service runs: the tunnel runner in service mode,
/// pointed at `config_file`.
pub fn service_command_line(executable: &Path, config_file: &Path) -> String {
    format!(
        "{} -service -config-file=\"{}\"",
        executable.display(),
        config_file.display()
    )
}

/// Resolve a relative executable path against the directory of the running
/// binary. Absolute paths are returned unchanged.
pub fn resolve_executable(executable: &Path) -> Result<PathBuf, DaemonError> {
    if executable.is_absolute() {
        return Ok(executable.to_path_buf());
    }

    let current = std::env::current_exe()?;
    let dir = current.parent().ok_or_else(|| DaemonError::Config {
        message: format!("Cannot determine directory of '{}'", current.display()),
    })?;
    Ok(dir.join(executable))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_format() {
        let line = service_command_line(
            Path::new(r"C:\x\wireguard_svc.exe"),
            Path::new(r"C:\temp\wg_conf1.conf"),
        );
        assert_eq!(
            line,
            r#"C:\x\wireguard_svc.exe -service -config-file="C:\temp\wg_conf1.conf""#
        );
    }

    #[test]
    fn test_relative_executable_resolves_next_to_binary() {
        let resolved = resolve_executable(Path::new("wireguard_svc.exe")).unwrap();
        let exe_dir = std::env::current_exe().unwrap().parent().unwrap().to_path_buf();
        assert_eq!(resolved, exe_dir.join("wireguard_svc.exe"));
    }

    #[test]
    fn test_absolute_executable_unchanged() {
        let absolute = std::env::temp_dir().join("wireguard_svc.exe");
        assert_eq!(resolve_executable(&absolute).unwrap(), absolute);
    }
}

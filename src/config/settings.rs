//! Configuration settings for the tunnel service daemon.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::DaemonError;
use crate::lifecycle::LifecycleTiming;
use crate::validation::validate_service_name;

/// Main configuration structure for the daemon.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub tunnel: TunnelConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Service identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Name of the OS service hosting the tunnel.
    #[serde(default = "default_service_name")]
    pub name: String,
}

/// Tunnel runner configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TunnelConfig {
    /// Tunnel runner executable. Relative paths resolve next to the daemon binary.
    #[serde(default = "default_executable")]
    pub executable: PathBuf,
    /// Services that must be running before the tunnel service starts.
    #[serde(default = "default_dependencies")]
    pub dependencies: Vec<String>,
    /// Directory for generated tunnel configuration files (OS temp dir if unset).
    pub config_dir: Option<PathBuf>,
    /// Packet forwarding service stopped and disabled by `tunnel.native_init`.
    #[serde(default = "default_forwarding_service")]
    pub forwarding_service: String,
}

/// Start/stop timing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    /// Lower bound of the settle delay after a start command.
    #[serde(default = "default_settle_min_ms")]
    pub settle_min_ms: u64,
    /// Upper bound of the settle delay after a start command.
    #[serde(default = "default_settle_max_ms")]
    pub settle_max_ms: u64,
    /// Fixed tick between status polls while stopping.
    #[serde(default = "default_stop_poll_interval_ms")]
    pub stop_poll_interval_ms: u64,
    /// Ceiling on the whole stop operation.
    #[serde(default = "default_stop_timeout_seconds")]
    pub stop_timeout_seconds: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format ("pretty" or "json").
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_service_name() -> String {
    "wgtun".to_string()
}

fn default_executable() -> PathBuf {
    PathBuf::from("wireguard_svc.exe")
}

fn default_dependencies() -> Vec<String> {
    vec!["Nsi".to_string(), "TcpIp".to_string()]
}

fn default_forwarding_service() -> String {
    "RemoteAccess".to_string()
}

fn default_settle_min_ms() -> u64 {
    1000
}

fn default_settle_max_ms() -> u64 {
    1500
}

fn default_stop_poll_interval_ms() -> u64 {
    1000
}

fn default_stop_timeout_seconds() -> u64 {
    15
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
        }
    }
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            dependencies: default_dependencies(),
            config_dir: None,
            forwarding_service: default_forwarding_service(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_min_ms: default_settle_min_ms(),
            settle_max_ms: default_settle_max_ms(),
            stop_poll_interval_ms: default_stop_poll_interval_ms(),
            stop_timeout_seconds: default_stop_timeout_seconds(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl TimingConfig {
    /// Convert to the controller's timing parameters.
    pub fn to_lifecycle_timing(&self) -> LifecycleTiming {
        LifecycleTiming {
            settle_min: Duration::from_millis(self.settle_min_ms),
            settle_max: Duration::from_millis(self.settle_max_ms),
            stop_poll_interval: Duration::from_millis(self.stop_poll_interval_ms),
            stop_timeout: Duration::from_secs(self.stop_timeout_seconds),
        }
    }
}

impl Settings {
    /// Load settings from a TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DaemonError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| DaemonError::Config {
            message: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;

        Self::from_toml(&content).map_err(|e| match e {
            DaemonError::Config { message } => DaemonError::Config {
                message: format!("{} ('{}')", message, path.display()),
            },
            other => other,
        })
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, DaemonError> {
        let settings: Settings = toml::from_str(content).map_err(|e| DaemonError::Config {
            message: format!("Failed to parse config: {}", e),
        })?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate the settings.
    fn validate(&self) -> Result<(), DaemonError> {
        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(DaemonError::Config {
                message: format!(
                    "Invalid log level '{}'. Valid levels: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        // Validate log format
        let valid_formats = ["pretty", "json"];
        if !valid_formats.contains(&self.logging.format.to_lowercase().as_str()) {
            return Err(DaemonError::Config {
                message: format!(
                    "Invalid log format '{}'. Valid formats: {:?}",
                    self.logging.format, valid_formats
                ),
            });
        }

        validate_service_name(&self.service.name).map_err(|e| DaemonError::Config {
            message: format!("Invalid service name '{}': {}", self.service.name, e),
        })?;

        validate_service_name(&self.tunnel.forwarding_service).map_err(|e| DaemonError::Config {
            message: format!(
                "Invalid forwarding service name '{}': {}",
                self.tunnel.forwarding_service, e
            ),
        })?;

        let timing = &self.timing;
        if timing.settle_min_ms > timing.settle_max_ms {
            return Err(DaemonError::Config {
                message: format!(
                    "settle_min_ms ({}) must not exceed settle_max_ms ({})",
                    timing.settle_min_ms, timing.settle_max_ms
                ),
            });
        }

        if timing.stop_poll_interval_ms == 0 || timing.stop_timeout_seconds == 0 {
            return Err(DaemonError::Config {
                message: "stop_poll_interval_ms and stop_timeout_seconds must be positive"
                    .to_string(),
            });
        }

        Ok(())
    }
}

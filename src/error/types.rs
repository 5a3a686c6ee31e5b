//! Error types for the tunnel service daemon.

use std::time::Duration;

use thiserror::Error;

/// Main error type for the daemon.
#[derive(Error, Debug)]
pub enum DaemonError {
    /// Configuration-related errors.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors.
    #[error("Validation error: {kind}")]
    Validation { kind: ValidationErrorKind },

    /// Service lifecycle errors. Rendered without a prefix so callers see
    /// the OS-facing message as is.
    #[error("{kind}")]
    Service { kind: ServiceErrorKind },

    /// An operation was requested before the daemon was ready for it.
    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    /// Writing the tunnel configuration failed.
    #[error("{message}")]
    TunnelConfig { message: String },

    /// Stopping or disabling the packet forwarding service failed.
    #[error("Could not {action} packet forwarding: {source}")]
    PacketForwarding {
        action: &'static str,
        #[source]
        source: Box<DaemonError>,
    },

    /// Command dispatch errors.
    #[error("Command error: {kind}")]
    Command { kind: CommandErrorKind },

    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DaemonError {
    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            DaemonError::Config { .. } => "CONFIG_ERROR",
            DaemonError::Validation { .. } => "VALIDATION_ERROR",
            DaemonError::Service { kind } => kind.error_code(),
            DaemonError::InvalidState { .. } => "INVALID_STATE",
            DaemonError::TunnelConfig { .. } => "TUNNEL_CONFIG_ERROR",
            DaemonError::PacketForwarding { .. } => "PACKET_FORWARDING_ERROR",
            DaemonError::Command { .. } => "COMMAND_ERROR",
            DaemonError::Io(_) => "IO_ERROR",
            DaemonError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// The service error kind, if this is a lifecycle error.
    pub fn service_kind(&self) -> Option<&ServiceErrorKind> {
        match self {
            DaemonError::Service { kind } => Some(kind),
            _ => None,
        }
    }
}

impl From<ServiceErrorKind> for DaemonError {
    fn from(kind: ServiceErrorKind) -> Self {
        DaemonError::Service { kind }
    }
}

/// Validation error kinds.
#[derive(Error, Debug)]
pub enum ValidationErrorKind {
    #[error("Missing required parameter: {param}")]
    MissingParameter { param: String },

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },
}

/// Service lifecycle error kinds.
#[derive(Error, Debug)]
pub enum ServiceErrorKind {
    #[error("Failed to open service manager{}", code_suffix(.code))]
    ManagerUnavailable { code: Option<u32> },

    #[error("{message}{}", code_suffix(.code))]
    ServiceCreationFailed { message: String, code: Option<u32> },

    #[error("{message}{}", code_suffix(.code))]
    ServiceConfigurationFailed { message: String, code: Option<u32> },

    #[error("Failed to start the service{}", code_suffix(.code))]
    ServiceStartFailed { code: Option<u32> },

    #[error("Stop service command failed{}", code_suffix(.code))]
    ServiceStopCommandFailed { code: Option<u32> },

    #[error("Disconnect timed out after {}", format_timeout(.timeout))]
    ServiceStopTimeout { timeout: Duration },

    #[error("{message}{}", code_suffix(.code))]
    QueryFailed { message: String, code: Option<u32> },
}

impl ServiceErrorKind {
    /// Underlying OS error code, when the OS reported one.
    pub fn os_code(&self) -> Option<u32> {
        match self {
            ServiceErrorKind::ManagerUnavailable { code }
            | ServiceErrorKind::ServiceCreationFailed { code, .. }
            | ServiceErrorKind::ServiceConfigurationFailed { code, .. }
            | ServiceErrorKind::ServiceStartFailed { code }
            | ServiceErrorKind::ServiceStopCommandFailed { code }
            | ServiceErrorKind::QueryFailed { code, .. } => *code,
            ServiceErrorKind::ServiceStopTimeout { .. } => None,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ServiceErrorKind::ManagerUnavailable { .. } => "MANAGER_UNAVAILABLE",
            ServiceErrorKind::ServiceCreationFailed { .. } => "SERVICE_CREATION_FAILED",
            ServiceErrorKind::ServiceConfigurationFailed { .. } => "SERVICE_CONFIGURATION_FAILED",
            ServiceErrorKind::ServiceStartFailed { .. } => "SERVICE_START_FAILED",
            ServiceErrorKind::ServiceStopCommandFailed { .. } => "SERVICE_STOP_COMMAND_FAILED",
            ServiceErrorKind::ServiceStopTimeout { .. } => "SERVICE_STOP_TIMEOUT",
            ServiceErrorKind::QueryFailed { .. } => "QUERY_FAILED",
        }
    }
}

/// Command error kinds.
#[derive(Error, Debug)]
pub enum CommandErrorKind {
    #[error("Unknown command: {name}")]
    UnknownCommand { name: String },

    #[error("Command execution failed: {message}")]
    ExecutionFailed { message: String },
}

fn code_suffix(code: &Option<u32>) -> String {
    match code {
        Some(code) => format!(" ({})", code),
        None => String::new(),
    }
}

fn format_timeout(timeout: &Duration) -> String {
    if timeout.subsec_nanos() == 0 {
        format!("{} seconds", timeout.as_secs())
    } else {
        format!("{} ms", timeout.as_millis())
    }
}

/// Result type alias for daemon operations.
pub type DaemonResult<T> = Result<T, DaemonError>;

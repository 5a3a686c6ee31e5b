//! Command types: parameters, results, and execution context.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DaemonError, ValidationErrorKind};

/// Wrapper around command parameters with helper methods.
#[derive(Debug, Clone)]
pub struct CommandParams {
    inner: serde_json::Value,
}

impl CommandParams {
    /// Create new command parameters from a JSON value.
    pub fn new(value: serde_json::Value) -> Self {
        Self { inner: value }
    }

    /// Get a required string parameter.
    pub fn get_string(&self, key: &str) -> Result<String, DaemonError> {
        self.inner
            .get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| missing(key))
    }

    /// Require that a non-empty string parameter exists (for validation).
    pub fn require_string(&self, key: &str) -> Result<(), DaemonError> {
        match self.inner.get(key).and_then(|v| v.as_str()) {
            Some(value) if !value.is_empty() => Ok(()),
            Some(_) => Err(DaemonError::Validation {
                kind: ValidationErrorKind::InvalidParameter {
                    param: key.to_string(),
                    message: "must not be empty".to_string(),
                },
            }),
            None => Err(missing(key)),
        }
    }
}

impl From<serde_json::Value> for CommandParams {
    fn from(value: serde_json::Value) -> Self {
        Self::new(value)
    }
}

fn missing(key: &str) -> DaemonError {
    DaemonError::Validation {
        kind: ValidationErrorKind::MissingParameter {
            param: key.to_string(),
        },
    }
}

/// Result of command execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,
    /// Result data on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Error code on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Error message on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl CommandResult {
    /// Create a success result with data.
    pub fn success(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error_code: None,
            error_message: None,
        }
    }

    /// Create a failure result.
    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error_code: Some(code.into()),
            error_message: Some(message.into()),
        }
    }

    /// Failure result describing `error`.
    pub fn from_error(error: &DaemonError) -> Self {
        Self::failure(error.error_code(), error.to_string())
    }
}

/// Execution context for a command.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Unique identifier for this request.
    pub request_id: Uuid,
    /// Timestamp when the request was received.
    pub timestamp: u64,
    /// The command being executed.
    pub command: String,
}

impl ExecutionContext {
    /// Create a new execution context.
    pub fn new(request_id: Uuid, timestamp: u64, command: String) -> Self {
        Self {
            request_id,
            timestamp,
            command,
        }
    }

    /// Context for a request arriving now.
    pub fn now(command: impl Into<String>) -> Self {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self::new(Uuid::new_v4(), timestamp, command.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceErrorKind;

    #[test]
    fn test_command_params_get_string() {
        let params = CommandParams::new(serde_json::json!({
            "service_name": "wgtun",
            "count": 42
        }));

        assert_eq!(params.get_string("service_name").unwrap(), "wgtun");
        assert!(params.get_string("count").is_err());
        assert!(params.get_string("missing").is_err());
    }

    #[test]
    fn test_require_string_rejects_empty() {
        let params = CommandParams::new(serde_json::json!({"wg_quick_config": ""}));
        assert!(matches!(
            params.require_string("wg_quick_config"),
            Err(DaemonError::Validation {
                kind: ValidationErrorKind::InvalidParameter { .. }
            })
        ));
    }

    #[test]
    fn test_command_result_success() {
        let result = CommandResult::success(serde_json::json!({"stage": "connected"}));
        assert!(result.success);
        assert!(result.data.is_some());
        assert!(result.error_code.is_none());
    }

    #[test]
    fn test_command_result_from_error() {
        let err = DaemonError::from(ServiceErrorKind::ServiceStopCommandFailed { code: Some(1052) });
        let result = CommandResult::from_error(&err);
        assert!(!result.success);
        assert_eq!(result.error_code.as_deref(), Some("SERVICE_STOP_COMMAND_FAILED"));
        assert_eq!(result.error_message.as_deref(), Some("Stop service command failed (1052)"));
    }

    #[test]
    fn test_execution_context_now() {
        let ctx = ExecutionContext::now("tunnel.stage");
        assert_eq!(ctx.command, "tunnel.stage");
        assert!(ctx.timestamp > 0);
    }
}

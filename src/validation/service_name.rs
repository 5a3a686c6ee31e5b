//! Service name validation.
//!
//! Validates that a service identity can be registered with the OS service
//! database.

use crate::error::{DaemonError, ValidationErrorKind};

/// Maximum length of a service key name accepted by the service database.
const MAX_SERVICE_NAME_LEN: usize = 256;

/// Validate a service name.
///
/// # Arguments
///
/// * `name` - The service name to validate
///
/// # Returns
///
/// Returns `Ok(())` if the name can identify a service, or an error if not.
///
/// # Example
///
/// ```
/// use wgtun_daemon::validation::validate_service_name;
///
/// assert!(validate_service_name("wgtun").is_ok());
/// assert!(validate_service_name("bad\\name").is_err());
/// ```
pub fn validate_service_name(name: &str) -> Result<(), DaemonError> {
    if name.is_empty() {
        return Err(invalid("Service name cannot be empty"));
    }

    if name.chars().count() > MAX_SERVICE_NAME_LEN {
        return Err(invalid(&format!(
            "Service name exceeds {} characters",
            MAX_SERVICE_NAME_LEN
        )));
    }

    // The service database treats slashes as key separators.
    if name.contains('/') || name.contains('\\') {
        return Err(invalid("Service name cannot contain '/' or '\\'"));
    }

    if name.chars().any(char::is_control) {
        return Err(invalid("Service name cannot contain control characters"));
    }

    Ok(())
}

fn invalid(message: &str) -> DaemonError {
    DaemonError::Validation {
        kind: ValidationErrorKind::InvalidParameter {
            param: "service_name".to_string(),
            message: message.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(validate_service_name("wgtun").is_ok());
        assert!(validate_service_name("WireGuardTunnel$office").is_ok());
        assert!(validate_service_name("tunnel with spaces").is_ok());
    }

    #[test]
    fn test_empty_service_name() {
        let result = validate_service_name("");
        assert!(matches!(
            result,
            Err(DaemonError::Validation {
                kind: ValidationErrorKind::InvalidParameter { .. }
            })
        ));
    }

    #[test]
    fn test_separators_rejected() {
        assert!(validate_service_name("a/b").is_err());
        assert!(validate_service_name("a\\b").is_err());
    }

    #[test]
    fn test_control_characters_rejected() {
        assert!(validate_service_name("wgtun\nmalicious").is_err());
        assert!(validate_service_name("wgtun\0").is_err());
    }

    #[test]
    fn test_length_limit() {
        assert!(validate_service_name(&"a".repeat(256)).is_ok());
        assert!(validate_service_name(&"a".repeat(257)).is_err());
    }
}

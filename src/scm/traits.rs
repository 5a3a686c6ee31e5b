//! Handle traits for the OS service database.

use thiserror::Error;

use super::create::CreateSpec;
use super::status::ServiceStatus;

/// A failed OS call, identified by its Win32 error code.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("OS error {code}")]
pub struct OsError {
    pub code: u32,
}

impl OsError {
    pub fn new(code: u32) -> Self {
        Self { code }
    }
}

/// Entry point to a service database.
///
/// Implementations must be cheap to connect repeatedly: the lifecycle
/// controller opens a fresh connection for every operation.
pub trait ServiceControlManager: Send + Sync {
    /// Open a connection to the service database.
    fn connect(&self) -> Result<Box<dyn ManagerConnection + '_>, OsError>;
}

/// An open connection to the service database. Dropping it releases the
/// manager handle.
pub trait ManagerConnection {
    /// Open a service by name. `Ok(None)` means the service does not exist.
    fn open_service(&self, name: &str) -> Result<Option<Box<dyn ServiceHandle + '_>>, OsError>;

    /// Create a service that runs `spec.command_line` on start.
    fn create_service(
        &self,
        name: &str,
        spec: &CreateSpec,
    ) -> Result<Box<dyn ServiceHandle + '_>, OsError>;
}

/// An open service. Dropping it releases the service handle; it borrows
/// its connection so it is always released first.
pub trait ServiceHandle {
    /// Give the service an unrestricted security identifier.
    fn set_sid_type_unrestricted(&self) -> Result<(), OsError>;

    fn set_description(&self, description: &str) -> Result<(), OsError>;

    fn query_status(&self) -> Result<ServiceStatus, OsError>;

    /// Issue the start command. Returns once the OS accepted it, not once
    /// the service is running.
    fn start(&self) -> Result<(), OsError>;

    /// Issue the stop control and return the status reported with it.
    fn control_stop(&self) -> Result<ServiceStatus, OsError>;

    /// Mark the service for deletion.
    fn delete(&self) -> Result<(), OsError>;

    /// Set the start type to disabled, leaving the rest of the configuration.
    fn disable(&self) -> Result<(), OsError>;
}

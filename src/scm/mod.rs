//! Service control manager module.
//!
//! Wraps the OS service database behind a small set of handle traits. Every
//! lifecycle operation connects, performs its work, and drops the handles
//! again; nothing is held between operations.
//!
//! ## Backends
//!
//! - **Windows**: the Service Control Manager via the `windows` crate
//! - **Other hosts**: a manager that refuses every connection

mod create;
mod status;
mod traits;
mod unsupported;
#[cfg(windows)]
mod windows;

use std::sync::Arc;

pub use create::CreateSpec;
pub use status::{NativeState, ServiceStatus};
pub use traits::{ManagerConnection, OsError, ServiceControlManager, ServiceHandle};
pub use unsupported::UnsupportedManager;
#[cfg(windows)]
pub use self::windows::WindowsServiceManager;

/// `ERROR_CALL_NOT_IMPLEMENTED`.
pub const ERROR_CALL_NOT_IMPLEMENTED: u32 = 120;

/// `ERROR_SERVICE_DOES_NOT_EXIST`.
pub const ERROR_SERVICE_DOES_NOT_EXIST: u32 = 1060;

/// The service manager of the host operating system.
#[cfg(windows)]
pub fn system_manager() -> Arc<dyn ServiceControlManager> {
    Arc::new(WindowsServiceManager::new())
}

/// The service manager of the host operating system.
#[cfg(not(windows))]
pub fn system_manager() -> Arc<dyn ServiceControlManager> {
    Arc::new(UnsupportedManager)
}

//! Service manager for hosts without a supported service database.

use super::traits::{ManagerConnection, OsError, ServiceControlManager};
use super::ERROR_CALL_NOT_IMPLEMENTED;

/// Refuses every connection with `ERROR_CALL_NOT_IMPLEMENTED`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedManager;

impl ServiceControlManager for UnsupportedManager {
    fn connect(&self) -> Result<Box<dyn ManagerConnection + '_>, OsError> {
        Err(OsError::new(ERROR_CALL_NOT_IMPLEMENTED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_is_refused() {
        let err = UnsupportedManager.connect().err();
        assert_eq!(err, Some(OsError::new(ERROR_CALL_NOT_IMPLEMENTED)));
    }
}

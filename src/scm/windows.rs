//! Windows Service Control Manager backend.

use std::ffi::c_void;
use std::marker::PhantomData;
use std::mem::size_of;
use std::time::Duration;

use tracing::debug;
use windows::core::{PCWSTR, PWSTR};
use windows::Win32::System::Services::{
    ChangeServiceConfig2W, ChangeServiceConfigW, CloseServiceHandle, ControlService,
    CreateServiceW, DeleteService, OpenSCManagerW, OpenServiceW, QueryServiceStatusEx,
    StartServiceW, ENUM_SERVICE_TYPE, SC_HANDLE, SC_MANAGER_ALL_ACCESS, SC_STATUS_PROCESS_INFO,
    SERVICE_ALL_ACCESS, SERVICE_CONFIG_DESCRIPTION, SERVICE_CONFIG_SERVICE_SID_INFO,
    SERVICE_CONTROL_STOP, SERVICE_DEMAND_START, SERVICE_DESCRIPTIONW, SERVICE_DISABLED,
    SERVICE_ERROR, SERVICE_ERROR_NORMAL, SERVICE_NO_CHANGE, SERVICE_SID_INFO,
    SERVICE_SID_TYPE_UNRESTRICTED, SERVICE_STATUS, SERVICE_STATUS_PROCESS,
    SERVICE_WIN32_OWN_PROCESS,
};

use super::create::CreateSpec;
use super::status::{NativeState, ServiceStatus};
use super::traits::{ManagerConnection, OsError, ServiceControlManager, ServiceHandle};
use super::ERROR_SERVICE_DOES_NOT_EXIST;

/// The local Service Control Manager.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsServiceManager;

impl WindowsServiceManager {
    pub fn new() -> Self {
        Self
    }
}

impl ServiceControlManager for WindowsServiceManager {
    fn connect(&self) -> Result<Box<dyn ManagerConnection + '_>, OsError> {
        // SAFETY: null machine and database names select the local active database.
        let handle = unsafe { OpenSCManagerW(PCWSTR::null(), PCWSTR::null(), SC_MANAGER_ALL_ACCESS) }
            .map_err(os_error)?;
        Ok(Box::new(ScmConnection {
            handle: OwnedScHandle(handle),
        }))
    }
}

/// Closes the wrapped handle on drop.
struct OwnedScHandle(SC_HANDLE);

impl Drop for OwnedScHandle {
    fn drop(&mut self) {
        // SAFETY: the handle came from a successful open/create call and is closed once.
        if let Err(e) = unsafe { CloseServiceHandle(self.0) } {
            debug!(error = %e, "CloseServiceHandle failed");
        }
    }
}

struct ScmConnection {
    handle: OwnedScHandle,
}

impl ManagerConnection for ScmConnection {
    fn open_service(&self, name: &str) -> Result<Option<Box<dyn ServiceHandle + '_>>, OsError> {
        let name = to_wide(name);
        // SAFETY: `name` is NUL-terminated and outlives the call.
        let result = unsafe {
            OpenServiceW(self.handle.0, PCWSTR(name.as_ptr()), SERVICE_ALL_ACCESS)
        };
        match result {
            Ok(handle) => Ok(Some(Box::new(ScmService {
                handle: OwnedScHandle(handle),
                _connection: PhantomData,
            }))),
            Err(e) => {
                let err = os_error(e);
                if err.code == ERROR_SERVICE_DOES_NOT_EXIST {
                    Ok(None)
                } else {
                    Err(err)
                }
            }
        }
    }

    fn create_service(
        &self,
        name: &str,
        spec: &CreateSpec,
    ) -> Result<Box<dyn ServiceHandle + '_>, OsError> {
        let name = to_wide(name);
        let binary_path = to_wide(&spec.command_line);
        let dependencies = to_multi_wide(&spec.dependencies);

        // SAFETY: every string argument is NUL-terminated (the dependency list
        // double-NUL-terminated) and outlives the call.
        let handle = unsafe {
            CreateServiceW(
                self.handle.0,
                PCWSTR(name.as_ptr()),
                PCWSTR(name.as_ptr()),
                SERVICE_ALL_ACCESS,
                SERVICE_WIN32_OWN_PROCESS,
                SERVICE_DEMAND_START,
                SERVICE_ERROR_NORMAL,
                PCWSTR(binary_path.as_ptr()),
                PCWSTR::null(),
                None,
                PCWSTR(dependencies.as_ptr()),
                PCWSTR::null(),
                PCWSTR::null(),
            )
        }
        .map_err(os_error)?;

        Ok(Box::new(ScmService {
            handle: OwnedScHandle(handle),
            _connection: PhantomData,
        }))
    }
}

struct ScmService<'a> {
    handle: OwnedScHandle,
    _connection: PhantomData<&'a ScmConnection>,
}

impl ServiceHandle for ScmService<'_> {
    fn set_sid_type_unrestricted(&self) -> Result<(), OsError> {
        let info = SERVICE_SID_INFO {
            dwServiceSidType: SERVICE_SID_TYPE_UNRESTRICTED,
        };
        // SAFETY: `info` matches the SERVICE_CONFIG_SERVICE_SID_INFO level.
        unsafe {
            ChangeServiceConfig2W(
                self.handle.0,
                SERVICE_CONFIG_SERVICE_SID_INFO,
                Some(&info as *const SERVICE_SID_INFO as *const c_void),
            )
        }
        .map_err(os_error)
    }

    fn set_description(&self, description: &str) -> Result<(), OsError> {
        let mut text = to_wide(description);
        let info = SERVICE_DESCRIPTIONW {
            lpDescription: PWSTR(text.as_mut_ptr()),
        };
        // SAFETY: `info` matches the SERVICE_CONFIG_DESCRIPTION level and `text`
        // outlives the call.
        unsafe {
            ChangeServiceConfig2W(
                self.handle.0,
                SERVICE_CONFIG_DESCRIPTION,
                Some(&info as *const SERVICE_DESCRIPTIONW as *const c_void),
            )
        }
        .map_err(os_error)
    }

    fn query_status(&self) -> Result<ServiceStatus, OsError> {
        let mut status = SERVICE_STATUS_PROCESS::default();
        let mut bytes_needed = 0u32;
        // SAFETY: the buffer is exactly one SERVICE_STATUS_PROCESS owned by this frame.
        unsafe {
            let buffer = std::slice::from_raw_parts_mut(
                &mut status as *mut SERVICE_STATUS_PROCESS as *mut u8,
                size_of::<SERVICE_STATUS_PROCESS>(),
            );
            QueryServiceStatusEx(
                self.handle.0,
                SC_STATUS_PROCESS_INFO,
                Some(buffer),
                &mut bytes_needed,
            )
        }
        .map_err(os_error)?;

        Ok(
            ServiceStatus::new(NativeState::from_code(status.dwCurrentState.0))
                .with_wait_hint(Duration::from_millis(u64::from(status.dwWaitHint))),
        )
    }

    fn start(&self) -> Result<(), OsError> {
        // SAFETY: no argument vector is passed.
        unsafe { StartServiceW(self.handle.0, None) }.map_err(os_error)
    }

    fn control_stop(&self) -> Result<ServiceStatus, OsError> {
        let mut status = SERVICE_STATUS::default();
        // SAFETY: `status` is a valid out pointer for the duration of the call.
        unsafe { ControlService(self.handle.0, SERVICE_CONTROL_STOP, &mut status) }
            .map_err(os_error)?;

        Ok(
            ServiceStatus::new(NativeState::from_code(status.dwCurrentState.0))
                .with_wait_hint(Duration::from_millis(u64::from(status.dwWaitHint))),
        )
    }

    fn delete(&self) -> Result<(), OsError> {
        // SAFETY: the handle was opened with DELETE access (SERVICE_ALL_ACCESS).
        unsafe { DeleteService(self.handle.0) }.map_err(os_error)
    }

    fn disable(&self) -> Result<(), OsError> {
        // SAFETY: null strings and SERVICE_NO_CHANGE leave every other setting as is.
        unsafe {
            ChangeServiceConfigW(
                self.handle.0,
                ENUM_SERVICE_TYPE(SERVICE_NO_CHANGE),
                SERVICE_DISABLED,
                SERVICE_ERROR(SERVICE_NO_CHANGE),
                PCWSTR::null(),
                PCWSTR::null(),
                None,
                PCWSTR::null(),
                PCWSTR::null(),
                PCWSTR::null(),
                PCWSTR::null(),
            )
        }
        .map_err(os_error)
    }
}

/// Recover the Win32 code from an `HRESULT_FROM_WIN32` error.
fn os_error(error: windows::core::Error) -> OsError {
    let hresult = error.code().0 as u32;
    if hresult & 0xFFFF_0000 == 0x8007_0000 {
        OsError::new(hresult & 0xFFFF)
    } else {
        OsError::new(hresult)
    }
}

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Encode a list as consecutive NUL-terminated strings followed by an extra NUL.
fn to_multi_wide(items: &[String]) -> Vec<u16> {
    let mut wide: Vec<u16> = items
        .iter()
        .flat_map(|item| item.encode_utf16().chain(std::iter::once(0)))
        .collect();
    wide.push(0);
    if items.is_empty() {
        wide.push(0);
    }
    wide
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_wide_layout() {
        let wide = to_multi_wide(&["Nsi".to_string(), "TcpIp".to_string()]);
        let expected: Vec<u16> = "Nsi\0TcpIp\0\0".encode_utf16().collect();
        assert_eq!(wide, expected);
    }

    #[test]
    fn test_multi_wide_empty() {
        assert_eq!(to_multi_wide(&[]), vec![0, 0]);
    }
}

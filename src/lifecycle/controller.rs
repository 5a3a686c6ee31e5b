//! Service lifecycle controller.
//!
//! Creates, starts, stops and queries the OS service hosting the tunnel, and
//! reports every transition to the registered [`StageListener`].

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{DaemonError, DaemonResult, ServiceErrorKind};
use crate::scm::{
    CreateSpec, ManagerConnection, NativeState, OsError, ServiceControlManager, ServiceHandle,
    ServiceStatus,
};
use crate::validation::validate_service_name;

use super::listener::{ListenerSlot, StageListener};
use super::stage::ServiceStage;
use super::timing::LifecycleTiming;

/// Outcome of a single create-and-start attempt.
enum StartAttempt {
    Running,
    /// The service did not come up and was deleted so it can be recreated.
    Recreated,
}

/// Controls one named OS service.
///
/// Operations are blocking and must not run concurrently on the same
/// service; see [`ServiceWorker`](super::ServiceWorker) for an async,
/// serialized front end.
pub struct ServiceController {
    service_name: String,
    manager: Arc<dyn ServiceControlManager>,
    timing: LifecycleTiming,
    listener: ListenerSlot,
}

impl ServiceController {
    /// Create a controller for `service_name` using default timing.
    pub fn new(
        service_name: impl Into<String>,
        manager: Arc<dyn ServiceControlManager>,
    ) -> DaemonResult<Self> {
        let service_name = service_name.into();
        validate_service_name(&service_name)?;

        Ok(Self {
            service_name,
            manager,
            timing: LifecycleTiming::default(),
            listener: ListenerSlot::default(),
        })
    }

    pub fn with_timing(mut self, timing: LifecycleTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn timing(&self) -> LifecycleTiming {
        self.timing
    }

    /// Attach a stage listener, replacing any existing one.
    pub fn register_listener(&self, listener: Arc<dyn StageListener>) {
        debug!(service = %self.service_name, "Stage listener registered");
        self.listener.set(Some(listener));
    }

    /// Detach the stage listener. Later stages are dropped.
    pub fn unregister_listener(&self) {
        debug!(service = %self.service_name, "Stage listener unregistered");
        self.listener.set(None);
    }

    /// Create (or reconfigure) the service and start it.
    ///
    /// A service that rejects the start command or settles back into a
    /// stopped state is deleted and rebuilt once when `spec.first_time` is
    /// set; a second failure is returned as `ServiceStartFailed`. Starting a
    /// service that is already running succeeds without a start command.
    ///
    /// On failure the last emitted stage is `denied`.
    pub fn create_and_start(&self, spec: &CreateSpec) -> DaemonResult<()> {
        info!(
            service = %self.service_name,
            first_time = spec.first_time,
            "Starting tunnel service"
        );

        let result = match self.start_attempt(spec, spec.first_time) {
            Ok(StartAttempt::Recreated) => self
                .start_attempt(spec, false)
                .and_then(Self::require_running),
            other => other.and_then(Self::require_running),
        };

        match result {
            Ok(()) => {
                self.emit(ServiceStage::Connected);
                info!(service = %self.service_name, "Tunnel service running");
                Ok(())
            }
            Err(e) => {
                warn!(service = %self.service_name, error = %e, "Failed to start tunnel service");
                self.emit(ServiceStage::Denied);
                Err(e)
            }
        }
    }

    /// Stop the service and wait until it reports stopped.
    ///
    /// A missing service counts as stopped. Polls on a fixed tick and gives
    /// up with `ServiceStopTimeout` once the configured ceiling has passed.
    pub fn stop(&self) -> DaemonResult<()> {
        info!(service = %self.service_name, "Stopping tunnel service");

        let result = self.stop_service();
        if let Err(e) = &result {
            warn!(service = %self.service_name, error = %e, "Failed to stop tunnel service");
            // Leave the listener on the real state rather than `disconnecting`.
            self.emit(self.status());
        }
        result
    }

    /// Set the service's start type to disabled.
    ///
    /// A missing service has nothing to disable. No stage is emitted.
    pub fn disable(&self) -> DaemonResult<()> {
        let connection = self.connect()?;
        let service = match connection
            .open_service(&self.service_name)
            .map_err(|e| query_failed("Failed to open the service", e))?
        {
            Some(service) => service,
            None => {
                debug!(service = %self.service_name, "Service does not exist, nothing to disable");
                return Ok(());
            }
        };

        service
            .disable()
            .map_err(|e| configuration_failed("Failed to disable the service", e))?;

        info!(service = %self.service_name, "Service disabled");
        Ok(())
    }

    /// Current stage of the service.
    ///
    /// Never fails: a missing service is `disconnected`, an unreachable
    /// manager or failed query is `denied`.
    pub fn status(&self) -> ServiceStage {
        let connection = match self.manager.connect() {
            Ok(connection) => connection,
            Err(e) => {
                warn!(service = %self.service_name, code = e.code, "Failed to open service manager");
                return ServiceStage::Denied;
            }
        };

        let stage = match connection.open_service(&self.service_name) {
            Ok(None) => ServiceStage::Disconnected,
            Ok(Some(service)) => match service.query_status() {
                Ok(status) => ServiceStage::from(status.state),
                Err(e) => {
                    warn!(service = %self.service_name, code = e.code, "Failed to query service status");
                    ServiceStage::Denied
                }
            },
            Err(e) => {
                warn!(service = %self.service_name, code = e.code, "Failed to open service");
                ServiceStage::Denied
            }
        };

        debug!(service = %self.service_name, stage = %stage, "Queried service stage");
        stage
    }

    fn start_attempt(&self, spec: &CreateSpec, retry_allowed: bool) -> DaemonResult<StartAttempt> {
        self.emit(ServiceStage::Connecting);

        let connection = self.connect()?;
        let service = match connection.open_service(&self.service_name) {
            Ok(Some(service)) => {
                debug!(service = %self.service_name, "Service exists, reconfiguring");
                service
            }
            Ok(None) => {
                debug!(
                    service = %self.service_name,
                    command_line = %spec.command_line,
                    dependencies = ?spec.dependencies,
                    "Creating service"
                );
                connection
                    .create_service(&self.service_name, spec)
                    .map_err(|e| creation_failed("Failed to create the service", e))?
            }
            Err(e) => return Err(creation_failed("Failed to open the service", e)),
        };

        service
            .set_sid_type_unrestricted()
            .map_err(|e| configuration_failed("Failed to configure service SID type", e))?;
        service
            .set_description(&spec.description)
            .map_err(|e| configuration_failed("Failed to configure service description", e))?;

        let status = service
            .query_status()
            .map_err(|e| query_failed("Failed to query service status", e))?;
        if !matches!(status.state, NativeState::Stopped | NativeState::StopPending) {
            info!(service = %self.service_name, state = ?status.state, "Service is already running");
            return Ok(StartAttempt::Running);
        }

        self.emit(ServiceStage::Connecting);
        if let Err(e) = service.start() {
            warn!(service = %self.service_name, code = e.code, "Start command rejected");
            return self.recreate_or_fail(&*service, retry_allowed, Some(e.code));
        }

        let settle = self.timing.settle_delay(status.wait_hint);
        debug!(
            service = %self.service_name,
            settle_ms = settle.as_millis() as u64,
            "Waiting for service to settle"
        );
        thread::sleep(settle);

        let settled = service
            .query_status()
            .map_err(|e| query_failed("Failed to query service status after start", e))?;
        if ServiceStage::from(settled.state) == ServiceStage::Disconnected {
            warn!(service = %self.service_name, "Service stopped right after starting");
            return self.recreate_or_fail(&*service, retry_allowed, None);
        }

        Ok(StartAttempt::Running)
    }

    /// Delete the service for one more attempt, or fail the start.
    fn recreate_or_fail(
        &self,
        service: &dyn ServiceHandle,
        retry_allowed: bool,
        code: Option<u32>,
    ) -> DaemonResult<StartAttempt> {
        if !retry_allowed {
            return Err(ServiceErrorKind::ServiceStartFailed { code }.into());
        }

        info!(service = %self.service_name, "Deleting service to recreate it");
        self.emit(ServiceStage::Reconnecting);
        if let Err(e) = service.delete() {
            warn!(service = %self.service_name, code = e.code, "Failed to delete service");
        }
        Ok(StartAttempt::Recreated)
    }

    // Recreation is only offered while a retry is still allowed, so after the
    // second attempt it cannot occur.
    fn require_running(attempt: StartAttempt) -> DaemonResult<()> {
        match attempt {
            StartAttempt::Running => Ok(()),
            StartAttempt::Recreated => Err(ServiceErrorKind::ServiceStartFailed { code: None }.into()),
        }
    }

    fn stop_service(&self) -> DaemonResult<()> {
        let connection = self.connect()?;
        let service = match connection
            .open_service(&self.service_name)
            .map_err(|e| query_failed("Failed to open the service", e))?
        {
            Some(service) => service,
            None => {
                debug!(service = %self.service_name, "Service does not exist, nothing to stop");
                self.emit(ServiceStage::Disconnected);
                return Ok(());
            }
        };

        self.emit(ServiceStage::Disconnecting);

        let mut status = service
            .query_status()
            .map_err(|e| query_failed("Failed to query service status", e))?;
        if status.state == NativeState::Stopped {
            debug!(service = %self.service_name, "Service already stopped");
            self.emit(ServiceStage::Disconnected);
            return Ok(());
        }

        let started = Instant::now();

        if status.state == NativeState::StopPending {
            status = self.poll_stop(
                &*service,
                status,
                started,
                |state| state == NativeState::StopPending,
                "Failed to query service status when stop pending",
            )?;
            if status.state == NativeState::Stopped {
                self.emit(ServiceStage::Disconnected);
                return Ok(());
            }
        }

        debug!(service = %self.service_name, "Sending stop control");
        status = service
            .control_stop()
            .map_err(|e| ServiceErrorKind::ServiceStopCommandFailed { code: Some(e.code) })?;

        self.poll_stop(
            &*service,
            status,
            started,
            |state| state != NativeState::Stopped,
            "Failed to query service status after issuing stop command",
        )?;

        self.emit(ServiceStage::Disconnected);
        info!(service = %self.service_name, "Tunnel service stopped");
        Ok(())
    }

    /// Re-query on a fixed tick while `keep_polling` holds, stopping early
    /// once the service reports stopped.
    fn poll_stop(
        &self,
        service: &dyn ServiceHandle,
        mut status: ServiceStatus,
        started: Instant,
        keep_polling: impl Fn(NativeState) -> bool,
        context: &str,
    ) -> DaemonResult<ServiceStatus> {
        while keep_polling(status.state) {
            thread::sleep(self.timing.stop_poll_interval);

            status = service.query_status().map_err(|e| query_failed(context, e))?;
            debug!(service = %self.service_name, state = ?status.state, "Polled service status");
            if status.state == NativeState::Stopped {
                break;
            }

            if started.elapsed() > self.timing.stop_timeout {
                return Err(ServiceErrorKind::ServiceStopTimeout {
                    timeout: self.timing.stop_timeout,
                }
                .into());
            }
        }
        Ok(status)
    }

    fn connect(&self) -> DaemonResult<Box<dyn ManagerConnection + '_>> {
        self.manager.connect().map_err(|e| {
            DaemonError::from(ServiceErrorKind::ManagerUnavailable { code: Some(e.code) })
        })
    }

    fn emit(&self, stage: ServiceStage) {
        debug!(service = %self.service_name, stage = %stage, "Stage changed");
        self.listener.emit(stage);
    }
}

fn creation_failed(message: &str, e: OsError) -> DaemonError {
    ServiceErrorKind::ServiceCreationFailed {
        message: message.to_string(),
        code: Some(e.code),
    }
    .into()
}

fn configuration_failed(message: &str, e: OsError) -> DaemonError {
    ServiceErrorKind::ServiceConfigurationFailed {
        message: message.to_string(),
        code: Some(e.code),
    }
    .into()
}

fn query_failed(message: &str, e: OsError) -> DaemonError {
    ServiceErrorKind::QueryFailed {
        message: message.to_string(),
        code: Some(e.code),
    }
    .into()
}

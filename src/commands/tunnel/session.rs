//! Shared tunnel session state.

use std::sync::{Arc, RwLock};

use tracing::info;

use crate::config::Settings;
use crate::error::{DaemonError, DaemonResult};
use crate::lifecycle::{ServiceController, StageListener};
use crate::scm::ServiceControlManager;

/// Controller and listener, kept under one lock so a listener registered
/// while a controller is being replaced always lands on the new one.
#[derive(Default)]
struct SessionState {
    controller: Option<Arc<ServiceController>>,
    listener: Option<Arc<dyn StageListener>>,
}

/// State shared by the tunnel commands: the controller selected by
/// `tunnel.initialize` and the stage listener to attach to it.
pub struct TunnelSession {
    manager: Arc<dyn ServiceControlManager>,
    settings: Settings,
    state: RwLock<SessionState>,
}

impl TunnelSession {
    /// Create a session with no controller selected yet.
    pub fn new(manager: Arc<dyn ServiceControlManager>, settings: Settings) -> Self {
        Self {
            manager,
            settings,
            state: RwLock::new(SessionState::default()),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Select the service to control, replacing any previous controller.
    /// The registered listener carries over.
    pub fn initialize(&self, service_name: &str) -> DaemonResult<Arc<ServiceController>> {
        let controller = Arc::new(self.build_controller(service_name)?);

        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if let Some(listener) = &state.listener {
            controller.register_listener(Arc::clone(listener));
        }
        if state.controller.is_some() {
            info!(service = %service_name, "Replacing tunnel controller");
        }
        state.controller = Some(Arc::clone(&controller));

        Ok(controller)
    }

    /// The selected controller.
    pub fn controller(&self) -> DaemonResult<Arc<ServiceController>> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .controller
            .clone()
            .ok_or_else(|| DaemonError::InvalidState {
                message: "call 'tunnel.initialize' first".to_string(),
            })
    }

    /// Controller for the packet forwarding service. It never carries the
    /// tunnel's stage listener.
    pub fn forwarding_controller(&self) -> DaemonResult<ServiceController> {
        self.build_controller(&self.settings.tunnel.forwarding_service)
    }

    /// Attach a stage listener to the current and any later controller.
    pub fn register_listener(&self, listener: Arc<dyn StageListener>) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if let Some(controller) = &state.controller {
            controller.register_listener(Arc::clone(&listener));
        }
        state.listener = Some(listener);
    }

    /// Detach the stage listener.
    pub fn unregister_listener(&self) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if let Some(controller) = &state.controller {
            controller.unregister_listener();
        }
        state.listener = None;
    }

    fn build_controller(&self, service_name: &str) -> DaemonResult<ServiceController> {
        Ok(ServiceController::new(service_name, Arc::clone(&self.manager))?
            .with_timing(self.settings.timing.to_lifecycle_timing()))
    }
}

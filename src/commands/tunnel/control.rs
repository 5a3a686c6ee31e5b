//! Tunnel control commands.
//!
//! Commands for starting and stopping the tunnel service.

use std::sync::Arc;

use tracing::{debug, info};

use crate::commands::traits::Command;
use crate::commands::types::{CommandParams, CommandResult, ExecutionContext};
use crate::error::DaemonError;
use crate::lifecycle::{CreateSpec, ServiceStage};
use crate::tunnel::{resolve_executable, service_command_line, write_config_file};

use super::session::TunnelSession;

/// Start the tunnel service with a wg-quick configuration.
pub struct StartTunnelCommand {
    session: Arc<TunnelSession>,
}

impl StartTunnelCommand {
    pub fn new(session: Arc<TunnelSession>) -> Self {
        Self { session }
    }
}

impl Command for StartTunnelCommand {
    fn name(&self) -> &'static str {
        "tunnel.start"
    }

    fn validate(&self, params: &CommandParams) -> Result<(), DaemonError> {
        params.require_string("wg_quick_config")
    }

    fn execute(
        &self,
        ctx: &ExecutionContext,
        params: CommandParams,
    ) -> Result<CommandResult, DaemonError> {
        let controller = self.session.controller()?;
        let config = params.get_string("wg_quick_config")?;
        let tunnel = &self.session.settings().tunnel;

        let config_file = write_config_file(&config, tunnel.config_dir.as_deref())?;
        let executable = resolve_executable(&tunnel.executable)?;
        let command_line = service_command_line(&executable, &config_file);

        debug!(
            request_id = %ctx.request_id,
            service = %controller.service_name(),
            command_line = %command_line,
            "Starting tunnel"
        );

        let spec = CreateSpec::for_tunnel(
            controller.service_name(),
            command_line,
            tunnel.dependencies.clone(),
        );
        controller.create_and_start(&spec)?;

        info!(
            request_id = %ctx.request_id,
            service = %controller.service_name(),
            "Tunnel started"
        );

        Ok(CommandResult::success(serde_json::json!({
            "service": controller.service_name(),
            "stage": ServiceStage::Connected,
            "config_file": config_file.display().to_string(),
        })))
    }
}

/// Stop the tunnel service.
pub struct StopTunnelCommand {
    session: Arc<TunnelSession>,
}

impl StopTunnelCommand {
    pub fn new(session: Arc<TunnelSession>) -> Self {
        Self { session }
    }
}

impl Command for StopTunnelCommand {
    fn name(&self) -> &'static str {
        "tunnel.stop"
    }

    fn validate(&self, _params: &CommandParams) -> Result<(), DaemonError> {
        Ok(())
    }

    fn execute(
        &self,
        ctx: &ExecutionContext,
        _params: CommandParams,
    ) -> Result<CommandResult, DaemonError> {
        let controller = self.session.controller()?;

        controller.stop()?;

        info!(
            request_id = %ctx.request_id,
            service = %controller.service_name(),
            "Tunnel stopped"
        );

        Ok(CommandResult::success(serde_json::json!({
            "service": controller.service_name(),
            "stage": ServiceStage::Disconnected,
        })))
    }
}

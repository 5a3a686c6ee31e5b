//! Tunnel initialize command.

use std::sync::Arc;

use tracing::info;

use crate::commands::traits::Command;
use crate::commands::types::{CommandParams, CommandResult, ExecutionContext};
use crate::error::DaemonError;
use crate::validation::validate_service_name;

use super::session::TunnelSession;

/// Select the OS service the session controls.
pub struct InitializeTunnelCommand {
    session: Arc<TunnelSession>,
}

impl InitializeTunnelCommand {
    pub fn new(session: Arc<TunnelSession>) -> Self {
        Self { session }
    }
}

impl Command for InitializeTunnelCommand {
    fn name(&self) -> &'static str {
        "tunnel.initialize"
    }

    fn validate(&self, params: &CommandParams) -> Result<(), DaemonError> {
        let service = params.get_string("service_name")?;
        validate_service_name(&service)?;
        Ok(())
    }

    fn execute(
        &self,
        ctx: &ExecutionContext,
        params: CommandParams,
    ) -> Result<CommandResult, DaemonError> {
        let service = params.get_string("service_name")?;

        self.session.initialize(&service)?;

        info!(
            request_id = %ctx.request_id,
            service = %service,
            "Tunnel session initialized"
        );

        Ok(CommandResult::success(serde_json::json!({
            "service": service,
        })))
    }
}

//! Tunnel stage command.
//!
//! Query the current stage of the tunnel service.

use std::sync::Arc;

use tracing::debug;

use crate::commands::traits::Command;
use crate::commands::types::{CommandParams, CommandResult, ExecutionContext};
use crate::error::DaemonError;

use super::session::TunnelSession;

/// Get the current stage of the tunnel service.
pub struct StageTunnelCommand {
    session: Arc<TunnelSession>,
}

impl StageTunnelCommand {
    pub fn new(session: Arc<TunnelSession>) -> Self {
        Self { session }
    }
}

impl Command for StageTunnelCommand {
    fn name(&self) -> &'static str {
        "tunnel.stage"
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
        let stage = controller.status();

        debug!(
            request_id = %ctx.request_id,
            service = %controller.service_name(),
            stage = %stage,
            "Tunnel stage retrieved"
        );

        Ok(CommandResult::success(serde_json::json!({
            "service": controller.service_name(),
            "stage": stage,
        })))
    }
}

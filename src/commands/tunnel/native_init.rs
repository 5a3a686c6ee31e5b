//! Packet forwarding shutdown.
//!
//! The routing and remote access service forwards packets in a way that
//! conflicts with the tunnel, so it is stopped and disabled before first use.

use std::sync::Arc;

use tracing::info;

use crate::commands::traits::Command;
use crate::commands::types::{CommandParams, CommandResult, ExecutionContext};
use crate::error::DaemonError;

use super::session::TunnelSession;

/// Stop and disable the packet forwarding service.
pub struct NativeInitCommand {
    session: Arc<TunnelSession>,
}

impl NativeInitCommand {
    pub fn new(session: Arc<TunnelSession>) -> Self {
        Self { session }
    }
}

impl Command for NativeInitCommand {
    fn name(&self) -> &'static str {
        "tunnel.native_init"
    }

    fn validate(&self, _params: &CommandParams) -> Result<(), DaemonError> {
        Ok(())
    }

    fn execute(
        &self,
        ctx: &ExecutionContext,
        _params: CommandParams,
    ) -> Result<CommandResult, DaemonError> {
        let forwarding = self.session.forwarding_controller()?;

        forwarding.stop().map_err(|e| DaemonError::PacketForwarding {
            action: "stop",
            source: Box::new(e),
        })?;
        forwarding.disable().map_err(|e| DaemonError::PacketForwarding {
            action: "disable",
            source: Box::new(e),
        })?;

        info!(
            request_id = %ctx.request_id,
            service = %forwarding.service_name(),
            "Packet forwarding disabled"
        );

        Ok(CommandResult::success(serde_json::json!({
            "service": forwarding.service_name(),
        })))
    }
}

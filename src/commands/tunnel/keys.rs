//! Key pair generation command.

use tracing::debug;

use crate::commands::traits::Command;
use crate::commands::types::{CommandParams, CommandResult, ExecutionContext};
use crate::error::DaemonError;
use crate::tunnel::generate_key_pair;

/// Generate a WireGuard key pair.
pub struct GenerateKeyPairCommand;

impl Command for GenerateKeyPairCommand {
    fn name(&self) -> &'static str {
        "tunnel.generate_key_pair"
    }

    fn validate(&self, _params: &CommandParams) -> Result<(), DaemonError> {
        Ok(())
    }

    fn execute(
        &self,
        ctx: &ExecutionContext,
        _params: CommandParams,
    ) -> Result<CommandResult, DaemonError> {
        let pair = generate_key_pair();

        debug!(
            request_id = %ctx.request_id,
            public_key = %pair.public_key,
            "Generated key pair"
        );

        Ok(CommandResult::success(serde_json::to_value(pair)?))
    }
}

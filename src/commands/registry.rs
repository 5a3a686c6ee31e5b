//! Command registry for dispatching requests to handlers.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{CommandErrorKind, DaemonError};

use super::traits::Command;
use super::tunnel::{
    GenerateKeyPairCommand, InitializeTunnelCommand, NativeInitCommand, StageTunnelCommand,
    StartTunnelCommand, StopTunnelCommand, TunnelSession,
};
use super::types::{CommandParams, CommandResult, ExecutionContext};

/// Registry of all available commands.
#[derive(Clone)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, Arc<dyn Command>>,
}

impl CommandRegistry {
    /// Create a new command registry with all built-in commands bound to
    /// `session`.
    pub fn new(session: Arc<TunnelSession>) -> Self {
        let mut registry = Self {
            commands: HashMap::new(),
        };

        // Tunnel commands
        registry.register(Arc::new(InitializeTunnelCommand::new(Arc::clone(&session))));
        registry.register(Arc::new(StartTunnelCommand::new(Arc::clone(&session))));
        registry.register(Arc::new(StopTunnelCommand::new(Arc::clone(&session))));
        registry.register(Arc::new(StageTunnelCommand::new(Arc::clone(&session))));
        registry.register(Arc::new(NativeInitCommand::new(session)));
        registry.register(Arc::new(GenerateKeyPairCommand));

        info!(
            count = registry.commands.len(),
            "Command registry initialized"
        );

        registry
    }

    /// Register a command.
    fn register(&mut self, command: Arc<dyn Command>) {
        let name = command.name();
        debug!(command = name, "Registering command");
        self.commands.insert(name, command);
    }

    /// Get a command by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands.get(name).cloned()
    }

    /// Dispatch a request to the appropriate command handler.
    pub fn dispatch(
        &self,
        ctx: &ExecutionContext,
        command_name: &str,
        params: CommandParams,
    ) -> Result<CommandResult, DaemonError> {
        // Look up the command
        let command = self
            .commands
            .get(command_name)
            .ok_or_else(|| DaemonError::Command {
                kind: CommandErrorKind::UnknownCommand {
                    name: command_name.to_string(),
                },
            })?;

        // Validate parameters
        command.validate(&params)?;

        // Execute the command
        command.execute(ctx, params)
    }

    /// List all registered command names.
    pub fn list_commands(&self) -> Vec<&'static str> {
        self.commands.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::scm::UnsupportedManager;

    fn create_registry() -> CommandRegistry {
        let session = TunnelSession::new(Arc::new(UnsupportedManager), Settings::default());
        CommandRegistry::new(Arc::new(session))
    }

    #[test]
    fn test_registry_has_commands() {
        let registry = create_registry();
        assert!(registry.get("tunnel.initialize").is_some());
        assert!(registry.get("tunnel.start").is_some());
        assert!(registry.get("tunnel.stop").is_some());
        assert!(registry.get("tunnel.stage").is_some());
        assert!(registry.get("tunnel.native_init").is_some());
        assert!(registry.get("tunnel.generate_key_pair").is_some());
        assert!(registry.get("nonexistent").is_none());
        assert_eq!(registry.list_commands().len(), 6);
    }

    #[test]
    fn test_dispatch_unknown_command() {
        let registry = create_registry();
        let ctx = ExecutionContext::now("unknown.command");
        let params = CommandParams::new(serde_json::json!({}));

        let result = registry.dispatch(&ctx, "unknown.command", params);
        assert!(matches!(
            result,
            Err(DaemonError::Command {
                kind: CommandErrorKind::UnknownCommand { .. }
            })
        ));
    }

    #[test]
    fn test_stage_before_initialize() {
        let registry = create_registry();
        let ctx = ExecutionContext::now("tunnel.stage");
        let params = CommandParams::new(serde_json::json!({}));

        let result = registry.dispatch(&ctx, "tunnel.stage", params);
        assert!(matches!(result, Err(DaemonError::InvalidState { .. })));
    }

    #[test]
    fn test_stage_without_manager_is_denied() {
        let registry = create_registry();
        let params = CommandParams::new(serde_json::json!({"service_name": "wgtun"}));
        registry
            .dispatch(&ExecutionContext::now("tunnel.initialize"), "tunnel.initialize", params)
            .unwrap();

        let result = registry
            .dispatch(
                &ExecutionContext::now("tunnel.stage"),
                "tunnel.stage",
                CommandParams::new(serde_json::json!({})),
            )
            .unwrap();
        assert_eq!(result.data.unwrap()["stage"], "denied");
    }
}

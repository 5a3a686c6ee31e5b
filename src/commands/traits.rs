//! Command trait definition.

use crate::error::DaemonError;

use super::types::{CommandParams, CommandResult, ExecutionContext};

/// Core trait for all executable commands.
///
/// Every request the daemon accepts is handled by a type implementing this
/// trait.
///
/// # Example
///
/// ```ignore
/// pub struct MyCommand;
///
/// impl Command for MyCommand {
///     fn name(&self) -> &'static str {
///         "tunnel.my_command"
///     }
///
///     fn validate(&self, params: &CommandParams) -> Result<(), DaemonError> {
///         params.require_string("required_param")?;
///         Ok(())
///     }
///
///     fn execute(
///         &self,
///         ctx: &ExecutionContext,
///         params: CommandParams,
///     ) -> Result<CommandResult, DaemonError> {
///         let value = params.get_string("required_param")?;
///         Ok(CommandResult::success(serde_json::json!({"value": value})))
///     }
/// }
/// ```
pub trait Command: Send + Sync {
    /// Unique command identifier (e.g., "tunnel.start").
    fn name(&self) -> &'static str;

    /// Validate the command parameters before execution.
    ///
    /// Called before `execute()`; must not touch the service database.
    fn validate(&self, params: &CommandParams) -> Result<(), DaemonError>;

    /// Execute the command.
    ///
    /// Lifecycle commands block for seconds at a time. Call this from a
    /// blocking context (e.g. `spawn_blocking`).
    fn execute(
        &self,
        ctx: &ExecutionContext,
        params: CommandParams,
    ) -> Result<CommandResult, DaemonError>;
}

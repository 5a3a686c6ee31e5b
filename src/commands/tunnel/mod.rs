//! Tunnel service commands.
//!
//! Provides commands for driving the tunnel service lifecycle:
//! - `tunnel.initialize` - Select the service the session controls
//! - `tunnel.start` - Write the tunnel config, then create and start the service
//! - `tunnel.stop` - Stop the service
//! - `tunnel.stage` - Get the current service stage
//! - `tunnel.native_init` - Stop and disable the packet forwarding service
//! - `tunnel.generate_key_pair` - Generate a WireGuard key pair

mod control;
mod initialize;
mod keys;
mod native_init;
mod session;
mod stage;

pub use control::{StartTunnelCommand, StopTunnelCommand};
pub use initialize::InitializeTunnelCommand;
pub use keys::GenerateKeyPairCommand;
pub use native_init::NativeInitCommand;
pub use session::TunnelSession;
pub use stage::StageTunnelCommand;

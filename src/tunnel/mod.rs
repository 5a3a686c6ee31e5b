//! Tunnel runner collaborators.
//!
//! Writes the wg-quick configuration to disk, assembles the command line
//! the tunnel service runs and generates key pairs.

mod command_line;
mod config_file;
mod keys;

pub use command_line::{resolve_executable, service_command_line};
pub use config_file::write_config_file;
pub use keys::{generate_key_pair, KeyPair};

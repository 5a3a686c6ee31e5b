//! Input validation module.
//!
//! Provides validators for values that reach the OS service database.

mod service_name;

pub use service_name::validate_service_name;

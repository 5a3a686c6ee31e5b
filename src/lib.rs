//! WireGuard tunnel service daemon library.
//!
//! This crate manages the OS service that hosts a WireGuard tunnel runner:
//! it creates, starts, stops and queries the service and reports its
//! lifecycle as a small set of stages.

pub mod commands;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod scm;
pub mod tunnel;
pub mod validation;

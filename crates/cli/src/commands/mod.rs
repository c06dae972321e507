//! Subcommand implementations

pub mod frame;
pub mod session;

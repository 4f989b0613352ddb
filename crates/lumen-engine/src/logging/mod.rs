//! Logging utilities.
//!
//! Centralizes logger initialization. Everything else in the workspace talks
//! to the `log` facade only.

mod init;

pub use init::{init_logging, LoggingConfig};

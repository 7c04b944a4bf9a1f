//! Shared utilities: errors, configuration and diagnostics.
pub mod config;
pub mod error;
pub mod log;

pub use error::{PluginCode, PluginError, PluginResult};

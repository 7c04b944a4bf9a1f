//! Entry points: the C ABI, the command registry and the per-call context.

pub mod context;
pub mod dispatch;
pub mod ffi;
pub mod host;

pub use context::PluginContext;
pub use dispatch::{CommandRegistry, Handler, COMMAND_MAX, PLUGIN_NAME};

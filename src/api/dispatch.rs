//! Name-keyed command registry behind the single host entry point.

use crate::common::error::{PluginCode, PluginError, PluginResult};
use crate::training;

use super::context::PluginContext;

/// Prefix of every message the plugin writes to the error sink.
pub const PLUGIN_NAME: &str = "_svm";

/// Command names are compared on at most this many bytes.
pub const COMMAND_MAX: usize = 12;

/// A subcommand. Receives the arguments after the command name.
pub type Handler = fn(&PluginContext<'_>, &[String]) -> PluginResult<()>;

pub struct CommandRegistry {
    commands: Vec<(&'static str, Handler)>,
}

impl CommandRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Registry with every command the plugin ships.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("train", training::service::train);
        registry
    }

    /// Add or replace a command.
    pub fn register(&mut self, name: &'static str, handler: Handler) -> &mut Self {
        match self.commands.iter_mut().find(|(n, _)| names_match(n, name)) {
            Some(entry) => *entry = (name, handler),
            None => self.commands.push((name, handler)),
        }
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.iter().map(|(name, _)| *name)
    }

    pub fn lookup(&self, name: &str) -> PluginResult<Handler> {
        self.commands
            .iter()
            .find(|(n, _)| names_match(n, name))
            .map(|(_, handler)| *handler)
            .ok_or_else(|| PluginError::UnrecognizedSubcommand(name.to_string()))
    }

    /// Run `argv[0]` with the remaining arguments.
    pub fn run(&self, ctx: &PluginContext<'_>, argv: &[String]) -> PluginResult<()> {
        let (command, args) = argv.split_first().ok_or(PluginError::MissingSubcommand)?;
        log::debug!("dispatching {command} with {} argument(s)", args.len());
        let handler = self.lookup(command)?;
        handler(ctx, args)
    }

    /// Like [`run`](Self::run), but reports a failure once through the error
    /// sink and turns the outcome into the host's return code.
    pub fn dispatch(&self, ctx: &PluginContext<'_>, argv: &[String]) -> u32 {
        match self.run(ctx, argv) {
            Ok(()) => PluginCode::Ok as u32,
            Err(err) => {
                ctx.diagnostics.error(&format!("{PLUGIN_NAME}: {err}\n"));
                err.code() as u32
            }
        }
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Case-sensitive comparison of the first `COMMAND_MAX` bytes.
fn names_match(a: &str, b: &str) -> bool {
    a.bytes().take(COMMAND_MAX).eq(b.bytes().take(COMMAND_MAX))
}

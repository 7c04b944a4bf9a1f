//! Error handling primitives shared across the plugin core.
//!
//! Every failure is terminal for the current host call: the error travels up
//! with `?`, is reported once through the host's error sink and its code is
//! returned to the host.

use std::collections::TryReserveError;

use thiserror::Error;

/// Stable return codes that cross the FFI boundary.
///
/// Values follow the host's own numbering where one exists so the `.ado`
/// wrapper can pass them straight to `exit`.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PluginCode {
    /// Success.
    Ok = 0,
    /// The solver rejected the assembled problem or parameters.
    InvalidParameter = 198,
    /// No subcommand was given.
    MissingSubcommand = 197,
    /// The subcommand name is not registered.
    UnrecognizedSubcommand = 199,
    /// Input data cannot be converted (e.g. empty varlist).
    InvalidInput = 459,
    /// The host refused to hand over a cell value.
    SourceRead = 460,
    /// Memory for the problem could not be obtained.
    OutOfMemory = 909,
    /// The `if`/`in` selection left nothing to train on.
    NoObservations = 2000,
    /// `stsvm_call` was reached before `stsvm_init`.
    Uninitialized = 3000,
}

/// Canonical error type for the core.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("unable to allocate {what}")]
    Allocation {
        what: &'static str,
        #[source]
        source: TryReserveError,
    },

    #[error("Parameter error: {0}")]
    ParameterValidation(String),

    #[error("no subcommand specified")]
    MissingSubcommand,

    #[error("unrecognized subcommand {0}")]
    UnrecognizedSubcommand(String),

    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("host returned code {code} reading variable {column}, observation {observation}")]
    Source {
        column: usize,
        observation: usize,
        code: i32,
    },

    #[error("no observations")]
    NoObservations,

    #[error("plugin used before initialisation")]
    Uninitialized,
}

/// Result alias used throughout the crate.
pub type PluginResult<T> = Result<T, PluginError>;

impl PluginError {
    /// Allocation helper for `try_reserve*` failures.
    pub fn allocation(what: &'static str) -> impl FnOnce(TryReserveError) -> Self {
        move |source| Self::Allocation { what, source }
    }

    /// Parameter validation helper.
    pub fn parameter<S: Into<String>>(msg: S) -> Self {
        Self::ParameterValidation(msg.into())
    }

    /// Code handed back to the host for this error.
    pub fn code(&self) -> PluginCode {
        match self {
            Self::Allocation { .. } => PluginCode::OutOfMemory,
            Self::ParameterValidation(_) => PluginCode::InvalidParameter,
            Self::MissingSubcommand => PluginCode::MissingSubcommand,
            Self::UnrecognizedSubcommand(_) => PluginCode::UnrecognizedSubcommand,
            Self::InvalidInput(_) => PluginCode::InvalidInput,
            Self::Source { .. } => PluginCode::SourceRead,
            Self::NoObservations => PluginCode::NoObservations,
            Self::Uninitialized => PluginCode::Uninitialized,
        }
    }
}

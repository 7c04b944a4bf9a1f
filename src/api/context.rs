//! Per-invocation context threaded through command handlers.

use crate::common::config::PluginCfg;
use crate::common::log::Diagnostics;
use crate::data::domain::TabularSource;
use crate::training::domain::Solver;

/// Everything one host call needs. Built fresh for every call and dropped
/// when it returns; nothing in here outlives the invocation.
pub struct PluginContext<'a> {
    pub source: &'a dyn TabularSource,
    pub diagnostics: &'a dyn Diagnostics,
    pub solver: &'a dyn Solver,
    pub cfg: PluginCfg,
}

impl<'a> PluginContext<'a> {
    pub fn new(
        source: &'a dyn TabularSource,
        diagnostics: &'a dyn Diagnostics,
        solver: &'a dyn Solver,
        cfg: PluginCfg,
    ) -> Self {
        Self {
            source,
            diagnostics,
            solver,
            cfg,
        }
    }
}

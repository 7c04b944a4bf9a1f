//! Runtime configuration loaded from the process environment.

use std::env;
use std::path::PathBuf;

use log::LevelFilter;

/// File name the fitted model is exported to in `debug-model` builds.
pub const DEFAULT_MODEL_PATH: &str = "svmfit";

/// Snapshot of configuration values consumed by the core.
#[derive(Clone, Debug)]
pub struct PluginCfg {
    pub log_level: LevelFilter,
    pub model_path: PathBuf,
}

impl Default for PluginCfg {
    fn default() -> Self {
        Self {
            log_level: LevelFilter::Warn,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
        }
    }
}

impl PluginCfg {
    /// Create a configuration snapshot from the process environment.
    pub fn load() -> Self {
        fn env_or(key: &str, default: &str) -> String {
            env::var(key).unwrap_or_else(|_| default.to_string())
        }

        Self {
            log_level: parse_level(&env_or("STSVM_LOG_LEVEL", "warn")),
            model_path: PathBuf::from(env_or("STSVM_MODEL_PATH", DEFAULT_MODEL_PATH)),
        }
    }
}

/// Unknown names fall back to `warn` rather than silencing the plugin.
fn parse_level(raw: &str) -> LevelFilter {
    raw.trim().parse().unwrap_or(LevelFilter::Warn)
}

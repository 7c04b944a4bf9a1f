//! C-compatible entry points loaded by the host's plugin shim.
//!
//! `stsvm_init` is called once when the plugin is loaded and registers the
//! host's callback table for the life of the process. Every `stsvm_call`
//! then builds a fresh [`PluginContext`] over that table and dispatches.

use std::ffi::CStr;
use std::os::raw::c_char;
use std::sync::OnceLock;

use crate::common::config::PluginCfg;
use crate::common::error::PluginError;
use crate::common::log::{Diagnostics, HostLogger};

use super::context::PluginContext;
use super::dispatch::CommandRegistry;
use super::host::{HostCallbacks, HostSinks, HostSolver, HostSource};

/// Plugin interface version reported back to the host at initialisation.
pub const HOST_INTERFACE_VERSION: u32 = 2000;

static HOST: OnceLock<HostCallbacks> = OnceLock::new();

/// ABI version of this library.
#[no_mangle]
pub extern "C" fn stsvm_api_version() -> u32 {
    1
}

/// Register the host callback table. Only the first table is kept.
#[no_mangle]
pub extern "C" fn stsvm_init(host: *const HostCallbacks) -> u32 {
    if host.is_null() {
        return 0;
    }
    let offered = unsafe { *host };
    let host = HOST.get_or_init(|| offered);

    let cfg = PluginCfg::load();
    HostLogger::new(host_display, cfg.log_level).install();
    if let Some(set_print) = host.solver.set_print_string_function {
        set_print(Some(host.display));
    }
    log::debug!("registered host table, log level {}", cfg.log_level);

    HOST_INTERFACE_VERSION
}

/// Run one plugin command. `argv[0]` names the subcommand.
#[no_mangle]
pub extern "C" fn stsvm_call(argc: i32, argv: *const *const c_char) -> u32 {
    let Some(host) = HOST.get() else {
        return PluginError::Uninitialized.code() as u32;
    };

    let args = collect_args(argc, argv);
    let source = HostSource::new(host);
    let sinks = HostSinks::new(host);
    let solver = HostSolver::new(host);
    let ctx = PluginContext::new(&source, &sinks, &solver, PluginCfg::load());

    CommandRegistry::with_defaults().dispatch(&ctx, &args)
}

fn host_display(msg: &str) {
    if let Some(host) = HOST.get() {
        HostSinks::new(host).display(msg);
    }
}

fn collect_args(argc: i32, argv: *const *const c_char) -> Vec<String> {
    if argv.is_null() || argc <= 0 {
        return Vec::new();
    }
    (0..argc as usize)
        .map(|i| unsafe { *argv.add(i) })
        .filter(|arg| !arg.is_null())
        .map(|arg| unsafe { CStr::from_ptr(arg) }.to_string_lossy().into_owned())
        .collect()
}

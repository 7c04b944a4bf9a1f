//! Adapters from the host's C callback table to the core's traits.
//!
//! The host (a thin C shim around the statistics package's plugin API and the
//! solver library) fills a [`HostCallbacks`] table once at initialisation.
//! Everything here only borrows that table.

use std::ffi::{c_void, CStr, CString};
use std::io;
use std::marker::PhantomData;
use std::os::raw::c_char;
use std::path::Path;
use std::ptr;

use crate::common::error::{PluginError, PluginResult};
use crate::common::log::Diagnostics;
use crate::data::domain::{ObservationRange, TabularSource};
use crate::problem::domain::{Problem, SvmNode};
use crate::training::domain::{FittedModel, Solver, SvmParameter};

/// Text output callback; receives a NUL-terminated string.
pub type TextSink = extern "C" fn(*const c_char);

/// Data plane and output channels of the host.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct HostCallbacks {
    pub display: TextSink,
    pub error: TextSink,
    /// First observation of the `in` window (1-based).
    pub in1: extern "C" fn() -> i32,
    /// Last observation of the `in` window, inclusive.
    pub in2: extern "C" fn() -> i32,
    /// Non-zero when the observation satisfies the `if` condition.
    pub ifobs: extern "C" fn(i32) -> i32,
    pub nvars: extern "C" fn() -> i32,
    /// `vdata(variable, observation, out)`; variables are 1-based.
    pub vdata: extern "C" fn(i32, i32, *mut f64) -> i32,
    pub solver: SolverCallbacks,
}

/// Entry points of the solver library.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct SolverCallbacks {
    /// Returns NULL when the parameters are acceptable. When absent the
    /// built-in checker is used.
    pub check_parameter:
        Option<extern "C" fn(*const RawProblem, *const RawParameter) -> *const c_char>,
    pub train: extern "C" fn(*const RawProblem, *const RawParameter) -> *mut c_void,
    /// Returns zero on success.
    pub save_model: extern "C" fn(*const c_char, *const c_void) -> i32,
    pub free_model: extern "C" fn(*mut *mut c_void),
    pub set_print_string_function: Option<extern "C" fn(Option<TextSink>)>,
}

/// Solver view of a problem: `l` rows, `y` labels, `x` row pointers.
#[repr(C)]
pub struct RawProblem {
    pub l: i32,
    pub y: *const f64,
    pub x: *const *const SvmNode,
}

/// Solver parameter block, field order as the solver declares it.
#[repr(C)]
#[derive(Debug)]
pub struct RawParameter {
    pub svm_type: i32,
    pub kernel_type: i32,
    pub degree: i32,
    pub gamma: f64,
    pub coef0: f64,
    pub cache_size: f64,
    pub eps: f64,
    pub c: f64,
    pub nr_weight: i32,
    pub weight_label: *const i32,
    pub weight: *const f64,
    pub nu: f64,
    pub p: f64,
    pub shrinking: i32,
    pub probability: i32,
}

impl From<&SvmParameter> for RawParameter {
    fn from(param: &SvmParameter) -> Self {
        Self {
            svm_type: param.svm_type as i32,
            kernel_type: param.kernel_type as i32,
            degree: param.degree,
            gamma: param.gamma,
            coef0: param.coef0,
            cache_size: param.cache_size,
            eps: param.eps,
            c: param.c,
            nr_weight: 0,
            weight_label: ptr::null(),
            weight: ptr::null(),
            nu: param.nu,
            p: param.p,
            shrinking: param.shrinking as i32,
            probability: param.probability as i32,
        }
    }
}

/// Borrowed [`RawProblem`] over a [`Problem`]. The row pointer table lives as
/// long as the view; the problem must outlive both.
pub struct RawProblemView<'a> {
    raw: RawProblem,
    _rows: Vec<*const SvmNode>,
    _problem: PhantomData<&'a Problem>,
}

impl<'a> RawProblemView<'a> {
    pub fn new(problem: &'a Problem) -> PluginResult<Self> {
        let l = i32::try_from(problem.count())
            .map_err(|_| PluginError::InvalidInput("too many observations for the solver"))?;
        let rows: Vec<*const SvmNode> = problem.rows().iter().map(|row| row.as_ptr()).collect();
        Ok(Self {
            raw: RawProblem {
                l,
                y: problem.labels().as_ptr(),
                x: rows.as_ptr(),
            },
            _rows: rows,
            _problem: PhantomData,
        })
    }

    pub fn as_raw(&self) -> &RawProblem {
        &self.raw
    }
}

fn with_c_str<R>(msg: &str, f: impl FnOnce(*const c_char) -> R) -> R {
    let owned = CString::new(msg).unwrap_or_else(|_| {
        CString::new(msg.replace('\0', " ")).unwrap_or_default()
    });
    f(owned.as_ptr())
}

/// Host output channels.
pub struct HostSinks<'h> {
    host: &'h HostCallbacks,
}

impl<'h> HostSinks<'h> {
    pub fn new(host: &'h HostCallbacks) -> Self {
        Self { host }
    }
}

impl Diagnostics for HostSinks<'_> {
    fn display(&self, msg: &str) {
        with_c_str(msg, |s| (self.host.display)(s));
    }

    fn error(&self, msg: &str) {
        with_c_str(msg, |s| (self.host.error)(s));
    }
}

/// The host's current dataset, restricted by its `in`/`if` qualifiers.
pub struct HostSource<'h> {
    host: &'h HostCallbacks,
}

impl<'h> HostSource<'h> {
    pub fn new(host: &'h HostCallbacks) -> Self {
        Self { host }
    }
}

impl TabularSource for HostSource<'_> {
    fn bounds(&self) -> ObservationRange {
        let first = (self.host.in1)();
        let last = (self.host.in2)();
        if first < 1 || last < first {
            ObservationRange::empty()
        } else {
            ObservationRange::new(first as usize, last as usize)
        }
    }

    fn accepts(&self, observation: usize) -> bool {
        i32::try_from(observation).map_or(false, |obs| (self.host.ifobs)(obs) != 0)
    }

    fn nvars(&self) -> usize {
        usize::try_from((self.host.nvars)()).unwrap_or(0)
    }

    fn value_at(&self, column: usize, observation: usize) -> PluginResult<f64> {
        let (Ok(variable), Ok(obs)) = (i32::try_from(column + 1), i32::try_from(observation))
        else {
            return Err(PluginError::InvalidInput("cell outside the host's index range"));
        };
        let mut out = 0.0;
        let code = (self.host.vdata)(variable, obs, &mut out);
        if code != 0 {
            return Err(PluginError::Source {
                column,
                observation,
                code,
            });
        }
        Ok(out)
    }
}

/// The solver library reached through the callback table.
pub struct HostSolver<'h> {
    callbacks: &'h SolverCallbacks,
}

impl<'h> HostSolver<'h> {
    pub fn new(host: &'h HostCallbacks) -> Self {
        Self {
            callbacks: &host.solver,
        }
    }
}

impl Solver for HostSolver<'_> {
    fn check_parameter(&self, problem: &Problem, param: &SvmParameter) -> Option<String> {
        let Some(check) = self.callbacks.check_parameter else {
            return param.check(problem).err().map(str::to_owned);
        };
        let view = match RawProblemView::new(problem) {
            Ok(view) => view,
            Err(err) => return Some(err.to_string()),
        };
        let raw_param = RawParameter::from(param);
        let msg = check(view.as_raw(), &raw_param);
        if msg.is_null() {
            None
        } else {
            Some(unsafe { CStr::from_ptr(msg) }.to_string_lossy().into_owned())
        }
    }

    fn train(&self, problem: &Problem, param: &SvmParameter) -> PluginResult<Box<dyn FittedModel>> {
        let view = RawProblemView::new(problem)?;
        let raw_param = RawParameter::from(param);
        let handle = (self.callbacks.train)(view.as_raw(), &raw_param);
        if handle.is_null() {
            return Err(PluginError::InvalidInput("solver returned no model"));
        }
        Ok(Box::new(HostModel {
            handle,
            callbacks: *self.callbacks,
        }))
    }
}

/// Solver-owned model; freed through the solver when dropped.
struct HostModel {
    handle: *mut c_void,
    callbacks: SolverCallbacks,
}

impl FittedModel for HostModel {
    fn save(&self, path: &Path) -> io::Result<()> {
        let code = with_c_str(&path.to_string_lossy(), |p| {
            (self.callbacks.save_model)(p, self.handle)
        });
        if code == 0 {
            Ok(())
        } else {
            Err(io::Error::other(format!("solver returned {code}")))
        }
    }
}

impl Drop for HostModel {
    fn drop(&mut self) {
        (self.callbacks.free_model)(&mut self.handle);
    }
}

//! Solver parameters and the seam to the external SVM solver.
//!
//! The solver itself (training, model format) lives outside the crate; this
//! module describes what is handed to it and how its answers come back.

use std::io;
use std::path::Path;

use crate::common::error::{PluginError, PluginResult};
use crate::problem::domain::Problem;

/// SVM formulation, numbered as the solver expects.
#[repr(i32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SvmType {
    CSvc = 0,
    NuSvc = 1,
    OneClass = 2,
    EpsilonSvr = 3,
    NuSvr = 4,
}

impl SvmType {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "c_svc" => Some(Self::CSvc),
            "nu_svc" => Some(Self::NuSvc),
            "one_class" => Some(Self::OneClass),
            "epsilon_svr" => Some(Self::EpsilonSvr),
            "nu_svr" => Some(Self::NuSvr),
            _ => None,
        }
    }
}

/// Kernel function, numbered as the solver expects.
#[repr(i32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum KernelType {
    Linear = 0,
    Poly = 1,
    Rbf = 2,
    Sigmoid = 3,
    Precomputed = 4,
}

impl KernelType {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "linear" => Some(Self::Linear),
            "poly" | "polynomial" => Some(Self::Poly),
            "rbf" => Some(Self::Rbf),
            "sigmoid" => Some(Self::Sigmoid),
            "precomputed" => Some(Self::Precomputed),
            _ => None,
        }
    }
}

/// Training parameters. `gamma == 0` means "one over the number of features"
/// and is resolved against the problem before training.
#[derive(Clone, Debug, PartialEq)]
pub struct SvmParameter {
    pub svm_type: SvmType,
    pub kernel_type: KernelType,
    pub degree: i32,
    pub gamma: f64,
    pub coef0: f64,
    pub nu: f64,
    /// In MB.
    pub cache_size: f64,
    pub c: f64,
    pub eps: f64,
    pub p: f64,
    pub shrinking: bool,
    pub probability: bool,
}

impl Default for SvmParameter {
    fn default() -> Self {
        Self {
            svm_type: SvmType::CSvc,
            kernel_type: KernelType::Rbf,
            degree: 3,
            gamma: 0.0,
            coef0: 0.0,
            nu: 0.5,
            cache_size: 100.0,
            c: 1.0,
            eps: 1e-3,
            p: 0.1,
            shrinking: true,
            probability: false,
        }
    }
}

impl SvmParameter {
    /// Defaults overridden by `name=value` arguments.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> PluginResult<Self> {
        let mut param = Self::default();
        for arg in args {
            let arg = arg.as_ref();
            let (key, value) = arg
                .split_once('=')
                .ok_or_else(|| PluginError::parameter(format!("expected name=value, got '{arg}'")))?;
            param.set(&key.trim().to_ascii_lowercase(), value.trim())?;
        }
        Ok(param)
    }

    fn set(&mut self, key: &str, value: &str) -> PluginResult<()> {
        fn num<T: std::str::FromStr>(key: &str, value: &str) -> PluginResult<T> {
            value
                .parse()
                .map_err(|_| PluginError::parameter(format!("invalid value '{value}' for {key}")))
        }
        fn flag(key: &str, value: &str) -> PluginResult<bool> {
            match value {
                "1" => Ok(true),
                "0" => Ok(false),
                _ => Err(PluginError::parameter(format!("{key} must be 0 or 1"))),
            }
        }

        match key {
            "svm_type" => {
                self.svm_type = SvmType::parse(value)
                    .ok_or_else(|| PluginError::parameter("unknown svm type"))?
            }
            "kernel" | "kernel_type" => {
                self.kernel_type = KernelType::parse(value)
                    .ok_or_else(|| PluginError::parameter("unknown kernel type"))?
            }
            "degree" => self.degree = num(key, value)?,
            "gamma" => self.gamma = num(key, value)?,
            "coef0" => self.coef0 = num(key, value)?,
            "nu" => self.nu = num(key, value)?,
            "cache_size" => self.cache_size = num(key, value)?,
            "c" => self.c = num(key, value)?,
            "eps" => self.eps = num(key, value)?,
            "p" => self.p = num(key, value)?,
            "shrinking" => self.shrinking = flag(key, value)?,
            "probability" => self.probability = flag(key, value)?,
            _ => return Err(PluginError::parameter(format!("unknown option {key}"))),
        }
        Ok(())
    }

    /// Replace an automatic gamma with one over the largest feature index.
    pub fn resolve_gamma(&mut self, problem: &Problem) {
        let max_index = problem.max_index();
        if self.gamma == 0.0 && max_index > 0 {
            self.gamma = 1.0 / max_index as f64;
        }
    }

    /// The solver's own admissibility rules for a parameter set.
    pub fn check(&self, problem: &Problem) -> Result<(), &'static str> {
        use KernelType::*;
        use SvmType::*;

        if matches!(self.kernel_type, Poly | Rbf | Sigmoid) && self.gamma < 0.0 {
            return Err("gamma < 0");
        }
        if self.kernel_type == Poly && self.degree < 0 {
            return Err("degree of polynomial kernel < 0");
        }
        if self.cache_size <= 0.0 {
            return Err("cache_size <= 0");
        }
        if self.eps <= 0.0 {
            return Err("eps <= 0");
        }
        if matches!(self.svm_type, CSvc | EpsilonSvr | NuSvr) && self.c <= 0.0 {
            return Err("C <= 0");
        }
        if matches!(self.svm_type, NuSvc | OneClass | NuSvr) && (self.nu <= 0.0 || self.nu > 1.0) {
            return Err("nu <= 0 or nu > 1");
        }
        if self.svm_type == EpsilonSvr && self.p < 0.0 {
            return Err("p < 0");
        }
        if self.svm_type == OneClass && self.probability {
            return Err("one-class SVM probability output not supported");
        }
        if self.svm_type == NuSvc && !nu_is_feasible(self.nu, problem.labels()) {
            return Err("specified nu is infeasible");
        }
        Ok(())
    }
}

/// nu-SVC needs `nu * (n1 + n2) / 2 <= min(n1, n2)` for every class pair.
fn nu_is_feasible(nu: f64, labels: &[f64]) -> bool {
    let mut classes: Vec<(i64, usize)> = Vec::new();
    for &y in labels {
        let class = y as i64;
        match classes.iter_mut().find(|(c, _)| *c == class) {
            Some((_, n)) => *n += 1,
            None => classes.push((class, 1)),
        }
    }
    classes.iter().enumerate().all(|(i, &(_, n1))| {
        classes[i + 1..]
            .iter()
            .all(|&(_, n2)| nu * (n1 + n2) as f64 / 2.0 <= n1.min(n2) as f64)
    })
}

/// A model produced by the solver. Dropping it releases the solver's storage.
pub trait FittedModel {
    /// Write the model in the solver's own format.
    fn save(&self, path: &Path) -> io::Result<()>;
}

/// The external solver as seen from the `train` command.
pub trait Solver {
    /// `None` when the solver accepts the problem and parameters, otherwise
    /// its complaint.
    fn check_parameter(&self, problem: &Problem, param: &SvmParameter) -> Option<String> {
        param.check(problem).err().map(str::to_owned)
    }

    fn train(&self, problem: &Problem, param: &SvmParameter) -> PluginResult<Box<dyn FittedModel>>;
}

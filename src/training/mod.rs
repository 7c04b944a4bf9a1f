//! Training domain: solver parameters, the solver seam and the `train`
//! command.

pub mod domain;
pub mod service;

pub use domain::{FittedModel, KernelType, Solver, SvmParameter, SvmType};

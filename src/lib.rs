// lib.rs - Stata plugin core turning the host dataset into an SVM problem
pub mod api;
pub mod common;
pub mod data;
pub mod problem;
pub mod training;

pub use api::ffi::{stsvm_api_version, stsvm_call, stsvm_init};
pub use common::{PluginCode, PluginError, PluginResult};
pub use problem::{convert, Problem, SparseRow, SvmNode};

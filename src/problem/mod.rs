//! Problem domain: the sparse structure handed to the solver, how it is
//! built from host data and how it is torn down.

pub mod domain;
pub mod growable;
pub mod service;

pub use domain::{Problem, ReleaseStep, SparseRow, SvmNode, SENTINEL_INDEX};
pub use growable::GrowableArray;
pub use service::convert;

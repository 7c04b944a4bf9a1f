//! The data-plane contract between the host dataset and the converter.

use std::ops::RangeInclusive;

use crate::common::error::PluginResult;

/// Inclusive `[first, last]` window of observation numbers (the host's `in`).
///
/// `first > last` describes an empty window.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ObservationRange {
    pub first: usize,
    pub last: usize,
}

impl ObservationRange {
    pub const fn new(first: usize, last: usize) -> Self {
        Self { first, last }
    }

    pub const fn empty() -> Self {
        Self { first: 1, last: 0 }
    }

    pub fn iter(&self) -> RangeInclusive<usize> {
        self.first..=self.last
    }

    pub fn contains(&self, observation: usize) -> bool {
        self.iter().contains(&observation)
    }

    pub fn len(&self) -> usize {
        if self.first > self.last {
            0
        } else {
            self.last - self.first + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Column-oriented dataset as seen by the converter.
///
/// Column `0` is the outcome, columns `1..nvars()` are features. The
/// predicate may be expensive or stateful on the host side; callers must not
/// assume its answers are cached.
pub trait TabularSource {
    /// Observation window to visit.
    fn bounds(&self) -> ObservationRange;

    /// Whether observation `observation` passes the host's `if` condition.
    fn accepts(&self, observation: usize) -> bool;

    /// Number of columns in the varlist, outcome included.
    fn nvars(&self) -> usize;

    /// Cell value at `column` for `observation`.
    fn value_at(&self, column: usize, observation: usize) -> PluginResult<f64>;
}

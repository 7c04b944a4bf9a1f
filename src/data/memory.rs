//! In-memory `TabularSource` for embedders and tests.

use crate::common::error::{PluginError, PluginResult};

use super::domain::{ObservationRange, TabularSource};

/// Column-major table with host-style 1-based observation numbers, an `in`
/// window and an optional `if` mask.
#[derive(Clone, Debug)]
pub struct ColumnTable {
    columns: Vec<Vec<f64>>,
    nobs: usize,
    range: ObservationRange,
    mask: Option<Vec<bool>>,
}

impl ColumnTable {
    /// Build a table from columns; column `0` is the outcome.
    pub fn new(columns: Vec<Vec<f64>>) -> PluginResult<Self> {
        let nobs = columns.first().map_or(0, Vec::len);
        if columns.iter().any(|c| c.len() != nobs) {
            return Err(PluginError::InvalidInput("columns differ in length"));
        }
        Ok(Self {
            columns,
            nobs,
            range: ObservationRange::new(1, nobs),
            mask: None,
        })
    }

    /// Restrict visiting to `[first, last]`.
    pub fn with_range(mut self, first: usize, last: usize) -> Self {
        self.range = ObservationRange::new(first, last);
        self
    }

    /// Accept only observations for which `keep(observation)` holds.
    pub fn select_where<F>(mut self, keep: F) -> Self
    where
        F: Fn(usize) -> bool,
    {
        self.mask = Some((1..=self.nobs).map(keep).collect());
        self
    }

    fn slot(&self, observation: usize) -> Option<usize> {
        ObservationRange::new(1, self.nobs)
            .contains(observation)
            .then(|| observation - 1)
    }
}

impl TabularSource for ColumnTable {
    fn bounds(&self) -> ObservationRange {
        self.range
    }

    fn accepts(&self, observation: usize) -> bool {
        match (self.slot(observation), &self.mask) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(slot), Some(mask)) => mask[slot],
        }
    }

    fn nvars(&self) -> usize {
        self.columns.len()
    }

    fn value_at(&self, column: usize, observation: usize) -> PluginResult<f64> {
        let slot = self
            .slot(observation)
            .ok_or(PluginError::InvalidInput("observation outside the table"))?;
        self.columns
            .get(column)
            .map(|c| c[slot])
            .ok_or(PluginError::InvalidInput("column outside the varlist"))
    }
}

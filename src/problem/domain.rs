//! Sparse problem types and their ownership rules.
//!
//! A [`Problem`] is the outcome vector plus one [`SparseRow`] per accepted
//! observation. It exclusively owns every allocation it references and is
//! torn down in a fixed order: each row, then the label array, then the row
//! array, then the record itself.

use std::mem;

use crate::common::error::{PluginError, PluginResult};
use crate::data::domain::TabularSource;

/// Index reserved for the end-of-row marker.
pub const SENTINEL_INDEX: i32 = -1;

/// One `(index, value)` pair, laid out like the solver's node type.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SvmNode {
    pub index: i32,
    pub value: f64,
}

impl SvmNode {
    pub const SENTINEL: SvmNode = SvmNode {
        index: SENTINEL_INDEX,
        value: 0.0,
    };

    pub fn is_sentinel(&self) -> bool {
        self.index == SENTINEL_INDEX
    }
}

/// Sentinel-terminated row of feature nodes with strictly increasing indices.
#[derive(Debug, Default)]
pub struct SparseRow {
    nodes: Box<[SvmNode]>,
}

impl SparseRow {
    /// Read feature columns `1..nvars` of `observation` into a new row.
    ///
    /// Column `c` becomes feature index `c` (the solver counts features from
    /// one). The row is only returned once its sentinel is in place.
    pub fn from_observation<S>(source: &S, observation: usize, nvars: usize) -> PluginResult<Self>
    where
        S: TabularSource + ?Sized,
    {
        let mut nodes = Vec::new();
        // nvars - 1 features plus the sentinel
        nodes
            .try_reserve_exact(nvars.max(1))
            .map_err(PluginError::allocation("sparse row"))?;
        for column in 1..nvars {
            let index = i32::try_from(column)
                .map_err(|_| PluginError::InvalidInput("too many feature variables"))?;
            let value = source.value_at(column, observation)?;
            nodes.push(SvmNode { index, value });
        }
        nodes.push(SvmNode::SENTINEL);
        Ok(Self {
            nodes: nodes.into_boxed_slice(),
        })
    }

    /// All nodes, sentinel included.
    pub fn nodes(&self) -> &[SvmNode] {
        &self.nodes
    }

    /// Feature nodes without the sentinel.
    pub fn features(&self) -> &[SvmNode] {
        match self.nodes.split_last() {
            Some((last, rest)) if last.is_sentinel() => rest,
            _ => &self.nodes,
        }
    }

    /// Number of feature nodes.
    pub fn len(&self) -> usize {
        self.features().len()
    }

    pub fn is_empty(&self) -> bool {
        self.features().is_empty()
    }

    pub fn as_ptr(&self) -> *const SvmNode {
        self.nodes.as_ptr()
    }

    /// Sorted by index, exactly one sentinel, and it is last.
    pub fn is_well_formed(&self) -> bool {
        let Some((last, features)) = self.nodes.split_last() else {
            return false;
        };
        last.is_sentinel()
            && features.iter().all(|n| n.index > 0)
            && features.windows(2).all(|w| w[0].index < w[1].index)
    }
}

/// Observable steps of [`Problem::release_traced`], in the order they occur.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ReleaseStep {
    Row(usize),
    Labels,
    Rows,
    Record,
}

/// Outcome vector and design matrix handed to the solver.
#[derive(Debug)]
pub struct Problem {
    count: usize,
    labels: Box<[f64]>,
    rows: Box<[SparseRow]>,
}

impl Problem {
    pub(crate) fn from_parts(labels: Box<[f64]>, rows: Box<[SparseRow]>) -> Self {
        debug_assert_eq!(labels.len(), rows.len());
        Self {
            count: labels.len(),
            labels,
            rows,
        }
    }

    /// Number of accepted observations.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    pub fn rows(&self) -> &[SparseRow] {
        &self.rows
    }

    /// Largest feature index present in any row, zero when there is none.
    pub fn max_index(&self) -> usize {
        self.rows
            .iter()
            .filter_map(|row| row.features().last())
            .map(|node| node.index as usize)
            .max()
            .unwrap_or(0)
    }

    /// Give the problem back. Consuming the box makes a second release or any
    /// later use a compile error.
    pub fn release(self: Box<Self>) {
        drop(self);
    }

    /// Same as [`release`](Self::release), reporting each step to `trace`.
    pub fn release_traced<F>(mut self: Box<Self>, mut trace: F)
    where
        F: FnMut(ReleaseStep),
    {
        self.teardown(&mut trace);
        drop(self);
        trace(ReleaseStep::Record);
    }

    fn teardown(&mut self, trace: &mut dyn FnMut(ReleaseStep)) {
        for (i, row) in self.rows.iter_mut().enumerate() {
            drop(mem::take(row));
            trace(ReleaseStep::Row(i));
        }
        self.count = 0;
        self.labels = Box::default();
        trace(ReleaseStep::Labels);
        self.rows = Box::default();
        trace(ReleaseStep::Rows);
    }
}

impl Drop for Problem {
    fn drop(&mut self) {
        self.teardown(&mut |_| {});
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::ColumnTable;

    fn table() -> ColumnTable {
        ColumnTable::new(vec![
            vec![1.0, -1.0],
            vec![0.5, 0.0],
            vec![2.0, 3.5],
            vec![-4.0, 8.0],
        ])
        .unwrap()
    }

    #[test]
    fn row_indices_follow_column_positions() {
        let row = SparseRow::from_observation(&table(), 2, 4).unwrap();
        assert_eq!(
            row.nodes(),
            &[
                SvmNode { index: 1, value: 0.0 },
                SvmNode { index: 2, value: 3.5 },
                SvmNode { index: 3, value: 8.0 },
                SvmNode::SENTINEL,
            ]
        );
        assert_eq!(row.len(), 3);
        assert!(row.is_well_formed());
    }

    #[test]
    fn outcome_only_varlist_yields_sentinel_row() {
        let row = SparseRow::from_observation(&table(), 1, 1).unwrap();
        assert_eq!(row.nodes(), &[SvmNode::SENTINEL]);
        assert!(row.is_empty());
        assert!(row.is_well_formed());
    }

    #[test]
    fn source_errors_abort_the_row() {
        assert!(SparseRow::from_observation(&table(), 9, 4).is_err());
    }

    #[test]
    fn malformed_rows_are_detected() {
        let unsorted = SparseRow {
            nodes: vec![
                SvmNode { index: 2, value: 1.0 },
                SvmNode { index: 1, value: 1.0 },
                SvmNode::SENTINEL,
            ]
            .into_boxed_slice(),
        };
        let unterminated = SparseRow {
            nodes: vec![SvmNode { index: 1, value: 1.0 }].into_boxed_slice(),
        };
        assert!(!unsorted.is_well_formed());
        assert!(!unterminated.is_well_formed());
        assert!(!SparseRow::default().is_well_formed());
    }

    #[test]
    fn release_runs_rows_then_arrays_then_record() {
        let t = table();
        let rows: Vec<_> = (1..=2)
            .map(|i| SparseRow::from_observation(&t, i, 4).unwrap())
            .collect();
        let problem = Box::new(Problem::from_parts(
            vec![1.0, -1.0].into_boxed_slice(),
            rows.into_boxed_slice(),
        ));
        assert_eq!(problem.max_index(), 3);

        let mut steps = Vec::new();
        problem.release_traced(|step| steps.push(step));
        assert_eq!(
            steps,
            vec![
                ReleaseStep::Row(0),
                ReleaseStep::Row(1),
                ReleaseStep::Labels,
                ReleaseStep::Rows,
                ReleaseStep::Record,
            ]
        );
    }

    #[test]
    fn empty_problem_releases_cleanly() {
        let problem = Box::new(Problem::from_parts(Box::default(), Box::default()));
        assert!(problem.is_empty());
        assert_eq!(problem.max_index(), 0);
        let mut steps = Vec::new();
        problem.release_traced(|step| steps.push(step));
        assert_eq!(
            steps,
            vec![ReleaseStep::Labels, ReleaseStep::Rows, ReleaseStep::Record]
        );
    }
}

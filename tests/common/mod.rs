//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::io;
use std::path::Path;

use stata_svm::common::log::Diagnostics;
use stata_svm::data::{ColumnTable, ObservationRange, TabularSource};
use stata_svm::training::{FittedModel, Solver, SvmParameter};
use stata_svm::{PluginResult, Problem};

/// Outcome for observation `i` is `10 * i`; feature `j` is `i + j / 10`.
pub fn table(nobs: usize, nfeatures: usize) -> ColumnTable {
    let mut columns = vec![(1..=nobs).map(|i| 10.0 * i as f64).collect::<Vec<_>>()];
    for j in 1..=nfeatures {
        columns.push((1..=nobs).map(|i| i as f64 + j as f64 / 10.0).collect());
    }
    ColumnTable::new(columns).unwrap()
}

pub fn label(observation: usize) -> f64 {
    10.0 * observation as f64
}

/// Records every message written to either channel.
#[derive(Default)]
pub struct RecordingSink {
    pub displayed: RefCell<Vec<String>>,
    pub errors: RefCell<Vec<String>>,
}

impl Diagnostics for RecordingSink {
    fn display(&self, msg: &str) {
        self.displayed.borrow_mut().push(msg.to_string());
    }

    fn error(&self, msg: &str) {
        self.errors.borrow_mut().push(msg.to_string());
    }
}

/// Wraps a source and logs every predicate query.
pub struct CountingSource<S> {
    pub inner: S,
    pub asked: RefCell<Vec<usize>>,
    pub bounds_calls: Cell<usize>,
}

impl<S> CountingSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            asked: RefCell::new(Vec::new()),
            bounds_calls: Cell::new(0),
        }
    }
}

impl<S: TabularSource> TabularSource for CountingSource<S> {
    fn bounds(&self) -> ObservationRange {
        self.bounds_calls.set(self.bounds_calls.get() + 1);
        self.inner.bounds()
    }

    fn accepts(&self, observation: usize) -> bool {
        self.asked.borrow_mut().push(observation);
        self.inner.accepts(observation)
    }

    fn nvars(&self) -> usize {
        self.inner.nvars()
    }

    fn value_at(&self, column: usize, observation: usize) -> PluginResult<f64> {
        self.inner.value_at(column, observation)
    }
}

/// What the solver saw when it was asked to train.
#[derive(Clone, Debug, PartialEq)]
pub struct Seen {
    pub count: usize,
    pub labels: Vec<f64>,
    pub gamma: f64,
}

/// Solver stand-in. Optionally rejects every parameter set.
#[derive(Default)]
pub struct RecordingSolver {
    pub reject_with: Option<String>,
    pub trained: RefCell<Vec<Seen>>,
}

impl RecordingSolver {
    pub fn rejecting(msg: &str) -> Self {
        Self {
            reject_with: Some(msg.to_string()),
            ..Self::default()
        }
    }
}

struct NullModel;

impl FittedModel for NullModel {
    fn save(&self, _: &Path) -> io::Result<()> {
        Ok(())
    }
}

impl Solver for RecordingSolver {
    fn check_parameter(&self, problem: &Problem, param: &SvmParameter) -> Option<String> {
        match &self.reject_with {
            Some(msg) => Some(msg.clone()),
            None => param.check(problem).err().map(str::to_owned),
        }
    }

    fn train(&self, problem: &Problem, param: &SvmParameter) -> PluginResult<Box<dyn FittedModel>> {
        self.trained.borrow_mut().push(Seen {
            count: problem.count(),
            labels: problem.labels().to_vec(),
            gamma: param.gamma,
        });
        Ok(Box::new(NullModel))
    }
}

pub fn args(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

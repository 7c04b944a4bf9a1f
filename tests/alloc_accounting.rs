//! Allocation accounting: exact sizing, clean release and rollback when an
//! allocation fails part-way through a conversion.

mod common;

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::mem::size_of;
use std::ptr;

use stata_svm::api::{CommandRegistry, PluginContext};
use stata_svm::common::config::PluginCfg;
use stata_svm::common::log::Diagnostics;
use stata_svm::problem::{convert, Problem, SparseRow, SvmNode};
use stata_svm::{PluginCode, PluginError};

use common::{args, table, RecordingSolver};

/// Per-thread live byte count with one-shot failure injection.
struct Accounting;

thread_local! {
    static LIVE: Cell<isize> = const { Cell::new(0) };
    static FAIL_IN: Cell<Option<usize>> = const { Cell::new(None) };
}

fn track(delta: isize) {
    let _ = LIVE.try_with(|live| live.set(live.get() + delta));
}

fn should_fail() -> bool {
    FAIL_IN
        .try_with(|slot| match slot.get() {
            Some(0) => {
                slot.set(None);
                true
            }
            Some(n) => {
                slot.set(Some(n - 1));
                false
            }
            None => false,
        })
        .unwrap_or(false)
}

unsafe impl GlobalAlloc for Accounting {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if should_fail() {
            return ptr::null_mut();
        }
        let p = System.alloc(layout);
        if !p.is_null() {
            track(layout.size() as isize);
        }
        p
    }

    unsafe fn dealloc(&self, p: *mut u8, layout: Layout) {
        System.dealloc(p, layout);
        track(-(layout.size() as isize));
    }

    unsafe fn realloc(&self, p: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if should_fail() {
            return ptr::null_mut();
        }
        let q = System.realloc(p, layout, new_size);
        if !q.is_null() {
            track(new_size as isize - layout.size() as isize);
        }
        q
    }
}

#[global_allocator]
static GLOBAL: Accounting = Accounting;

fn live() -> isize {
    LIVE.with(Cell::get)
}

/// Fail the allocation after `n` successful ones on this thread.
fn fail_after(n: usize) {
    FAIL_IN.with(|slot| slot.set(Some(n)));
}

fn disarm() {
    FAIL_IN.with(|slot| slot.set(None));
}

#[test]
fn converted_problem_holds_no_slack() {
    let source = table(37, 3).select_where(|i| i % 3 != 0);
    let before = live();

    let problem = convert(&source).unwrap();
    let n = problem.count();
    let nvars = 4;
    let expected = size_of::<Problem>()
        + n * size_of::<f64>()
        + n * size_of::<SparseRow>()
        + n * nvars * size_of::<SvmNode>();
    assert_eq!(n, 25);
    assert_eq!(live() - before, expected as isize);

    problem.release();
    assert_eq!(live(), before);
}

#[test]
fn empty_problem_is_only_the_record() {
    let source = table(5, 2).select_where(|_| false);
    let before = live();
    let problem = convert(&source).unwrap();
    assert_eq!(live() - before, size_of::<Problem>() as isize);
    problem.release();
    assert_eq!(live(), before);
}

#[test]
fn every_failed_allocation_is_rolled_back() {
    let source = table(9, 2).select_where(|i| i != 4);
    let mut failures = 0;

    for n in 0.. {
        let before = live();
        fail_after(n);
        let outcome = convert(&source).map(|problem| problem.count());
        disarm();

        assert_eq!(live(), before, "allocation {n} leaked");
        match outcome {
            Ok(count) => {
                assert_eq!(count, 8);
                break;
            }
            Err(err) => {
                assert!(matches!(err, PluginError::Allocation { .. }), "{err}");
                failures += 1;
            }
        }
    }
    assert!(failures > 8);
}

#[derive(Default)]
struct CountingSink {
    errors: Cell<usize>,
}

impl Diagnostics for CountingSink {
    fn display(&self, _: &str) {}

    fn error(&self, _: &str) {
        self.errors.set(self.errors.get() + 1);
    }
}

#[test]
fn failed_train_reports_once_and_leaves_nothing_behind() {
    let source = table(9, 3);
    let sink = CountingSink::default();
    let solver = RecordingSolver::default();
    let ctx = PluginContext::new(&source, &sink, &solver, PluginCfg::default());
    let registry = CommandRegistry::with_defaults();
    let argv = args(&["train"]);

    let before = live();
    // labels, rows, first row, two growths, then the second row fails
    fail_after(5);
    let code = registry.dispatch(&ctx, &argv);
    disarm();

    assert_eq!(code, PluginCode::OutOfMemory as u32);
    assert_eq!(sink.errors.get(), 1);
    assert!(solver.trained.borrow().is_empty());
    assert_eq!(live(), before);
}

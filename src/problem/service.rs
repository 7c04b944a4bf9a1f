//! Conversion of a filtered host dataset into a sparse [`Problem`].

use crate::common::error::{PluginError, PluginResult};
use crate::data::domain::TabularSource;

use super::domain::{Problem, SparseRow};
use super::growable::{try_box, GrowableArray};

/// Stream the accepted observations of `source` into a new problem.
///
/// Observations are visited in ascending order inside `source.bounds()`; the
/// predicate is asked exactly once for each of them and never for anything
/// outside the window. Column `0` becomes the label, the remaining columns the
/// row. Labels and rows grow together and are trimmed to the accepted count
/// before hand-off.
///
/// On error nothing escapes: the partially filled arrays and every completed
/// row are dropped on the way out.
pub fn convert<S>(source: &S) -> PluginResult<Box<Problem>>
where
    S: TabularSource + ?Sized,
{
    let nvars = source.nvars();
    if nvars == 0 {
        return Err(PluginError::InvalidInput("no outcome variable"));
    }

    let bounds = source.bounds();
    let mut labels = GrowableArray::try_new("labels")?;
    let mut rows = GrowableArray::try_new("rows")?;

    for observation in bounds.iter() {
        if !source.accepts(observation) {
            continue;
        }
        labels.ensure_spare()?;
        rows.ensure_spare()?;

        let label = source.value_at(0, observation)?;
        let row = SparseRow::from_observation(source, observation, nvars)?;
        labels.append(label)?;
        rows.append(row)?;
    }

    labels.shrink_to_fit()?;
    rows.shrink_to_fit()?;
    log::debug!(
        "accepted {} of {} observations in [{}, {}] with {} features",
        labels.len(),
        bounds.len(),
        bounds.first,
        bounds.last,
        nvars - 1
    );

    let problem = Problem::from_parts(labels.into_boxed_slice()?, rows.into_boxed_slice()?);
    try_box(problem, "problem record")
}

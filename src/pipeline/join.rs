//! Exact-timestamp join of several metric series belonging to one entity.
//!
//! The join key is the timestamp value, never the row position, so shuffled
//! inputs produce the same table. Output rows are sorted by time and every
//! key appears exactly once.

use polars::prelude::*;

use crate::pipeline::{load::RawSeries, table::Table};
use crate::utils::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinMode {
    /// Union of timestamps; cells missing in a source stay null.
    Outer,
    /// Only timestamps present in every source.
    Inner,
}

impl JoinMode {
    fn args(self) -> JoinArgs {
        match self {
            JoinMode::Outer => {
                JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns)
            }
            JoinMode::Inner => JoinArgs::new(JoinType::Inner),
        }
    }
}

/// Joins `(metric, series)` pairs. Each value column is named
/// `<value header>_<metric>`, in input order after the time column.
pub fn join(inputs: &[(&str, &RawSeries)], mode: JoinMode, time_name: &str) -> Result<Table> {
    let mut frames = inputs
        .iter()
        .map(|(metric, series)| unique_rows(series, metric, time_name))
        .collect::<Result<Vec<_>>>()?
        .into_iter();

    let Some(first) = frames.next() else {
        return Ok(Table::new(time_name, Vec::new()));
    };
    let key = [col(time_name)];
    let frame = frames
        .fold(first, |joined, next| joined.join(next, key.clone(), key.clone(), mode.args()))
        .sort([time_name], SortMultipleOptions::default())
        .collect()?;
    Ok(Table::from_frame(time_name, frame))
}

/// One row per timestamp. Duplicate timestamps keep the largest value, which
/// does not depend on row order.
fn unique_rows(series: &RawSeries, metric: &str, time_name: &str) -> Result<LazyFrame> {
    let value = format!("{}_{}", series.value_name, metric);
    let times: Vec<f64> = series.times.iter().map(|t| t + 0.0).collect();
    let frame = DataFrame::new(vec![
        Column::new(time_name.into(), times),
        Column::new(value.as_str().into(), &series.values),
    ])?;
    Ok(frame
        .lazy()
        .group_by([col(time_name)])
        .agg([col(value.as_str()).max()]))
}

//! Fixed-width (one time unit) bucketing.
//!
//! Bucket key is `trunc(t)`: truncation toward zero, left-closed buckets.
//! Only buckets that received at least one sample are emitted; the output is
//! never densified.

use std::collections::BTreeSet;

use polars::prelude::*;

use crate::pipeline::{
    load::{ListSeries, RawSeries},
    table::Table,
};
use crate::utils::error::Result;

pub const MEAN_COLUMN: &str = "Mean";
pub const ERROR_COLUMN: &str = "Error";
pub const COUNT_COLUMN: &str = "Count";

const KEY: &str = "Bucket";
const VALUE: &str = "Value";
const STD: &str = "Std";
const ITEM: &str = "Item";

/// Aggregate of one bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    pub key: i64,
    pub mean: f64,
    /// Standard error of the mean; NaN when the bucket holds a single sample.
    pub error: f64,
    pub count: usize,
}

/// Same truncation as the `Int64` cast used by the group-by.
#[inline]
pub fn bucket_key(t: f64) -> i64 {
    t.trunc() as i64
}

/// Groups samples by bucket key and computes mean and standard error.
///
/// Rows are sorted by `(time, value)` before grouping so the accumulation
/// order (and therefore the floating-point result) does not depend on row order.
pub fn bucket_series(series: &RawSeries) -> Result<Vec<Bucket>> {
    let frame = DataFrame::new(vec![
        Column::new(KEY.into(), &series.times),
        Column::new(VALUE.into(), &series.values),
    ])?
    .lazy()
    .sort([KEY, VALUE], SortMultipleOptions::default())
    .group_by_stable([col(KEY).cast(DataType::Int64)])
    .agg([
        col(VALUE).mean().alias(MEAN_COLUMN),
        col(VALUE).std(1).alias(STD),
        len().cast(DataType::Float64).alias(COUNT_COLUMN),
    ])
    .sort([KEY], SortMultipleOptions::default())
    .collect()?;

    let keys = frame.column(KEY)?.i64()?;
    let means = frame.column(MEAN_COLUMN)?.f64()?;
    let stds = frame.column(STD)?.f64()?;
    let counts = frame.column(COUNT_COLUMN)?.f64()?;

    Ok((0..frame.height())
        .filter_map(|i| {
            let count = counts.get(i)? as usize;
            Some(Bucket {
                key: keys.get(i)?,
                mean: means.get(i).unwrap_or(f64::NAN),
                error: standard_error(stds.get(i), count),
                count,
            })
        })
        .collect())
}

fn standard_error(std: Option<f64>, count: usize) -> f64 {
    match std {
        Some(std) if count > 1 => std / (count as f64).sqrt(),
        _ => f64::NAN,
    }
}

/// [`bucket_series`] as a table with `Mean`, `Error` and `Count` columns.
pub fn bucket_table(series: &RawSeries, time_name: &str) -> Result<Table> {
    let buckets = bucket_series(series)?;
    let mut table = Table::new(time_name, buckets.iter().map(|b| b.key as f64).collect());
    table.push_numeric(MEAN_COLUMN, buckets.iter().map(|b| Some(b.mean)).collect())?;
    table.push_numeric(ERROR_COLUMN, buckets.iter().map(|b| Some(b.error)).collect())?;
    table.push_numeric(
        COUNT_COLUMN,
        buckets.iter().map(|b| Some(b.count as f64)).collect(),
    )?;
    Ok(table)
}

/// Per bucket, how often each list item occurred. One column per distinct
/// item (sorted by name); an item missing from a present bucket counts 0.
pub fn bucket_counts(series: &ListSeries, time_name: &str) -> Result<Table> {
    let names: BTreeSet<&str> = series.items.iter().flatten().map(String::as_str).collect();

    // Long form: one row per item occurrence; an empty list still marks its bucket.
    let mut keys = Vec::new();
    let mut items: Vec<Option<&str>> = Vec::new();
    for (t, row) in series.times.iter().zip(&series.items) {
        if row.is_empty() {
            keys.push(*t);
            items.push(None);
        }
        for item in row {
            keys.push(*t);
            items.push(Some(item.as_str()));
        }
    }

    let counts: Vec<Expr> = names
        .iter()
        .map(|name| {
            col(ITEM)
                .eq(lit(*name))
                .cast(DataType::Float64)
                .sum()
                .alias(*name)
        })
        .collect();

    let frame = DataFrame::new(vec![
        Column::new(KEY.into(), keys),
        Column::new(ITEM.into(), items),
    ])?
    .lazy()
    .group_by([col(KEY).cast(DataType::Int64).alias(time_name)])
    .agg(counts)
    .sort([time_name], SortMultipleOptions::default())
    .with_column(col(time_name).cast(DataType::Float64))
    .collect()?;
    Ok(Table::from_frame(time_name, frame))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(rows: &[(f64, f64)]) -> RawSeries {
        RawSeries {
            value_name: "ResponseTimes".into(),
            times: rows.iter().map(|r| r.0).collect(),
            values: rows.iter().map(|r| r.1).collect(),
            labels: None,
        }
    }

    #[test]
    fn response_time_scenario() {
        let buckets = bucket_series(&series(&[(0.2, 5.0), (0.7, 7.0), (1.1, 9.0)])).unwrap();

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].key, 0);
        assert_eq!(buckets[0].count, 2);
        assert!((buckets[0].mean - 6.0).abs() < 1e-12);
        assert!((buckets[0].error - 1.0).abs() < 1e-12);

        assert_eq!(buckets[1].key, 1);
        assert_eq!(buckets[1].count, 1);
        assert_eq!(buckets[1].mean, 9.0);
        assert!(buckets[1].error.is_nan());
    }

    #[test]
    fn gaps_are_not_densified() {
        let buckets = bucket_series(&series(&[(0.5, 1.0), (7.9, 2.0)])).unwrap();
        let keys: Vec<i64> = buckets.iter().map(|b| b.key).collect();
        assert_eq!(keys, vec![0, 7]);
    }

    #[test]
    fn truncates_toward_zero() {
        assert_eq!(bucket_key(1.999), 1);
        assert_eq!(bucket_key(2.0), 2);
        assert_eq!(bucket_key(-0.5), 0);
    }

    #[test]
    fn table_has_mean_error_count() {
        let t = bucket_table(&series(&[(3.1, 2.0), (3.6, 4.0)]), "SimulationTime").unwrap();
        assert_eq!(t.time(), vec![3.0]);
        assert_eq!(t.numeric(MEAN_COLUMN).unwrap(), vec![Some(3.0)]);
        assert_eq!(t.numeric(COUNT_COLUMN).unwrap(), vec![Some(2.0)]);
        assert_eq!(
            t.numeric_names().collect::<Vec<_>>(),
            vec![MEAN_COLUMN, ERROR_COLUMN, COUNT_COLUMN]
        );
    }

    #[test]
    fn counts_list_items_per_bucket() {
        let s = ListSeries {
            value_name: "Load_Distribution".into(),
            times: vec![0.1, 0.9, 2.5],
            items: vec![
                vec!["b".into(), "a".into()],
                vec!["a".into()],
                vec!["b".into(), "b".into()],
            ],
        };

        let t = bucket_counts(&s, "SimulationTime").unwrap();
        assert_eq!(t.time(), vec![0.0, 2.0]);
        assert_eq!(t.numeric("a").unwrap(), vec![Some(2.0), Some(0.0)]);
        assert_eq!(t.numeric("b").unwrap(), vec![Some(1.0), Some(2.0)]);
    }

    #[test]
    fn empty_list_still_marks_its_bucket() {
        let s = ListSeries {
            value_name: "Load_Distribution".into(),
            times: vec![0.5, 1.5],
            items: vec![vec!["a".into()], vec![]],
        };

        let t = bucket_counts(&s, "SimulationTime").unwrap();
        assert_eq!(t.time(), vec![0.0, 1.0]);
        assert_eq!(t.numeric("a").unwrap(), vec![Some(1.0), Some(0.0)]);
    }
}

//! In-memory table shared by every pipeline stage: a polars `DataFrame` with
//! one designated `Float64` time column, rows sorted by time.
//!
//! Cells follow polars semantics: null means "no observation at this
//! timestamp", NaN means an observation whose value is undefined (0/0, a
//! single-sample standard error). The two are never collapsed into zero.

use std::path::PathBuf;

use polars::prelude::*;

use crate::utils::error::Result;

/// Unit handed from aggregation to rendering: built once, drawn once, never mutated in between.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Entity name from the source file; used as chart title.
    pub title: String,
    pub table: Table,
    /// Primary input file; the processed output is named after it.
    pub source: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Table {
    time_name: String,
    frame: DataFrame,
}

impl Table {
    /// A table holding only the time column.
    pub fn new(time_name: &str, time: Vec<f64>) -> Self {
        Self {
            time_name: time_name.to_string(),
            frame: Series::new(time_name.into(), time).into_frame(),
        }
    }

    /// Wraps a frame whose `time_name` column is `Float64` and sorted ascending.
    pub fn from_frame(time_name: &str, frame: DataFrame) -> Self {
        Self {
            time_name: time_name.to_string(),
            frame,
        }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    pub fn time(&self) -> Vec<f64> {
        self.numeric(&self.time_name)
            .map(|t| t.into_iter().flatten().collect())
            .unwrap_or_default()
    }

    /// Appends a numeric column; fails if its length differs from the table's.
    pub fn push_numeric(&mut self, name: &str, values: Vec<Option<f64>>) -> Result<()> {
        self.push(Series::new(name.into(), values))
    }

    pub fn push_text(&mut self, name: &str, values: Vec<Option<String>>) -> Result<()> {
        self.push(Series::new(name.into(), values))
    }

    fn push(&mut self, series: Series) -> Result<()> {
        if series.len() != self.len() {
            let reason = format!(
                "column '{}' has {} rows, table has {}",
                series.name(),
                series.len(),
                self.len()
            );
            return Err(PolarsError::ShapeMismatch(reason.into()).into());
        }
        self.frame.with_column(series)?;
        Ok(())
    }

    pub fn numeric(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let values = self.frame.column(name).ok()?.f64().ok()?;
        Some(values.into_iter().collect())
    }

    pub fn text(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let values = self.frame.column(name).ok()?.str().ok()?;
        Some(values.into_iter().collect())
    }

    /// Value columns of float type, in frame order; the time column is excluded.
    pub fn numeric_names(&self) -> impl Iterator<Item = &str> {
        self.value_columns()
            .filter(|c| c.dtype().is_float())
            .map(|c| c.name().as_str())
    }

    pub fn text_names(&self) -> impl Iterator<Item = &str> {
        self.value_columns()
            .filter(|c| c.dtype() == &DataType::String)
            .map(|c| c.name().as_str())
    }

    fn value_columns(&self) -> impl Iterator<Item = &Column> {
        self.frame
            .get_columns()
            .iter()
            .filter(move |c| c.name().as_str() != self.time_name)
    }

    /// `(time, value)` pairs of a numeric column, skipping absent and NaN cells.
    pub fn points(&self, name: &str) -> Vec<(f64, f64)> {
        self.numeric(name)
            .map(|values| {
                self.time()
                    .into_iter()
                    .zip(values)
                    .filter_map(|(t, v)| match v {
                        Some(v) if v.is_finite() => Some((t, v)),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Largest finite value over all numeric columns.
    pub fn finite_max(&self) -> Option<f64> {
        self.numeric_names()
            .filter_map(|name| self.numeric(name))
            .flatten()
            .filter_map(|v| v.filter(|x| x.is_finite()))
            .fold(None, |acc: Option<f64>, x| Some(acc.map_or(x, |a| a.max(x))))
    }

    /// First and last timestamp; rows are kept sorted by every producer.
    pub fn time_span(&self) -> Option<(f64, f64)> {
        let time = self.time();
        Some((*time.first()?, *time.last()?))
    }
}

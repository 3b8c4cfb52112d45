//! User-request response times, aggregated into one-unit buckets.
//!
//! Each bucket shows its mean as a line and `mean ± standard error` as an
//! error bar. Single-sample buckets have no error bar.

use crate::pipeline::{
    bucket::{ERROR_COLUMN, MEAN_COLUMN, bucket_table},
    discovery::{DiscoveredFile, metric_pattern},
    load::load_series,
    table::{Dataset, Table},
};
use crate::render::{DrawDataset, Panel, marks};
use crate::reports::{Report, dataset};
use crate::utils::{config::ColumnSchema, error::Result};

pub struct ResponseTimeReport;

impl Report for ResponseTimeReport {
    fn name(&self) -> &'static str {
        "response-times"
    }

    fn title(&self) -> &'static str {
        "Response times"
    }

    fn pattern(&self) -> String {
        metric_pattern("R", "ResponseTimes")
    }

    fn build(&self, file: &DiscoveredFile, schema: &ColumnSchema) -> Result<Dataset> {
        let series = load_series(&file.path, schema)?;
        Ok(dataset(file, bucket_table(&series, schema.time_column)?))
    }
}

/// `(bucket, mean, error)` for every bucket with a finite mean.
fn bucket_rows(table: &Table) -> Vec<(f64, f64, f64)> {
    let (Some(means), Some(errors)) = (table.numeric(MEAN_COLUMN), table.numeric(ERROR_COLUMN))
    else {
        return Vec::new();
    };
    table
        .time()
        .into_iter()
        .zip(means.into_iter().zip(errors))
        .filter_map(|(t, (m, e))| {
            let m = m.filter(|m| m.is_finite())?;
            Some((t, m, e.unwrap_or(f64::NAN)))
        })
        .collect()
}

impl DrawDataset for ResponseTimeReport {
    /// Top of the highest error bar, or the highest mean where no bar exists.
    fn y_max(&self, _panel: usize, table: &Table) -> Option<f64> {
        bucket_rows(table)
            .into_iter()
            .map(|(_, m, e)| if e.is_finite() { m + e } else { m })
            .reduce(f64::max)
    }

    fn draw<'a, 'b: 'a>(&self, panels: &mut [Panel<'a, 'b>], table: &Table) -> Result<()> {
        let Some(panel) = panels.first_mut() else {
            return Ok(());
        };
        let rows = bucket_rows(table);
        let means: Vec<(f64, f64)> = rows.iter().map(|(t, m, _)| (*t, *m)).collect();

        marks::line(panel, &means, marks::color(0), "Mean response time")?;
        marks::error_bars(panel, &rows, marks::color(0))?;
        marks::legend(panel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn buckets_samples_per_time_unit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("R[checkout]_ResponseTimes.csv");
        fs::write(&path, "SimulationTime;ResponseTimes\n1.1;9\n0.7;7\n0.2;5\n").unwrap();

        let file = DiscoveredFile {
            path,
            entity: "checkout".into(),
        };
        let ds = ResponseTimeReport.build(&file, &ColumnSchema::CURRENT).unwrap();

        assert_eq!(ds.table.time(), vec![0.0, 1.0]);
        let rows = bucket_rows(&ds.table);
        assert_eq!(rows[0].1, 6.0);
        assert!((rows[0].2 - 1.0).abs() < 1e-12);
        assert!(rows[1].2.is_nan());

        // Bucket 0 reaches 6 + 1; bucket 1 has no bar and tops out at its mean.
        assert_eq!(ResponseTimeReport.y_max(0, &ds.table), Some(9.0));
    }
}

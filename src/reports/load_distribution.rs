//! How a service spreads its requests over instances.
//!
//! Cells are instance lists such as `[inst-1, inst-2, inst-1]`, one entry per
//! handled request. Per one-unit bucket every instance's share is counted and
//! drawn as stacked bars.

use crate::pipeline::{
    bucket::bucket_counts,
    discovery::{DiscoveredFile, metric_pattern},
    load::load_list_series,
    table::{Dataset, Table},
};
use crate::render::{DrawDataset, Panel, marks};
use crate::reports::{Report, dataset};
use crate::utils::{config::ColumnSchema, error::Result};

pub struct LoadDistributionReport;

impl Report for LoadDistributionReport {
    fn name(&self) -> &'static str {
        "load-distribution"
    }

    fn title(&self) -> &'static str {
        "Load distribution"
    }

    fn pattern(&self) -> String {
        metric_pattern("S", "Load_Distribution")
    }

    fn build(&self, file: &DiscoveredFile, schema: &ColumnSchema) -> Result<Dataset> {
        let series = load_list_series(&file.path, schema)?;
        Ok(dataset(file, bucket_counts(&series, schema.time_column)?))
    }
}

impl DrawDataset for LoadDistributionReport {
    /// Height of the tallest stack.
    fn y_max(&self, _panel: usize, table: &Table) -> Option<f64> {
        let mut totals = vec![0.0; table.len()];
        for (_, heights) in layers(table) {
            for (total, h) in totals.iter_mut().zip(heights) {
                *total += h.filter(|h| h.is_finite()).unwrap_or(0.0);
            }
        }
        totals.into_iter().reduce(f64::max)
    }

    fn draw<'a, 'b: 'a>(&self, panels: &mut [Panel<'a, 'b>], table: &Table) -> Result<()> {
        let Some(panel) = panels.first_mut() else {
            return Ok(());
        };
        let layers = layers(table);
        let stacks: Vec<(&str, &[Option<f64>])> = layers
            .iter()
            .map(|(name, heights)| (*name, heights.as_slice()))
            .collect();
        marks::stacked_bars(panel, &table.time(), &stacks)?;
        marks::legend(panel)
    }
}

/// One `(instance, count per bucket)` layer per numeric column, in column order.
fn layers(table: &Table) -> Vec<(&str, Vec<Option<f64>>)> {
    table
        .numeric_names()
        .filter_map(|name| Some((name, table.numeric(name)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn counts_instances_per_bucket() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("S[cart]_Load_Distribution.csv");
        fs::write(
            &path,
            "SimulationTime;Load_Distribution\n0.5;[b, a, a]\n0.9;[a]\n2.1;[b]\n",
        )
        .unwrap();

        let file = DiscoveredFile {
            path,
            entity: "cart".into(),
        };
        let ds = LoadDistributionReport.build(&file, &ColumnSchema::CURRENT).unwrap();

        assert_eq!(ds.table.time(), vec![0.0, 2.0]);
        assert_eq!(ds.table.numeric("a").unwrap(), vec![Some(3.0), Some(0.0)]);
        assert_eq!(ds.table.numeric("b").unwrap(), vec![Some(1.0), Some(1.0)]);
        assert_eq!(LoadDistributionReport.y_max(0, &ds.table), Some(4.0));
    }
}

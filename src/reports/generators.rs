//! Load-generator outcome: successful vs. failed requests and the success rate.
//!
//! Both counters are reported at the same instants, so the join is inner.
//! `SuccessRate = ok / (ok + failed)`; instants with no requests at all are
//! NaN in the table and left out of the scatter and the trend fit.

use crate::pipeline::{
    discovery::{DiscoveredFile, metric_pattern, require_companion},
    join::{JoinMode, join},
    load::load_series,
    ratio::{finite_points, linear_trend, ratio_column},
    table::{Dataset, Table},
};
use crate::render::{DrawDataset, Panel, marks};
use crate::reports::{Report, dataset, max_of, metric_column};
use crate::utils::{config::ColumnSchema, error::Result};

const SUCCESSFUL: &str = "SuccessfulRequests";
const FAILED: &str = "FailedRequests";
pub const SUCCESS_RATE: &str = "SuccessRate";

pub struct GeneratorReport;

impl Report for GeneratorReport {
    fn name(&self) -> &'static str {
        "generators"
    }

    fn title(&self) -> &'static str {
        "Generator success rate"
    }

    fn pattern(&self) -> String {
        metric_pattern("G", SUCCESSFUL)
    }

    fn build(&self, file: &DiscoveredFile, schema: &ColumnSchema) -> Result<Dataset> {
        let failed_path = require_companion(
            &file.path,
            &format!("_{SUCCESSFUL}.csv"),
            &format!("_{FAILED}.csv"),
        )?;
        let successful = load_series(&file.path, schema)?;
        let failed = load_series(&failed_path, schema)?;

        let mut table = join(
            &[(SUCCESSFUL, &successful), (FAILED, &failed)],
            JoinMode::Inner,
            schema.time_column,
        )?;
        let ok_col = format!("{}_{SUCCESSFUL}", successful.value_name);
        let failed_col = format!("{}_{FAILED}", failed.value_name);
        ratio_column(&mut table, &ok_col, &failed_col, SUCCESS_RATE)?;
        Ok(dataset(file, table))
    }
}

impl DrawDataset for GeneratorReport {
    fn panels(&self) -> usize {
        2
    }

    fn y_max(&self, panel: usize, table: &Table) -> Option<f64> {
        match panel {
            0 => max_of(
                table,
                &[metric_column(table, SUCCESSFUL), metric_column(table, FAILED)],
            ),
            _ => Some(1.0),
        }
    }

    fn draw<'a, 'b: 'a>(&self, panels: &mut [Panel<'a, 'b>], table: &Table) -> Result<()> {
        let [counts, rate] = panels else {
            return Ok(());
        };

        for (i, metric) in [SUCCESSFUL, FAILED].into_iter().enumerate() {
            if let Some(col) = metric_column(table, metric) {
                marks::step(counts, &table.points(col), marks::color(i + 2), metric)?;
            }
        }
        marks::legend(counts)?;

        let points = finite_points(table, SUCCESS_RATE);
        marks::scatter(rate, &points, marks::color(0), SUCCESS_RATE)?;
        if let Some(trend) = linear_trend(&points) {
            let (first, last) = (points[0].0, points[points.len() - 1].0);
            let line = [(first, trend.at(first)), (last, trend.at(last))];
            marks::line(rate, &line, marks::color(3), "Trend")?;
        }
        marks::legend(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn success_rate_over_inner_join() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("G[gen-1]_SuccessfulRequests.csv"),
            "SimulationTime;Count\n0;10\n1;10\n2;0\n3;4\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("G[gen-1]_FailedRequests.csv"),
            "SimulationTime;Count\n0;5\n1;0\n2;0\n",
        )
        .unwrap();

        let file = DiscoveredFile {
            path: dir.path().join("G[gen-1]_SuccessfulRequests.csv"),
            entity: "gen-1".into(),
        };
        let ds = GeneratorReport.build(&file, &ColumnSchema::CURRENT).unwrap();

        // t=3 has no failure sample and is dropped by the inner join.
        assert_eq!(ds.table.time(), vec![0.0, 1.0, 2.0]);
        let rate = ds.table.numeric(SUCCESS_RATE).unwrap();
        assert!((rate[0].unwrap() - 10.0 / 15.0).abs() < 1e-12);
        assert_eq!(rate[1], Some(1.0));
        assert!(rate[2].unwrap().is_nan());

        let fit = finite_points(&ds.table, SUCCESS_RATE);
        assert_eq!(fit.len(), 2);
        assert_eq!(GeneratorReport.y_max(1, &ds.table), Some(1.0));
    }
}

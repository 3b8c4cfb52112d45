//! CPU utilization: absolute and relative work demand per CPU, outer-joined.

use crate::pipeline::{
    discovery::{DiscoveredFile, metric_pattern, require_companion},
    join::{JoinMode, join},
    load::load_series,
    table::{Dataset, Table},
};
use crate::render::{DrawDataset, Panel, marks};
use crate::reports::{Report, dataset, max_of, metric_column};
use crate::utils::{config::ColumnSchema, error::Result};

const UTILIZATION: &str = "Utilization";
const RELATIVE: &str = "RelativeUtilization";

pub struct UtilizationReport;

impl Report for UtilizationReport {
    fn name(&self) -> &'static str {
        "utilization"
    }

    fn title(&self) -> &'static str {
        "CPU utilization"
    }

    fn pattern(&self) -> String {
        metric_pattern("C", UTILIZATION)
    }

    fn build(&self, file: &DiscoveredFile, schema: &ColumnSchema) -> Result<Dataset> {
        let relative_path = require_companion(
            &file.path,
            &format!("_{UTILIZATION}.csv"),
            &format!("_{RELATIVE}.csv"),
        )?;
        let utilization = load_series(&file.path, schema)?;
        let relative = load_series(&relative_path, schema)?;

        let table = join(
            &[(UTILIZATION, &utilization), (RELATIVE, &relative)],
            JoinMode::Outer,
            schema.time_column,
        )?;
        Ok(dataset(file, table))
    }
}

impl DrawDataset for UtilizationReport {
    /// Utilization is a fraction; keep the full `0..1` band visible.
    fn y_max(&self, _panel: usize, table: &Table) -> Option<f64> {
        let top = max_of(
            table,
            &[metric_column(table, UTILIZATION), metric_column(table, RELATIVE)],
        );
        Some(top.map_or(1.0, |m| m.max(1.0)))
    }

    fn draw<'a, 'b: 'a>(&self, panels: &mut [Panel<'a, 'b>], table: &Table) -> Result<()> {
        let Some(panel) = panels.first_mut() else {
            return Ok(());
        };
        for (i, metric) in [UTILIZATION, RELATIVE].into_iter().enumerate() {
            if let Some(col) = metric_column(table, metric) {
                marks::step(panel, &table.points(col), marks::color(i), metric)?;
            }
        }
        marks::legend(panel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn y_axis_covers_full_fraction() {
        let mut t = Table::new("SimulationTime", vec![0.0, 1.0]);
        t.push_numeric("Value_Utilization", vec![Some(0.2), Some(0.4)]).unwrap();
        t.push_numeric("Value_RelativeUtilization", vec![None, Some(1.3)]).unwrap();
        assert_eq!(UtilizationReport.y_max(0, &t), Some(1.3));

        let mut low = Table::new("SimulationTime", vec![0.0]);
        low.push_numeric("Value_Utilization", vec![Some(0.2)]).unwrap();
        assert_eq!(UtilizationReport.y_max(0, &low), Some(1.0));
    }
}

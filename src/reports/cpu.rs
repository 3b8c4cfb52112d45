//! CPU usage per service instance.
//!
//! `C[<cpu>]_Usage.csv` plus its `_ActiveProcesses` and `_TotalProcesses`
//! companions, outer-joined on the exact timestamp. Left panel: usage.
//! Right panel: active vs. total process count.

use crate::pipeline::{
    discovery::{DiscoveredFile, metric_pattern, require_companion},
    join::{JoinMode, join},
    load::load_series,
    table::{Dataset, Table},
};
use crate::render::{DrawDataset, Panel, marks};
use crate::reports::{Report, dataset, max_of, metric_column};
use crate::utils::{config::ColumnSchema, error::Result};

const USAGE: &str = "Usage";
const ACTIVE: &str = "ActiveProcesses";
const TOTAL: &str = "TotalProcesses";

pub struct CpuReport;

impl Report for CpuReport {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn title(&self) -> &'static str {
        "CPU usage"
    }

    fn pattern(&self) -> String {
        metric_pattern("C", USAGE)
    }

    fn build(&self, file: &DiscoveredFile, schema: &ColumnSchema) -> Result<Dataset> {
        let primary = format!("_{USAGE}.csv");
        let active_path = require_companion(&file.path, &primary, &format!("_{ACTIVE}.csv"))?;
        let total_path = require_companion(&file.path, &primary, &format!("_{TOTAL}.csv"))?;

        let usage = load_series(&file.path, schema)?;
        let active = load_series(&active_path, schema)?;
        let total = load_series(&total_path, schema)?;

        let table = join(
            &[(USAGE, &usage), (ACTIVE, &active), (TOTAL, &total)],
            JoinMode::Outer,
            schema.time_column,
        )?;
        Ok(dataset(file, table))
    }
}

impl DrawDataset for CpuReport {
    fn panels(&self) -> usize {
        2
    }

    fn y_max(&self, panel: usize, table: &Table) -> Option<f64> {
        match panel {
            0 => max_of(table, &[metric_column(table, USAGE)]),
            _ => max_of(
                table,
                &[metric_column(table, ACTIVE), metric_column(table, TOTAL)],
            ),
        }
    }

    fn draw<'a, 'b: 'a>(&self, panels: &mut [Panel<'a, 'b>], table: &Table) -> Result<()> {
        let [usage_panel, process_panel] = panels else {
            return Ok(());
        };

        if let Some(col) = metric_column(table, USAGE) {
            marks::step(usage_panel, &table.points(col), marks::color(0), USAGE)?;
        }
        marks::legend(usage_panel)?;

        for (i, metric) in [ACTIVE, TOTAL].into_iter().enumerate() {
            if let Some(col) = metric_column(table, metric) {
                marks::step(process_panel, &table.points(col), marks::color(i + 1), metric)?;
            }
        }
        marks::legend(process_panel)
    }
}

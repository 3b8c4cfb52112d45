//! Generated load: requests emitted per generator over time, drawn as stems.

use crate::pipeline::{
    discovery::{DiscoveredFile, metric_pattern},
    load::load_series,
    table::{Dataset, Table},
};
use crate::render::{DrawDataset, Panel, marks};
use crate::reports::{Report, dataset, value_column};
use crate::utils::{config::ColumnSchema, error::Result};

pub struct LoadReport;

impl Report for LoadReport {
    fn name(&self) -> &'static str {
        "load"
    }

    fn title(&self) -> &'static str {
        "Generator load"
    }

    fn pattern(&self) -> String {
        metric_pattern("G", "Load")
    }

    fn build(&self, file: &DiscoveredFile, schema: &ColumnSchema) -> Result<Dataset> {
        let series = load_series(&file.path, schema)?;
        Ok(dataset(file, series.into_table(schema.time_column)?))
    }
}

impl DrawDataset for LoadReport {
    fn draw<'a, 'b: 'a>(&self, panels: &mut [Panel<'a, 'b>], table: &Table) -> Result<()> {
        let (Some(panel), Some(col)) = (panels.first_mut(), value_column(table)) else {
            return Ok(());
        };
        marks::stems(panel, &table.points(col), marks::color(0), "Load")
    }
}

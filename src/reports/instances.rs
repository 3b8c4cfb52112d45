//! Running instance count per microservice, drawn as a step line.

use crate::pipeline::{
    discovery::{DiscoveredFile, metric_pattern},
    load::load_series,
    table::{Dataset, Table},
};
use crate::render::{DrawDataset, Panel, marks};
use crate::reports::{Report, dataset, value_column};
use crate::utils::{config::ColumnSchema, error::Result};

pub struct InstanceReport;

impl Report for InstanceReport {
    fn name(&self) -> &'static str {
        "instances"
    }

    fn title(&self) -> &'static str {
        "Instance count"
    }

    fn pattern(&self) -> String {
        metric_pattern("S", "InstanceCount")
    }

    fn build(&self, file: &DiscoveredFile, schema: &ColumnSchema) -> Result<Dataset> {
        let series = load_series(&file.path, schema)?;
        Ok(dataset(file, series.into_table(schema.time_column)?))
    }
}

impl DrawDataset for InstanceReport {
    fn draw<'a, 'b: 'a>(&self, panels: &mut [Panel<'a, 'b>], table: &Table) -> Result<()> {
        let (Some(panel), Some(col)) = (panels.first_mut(), value_column(table)) else {
            return Ok(());
        };
        marks::step(panel, &table.points(col), marks::color(2), "Instances")
    }
}

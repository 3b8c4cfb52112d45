//! Requests currently in the system, with an optional queue-state column.
//!
//! The count is drawn as a step line; when the source carries a third,
//! categorical column, each state gets its own marker colour on top.

use std::collections::BTreeMap;

use crate::pipeline::{
    discovery::{DiscoveredFile, metric_pattern},
    load::load_series,
    table::{Dataset, Table},
};
use crate::render::{DrawDataset, Panel, marks};
use crate::reports::{Report, dataset, value_column};
use crate::utils::{config::ColumnSchema, error::Result};

pub struct InSystemReport;

impl Report for InSystemReport {
    fn name(&self) -> &'static str {
        "in-system"
    }

    fn title(&self) -> &'static str {
        "Requests in system"
    }

    fn pattern(&self) -> String {
        metric_pattern("R", "InSystem")
    }

    fn build(&self, file: &DiscoveredFile, schema: &ColumnSchema) -> Result<Dataset> {
        let series = load_series(&file.path, schema)?;
        Ok(dataset(file, series.into_table(schema.time_column)?))
    }
}

/// Finite `(time, value)` points grouped by state label, labels sorted.
fn points_by_state<'t>(table: &'t Table, value: &str) -> BTreeMap<&'t str, Vec<(f64, f64)>> {
    let mut groups: BTreeMap<&str, Vec<(f64, f64)>> = BTreeMap::new();
    let (Some(values), Some(states)) = (
        table.numeric(value),
        table.text_names().next().and_then(|name| table.text(name)),
    ) else {
        return groups;
    };

    for ((t, v), state) in table.time().into_iter().zip(values).zip(states) {
        if let (Some(v), Some(state)) = (v.filter(|v| v.is_finite()), state) {
            groups.entry(state).or_default().push((t, v));
        }
    }
    groups
}

impl DrawDataset for InSystemReport {
    fn draw<'a, 'b: 'a>(&self, panels: &mut [Panel<'a, 'b>], table: &Table) -> Result<()> {
        let (Some(panel), Some(col)) = (panels.first_mut(), value_column(table)) else {
            return Ok(());
        };
        marks::step(panel, &table.points(col), marks::color(7), "In system")?;

        let groups = points_by_state(table, col);
        for (i, (state, points)) in groups.iter().enumerate() {
            marks::scatter(panel, points, marks::color(i), state)?;
        }
        marks::legend(panel)
    }
}

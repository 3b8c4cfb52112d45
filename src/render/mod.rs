//! Figure rendering: one SVG per report, one row of panels per dataset.
//!
//! The renderer owns everything shared across datasets:
//! - **Layout:** `panels_per_dataset` charts side by side, one row per dataset.
//! - **X axis:** `0..duration`, ticked every `max(1, floor(duration / 10))` units.
//! - **Y axis:** floor-clamped at 0; upper bound from the drawer or the table.
//! - **Title:** the dataset's entity name.
//!
//! What marks end up on a panel is entirely up to the [`DrawDataset`] impl;
//! this module never looks at column names.

pub mod marks;

use std::ops::Range;
use std::path::Path;

use log::info;
use plotters::coord::ranged1d::{KeyPointHint, NoDefaultFormatting, Ranged, ValueFormatter};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

use crate::pipeline::table::{Dataset, Table};
use crate::utils::{
    config::RunMetadata,
    error::{ReportError, Result},
};

/// One drawing surface handed to a [`DrawDataset`]. `'b` is the backend's
/// borrow of the output path and always outlives the chart borrow `'a`.
pub type Panel<'a, 'b> = ChartContext<'a, SVGBackend<'b>, Cartesian2d<TimeAxis, RangedCoordf64>>;

const PANEL_WIDTH: u32 = 640;
const ROW_HEIGHT: u32 = 320;
const TITLE_HEIGHT: u32 = 40;

/// Shared x-axis configuration derived from the run duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisOptions {
    pub duration: f64,
    pub tick_step: f64,
}

impl AxisOptions {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            tick_step: (duration / 10.0).floor().max(1.0),
        }
    }

    pub fn from_metadata(meta: &RunMetadata) -> Self {
        Self::new(meta.duration)
    }

    /// `0, step, 2·step, …` up to and including `duration`.
    pub fn ticks(&self) -> Vec<f64> {
        let count = (self.duration / self.tick_step).floor() as u64;
        (0..=count).map(|i| i as f64 * self.tick_step).collect()
    }
}

/// `0..duration` with mesh lines and labels exactly at [`AxisOptions::ticks`].
#[derive(Clone)]
pub struct TimeAxis {
    range: RangedCoordf64,
    ticks: Vec<f64>,
}

impl TimeAxis {
    pub fn new(axis: &AxisOptions) -> Self {
        Self {
            range: (0.0..axis.duration).into(),
            ticks: axis.ticks(),
        }
    }
}

impl Ranged for TimeAxis {
    type FormatOption = NoDefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.range.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, _hint: Hint) -> Vec<f64> {
        self.ticks.clone()
    }

    fn range(&self) -> Range<f64> {
        self.range.range()
    }
}

impl ValueFormatter<f64> for TimeAxis {
    fn format(value: &f64) -> String {
        format!("{:.0}", value)
    }
}

/// Per-report drawing callback.
pub trait DrawDataset {
    /// Charts per dataset (1 or 2).
    fn panels(&self) -> usize {
        1
    }

    /// Upper y bound for `panel`; `None` uses the table's largest finite value.
    fn y_max(&self, _panel: usize, _table: &Table) -> Option<f64> {
        None
    }

    fn draw<'a, 'b: 'a>(&self, panels: &mut [Panel<'a, 'b>], table: &Table) -> Result<()>;
}

/// Renders all datasets into one SVG figure at `path`.
pub fn render_figure<D: DrawDataset + ?Sized>(
    path: &Path,
    figure_title: &str,
    datasets: &[Dataset],
    axis: &AxisOptions,
    drawer: &D,
) -> Result<()> {
    let cols = drawer.panels().max(1);
    let rows = datasets.len().max(1);
    let size = (
        PANEL_WIDTH * cols as u32,
        ROW_HEIGHT * rows as u32 + TITLE_HEIGHT,
    );

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(ReportError::render)?;
    let body = root
        .titled(figure_title, ("sans-serif", 24))
        .map_err(ReportError::render)?;
    let cells = body.split_evenly((rows, cols));

    let tick_count = axis.ticks().len();
    for (row, dataset) in datasets.iter().enumerate() {
        let mut panels = Vec::with_capacity(cols);
        for (i, area) in cells[row * cols..(row + 1) * cols].iter().enumerate() {
            let top = drawer
                .y_max(i, &dataset.table)
                .or_else(|| dataset.table.finite_max())
                .filter(|m| m.is_finite() && *m > 0.0)
                .unwrap_or(1.0);

            let mut chart = ChartBuilder::on(area)
                .caption(&dataset.title, ("sans-serif", 16))
                .margin(8)
                .x_label_area_size(28)
                .y_label_area_size(48)
                .build_cartesian_2d(TimeAxis::new(axis), 0f64..top * 1.05)
                .map_err(ReportError::render)?;

            chart
                .configure_mesh()
                .x_labels(tick_count)
                .x_desc("Simulation time")
                .draw()
                .map_err(ReportError::render)?;
            panels.push(chart);
        }
        drawer.draw(&mut panels, &dataset.table)?;
    }

    root.present().map_err(ReportError::render)?;
    info!("Figure written to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn tick_step_is_tenth_of_duration() {
        let axis = AxisOptions::new(120.0);
        assert_eq!(axis.tick_step, 12.0);
        assert_eq!(axis.ticks().len(), 11);
        assert_eq!(*axis.ticks().last().unwrap(), 120.0);
    }

    #[test]
    fn tick_step_never_below_one() {
        let axis = AxisOptions::new(5.5);
        assert_eq!(axis.tick_step, 1.0);
        assert_eq!(axis.ticks(), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn ticks_stop_at_duration() {
        let axis = AxisOptions::new(25.0);
        assert_eq!(axis.tick_step, 2.0);
        assert_eq!(*axis.ticks().last().unwrap(), 24.0);
    }

    struct Dots;

    impl DrawDataset for Dots {
        fn panels(&self) -> usize {
            2
        }

        fn draw<'a, 'b: 'a>(&self, panels: &mut [Panel<'a, 'b>], table: &Table) -> Result<()> {
            assert_eq!(panels.len(), 2);
            let points = table.points("v");
            for panel in panels.iter_mut() {
                marks::scatter(panel, &points, BLUE, "v")?;
                marks::legend(panel)?;
            }
            Ok(())
        }
    }

    #[test]
    fn renders_one_row_per_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figure.svg");

        let mut table = Table::new("SimulationTime", vec![0.0, 5.0]);
        table.push_numeric("v", vec![Some(1.0), Some(2.0)]).unwrap();
        let datasets = vec![
            Dataset {
                title: "alpha".into(),
                table: table.clone(),
                source: PathBuf::from("a.csv"),
            },
            Dataset {
                title: "beta".into(),
                table,
                source: PathBuf::from("b.csv"),
            },
        ];

        render_figure(&path, "demo", &datasets, &AxisOptions::new(10.0), &Dots).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("alpha"));
        assert!(svg.contains("beta"));
    }

    #[test]
    fn time_axis_keys_on_tick_multiples() {
        let axis = TimeAxis::new(&AxisOptions::new(25.0));
        assert_eq!(axis.range(), 0.0..25.0);
        assert_eq!(axis.key_points(4usize), AxisOptions::new(25.0).ticks());
        assert_eq!(axis.format_ext(&12.0), "12");
        assert_eq!(axis.map(&25.0, (0, 100)), 100);
    }
}

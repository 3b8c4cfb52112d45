//! Report catalogue and the batch runner shared by all reports.
//!
//! A report is a discovery pattern, a per-file `build` step (load, join or
//! bucket) and a [`DrawDataset`] impl. [`run_report`] owns everything else:
//! - **Discovery:** sorted matches under `raw_dir`.
//! - **Export:** processed tables next to their source, before any rendering.
//! - **Headless:** stops after export and summaries; no figure, no metadata needed.
//! - **Render:** `<out_dir>/<name>.svg` with the x axis spanning the run duration.
//!
//! [`run_batch`] runs several reports against one configuration, reading the
//! run metadata at most once, and [`exit_code`] folds the results.

pub mod cpu;
pub mod generators;
pub mod in_system;
pub mod instances;
pub mod load;
pub mod load_distribution;
pub mod response_times;
pub mod utilization;

use std::path::PathBuf;

use log::{info, warn};

use crate::pipeline::{
    discovery::{DiscoveredFile, discover},
    table::{Dataset, Table},
};
use crate::render::{AxisOptions, DrawDataset, render_figure};
use crate::utils::{
    config::{ColumnSchema, ReportConfig, RunMetadata},
    error::{ReportError, Result},
    export::{processed_path, write_table},
    summary::print_summary,
};

pub trait Report: DrawDataset {
    /// CLI name, also the figure file stem.
    fn name(&self) -> &'static str;

    /// Figure heading.
    fn title(&self) -> &'static str;

    /// Glob relative to the raw directory matching the primary file of each entity.
    fn pattern(&self) -> String;

    /// Loads and aggregates one entity into a dataset.
    fn build(&self, file: &DiscoveredFile, schema: &ColumnSchema) -> Result<Dataset>;
}

/// How a run ended when nothing went wrong.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The discovery glob matched no files.
    Empty,
    Headless { datasets: usize },
    Rendered { figure: PathBuf, datasets: usize },
}

/// Runs one report end to end. Every invocation is a full redo of the data
/// path; only `metadata` carries over, filled on the first rendered figure.
pub fn run_report<R: Report + ?Sized>(
    report: &R,
    config: &ReportConfig,
    metadata: &mut Option<RunMetadata>,
) -> Result<RunOutcome> {
    let files = discover(&config.raw_dir, &report.pattern())?;
    if files.is_empty() {
        warn!(
            "[{}] No files matching {} in {}",
            report.name(),
            report.pattern(),
            config.raw_dir.display()
        );
        return Ok(RunOutcome::Empty);
    }

    let datasets = files
        .iter()
        .map(|file| report.build(file, &config.schema))
        .collect::<Result<Vec<_>>>()?;
    info!("[{}] Built {} dataset(s)", report.name(), datasets.len());

    if config.write_processed {
        for dataset in &datasets {
            write_table(&processed_path(&dataset.source, &config.schema), &dataset.table)?;
        }
    }
    for dataset in &datasets {
        print_summary(report.name(), &dataset.title, &dataset.table);
    }

    if config.headless {
        info!("[{}] Headless run, skipping figure", report.name());
        return Ok(RunOutcome::Headless {
            datasets: datasets.len(),
        });
    }

    let meta = match metadata.take() {
        Some(meta) => meta,
        None => RunMetadata::load(&config.report_dir, &config.schema)?,
    };
    let axis = AxisOptions::from_metadata(&meta);
    *metadata = Some(meta);

    std::fs::create_dir_all(&config.out_dir).map_err(|e| ReportError::io(&config.out_dir, e))?;
    let figure = config.out_dir.join(format!("{}.svg", report.name()));
    render_figure(
        &figure,
        report.title(),
        &datasets,
        &axis,
        report,
    )?;

    Ok(RunOutcome::Rendered {
        figure,
        datasets: datasets.len(),
    })
}

/// Runs each report in order; a failure does not stop the rest of the batch.
pub fn run_batch(reports: &[Box<dyn Report>], config: &ReportConfig) -> Vec<Result<RunOutcome>> {
    let mut metadata = None;
    reports
        .iter()
        .map(|report| run_report(report.as_ref(), config, &mut metadata))
        .collect()
}

/// `2` if any report failed, else `0` if any produced output, else `1`
/// (nothing matched anywhere).
pub fn exit_code(results: &[Result<RunOutcome>]) -> u8 {
    if results.iter().any(Result::is_err) {
        2
    } else if results
        .iter()
        .any(|r| matches!(r, Ok(RunOutcome::Headless { .. } | RunOutcome::Rendered { .. })))
    {
        0
    } else {
        1
    }
}

/// Every report, in catalogue order.
pub fn all_reports() -> Vec<Box<dyn Report>> {
    vec![
        Box::new(cpu::CpuReport),
        Box::new(utilization::UtilizationReport),
        Box::new(generators::GeneratorReport),
        Box::new(load::LoadReport),
        Box::new(instances::InstanceReport),
        Box::new(response_times::ResponseTimeReport),
        Box::new(in_system::InSystemReport),
        Box::new(load_distribution::LoadDistributionReport),
    ]
}

pub fn find_report(name: &str) -> Option<Box<dyn Report>> {
    all_reports().into_iter().find(|r| r.name() == name)
}

/// Name of the numeric column produced by joining `metric` (`<header>_<metric>`).
pub(crate) fn metric_column<'t>(table: &'t Table, metric: &str) -> Option<&'t str> {
    let suffix = format!("_{metric}");
    table.numeric_names().find(|n| n.ends_with(&suffix))
}

/// First numeric column; single-metric reports keep the source header as is.
pub(crate) fn value_column(table: &Table) -> Option<&str> {
    table.numeric_names().next()
}

/// Largest finite value over the given columns; missing columns are ignored.
pub(crate) fn max_of(table: &Table, columns: &[Option<&str>]) -> Option<f64> {
    columns
        .iter()
        .flatten()
        .flat_map(|c| table.points(c))
        .map(|(_, v)| v)
        .reduce(f64::max)
}

pub(crate) fn dataset(file: &DiscoveredFile, table: Table) -> Dataset {
    Dataset {
        title: file.entity.clone(),
        table,
        source: file.path.clone(),
    }
}

//! # Simulation Report Entry Point
//!
//! Runs one report (or the whole catalogue) over a simulator output directory.
//!
//! ## Modes
//! - **Render:** processed CSVs + `<out-dir>/<report>.svg`.
//! - **Headless (`--headless` / `--no-plot`):** processed CSVs and summaries only.
//! - **Repeat (`--repeat`):** after each batch, Enter re-runs everything from scratch, `q` quits.
//!
//! ## Exit codes
//! - `0` success or headless completion.
//! - `1` no input file matched (for `all`: no report found anything).
//! - `2` a report failed (missing companion, malformed table, bad metadata, render error).

use std::{
    io::{Write, stdin, stdout},
    path::PathBuf,
    process::ExitCode,
};

use clap::{Parser, ValueEnum};
use log::{error, info};

use sim_report::reports::{Report, RunOutcome, all_reports, exit_code, find_report, run_batch};
use sim_report::utils::config::{ColumnSchema, ReportConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Schema {
    /// `SimulationTime`, `metadata.json`, `_processed.csv`
    Current,
    /// `Simulation Time`, `meta.json`, `_mean.csv`
    Legacy,
}

#[derive(Debug, Parser)]
#[command(name = "sim-report", version, about = "Charts and processed tables from simulator CSV output")]
struct Cli {
    /// Report name, or `all`.
    #[arg(value_parser = report_names())]
    report: String,

    /// Process and export only; never create a figure.
    #[arg(long, visible_alias = "no-plot")]
    headless: bool,

    /// Report directory holding the run metadata.
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Directory with the simulator CSVs [default: <dir>/raw]
    #[arg(long)]
    raw_dir: Option<PathBuf>,

    /// Figure output directory [default: <dir>]
    #[arg(long)]
    out_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Schema::Current)]
    schema: Schema,

    /// Skip writing processed tables.
    #[arg(long)]
    no_write: bool,

    /// Prompt to re-run after each batch.
    #[arg(long)]
    repeat: bool,
}

fn report_names() -> clap::builder::PossibleValuesParser {
    let mut names: Vec<&'static str> = all_reports().iter().map(|r| r.name()).collect();
    names.push("all");
    clap::builder::PossibleValuesParser::new(names)
}

impl Cli {
    fn config(&self) -> ReportConfig {
        let schema = match self.schema {
            Schema::Current => ColumnSchema::CURRENT,
            Schema::Legacy => ColumnSchema::LEGACY,
        };
        let mut config = ReportConfig::new(&self.dir)
            .with_schema(schema)
            .headless(self.headless)
            .write_processed(!self.no_write);
        if let Some(raw) = &self.raw_dir {
            config = config.with_raw_dir(raw);
        }
        if let Some(out) = &self.out_dir {
            config = config.with_out_dir(out);
        }
        config
    }

    fn selected(&self) -> Vec<Box<dyn Report>> {
        if self.report == "all" {
            all_reports()
        } else {
            find_report(&self.report).into_iter().collect()
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let config = cli.config();
    info!("=== SIM REPORT START ({}) ===", cli.report);

    loop {
        let code = run_once(&cli.selected(), &config);
        if !cli.repeat || !prompt_repeat() {
            info!("=== SIM REPORT FINISHED ===");
            return ExitCode::from(code);
        }
    }
}

/// Runs every selected report once, reports each outcome and folds them
/// into an exit code.
fn run_once(reports: &[Box<dyn Report>], config: &ReportConfig) -> u8 {
    let results = run_batch(reports, config);
    for (report, result) in reports.iter().zip(&results) {
        match result {
            Ok(RunOutcome::Empty) => {
                println!("[{}] no matching input files", report.name());
            }
            Ok(RunOutcome::Headless { datasets }) => {
                println!("[{}] {} dataset(s) processed (headless)", report.name(), datasets);
            }
            Ok(RunOutcome::Rendered { figure, datasets }) => {
                println!(
                    "[{}] {} dataset(s) -> {}",
                    report.name(),
                    datasets,
                    figure.display()
                );
            }
            Err(e) => error!("[{}] {}", report.name(), e),
        }
    }
    exit_code(&results)
}

// Enter re-runs, `q` quits; EOF counts as quit.
fn prompt_repeat() -> bool {
    print!("\nPress Enter to re-run, or 'q' to quit: ");
    let _ = stdout().flush();

    let mut input = String::new();
    match stdin().read_line(&mut input) {
        Ok(0) | Err(_) => false,
        Ok(_) => !input.trim().eq_ignore_ascii_case("q"),
    }
}

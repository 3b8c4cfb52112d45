//! Console summary of processed datasets (one block per dataset, one line per column).

use average::{Estimate, Max, Min, Variance};

use crate::pipeline::table::Table;

/// Descriptive statistics of one numeric column, over finite cells only.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: String,
    pub count: u64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

pub fn summarize(table: &Table) -> Vec<ColumnSummary> {
    table
        .numeric_names()
        .filter_map(|name| Some((name, table.numeric(name)?)))
        .map(|(name, values)| {
            let mut var = Variance::new();
            let mut min = Min::new();
            let mut max = Max::new();
            for v in values.iter().flatten().filter(|v| v.is_finite()) {
                var.add(*v);
                min.add(*v);
                max.add(*v);
            }
            let count = var.len();
            ColumnSummary {
                name: name.to_string(),
                count,
                mean: if count > 0 { var.mean() } else { f64::NAN },
                min: if count > 0 { min.min() } else { f64::NAN },
                max: if count > 0 { max.max() } else { f64::NAN },
            }
        })
        .collect()
}

/// Prints a formatted block: title, row count, time span, per-column stats.
pub fn print_summary(report: &str, title: &str, table: &Table) {
    let span = table
        .time_span()
        .map(|(a, b)| format!("{:.2} → {:.2}", a, b))
        .unwrap_or_else(|| "-".to_string());

    println!("[{}] {}  ({} rows, t = {})", report, title, table.len(), span);
    if table.is_empty() {
        println!();
        return;
    }
    println!(
        "  {:<28} {:>8} {:>12} {:>12} {:>12}",
        "Column", "Samples", "Mean", "Min", "Max"
    );
    println!("  {}", "=".repeat(76));
    for s in summarize(table) {
        println!(
            "  {:<28} {:>8} {:>12.4} {:>12.4} {:>12.4}",
            s.name, s.count, s.mean, s.min, s.max
        );
    }
    println!();
}

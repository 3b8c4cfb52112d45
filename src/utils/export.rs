//! Processed-table export: writes aggregated tables back next to their source.
//!
//! Same `;` delimiter as the simulator. Absent cells are written empty, undefined
//! values as `NaN`, so a reader can tell "no observation" from "0/0".

use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use log::info;
use polars::prelude::{Column, DataType};

use crate::pipeline::table::Table;
use crate::utils::{
    config::ColumnSchema,
    error::{ReportError, Result},
};

/// `raw/C[a]_Usage.csv` → `raw/C[a]_Usage_processed.csv` (suffix per schema).
pub fn processed_path(source: &Path, schema: &ColumnSchema) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{}{}.csv", stem, schema.processed_suffix))
}

/// Writes `table` as `;`-delimited CSV with a header row.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let csv_err = |source: csv::Error| ReportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = WriterBuilder::new()
        .delimiter(b';')
        .from_path(path)
        .map_err(csv_err)?;

    let frame = table.frame();
    writer
        .write_record(frame.get_column_names().iter().map(|name| name.as_str()))
        .map_err(csv_err)?;

    let cells = frame
        .get_columns()
        .iter()
        .map(format_column)
        .collect::<Result<Vec<_>>>()?;
    for row in 0..frame.height() {
        writer
            .write_record(cells.iter().map(|column| column[row].as_str()))
            .map_err(csv_err)?;
    }

    writer.flush().map_err(|e| ReportError::io(path, e))?;
    info!("Processed table exported to: {}", path.display());
    Ok(())
}

/// Text columns verbatim, everything else as `f64`; nulls become empty cells.
fn format_column(column: &Column) -> Result<Vec<String>> {
    if column.dtype() == &DataType::String {
        return Ok(column
            .str()?
            .into_iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect());
    }
    let values = column.cast(&DataType::Float64)?;
    Ok(values
        .f64()?
        .into_iter()
        .map(|v| v.map(format_number).unwrap_or_default())
        .collect())
}

fn format_number(v: f64) -> String {
    if v.is_nan() { "NaN".to_string() } else { v.to_string() }
}

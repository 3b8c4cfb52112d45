//! Loads simulator CSVs (`;`-delimited, header row) into raw series.
//!
//! Files are split by the polars CSV reader with every column kept as text;
//! cells are then parsed here so a bad row can be reported by number. Only the
//! first two columns (time, value) are significant, plus an optional third
//! categorical column. Any malformed row fails the whole file; nothing is
//! skipped silently.

use std::fs::File;
use std::path::Path;

use polars::prelude::*;

use crate::pipeline::table::Table;
use crate::utils::{
    config::ColumnSchema,
    error::{ReportError, Result},
};

/// One parsed metric file. Row order is the file's order; no sorting or
/// deduplication happens here.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    pub value_name: String,
    pub times: Vec<f64>,
    pub values: Vec<f64>,
    /// Header name and cells of the optional categorical third column.
    pub labels: Option<(String, Vec<Option<String>>)>,
}

impl RawSeries {
    /// Converts to a table sorted by `(time, value)`, so the source row order
    /// never leaks into the result.
    pub fn into_table(self, time_name: &str) -> Result<Table> {
        let mut by = vec![time_name.to_string(), self.value_name.clone()];
        let mut columns = vec![
            Column::new(time_name.into(), self.times),
            Column::new(self.value_name.as_str().into(), self.values),
        ];
        if let Some((name, cells)) = self.labels {
            columns.push(Column::new(name.as_str().into(), cells));
            by.push(name);
        }

        let frame = DataFrame::new(columns)?
            .sort(by, SortMultipleOptions::default().with_maintain_order(true))?;
        Ok(Table::from_frame(time_name, frame))
    }
}

/// A file whose value cells are bracketed lists, e.g. `[inst-1, inst-2]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSeries {
    pub value_name: String,
    pub times: Vec<f64>,
    pub items: Vec<Vec<String>>,
}

/// Parses a numeric series. See the module docs for the accepted layout.
pub fn load_series(path: &Path, schema: &ColumnSchema) -> Result<RawSeries> {
    let frame = read_frame(path, schema)?;
    let cells = text_columns(&frame)?;
    let (time, value) = (cells[0], cells[1]);
    let label = cells.get(2);

    let mut times = Vec::with_capacity(frame.height());
    let mut values = Vec::with_capacity(frame.height());
    let mut labels = Vec::new();

    for i in 0..frame.height() {
        let row = i as u64 + 1;
        times.push(parse_time(path, row, time.get(i))?);
        values.push(parse_number(path, row, value.get(i), "value")?);
        if let Some(label) = label {
            labels.push(
                label
                    .get(i)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            );
        }
    }

    Ok(RawSeries {
        value_name: header(&frame, 1),
        times,
        values,
        labels: label.map(|_| (header(&frame, 2), labels)),
    })
}

/// Parses a series of list-valued cells. Items are kept in file order,
/// duplicates included.
pub fn load_list_series(path: &Path, schema: &ColumnSchema) -> Result<ListSeries> {
    let frame = read_frame(path, schema)?;
    let cells = text_columns(&frame)?;

    let mut times = Vec::with_capacity(frame.height());
    let mut items = Vec::with_capacity(frame.height());
    for i in 0..frame.height() {
        let row = i as u64 + 1;
        times.push(parse_time(path, row, cells[0].get(i))?);
        let cell = cells[1]
            .get(i)
            .ok_or_else(|| ReportError::malformed(path, row, "missing list cell"))?;
        items.push(parse_list_cell(cell));
    }

    Ok(ListSeries {
        value_name: header(&frame, 1),
        times,
        items,
    })
}

/// `"[a, b, c]"` → `["a", "b", "c"]`. Empty items are dropped.
pub fn parse_list_cell(cell: &str) -> Vec<String> {
    let inner = cell.trim();
    let inner = inner.strip_prefix('[').unwrap_or(inner);
    let inner = inner.strip_suffix(']').unwrap_or(inner);
    inner
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads the whole file as text columns and checks the header against the
/// schema's time column. Row numbers are 1-based data rows (the header is row 0).
fn read_frame(path: &Path, schema: &ColumnSchema) -> Result<DataFrame> {
    let file = File::open(path).map_err(|e| ReportError::io(path, e))?;
    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|opts| opts.with_separator(b';'))
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|source| ReportError::frame(path, source))?;

    let time_header = header(&frame, 0);
    if time_header != schema.time_column {
        return Err(ReportError::malformed(
            path,
            0,
            format!(
                "expected time column '{}', found '{}'",
                schema.time_column, time_header
            ),
        ));
    }
    if frame.width() < 2 {
        return Err(ReportError::malformed(path, 0, "header has no value column"));
    }
    Ok(frame)
}

fn text_columns(frame: &DataFrame) -> Result<Vec<&StringChunked>> {
    Ok(frame
        .get_columns()
        .iter()
        .map(Column::str)
        .collect::<PolarsResult<_>>()?)
}

fn header(frame: &DataFrame, i: usize) -> String {
    frame
        .get_column_names()
        .get(i)
        .map(|name| name.trim().to_string())
        .unwrap_or_default()
}

fn parse_time(path: &Path, row: u64, cell: Option<&str>) -> Result<f64> {
    // Normalise -0.0 so it keys identically to 0.0.
    Ok(parse_number(path, row, cell, "time")? + 0.0)
}

/// Parses a finite number; NaN and infinities are rejected like any other bad cell.
fn parse_number(path: &Path, row: u64, cell: Option<&str>, what: &str) -> Result<f64> {
    let cell = cell
        .map(str::trim)
        .ok_or_else(|| ReportError::malformed(path, row, format!("missing {what}")))?;
    match cell.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        Ok(_) => Err(ReportError::malformed(
            path,
            row,
            format!("{what} '{cell}' is not finite"),
        )),
        Err(_) => Err(ReportError::malformed(
            path,
            row,
            format!("{what} '{cell}' is not numeric"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn parses_two_column_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "C[a]_Usage.csv",
            "SimulationTime;Usage\n0.0;0.25\n1.5;0.5\n",
        );

        let s = load_series(&path, &ColumnSchema::CURRENT).unwrap();
        assert_eq!(s.value_name, "Usage");
        assert_eq!(s.times, vec![0.0, 1.5]);
        assert_eq!(s.values, vec![0.25, 0.5]);
        assert!(s.labels.is_none());
    }

    #[test]
    fn parses_optional_state_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "R[a]_InSystem.csv",
            "SimulationTime;InSystem;State\n0;1;queued\n2;0;idle\n",
        );

        let s = load_series(&path, &ColumnSchema::CURRENT).unwrap();
        let (name, cells) = s.labels.unwrap();
        assert_eq!(name, "State");
        assert_eq!(cells, vec![Some("queued".to_string()), Some("idle".to_string())]);
    }

    #[test]
    fn legacy_schema_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "x.csv", "Simulation Time;Value\n3;4\n");

        assert!(load_series(&path, &ColumnSchema::LEGACY).is_ok());
        let err = load_series(&path, &ColumnSchema::CURRENT).unwrap_err();
        assert!(matches!(err, ReportError::Malformed { row: 0, .. }));
    }

    #[test]
    fn non_numeric_value_fails_with_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "R[a]_ResponseTimes.csv",
            "SimulationTime;ResponseTimes\n0.1;5\n0.2;fast\n",
        );

        let err = load_series(&path, &ColumnSchema::CURRENT).unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, ReportError::Malformed { row: 2, .. }));
        assert!(msg.contains("R[a]_ResponseTimes.csv"));
        assert!(msg.contains("fast"));
    }

    #[test]
    fn non_finite_values_are_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let nan = write(dir.path(), "nan.csv", "SimulationTime;Value\n0;NaN\n1;inf\n");
        let inf = write(dir.path(), "inf.csv", "SimulationTime;Value\n0;1\n1;-inf\n");
        let time = write(dir.path(), "time.csv", "SimulationTime;Value\ninf;1\n");

        let err = load_series(&nan, &ColumnSchema::CURRENT).unwrap_err();
        assert!(matches!(err, ReportError::Malformed { row: 1, .. }), "{err}");
        assert!(err.to_string().contains("not finite"));
        let err = load_series(&inf, &ColumnSchema::CURRENT).unwrap_err();
        assert!(matches!(err, ReportError::Malformed { row: 2, .. }), "{err}");
        let err = load_series(&time, &ColumnSchema::CURRENT).unwrap_err();
        assert!(matches!(err, ReportError::Malformed { row: 1, .. }), "{err}");
    }

    #[test]
    fn wrong_delimiter_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "x.csv", "SimulationTime,Value\n0,1\n");

        let err = load_series(&path, &ColumnSchema::CURRENT).unwrap_err();
        assert!(matches!(err, ReportError::Malformed { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_series(&dir.path().join("nope.csv"), &ColumnSchema::CURRENT).unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
    }

    #[test]
    fn list_cells_keep_duplicates() {
        assert_eq!(parse_list_cell("[a, b, a]"), vec!["a", "b", "a"]);
        assert_eq!(parse_list_cell("[]"), Vec::<String>::new());
        assert_eq!(parse_list_cell(" [solo] "), vec!["solo"]);
    }

    #[test]
    fn loads_list_series() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "S[gw]_Load_Distribution.csv",
            "SimulationTime;Load_Distribution\n0.5;[gw#1, gw#2]\n1.0;[gw#1]\n",
        );

        let s = load_list_series(&path, &ColumnSchema::CURRENT).unwrap();
        assert_eq!(s.value_name, "Load_Distribution");
        assert_eq!(s.times, vec![0.5, 1.0]);
        assert_eq!(s.items[0], vec!["gw#1", "gw#2"]);
    }

    #[test]
    fn into_table_sorts_rows() {
        let s = RawSeries {
            value_name: "v".into(),
            times: vec![2.0, 0.0, 1.0],
            values: vec![20.0, 0.0, 10.0],
            labels: None,
        };
        let t = s.into_table("SimulationTime").unwrap();
        assert_eq!(t.time(), vec![0.0, 1.0, 2.0]);
        assert_eq!(t.numeric("v").unwrap(), vec![Some(0.0), Some(10.0), Some(20.0)]);
    }
}

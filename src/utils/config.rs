//! Run configuration: column schema, run metadata and the per-invocation report config.
//!
//! The simulator has gone through two naming eras:
//! - **Current:** `SimulationTime` column, `metadata.json`, `_processed.csv` outputs.
//! - **Legacy:** `Simulation Time` column, `meta.json`, `_mean.csv` outputs.
//!
//! Both are expressed as a [`ColumnSchema`] value so the pipeline exists once.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, warn};
use serde::Deserialize;

use crate::utils::error::{ReportError, Result};

/// Column and file naming convention of one simulator era.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSchema {
    pub time_column: &'static str,
    pub metadata_file: &'static str,
    pub processed_suffix: &'static str,
}

impl ColumnSchema {
    pub const CURRENT: ColumnSchema = ColumnSchema {
        time_column: "SimulationTime",
        metadata_file: "metadata.json",
        processed_suffix: "_processed",
    };

    pub const LEGACY: ColumnSchema = ColumnSchema {
        time_column: "Simulation Time",
        metadata_file: "meta.json",
        processed_suffix: "_mean",
    };

    /// The schema of the other era, used as metadata fallback.
    fn other(&self) -> ColumnSchema {
        if *self == ColumnSchema::LEGACY {
            ColumnSchema::CURRENT
        } else {
            ColumnSchema::LEGACY
        }
    }
}

/// Sidecar descriptor written by the simulator next to `raw/`.
/// Only `duration` is read; everything else in the file is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RunMetadata {
    pub duration: f64,
}

impl RunMetadata {
    /// Loads metadata from `dir`, trying the schema's file name first and then
    /// the other era's name.
    pub fn load(dir: &Path, schema: &ColumnSchema) -> Result<RunMetadata> {
        let primary = dir.join(schema.metadata_file);
        let fallback = dir.join(schema.other().metadata_file);

        let path = if primary.is_file() {
            primary
        } else if fallback.is_file() {
            warn!(
                "{} not found, falling back to {}",
                primary.display(),
                fallback.display()
            );
            fallback
        } else {
            return Err(ReportError::MissingMetadata {
                tried: vec![primary, fallback],
            });
        };

        let raw = fs::read_to_string(&path).map_err(|e| ReportError::io(&path, e))?;
        let meta: RunMetadata = serde_json::from_str(&raw).map_err(|source| {
            ReportError::MetadataJson {
                path: path.clone(),
                source,
            }
        })?;

        if !meta.duration.is_finite() || meta.duration <= 0.0 {
            return Err(ReportError::InvalidMetadata {
                path,
                reason: format!("duration must be a positive number, got {}", meta.duration),
            });
        }

        debug!("Loaded run metadata from {}: duration={}", path.display(), meta.duration);
        Ok(meta)
    }
}

/// Everything one report invocation needs, passed explicitly through the pipeline.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Directory holding the metadata file; figures land here by default.
    pub report_dir: PathBuf,
    /// Directory scanned for simulator CSVs; processed tables are written here.
    pub raw_dir: PathBuf,
    pub out_dir: PathBuf,
    pub schema: ColumnSchema,
    /// Process and persist, but never create a rendering surface.
    pub headless: bool,
    pub write_processed: bool,
}

impl ReportConfig {
    pub fn new(report_dir: impl Into<PathBuf>) -> Self {
        let report_dir = report_dir.into();
        Self {
            raw_dir: report_dir.join("raw"),
            out_dir: report_dir.clone(),
            report_dir,
            schema: ColumnSchema::CURRENT,
            headless: false,
            write_processed: true,
        }
    }

    pub fn with_raw_dir(mut self, raw_dir: impl Into<PathBuf>) -> Self {
        self.raw_dir = raw_dir.into();
        self
    }

    pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.out_dir = out_dir.into();
        self
    }

    pub fn with_schema(mut self, schema: ColumnSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn write_processed(mut self, write: bool) -> Self {
        self.write_processed = write;
        self
    }
}

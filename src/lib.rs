//! # Simulation Report Toolkit
//!
//! Turns the per-entity CSV time series written by the microservice simulator
//! into processed tables and SVG figures.
//!
//! ## Pipeline
//! - **Discovery & Load:** glob `raw/` for `<prefix>[<entity>]_<Metric>.csv`, parse `;`-delimited files.
//! - **Join/Bin/Aggregate:** exact-timestamp joins, one-unit buckets, derived ratios.
//! - **Render/Emit:** processed CSVs next to the sources, one SVG figure per report.
//!
//! ## Layout
//! - [`pipeline`]: the data path, free of any rendering concern.
//! - [`render`]: figure layout, shared axes, mark helpers.
//! - [`reports`]: the report catalogue and the batch runner.
//! - [`utils`]: configuration, errors, export, console summaries.

pub mod pipeline;
pub mod render;
pub mod reports;
pub mod utils;

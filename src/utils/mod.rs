// Ambient plumbing: config + metadata, errors, processed-table export, console summary.
pub mod config;
pub mod error;
pub mod export;
pub mod summary;

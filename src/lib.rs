//! Append-only file hierarchy history with time-travel folder reconstruction.

pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod ingest;
pub mod model;
pub mod report;
pub mod store;
pub mod util;

//! Per-file, per-class recoverable errors. These never abort a run; they are
//! logged and the offending item is skipped, per the walker's and graph
//! builder's "tolerate absent entries" contract.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum AnalysisError {
    #[error("failed to parse {path}: {message}")]
    ParseFailed { path: PathBuf, message: String },

    #[error("failed to read {path}: {message}")]
    ReadFailed { path: PathBuf, message: String },
}

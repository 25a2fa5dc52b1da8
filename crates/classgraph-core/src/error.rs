//! Error types and exit-code mapping for the class hierarchy graph tools.
//!
//! Errors are split by locality, following the analyzer's error-handling
//! design: a single file failing to parse or a single base failing to
//! resolve is local and recoverable (handled in `classgraph-python`, never
//! surfaced here); `GraphError` covers only the fatal cases that abort a
//! whole run — bad input path, an unreadable serialized graph, an output
//! directory that cannot be created.

use std::path::PathBuf;

use thiserror::Error;

/// Exit codes for the two CLI binaries.
///
/// `0` success, `1` missing/invalid input path, `2` any other fatal abort
/// (unreadable serialized graph, output directory failure, I/O error).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    InvalidInput = 1,
    Fatal = 2,
}

impl ExitCode {
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("input path does not exist: {path}")]
    InputNotFound { path: PathBuf },

    #[error("serialized graph unreadable at {path}: {reason}")]
    SerializedGraphUnreadable { path: PathBuf, reason: String },

    #[error("could not create output directory {path}: {source}")]
    OutputDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GraphError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            GraphError::InputNotFound { .. } => ExitCode::InvalidInput,
            GraphError::SerializedGraphUnreadable { .. }
            | GraphError::OutputDirCreate { .. }
            | GraphError::Io(_) => ExitCode::Fatal,
        }
    }
}

//! Language-agnostic core of the class hierarchy analyzer.
//!
//! This crate owns everything downstream of a parsed, language-specific
//! class graph: the graph model itself, the C3 linearization and cycle
//! checker, serialized-artifact I/O, CLI argument parsing, and the
//! logging/error-handling scaffolding both binaries share. Nothing here
//! knows about Python syntax; that lives in `classgraph-python`.

pub mod config;
pub mod consistency;
pub mod error;
pub mod graph;
pub mod logging;
pub mod report;

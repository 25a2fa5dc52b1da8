//! CLI argument surfaces for the two binaries. No config-file layer: the
//! external interface is exactly two positional-argument CLIs.

use std::path::PathBuf;

use clap::Parser;

/// `classgraph-build <root> --out-dir <dir> [--json-logs]`
#[derive(Debug, Parser)]
#[command(name = "classgraph-build", about = "Build a class hierarchy graph from a Python codebase")]
pub struct BuildArgs {
    /// Codebase root: a single file or a directory to walk recursively.
    pub root: PathBuf,

    /// Directory the serialized graph is written into (created on demand).
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Emit structured JSON logs instead of human-readable text.
    #[arg(long)]
    pub json_logs: bool,
}

/// `classgraph-check <graph_path> --out-dir <dir> [--json-logs]`
#[derive(Debug, Parser)]
#[command(name = "classgraph-check", about = "Check a serialized class hierarchy graph for consistency")]
pub struct CheckArgs {
    /// Path to the serialized graph produced by `classgraph-build`.
    pub graph_path: PathBuf,

    /// Directory the text reports are written into (created on demand).
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Emit structured JSON logs instead of human-readable text.
    #[arg(long)]
    pub json_logs: bool,
}

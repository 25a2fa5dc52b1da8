//! The two end-to-end operations the CLI binaries expose: build a graph
//! from a codebase, and check a serialized graph for consistency.

use std::path::Path;

use classgraph_core::config::{BuildArgs, CheckArgs};
use classgraph_core::consistency::{check_consistency, ConsistencyReport};
use classgraph_core::error::GraphError;
use classgraph_core::graph::{self, ClassHierarchyGraph};
use classgraph_core::report::write_reports;
use tracing::{info, warn};

/// Walks and resolves `args.root`, writing the serialized graph to
/// `<out_dir>/<basename>_class_hierarchy_graph.cbor`.
pub fn run_build(args: &BuildArgs) -> Result<ClassHierarchyGraph, GraphError> {
    if !args.root.exists() {
        return Err(GraphError::InputNotFound {
            path: args.root.clone(),
        });
    }

    let (class_graph, diagnostics) = classgraph_python::build_class_graph(&args.root);
    for diagnostic in &diagnostics {
        warn!(error = %diagnostic, "analysis diagnostic");
    }

    let out_path = args
        .out_dir
        .join(format!("{}_class_hierarchy_graph.cbor", basename_of(&args.root)));
    graph::save_to_file(&class_graph, &out_path)?;
    info!(
        classes = class_graph.len(),
        diagnostics = diagnostics.len(),
        out_path = %out_path.display(),
        "graph built"
    );

    Ok(class_graph)
}

/// Loads the serialized graph at `args.graph_path`, runs the consistency
/// checker, and writes the cycle/precedence text reports into `args.out_dir`.
pub fn run_check(args: &CheckArgs) -> Result<ConsistencyReport, GraphError> {
    if !args.graph_path.exists() {
        return Err(GraphError::InputNotFound {
            path: args.graph_path.clone(),
        });
    }

    let class_graph = graph::load_from_file(&args.graph_path)?;
    let report = check_consistency(&class_graph);

    for (class_id, status) in &report.linearizations {
        info!(class = %class_id, consistent = status.is_consistent(), "linearization status");
    }

    write_reports(&report, &class_graph, &args.out_dir)?;

    Ok(report)
}

fn basename_of(root: &Path) -> String {
    if root.is_file() {
        root.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default()
    } else {
        root.file_name().map(|s| s.to_string_lossy().to_string()).unwrap_or_default()
    }
}

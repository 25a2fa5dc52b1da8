//! Python front end: walks a codebase, resolves its imports and class
//! definitions, and builds a [`classgraph_core::graph::ClassHierarchyGraph`].
//!
//! This crate owns components A through D of the pipeline (module walker,
//! alias collector, last-binding resolver, graph builder); component E
//! (the consistency checker) is language-agnostic and lives in
//! `classgraph-core`.

pub mod alias;
pub mod error;
pub mod graph;
pub mod module_path;
pub mod resolve;

use std::path::Path;

use classgraph_core::graph::ClassHierarchyGraph;

use crate::error::AnalysisError;
use crate::graph::GraphBuilder;
use crate::module_path::walk;
use crate::resolve::Resolver;

/// Runs the full A→D pipeline over `root` (a single file or a directory to
/// walk recursively), returning the resolved graph plus every parse/read
/// diagnostic encountered along the way.
pub fn build_class_graph(root: &Path) -> (ClassHierarchyGraph, Vec<AnalysisError>) {
    let (entries, diagnostics) = walk(root);

    let basename = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| root.to_string_lossy().to_string());

    let resolver = Resolver::new(&entries, &basename);
    let builder = GraphBuilder::new(&resolver);
    let graph = builder.build(&entries);

    (graph, diagnostics)
}

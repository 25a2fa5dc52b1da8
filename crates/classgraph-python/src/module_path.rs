//! Component A: the module walker. Recursively enumerates source files under
//! a codebase root and parses each into a syntax tree, tolerating parse
//! failures as local diagnostics.
//!
//! The recursive walk also supplies the package-auto-binds-children
//! behavior: a package's immediate children are recorded so the alias
//! collector can synthesize `Module` bindings for them before the package's
//! own statements are read.

use std::fs;
use std::path::{Path, PathBuf};

use ruff_python_ast::ModModule;
use ruff_python_parser::{parse_module, Parsed};
use tracing::warn;

use crate::error::AnalysisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Package,
}

/// A single node in the module tree: a file or a package directory, its
/// canonical dotted path, and its parsed body (empty if unparseable or, for
/// a package with no `__init__.py`, simply absent).
pub struct ModuleEntry {
    pub file_path: PathBuf,
    pub module_path: String,
    pub kind: PathKind,
    parsed: Option<Parsed<ModModule>>,
    /// Bare names of immediate children, populated only for `Package` nodes.
    pub children: Vec<String>,
}

impl ModuleEntry {
    pub fn statements(&self) -> &[ruff_python_ast::Stmt] {
        self.parsed
            .as_ref()
            .map(|p| p.suite().as_slice())
            .unwrap_or(&[])
    }
}

/// Walks `root` (a file or a directory), returning every module/package node
/// in deterministic (sorted-by-name) order, parent before children, plus any
/// parse diagnostics encountered along the way.
pub fn walk(root: &Path) -> (Vec<ModuleEntry>, Vec<AnalysisError>) {
    let mut entries = Vec::new();
    let mut diagnostics = Vec::new();

    if root.is_file() {
        let module_path = stem_of(root);
        let parsed = parse_entry(root, &mut diagnostics);
        entries.push(ModuleEntry {
            file_path: root.to_path_buf(),
            module_path,
            kind: PathKind::File,
            parsed,
            children: Vec::new(),
        });
        return (entries, diagnostics);
    }

    let basename = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    walk_dir(root, &basename, &mut entries, &mut diagnostics);
    (entries, diagnostics)
}

fn walk_dir(
    dir: &Path,
    module_path: &str,
    entries: &mut Vec<ModuleEntry>,
    diagnostics: &mut Vec<AnalysisError>,
) {
    let mut dir_entries: Vec<_> = match fs::read_dir(dir) {
        Ok(rd) => rd.filter_map(|e| e.ok()).collect(),
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "failed to read directory, skipping");
            return;
        }
    };
    dir_entries.sort_by_key(|e| e.file_name());

    let mut children = Vec::new();
    let mut init_path: Option<PathBuf> = None;
    let mut child_files: Vec<(String, PathBuf)> = Vec::new();
    let mut child_dirs: Vec<(String, PathBuf)> = Vec::new();

    for entry in &dir_entries {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();

        if path.is_dir() {
            children.push(name.clone());
            child_dirs.push((name, path));
        } else if name == "__init__.py" {
            init_path = Some(path);
        } else if path.extension().is_some_and(|ext| ext == "py") {
            let stem = stem_of(&path);
            children.push(stem.clone());
            child_files.push((stem, path));
        }
    }

    let parsed = init_path
        .as_ref()
        .and_then(|p| parse_entry(p, diagnostics));
    entries.push(ModuleEntry {
        file_path: init_path.unwrap_or_else(|| dir.join("__init__.py")),
        module_path: module_path.to_string(),
        kind: PathKind::Package,
        parsed,
        children,
    });

    for (stem, path) in child_files {
        let child_module_path = format!("{module_path}.{stem}");
        let parsed = parse_entry(&path, diagnostics);
        entries.push(ModuleEntry {
            file_path: path,
            module_path: child_module_path,
            kind: PathKind::File,
            parsed,
            children: Vec::new(),
        });
    }

    for (name, path) in child_dirs {
        let child_module_path = format!("{module_path}.{name}");
        walk_dir(&path, &child_module_path, entries, diagnostics);
    }
}

fn parse_entry(path: &Path, diagnostics: &mut Vec<AnalysisError>) -> Option<Parsed<ModModule>> {
    let source = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read file, skipping");
            diagnostics.push(AnalysisError::ReadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            });
            return None;
        }
    };
    match parse_module(&source) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to parse, skipping");
            diagnostics.push(AnalysisError::ParseFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            });
            None
        }
    }
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

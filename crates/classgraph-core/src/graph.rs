//! The class hierarchy graph: the immutable artifact passed from the graph
//! builder (component D) to the consistency checker (component E).

use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// Bumped whenever the on-disk envelope's shape changes incompatibly.
pub const GRAPH_FORMAT_VERSION: u32 = 1;

/// Canonical dotted identifier of a class: `<module_path>.<local_class_name>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClassId(pub String);

impl ClassId {
    pub fn new(id: impl Into<String>) -> Self {
        ClassId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ClassId {
    fn from(s: String) -> Self {
        ClassId(s)
    }
}

impl AsRef<str> for ClassId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A single class node: its parents in declaration order, and the source
/// file it was declared in (kept for diagnostics, never used in linearization).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassEntry {
    pub parents: Vec<ClassId>,
    pub source_file: String,
}

/// Mapping `class_identifier -> (parents, source_file)`, closed under
/// "defined in this codebase". A `BTreeMap` keeps iteration order stable so
/// two runs over identical inputs serialize byte-identically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassHierarchyGraph {
    classes: BTreeMap<ClassId, ClassEntry>,
}

impl ClassHierarchyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new class node with an empty parent list. No-op if the
    /// identifier already exists (duplicate-class-in-module handling: the
    /// graph builder is responsible for calling this only once per class,
    /// but this guards the invariant regardless).
    pub fn insert_class(&mut self, id: ClassId, source_file: impl Into<String>) {
        self.classes.entry(id).or_insert_with(|| ClassEntry {
            parents: Vec::new(),
            source_file: source_file.into(),
        });
    }

    pub fn add_parent(&mut self, id: &ClassId, parent: ClassId) {
        if let Some(entry) = self.classes.get_mut(id) {
            entry.parents.push(parent);
        }
    }

    pub fn contains(&self, id: &ClassId) -> bool {
        self.classes.contains_key(id)
    }

    pub fn get(&self, id: &ClassId) -> Option<&ClassEntry> {
        self.classes.get(id)
    }

    pub fn parents_of(&self, id: &ClassId) -> &[ClassId] {
        self.classes
            .get(id)
            .map(|e| e.parents.as_slice())
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ClassId, &ClassEntry)> {
        self.classes.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ClassId> {
        self.classes.keys()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn total_resolved_bases(&self) -> usize {
        self.classes.values().map(|e| e.parents.len()).sum()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedGraph {
    version: u32,
    classes: BTreeMap<ClassId, ClassEntry>,
}

/// Writes the graph to `path` as a versioned CBOR envelope.
pub fn save_to_file(graph: &ClassHierarchyGraph, path: &Path) -> Result<(), GraphError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| GraphError::OutputDirCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    let envelope = SerializedGraph {
        version: GRAPH_FORMAT_VERSION,
        classes: graph.classes.clone(),
    };
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    ciborium::into_writer(&envelope, writer).map_err(|e| GraphError::SerializedGraphUnreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Reads a graph previously written by [`save_to_file`]. A version mismatch
/// or corrupt envelope becomes a fatal [`GraphError::SerializedGraphUnreadable`],
/// never a silent misparse.
pub fn load_from_file(path: &Path) -> Result<ClassHierarchyGraph, GraphError> {
    let file = File::open(path).map_err(|e| GraphError::SerializedGraphUnreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let reader = BufReader::new(file);
    let envelope: SerializedGraph =
        ciborium::from_reader(reader).map_err(|e| GraphError::SerializedGraphUnreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    if envelope.version != GRAPH_FORMAT_VERSION {
        return Err(GraphError::SerializedGraphUnreadable {
            path: path.to_path_buf(),
            reason: format!(
                "unsupported graph format version {} (expected {})",
                envelope.version, GRAPH_FORMAT_VERSION
            ),
        });
    }
    Ok(ClassHierarchyGraph {
        classes: envelope.classes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn cid(s: &str) -> ClassId {
        ClassId::new(s)
    }

    #[test]
    fn insert_is_idempotent_first_wins() {
        let mut g = ClassHierarchyGraph::new();
        g.insert_class(cid("a.A"), "a.py");
        g.add_parent(&cid("a.A"), cid("a.Base"));
        g.insert_class(cid("a.A"), "a.py");
        assert_eq!(g.parents_of(&cid("a.A")), &[cid("a.Base")]);
    }

    #[test]
    fn round_trips_through_cbor() {
        let mut g = ClassHierarchyGraph::new();
        g.insert_class(cid("a.A"), "a.py");
        g.insert_class(cid("b.B"), "b.py");
        g.add_parent(&cid("b.B"), cid("a.A"));

        let dir = tempdir().unwrap();
        let path = dir.path().join("graph.cbor");
        save_to_file(&g, &path).unwrap();
        let loaded = load_from_file(&path).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.parents_of(&cid("b.B")), &[cid("a.A")]);
    }

    #[test]
    fn rejects_mismatched_version() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph.cbor");
        let bad = SerializedGraph {
            version: GRAPH_FORMAT_VERSION + 1,
            classes: BTreeMap::new(),
        };
        let file = File::create(&path).unwrap();
        ciborium::into_writer(&bad, BufWriter::new(file)).unwrap();

        let err = load_from_file(&path).unwrap_err();
        assert!(matches!(err, GraphError::SerializedGraphUnreadable { .. }));
    }
}

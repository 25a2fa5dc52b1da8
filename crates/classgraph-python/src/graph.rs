//! Component D: the graph builder.
//!
//! Re-scans every module's class definitions, classifies each base
//! expression, and resolves it to a canonical class identifier via the
//! resolver (component C), inserting the result into a
//! [`classgraph_core::graph::ClassHierarchyGraph`].
//!
//! Base expressions are classified into a dotted textual form (the
//! reserved-attribute set, the `__or__`/`__ror__` union-call recognition,
//! and the `object`-suffix drop below) and resolved through the binding
//! map with a longest-leftmost-prefix walk over dotted references.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use classgraph_core::graph::{ClassHierarchyGraph, ClassId};
use ruff_python_ast::{Expr, Stmt};
use tracing::debug;

use crate::alias::BindingKind;
use crate::module_path::ModuleEntry;
use crate::resolve::{Binding, Resolver};

/// Attribute names that can never terminate a meaningful base-class
/// reference; these are metadata/dunder lookups, not class references.
const RESERVED_ATTRIBUTE_NAMES: &[&str] = &[
    "__class__",
    "__init__",
    "__mro__",
    "__dict__",
    "__bases__",
    "__subclasses__",
    "__name__",
    "__qualname__",
];

pub struct GraphBuilder<'a> {
    resolver: &'a Resolver<'a>,
    reference_memo: RefCell<HashMap<(String, String), Option<String>>>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(resolver: &'a Resolver<'a>) -> Self {
        GraphBuilder {
            resolver,
            reference_memo: RefCell::new(HashMap::new()),
        }
    }

    /// Builds the full graph from every module's class definitions.
    pub fn build(&self, entries: &[ModuleEntry]) -> ClassHierarchyGraph {
        let mut graph = ClassHierarchyGraph::new();

        for entry in entries {
            let mut seen_names = HashSet::new();
            for stmt in entry.statements() {
                let Stmt::ClassDef(class_def) = stmt else { continue };
                let name = class_def.name.as_str();
                if !seen_names.insert(name.to_string()) {
                    // Duplicate class name in the same module: first wins.
                    continue;
                }

                let class_identifier = format!("{}.{}", entry.module_path, name);
                let class_id = ClassId::new(class_identifier.clone());
                graph.insert_class(class_id.clone(), entry.file_path.to_string_lossy().to_string());

                for base in class_def.bases() {
                    let Some(dotted) = flatten_base(base) else {
                        debug!(class = %class_identifier, "base expression is not a recognized class reference, skipping");
                        continue;
                    };
                    if is_reserved_terminal(&dotted) {
                        debug!(class = %class_identifier, base = %dotted, "base resolves through a reserved attribute, skipping");
                        continue;
                    }
                    if dotted == "object" {
                        continue;
                    }

                    match self.resolve_reference(&dotted, &entry.module_path) {
                        Some(parent_id) if parent_id.rsplit('.').next() != Some("object") => {
                            graph.add_parent(&class_id, ClassId::new(parent_id));
                        }
                        Some(_) => {}
                        None => {
                            debug!(class = %class_identifier, base = %dotted, "base did not resolve to a known class, dropping");
                        }
                    }
                }
            }
        }

        graph
    }

    /// Resolves a flattened base-expression string (`"name"` or
    /// `"a.b.name"`) to a canonical class identifier, memoized per
    /// `(reference, module)` pair.
    fn resolve_reference(&self, dotted: &str, this_module: &str) -> Option<String> {
        let key = (dotted.to_string(), this_module.to_string());
        if let Some(cached) = self.reference_memo.borrow().get(&key) {
            return cached.clone();
        }

        let result = if dotted.contains('.') {
            self.resolve_dotted(dotted, this_module)
        } else {
            self.resolve_bare(dotted, this_module)
        };

        self.reference_memo.borrow_mut().insert(key, result.clone());
        result
    }

    fn resolve_bare(&self, name: &str, this_module: &str) -> Option<String> {
        let binding = self.resolver.lookup_name(this_module, name)?;
        let resolved = self.chase(binding)?;
        (resolved.kind == BindingKind::ClassDefined).then_some(resolved.origin_path)
    }

    fn resolve_dotted(&self, dotted: &str, this_module: &str) -> Option<String> {
        let parts: Vec<&str> = dotted.split('.').collect();

        let (prefix_len, prefix_binding) = self.longest_module_prefix(&parts, this_module)?;
        let mut reached_path = prefix_binding.origin_path;
        let remaining = &parts[prefix_len..];
        if remaining.is_empty() {
            return None;
        }

        for (i, seg) in remaining.iter().enumerate() {
            let binding = self.resolver.lookup_name(&reached_path, seg)?;
            let resolved = self.chase(binding)?;

            let is_last = i == remaining.len() - 1;
            if is_last {
                return (resolved.kind == BindingKind::ClassDefined).then_some(resolved.origin_path);
            }
            if resolved.kind != BindingKind::Module {
                return None;
            }
            reached_path = resolved.origin_path;
        }

        None
    }

    /// Finds the longest leftmost prefix of `parts` bound as `Module` as
    /// seen from `this_module`, trying progressively shorter joins; each
    /// candidate is resolved with the same `.__init__`-first fallback as
    /// any other name.
    fn longest_module_prefix(&self, parts: &[&str], this_module: &str) -> Option<(usize, Binding)> {
        for len in (1..=parts.len()).rev() {
            let candidate = parts[..len].join(".");
            if let Some(binding) = self.resolver.lookup_name(this_module, &candidate) {
                if binding.kind == BindingKind::Module {
                    return Some((len, binding));
                }
            }
        }
        None
    }

    /// Follows a chain of `ImportFromNode` bindings to whatever they
    /// ultimately name, guarding against re-export cycles.
    fn chase(&self, mut binding: Binding) -> Option<Binding> {
        let mut visited = HashSet::new();
        loop {
            match binding.kind {
                BindingKind::ImportFromNode => {
                    let chase_key = format!("{}::{}", binding.origin_path, binding.original_name);
                    if !visited.insert(chase_key) {
                        return None;
                    }
                    binding = self.resolver.lookup_name(&binding.origin_path, &binding.original_name)?;
                }
                _ => return Some(binding),
            }
        }
    }
}

/// Flattens a base-class expression to its dotted textual form, or `None`
/// if the shape is not a recognized class reference.
fn flatten_base(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Name(name) => Some(name.id.to_string()),
        Expr::Attribute(_) => dotted_name(expr),
        Expr::Subscript(sub) => flatten_base(&sub.value),
        Expr::Call(call) => {
            let Expr::Attribute(attr) = call.func.as_ref() else { return None };
            let op = attr.attr.as_str();
            if op != "__or__" && op != "__ror__" {
                return None;
            }
            if call.arguments.args.len() != 1 {
                return None;
            }
            let receiver = flatten_base(&attr.value)?;
            let arg = flatten_base(&call.arguments.args[0])?;
            (receiver == arg).then_some(receiver)
        }
        _ => None,
    }
}

fn dotted_name(expr: &Expr) -> Option<String> {
    let mut parts = Vec::new();
    let mut cur = expr;
    loop {
        match cur {
            Expr::Attribute(attr) => {
                parts.push(attr.attr.as_str().to_string());
                cur = &attr.value;
            }
            Expr::Name(name) => {
                parts.push(name.id.to_string());
                break;
            }
            _ => return None,
        }
    }
    parts.reverse();
    Some(parts.join("."))
}

fn is_reserved_terminal(dotted: &str) -> bool {
    let terminal = dotted.rsplit('.').next().unwrap_or(dotted);
    RESERVED_ATTRIBUTE_NAMES.contains(&terminal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module_path::walk;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn write(path: &std::path::Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        File::create(path).unwrap().write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn bare_name_resolves_to_same_module_class() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("m.py");
        write(&file, "class A:\n    pass\nclass B(A):\n    pass\n");

        let (entries, _) = walk(&file);
        let resolver = Resolver::new(&entries, "m");
        let builder = GraphBuilder::new(&resolver);
        let graph = builder.build(&entries);

        let b = graph.get(&classgraph_core::graph::ClassId("m.B".to_string())).unwrap();
        assert_eq!(b.parents, vec![classgraph_core::graph::ClassId("m.A".to_string())]);
    }

    #[test]
    fn cross_module_import_resolves_through_from_import() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("pkg").join("__init__.py"), "");
        write(&dir.path().join("pkg").join("base.py"), "class Base:\n    pass\n");
        write(
            &dir.path().join("pkg").join("derived.py"),
            "from pkg.base import Base\nclass Sub(Base):\n    pass\n",
        );

        let (entries, _) = walk(&dir.path().join("pkg"));
        let resolver = Resolver::new(&entries, "pkg");
        let builder = GraphBuilder::new(&resolver);
        let graph = builder.build(&entries);

        let sub = graph.get(&classgraph_core::graph::ClassId("pkg.derived.Sub".to_string())).unwrap();
        assert_eq!(
            sub.parents,
            vec![classgraph_core::graph::ClassId("pkg.base.Base".to_string())]
        );
    }

    #[test]
    fn dotted_attribute_prefix_walk_resolves() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("pkg").join("__init__.py"), "");
        write(&dir.path().join("pkg").join("base.py"), "class Base:\n    pass\n");
        write(
            &dir.path().join("pkg").join("derived.py"),
            "import pkg.base\nclass Sub(pkg.base.Base):\n    pass\n",
        );

        let (entries, _) = walk(&dir.path().join("pkg"));
        let resolver = Resolver::new(&entries, "pkg");
        let builder = GraphBuilder::new(&resolver);
        let graph = builder.build(&entries);

        let sub = graph.get(&classgraph_core::graph::ClassId("pkg.derived.Sub".to_string())).unwrap();
        assert_eq!(
            sub.parents,
            vec![classgraph_core::graph::ClassId("pkg.base.Base".to_string())]
        );
    }

    #[test]
    fn object_base_is_dropped() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("m.py");
        write(&file, "class A(object):\n    pass\n");

        let (entries, _) = walk(&file);
        let resolver = Resolver::new(&entries, "m");
        let builder = GraphBuilder::new(&resolver);
        let graph = builder.build(&entries);

        let a = graph.get(&classgraph_core::graph::ClassId("m.A".to_string())).unwrap();
        assert!(a.parents.is_empty());
    }

    #[test]
    fn union_call_form_resolves_to_receiver() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("m.py");
        write(
            &file,
            "class A:\n    pass\nclass B(A.__or__(A)):\n    pass\n",
        );

        let (entries, _) = walk(&file);
        let resolver = Resolver::new(&entries, "m");
        let builder = GraphBuilder::new(&resolver);
        let graph = builder.build(&entries);

        let b = graph.get(&classgraph_core::graph::ClassId("m.B".to_string())).unwrap();
        assert_eq!(b.parents, vec![classgraph_core::graph::ClassId("m.A".to_string())]);
    }

    #[test]
    fn unresolvable_base_is_dropped_silently() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("m.py");
        write(&file, "import unknown_external\nclass A(unknown_external.Thing):\n    pass\n");

        let (entries, _) = walk(&file);
        let resolver = Resolver::new(&entries, "m");
        let builder = GraphBuilder::new(&resolver);
        let graph = builder.build(&entries);

        let a = graph.get(&classgraph_core::graph::ClassId("m.A".to_string())).unwrap();
        assert!(a.parents.is_empty());
    }

    #[test]
    fn duplicate_class_name_in_module_keeps_first() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("m.py");
        write(
            &file,
            "class Base1:\n    pass\nclass Base2:\n    pass\nclass A(Base1):\n    pass\nclass A(Base2):\n    pass\n",
        );

        let (entries, _) = walk(&file);
        let resolver = Resolver::new(&entries, "m");
        let builder = GraphBuilder::new(&resolver);
        let graph = builder.build(&entries);

        let a = graph.get(&classgraph_core::graph::ClassId("m.A".to_string())).unwrap();
        assert_eq!(a.parents, vec![classgraph_core::graph::ClassId("m.Base1".to_string())]);
    }

    #[test]
    fn reserved_dunder_attribute_is_invalid_base() {
        assert!(is_reserved_terminal("x.__class__"));
        assert!(!is_reserved_terminal("x.Y"));
    }
}

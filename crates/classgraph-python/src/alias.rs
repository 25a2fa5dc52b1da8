//! Component B: the per-module alias collector.
//!
//! Walks one module's top-level (and nested-class) statements and emits a
//! flat, ordered stream of [`AliasEvent`]s describing every name binding,
//! wildcard re-export, and deletion the module performs. The resolver
//! (component C) folds this stream into a last-binding map; nothing here
//! does cross-module lookup.
//!
//! Each statement kind emits its events independently of every other
//! module; cross-module lookup and wildcard expansion happen one layer up,
//! in the resolver.

use ruff_python_ast::{Expr, Stmt};

use crate::module_path::{ModuleEntry, PathKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingKind {
    ClassDefined,
    Module,
    ImportFromNode,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasEvent {
    Bind {
        alias: String,
        original_name: String,
        origin_path: String,
        kind: BindingKind,
    },
    Wildcard {
        origin_path: String,
    },
    Delete {
        alias: String,
    },
}

/// Collects the alias-event stream produced by a module's own top-level
/// statements, in source order. This is the stream addressable at
/// `module_path + ".__init__"` for a package, or at the bare path for a
/// plain file.
pub fn collect_own_events(entry: &ModuleEntry, codebase_basename: &str) -> Vec<AliasEvent> {
    let mut events = Vec::new();
    for stmt in entry.statements() {
        collect_stmt(stmt, &entry.module_path, codebase_basename, &mut events);
    }
    events
}

/// Collects the auto-bind-children events for a package: every immediate
/// child file or subdirectory, bound as a `Module` under its bare name.
/// This is the stream addressable at the package's bare path; it is
/// distinct from the package's own `__init__` statements, since the
/// filesystem registers these submodules whether or not `__init__.py`
/// ever imports them. Empty for a `File` entry.
pub fn collect_child_events(entry: &ModuleEntry) -> Vec<AliasEvent> {
    if entry.kind != PathKind::Package {
        return Vec::new();
    }
    entry
        .children
        .iter()
        .map(|child| {
            let origin_path = format!("{}.{}", entry.module_path, child);
            AliasEvent::Bind {
                alias: child.clone(),
                original_name: child.clone(),
                origin_path,
                kind: BindingKind::Module,
            }
        })
        .collect()
}

fn collect_stmt(
    stmt: &Stmt,
    this_module: &str,
    basename: &str,
    events: &mut Vec<AliasEvent>,
) {
    match stmt {
        Stmt::Import(import_stmt) => {
            for alias in &import_stmt.names {
                let imported = alias.name.as_str();
                let bound_key = alias.asname.as_ref().map(|n| n.as_str()).unwrap_or(imported);
                let origin_path = absolute_target(imported, basename);

                events.push(AliasEvent::Bind {
                    alias: bound_key.to_string(),
                    original_name: imported.to_string(),
                    origin_path,
                    kind: BindingKind::Module,
                });

                // `import pkg.__init__` additionally binds the package itself.
                if imported.ends_with(".__init__") {
                    let prefix = &imported[..imported.len() - ".__init__".len()];
                    events.push(AliasEvent::Bind {
                        alias: prefix.to_string(),
                        original_name: prefix.to_string(),
                        origin_path: absolute_target(prefix, basename),
                        kind: BindingKind::Module,
                    });
                }
            }
        }

        Stmt::ImportFrom(import_from) => {
            let module_target =
                resolve_from_target(
                    import_from.module.as_ref().map(|m| m.as_str()),
                    import_from.level,
                    this_module,
                    basename,
                );

            for alias in &import_from.names {
                let imported_name = alias.name.as_str();

                if imported_name == "*" {
                    events.push(AliasEvent::Wildcard {
                        origin_path: module_target.clone(),
                    });
                    continue;
                }

                let bound_name = alias.asname.as_ref().map(|n| n.as_str()).unwrap_or(imported_name);
                events.push(AliasEvent::Bind {
                    alias: bound_name.to_string(),
                    original_name: imported_name.to_string(),
                    origin_path: module_target.clone(),
                    kind: BindingKind::ImportFromNode,
                });
            }
        }

        Stmt::ClassDef(class_def) => {
            let name = class_def.name.as_str();
            events.push(AliasEvent::Bind {
                alias: name.to_string(),
                original_name: name.to_string(),
                origin_path: format!("{this_module}.{name}"),
                kind: BindingKind::ClassDefined,
            });
        }

        Stmt::FunctionDef(func_def) => {
            let name = func_def.name.as_str();
            events.push(AliasEvent::Bind {
                alias: name.to_string(),
                original_name: name.to_string(),
                origin_path: format!("{this_module}.{name}"),
                kind: BindingKind::Other,
            });
        }

        Stmt::Assign(assign) => {
            for target in &assign.targets {
                collect_assign_target(target, this_module, events);
            }
        }

        Stmt::AnnAssign(ann_assign) => {
            collect_assign_target(&ann_assign.target, this_module, events);
        }

        Stmt::Delete(delete) => {
            for target in &delete.targets {
                collect_delete_target(target, events);
            }
        }

        _ => {}
    }
}

fn collect_assign_target(expr: &Expr, this_module: &str, events: &mut Vec<AliasEvent>) {
    match expr {
        Expr::Name(name) => {
            let n = name.id.to_string();
            events.push(AliasEvent::Bind {
                alias: n.clone(),
                original_name: n.clone(),
                origin_path: format!("{this_module}.{n}"),
                kind: BindingKind::Other,
            });
        }
        Expr::Tuple(tuple) => {
            for elt in &tuple.elts {
                collect_assign_target(elt, this_module, events);
            }
        }
        Expr::List(list) => {
            for elt in &list.elts {
                collect_assign_target(elt, this_module, events);
            }
        }
        Expr::Attribute(attr) => {
            if let Some(dotted) = dotted_name(expr) {
                let n = attr.attr.as_str();
                events.push(AliasEvent::Bind {
                    alias: dotted,
                    original_name: n.to_string(),
                    origin_path: format!("{this_module}.{n}"),
                    kind: BindingKind::Other,
                });
            }
        }
        _ => {}
    }
}

fn collect_delete_target(expr: &Expr, events: &mut Vec<AliasEvent>) {
    match expr {
        Expr::Name(name) => events.push(AliasEvent::Delete {
            alias: name.id.to_string(),
        }),
        Expr::Tuple(tuple) => {
            for elt in &tuple.elts {
                collect_delete_target(elt, events);
            }
        }
        Expr::Attribute(_) => {
            if let Some(dotted) = dotted_name(expr) {
                events.push(AliasEvent::Delete { alias: dotted });
            }
        }
        _ => {}
    }
}

/// Joins a `Name`/`Attribute` chain into its dotted textual form, e.g.
/// `a.b.c` for `Attribute(Attribute(Name(a), b), c)`.
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

fn absolute_target(name: &str, basename: &str) -> String {
    format!("{basename}.{name}")
}

/// Resolves a `from M import ...` module target (including relative forms)
/// to an absolute codebase-rooted dotted path: peel `level` leading
/// segments off the current module's path, then append the named module.
fn resolve_from_target(module: Option<&str>, level: u32, this_module: &str, basename: &str) -> String {
    if level == 0 {
        let m = module.unwrap_or("");
        return absolute_target(m, basename);
    }

    let mut parts: Vec<&str> = this_module.split('.').collect();
    let base_level = level as usize;
    let drop = base_level.min(parts.len());
    parts.truncate(parts.len() - drop);

    match module {
        Some(m) if !m.is_empty() => {
            parts.push(m);
        }
        _ => {}
    }
    parts.join(".")
}

//! Component C: the last-binding resolver.
//!
//! Folds each module's [`AliasEvent`] stream into a final alias→binding map,
//! expanding wildcard imports on demand and memoizing every module's map so
//! it is computed at most once.
//!
//! A package is addressable at two distinct keys: its bare dotted path
//! (populated only with the auto-bind-children events the module walker
//! supplies) and `path + ".__init__"` (populated only with the package's
//! own top-level statements). These are never merged. Per-name lookups
//! (bare-name resolution, dotted-segment hops, `ImportFromNode` chasing)
//! try the `.__init__` map first and fall back to the bare map on a miss;
//! wildcard expansion instead switches wholesale to the `.__init__` map for
//! a package and contributes nothing if that map is absent, with no
//! per-name fallback to the bare map.
//!
//! A cycle between wildcard imports contributes nothing rather than
//! hanging. Every module's map is computed at most once per resolver
//! instance via a `Rc`-backed memo, keyed by the same bare/`.__init__`
//! distinction as the lookups above.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::alias::{collect_child_events, collect_own_events, AliasEvent, BindingKind};
use crate::module_path::{ModuleEntry, PathKind};

const INIT_SUFFIX: &str = ".__init__";

#[derive(Debug, Clone)]
pub struct Binding {
    pub original_name: String,
    pub origin_path: String,
    pub kind: BindingKind,
}

pub type BindingMap = HashMap<String, Binding>;

/// Resolves alias chains across an already-walked module set. Borrowed
/// rather than owned: the module set is walked once up front (component A)
/// and lives for the duration of the whole pipeline.
pub struct Resolver<'a> {
    by_path: HashMap<String, &'a ModuleEntry>,
    basename: String,
    memo: RefCell<HashMap<String, Rc<BindingMap>>>,
}

impl<'a> Resolver<'a> {
    pub fn new(entries: &'a [ModuleEntry], basename: &str) -> Self {
        let by_path = entries.iter().map(|e| (e.module_path.clone(), e)).collect();
        Resolver {
            by_path,
            basename: basename.to_string(),
            memo: RefCell::new(HashMap::new()),
        }
    }

    /// The binding map addressed literally by `key` (a bare dotted path, or
    /// one suffixed with `.__init__`), computed once and cached.
    pub fn binding_map(&self, key: &str) -> Rc<BindingMap> {
        let mut visited = HashSet::new();
        self.binding_map_guarded(key, &mut visited)
    }

    /// Resolves `name` as seen from `path`: tries `path + ".__init__"`
    /// first, falling back to the bare `path` map on a miss. This is the
    /// per-name fallback used for bare-name resolution, dotted-segment
    /// hops, and `ImportFromNode` chasing.
    pub fn lookup_name(&self, path: &str, name: &str) -> Option<Binding> {
        let mut visited = HashSet::new();
        let suffixed = format!("{path}{INIT_SUFFIX}");
        let init_map = self.binding_map_guarded(&suffixed, &mut visited);
        if let Some(binding) = init_map.get(name) {
            return Some(binding.clone());
        }
        let mut visited = HashSet::new();
        let bare_map = self.binding_map_guarded(path, &mut visited);
        bare_map.get(name).cloned()
    }

    /// Selects the whole map a wildcard import (`from M import *`) pulls
    /// from: for a package this switches wholly to the `.__init__` map (an
    /// absent or empty `__init__.py` contributes nothing), never falling
    /// back to the bare map of auto-bound children.
    fn resolved_module_map_guarded(&self, origin_path: &str, visited: &mut HashSet<String>) -> Rc<BindingMap> {
        match self.by_path.get(origin_path) {
            Some(entry) if entry.kind == PathKind::Package => {
                let suffixed = format!("{origin_path}{INIT_SUFFIX}");
                self.binding_map_guarded(&suffixed, visited)
            }
            _ => self.binding_map_guarded(origin_path, visited),
        }
    }

    fn binding_map_guarded(&self, key: &str, visited: &mut HashSet<String>) -> Rc<BindingMap> {
        if let Some(cached) = self.memo.borrow().get(key) {
            return cached.clone();
        }
        if !visited.insert(key.to_string()) {
            return Rc::new(BindingMap::new());
        }
        let map = Rc::new(self.compute_binding_map(key, visited));
        self.memo.borrow_mut().insert(key.to_string(), map.clone());
        map
    }

    /// Builds the binding map addressed by `key`. A `.__init__`-suffixed key
    /// yields the package's own-statement events (only for an entry whose
    /// bare path is a `Package`); the bare key of a `Package` entry yields
    /// only its auto-bound-children events; the bare key of a `File` entry
    /// yields its own-statement events.
    fn compute_binding_map(&self, key: &str, visited: &mut HashSet<String>) -> BindingMap {
        let mut map = BindingMap::new();

        let events: Vec<AliasEvent> = if let Some(bare) = key.strip_suffix(INIT_SUFFIX) {
            match self.by_path.get(bare) {
                Some(entry) if entry.kind == PathKind::Package => {
                    collect_own_events(entry, &self.basename)
                }
                _ => return map,
            }
        } else {
            match self.by_path.get(key) {
                Some(entry) if entry.kind == PathKind::Package => collect_child_events(entry),
                Some(entry) => collect_own_events(entry, &self.basename),
                None => return map,
            }
        };

        for event in events {
            match event {
                AliasEvent::Bind { alias, original_name, origin_path, kind } => {
                    map.insert(alias, Binding { original_name, origin_path, kind });
                }
                AliasEvent::Delete { alias } => {
                    map.remove(&alias);
                }
                AliasEvent::Wildcard { origin_path } => {
                    let origin_map = self.resolved_module_map_guarded(&origin_path, visited);
                    for (name, binding) in origin_map.iter() {
                        map.insert(
                            name.clone(),
                            Binding {
                                original_name: name.clone(),
                                origin_path: origin_path.clone(),
                                kind: binding.kind.clone(),
                            },
                        );
                    }
                }
            }
        }

        map
    }
}

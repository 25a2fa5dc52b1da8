//! Component E: cycle detection (Tarjan SCC) and C3 linearization with
//! conflict-witness generation.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::graph::{ClassHierarchyGraph, ClassId};

/// The class `x` should precede in its own declared-parent order, but some
/// parent's linearization places `y` before `x` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecedenceWitness {
    pub x: ClassId,
    pub y: ClassId,
    pub parent_with_differing_precedence: ClassId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinearizationStatus {
    /// Full C3 linearization, starting with the class itself.
    Success(Vec<ClassId>),
    /// Computation could not proceed because a parent's own status was
    /// already `Error` (propagated, never produced directly by this pass).
    Error,
    CycleInconsistent,
    SourceLogicalInconsistent(PrecedenceWitness),
    InheritedLogicalInconsistent,
}

impl LinearizationStatus {
    pub fn is_consistent(&self) -> bool {
        matches!(self, LinearizationStatus::Success(_))
    }
}

pub struct ConsistencyReport {
    pub classes_in_cycle: BTreeSet<ClassId>,
    pub sccs: Vec<Vec<ClassId>>,
    pub linearizations: BTreeMap<ClassId, LinearizationStatus>,
}

impl ConsistencyReport {
    pub fn num_cycle_inconsistent(&self) -> usize {
        self.classes_in_cycle.len()
    }

    pub fn num_source_logical_inconsistent(&self) -> usize {
        self.linearizations
            .values()
            .filter(|s| matches!(s, LinearizationStatus::SourceLogicalInconsistent(_)))
            .count()
    }

    pub fn num_inherited_logical_inconsistent(&self) -> usize {
        self.linearizations
            .values()
            .filter(|s| matches!(s, LinearizationStatus::InheritedLogicalInconsistent))
            .count()
    }
}

/// Runs the full consistency check: Tarjan SCC for cycles, then C3
/// linearization in ancestors-first order with conflict-witness output.
pub fn check_consistency(graph: &ClassHierarchyGraph) -> ConsistencyReport {
    let sccs = find_sccs(graph);

    let mut classes_in_cycle = BTreeSet::new();
    for scc in &sccs {
        let is_cycle = if scc.len() == 1 {
            let only = &scc[0];
            graph.parents_of(only).contains(only)
        } else {
            true
        };
        if is_cycle {
            classes_in_cycle.extend(scc.iter().cloned());
        }
    }

    let order = topo_order(graph);
    let mut linearizations: BTreeMap<ClassId, LinearizationStatus> = BTreeMap::new();

    for class_id in order {
        if linearizations.contains_key(&class_id) {
            continue;
        }
        if classes_in_cycle.contains(&class_id) {
            linearizations.insert(class_id, LinearizationStatus::CycleInconsistent);
            continue;
        }

        let parents = graph.parents_of(&class_id).to_vec();
        let mut can_compute = true;
        // Each parent linearization, paired with the parent's identifier so a
        // conflict witness can name the right parent even when some parents
        // were skipped as not-in-codebase.
        let mut parent_lists: Vec<(ClassId, Vec<ClassId>)> = Vec::new();

        for parent in &parents {
            if !graph.contains(parent) {
                // Not a node in this codebase (external, or its defining file
                // failed to parse). Contributes nothing to the merge inputs
                // but stays in the local precedence list below.
                continue;
            }
            match linearizations.get(parent) {
                Some(LinearizationStatus::Success(list)) => {
                    parent_lists.push((parent.clone(), list.clone()));
                }
                Some(LinearizationStatus::Error) => {
                    can_compute = false;
                    linearizations.insert(class_id.clone(), LinearizationStatus::Error);
                    break;
                }
                Some(LinearizationStatus::CycleInconsistent)
                | Some(LinearizationStatus::SourceLogicalInconsistent(_))
                | Some(LinearizationStatus::InheritedLogicalInconsistent) => {
                    can_compute = false;
                    linearizations
                        .insert(class_id.clone(), LinearizationStatus::InheritedLogicalInconsistent);
                    break;
                }
                None => {
                    // Ancestors-first ordering guarantees this shouldn't
                    // happen; treat defensively as "not yet computable".
                    can_compute = false;
                    linearizations.insert(class_id.clone(), LinearizationStatus::Error);
                    break;
                }
            }
        }

        if !can_compute {
            continue;
        }

        let mut merge_inputs: Vec<MergeList> = parent_lists
            .into_iter()
            .map(|(parent, list)| MergeList {
                parent: Some(parent),
                items: list,
            })
            .collect();
        if !parents.is_empty() {
            merge_inputs.push(MergeList {
                parent: None,
                items: parents.clone(),
            });
        }

        match merge(merge_inputs) {
            MergeOutcome::Success(mut tail) => {
                let mut lin = Vec::with_capacity(tail.len() + 1);
                lin.push(class_id.clone());
                lin.append(&mut tail);
                linearizations.insert(class_id, LinearizationStatus::Success(lin));
            }
            MergeOutcome::Conflict(witness) => {
                linearizations.insert(
                    class_id,
                    LinearizationStatus::SourceLogicalInconsistent(witness),
                );
            }
        }
    }

    ConsistencyReport {
        classes_in_cycle,
        sccs,
        linearizations,
    }
}

struct MergeList {
    /// `None` marks the local precedence list (the class's own declared
    /// parent order); `Some(parent)` marks a parent's own linearization.
    parent: Option<ClassId>,
    items: Vec<ClassId>,
}

enum MergeOutcome {
    Success(Vec<ClassId>),
    Conflict(PrecedenceWitness),
}

/// The classical C3 merge: repeatedly take the first head that is not in the
/// tail of any list, remove it everywhere, drop emptied lists, repeat. If no
/// such head exists, compute a conflict witness.
fn merge(mut lists: Vec<MergeList>) -> MergeOutcome {
    let mut result = Vec::new();

    loop {
        lists.retain(|l| !l.items.is_empty());
        if lists.is_empty() {
            return MergeOutcome::Success(result);
        }

        let mut selected: Option<ClassId> = None;
        'heads: for candidate_list in &lists {
            let head = &candidate_list.items[0];
            for other in &lists {
                if other.items.len() > 1 && other.items[1..].contains(head) {
                    continue 'heads;
                }
            }
            selected = Some(head.clone());
            break;
        }

        match selected {
            Some(head) => {
                for list in lists.iter_mut() {
                    if list.items.first() == Some(&head) {
                        list.items.remove(0);
                    }
                }
                result.push(head);
            }
            None => return MergeOutcome::Conflict(precedence_order_mismatch(&lists)),
        }
    }
}

/// `x` is the head of the local precedence list; `y` is found by scanning,
/// for each tail occurrence of `x`, backward from just before that position
/// for an element that also appears after `x` in the local list. The parent
/// whose linearization supplied that tail is the reported culprit.
fn precedence_order_mismatch(lists: &[MergeList]) -> PrecedenceWitness {
    let local = lists
        .iter()
        .find(|l| l.parent.is_none())
        .expect("local precedence list is always present when a conflict is possible");
    let x = local.items[0].clone();
    let after_x: HashSet<&ClassId> = local.items[1..].iter().collect();

    for list in lists {
        if list.parent.is_none() {
            continue;
        }
        if let Some(x_pos) = list.items.iter().position(|item| *item == x) {
            if x_pos == 0 {
                continue;
            }
            for i in (0..x_pos).rev() {
                if after_x.contains(&list.items[i]) {
                    return PrecedenceWitness {
                        x,
                        y: list.items[i].clone(),
                        parent_with_differing_precedence: list
                            .parent
                            .clone()
                            .expect("non-local list always has a parent"),
                    };
                }
            }
        }
    }

    // Defensive fallback: a conflict was detected by `merge` but no witness
    // could be localized (should not happen for well-formed inputs).
    PrecedenceWitness {
        x: x.clone(),
        y: x,
        parent_with_differing_precedence: ClassId::new("<unknown>"),
    }
}

/// Iterative postorder DFS from every class, so that every parent appears
/// before its children in the returned order (cycles are broken arbitrarily;
/// their members are classified by `classes_in_cycle` before linearization
/// runs, so order among them does not matter).
fn topo_order(graph: &ClassHierarchyGraph) -> Vec<ClassId> {
    let mut visited: HashSet<ClassId> = HashSet::new();
    let mut order = Vec::new();

    for start in graph.keys() {
        if visited.contains(start) {
            continue;
        }
        let mut stack: Vec<(ClassId, usize)> = vec![(start.clone(), 0)];
        visited.insert(start.clone());

        while let Some(&(ref v, pos)) = stack.last() {
            let v = v.clone();
            let parents = graph.parents_of(&v).to_vec();
            if pos < parents.len() {
                stack.last_mut().unwrap().1 += 1;
                let p = &parents[pos];
                if !graph.contains(p) || visited.contains(p) {
                    continue;
                }
                visited.insert(p.clone());
                stack.push((p.clone(), 0));
            } else {
                stack.pop();
                order.push(v);
            }
        }
    }

    order
}

/// Tarjan's SCC algorithm, iterative to avoid recursion-depth limits on
/// large codebases. Neighbors outside the graph (external bases) are
/// skipped, matching the graph builder's "closed under in-codebase" model.
fn find_sccs(graph: &ClassHierarchyGraph) -> Vec<Vec<ClassId>> {
    let mut indices: HashMap<ClassId, usize> = HashMap::new();
    let mut lowlink: HashMap<ClassId, usize> = HashMap::new();
    let mut on_stack: HashSet<ClassId> = HashSet::new();
    let mut tarjan_stack: Vec<ClassId> = Vec::new();
    let mut sccs: Vec<Vec<ClassId>> = Vec::new();
    let mut next_index = 0usize;

    for start in graph.keys() {
        if indices.contains_key(start) {
            continue;
        }

        let mut work: Vec<(ClassId, usize)> = vec![(start.clone(), 0)];
        indices.insert(start.clone(), next_index);
        lowlink.insert(start.clone(), next_index);
        next_index += 1;
        tarjan_stack.push(start.clone());
        on_stack.insert(start.clone());

        while !work.is_empty() {
            let frame = work.len() - 1;
            let v = work[frame].0.clone();
            let pos = work[frame].1;
            let neighbors = graph.parents_of(&v).to_vec();

            if pos < neighbors.len() {
                work[frame].1 += 1;
                let w = neighbors[pos].clone();
                if !graph.contains(&w) {
                    continue;
                }
                if !indices.contains_key(&w) {
                    indices.insert(w.clone(), next_index);
                    lowlink.insert(w.clone(), next_index);
                    next_index += 1;
                    tarjan_stack.push(w.clone());
                    on_stack.insert(w.clone());
                    work.push((w, 0));
                } else if on_stack.contains(&w) {
                    let wi = indices[&w];
                    let vl = lowlink[&v];
                    if wi < vl {
                        lowlink.insert(v.clone(), wi);
                    }
                }
            } else {
                work.pop();
                if let Some((parent, _)) = work.last() {
                    let vlow = lowlink[&v];
                    let plow = lowlink[parent];
                    if vlow < plow {
                        lowlink.insert(parent.clone(), vlow);
                    }
                }
                if lowlink[&v] == indices[&v] {
                    let mut scc = Vec::new();
                    loop {
                        let w = tarjan_stack.pop().expect("node pushed before being closed");
                        on_stack.remove(&w);
                        let done = w == v;
                        scc.push(w);
                        if done {
                            break;
                        }
                    }
                    sccs.push(scc);
                }
            }
        }
    }

    sccs
}

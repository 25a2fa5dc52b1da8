//! Consistency-checker acceptance scenarios built directly on the public
//! graph API, independent of any front end that produces one.

use classgraph_core::consistency::{check_consistency, LinearizationStatus};
use classgraph_core::graph::{ClassHierarchyGraph, ClassId};

fn cid(s: &str) -> ClassId {
    ClassId::new(s)
}

fn insert(graph: &mut ClassHierarchyGraph, name: &str, parents: &[&str]) {
    graph.insert_class(cid(name), format!("{name}.py"));
    for p in parents {
        graph.add_parent(&cid(name), cid(p));
    }
}

#[test]
fn linear_chain_linearizes_in_declaration_order() {
    let mut graph = ClassHierarchyGraph::new();
    insert(&mut graph, "a.A", &[]);
    insert(&mut graph, "a.B", &["a.A"]);
    insert(&mut graph, "a.C", &["a.B"]);

    let report = check_consistency(&graph);
    match report.linearizations.get(&cid("a.C")).unwrap() {
        LinearizationStatus::Success(list) => {
            let got: Vec<&str> = list.iter().map(ClassId::as_str).collect();
            assert_eq!(got, vec!["a.C", "a.B", "a.A"]);
        }
        other => panic!("expected Success, got {other:?}"),
    }
}

#[test]
fn diamond_with_shared_grandparent_merges_once() {
    let mut graph = ClassHierarchyGraph::new();
    insert(&mut graph, "a.Base", &[]);
    insert(&mut graph, "a.Left", &["a.Base"]);
    insert(&mut graph, "a.Right", &["a.Base"]);
    insert(&mut graph, "a.Diamond", &["a.Left", "a.Right"]);

    let report = check_consistency(&graph);
    match report.linearizations.get(&cid("a.Diamond")).unwrap() {
        LinearizationStatus::Success(list) => {
            let got: Vec<&str> = list.iter().map(ClassId::as_str).collect();
            assert_eq!(got, vec!["a.Diamond", "a.Left", "a.Right", "a.Base"]);
        }
        other => panic!("expected Success, got {other:?}"),
    }
}

#[test]
fn self_referential_cycle_is_marked_cycle_inconsistent() {
    let mut graph = ClassHierarchyGraph::new();
    graph.insert_class(cid("a.A"), "a.py");
    graph.add_parent(&cid("a.A"), cid("a.B"));
    graph.insert_class(cid("a.B"), "a.py");
    graph.add_parent(&cid("a.B"), cid("a.A"));

    let report = check_consistency(&graph);
    assert!(report.classes_in_cycle.contains(&cid("a.A")));
    assert!(report.classes_in_cycle.contains(&cid("a.B")));
    assert_eq!(
        report.linearizations.get(&cid("a.A")),
        Some(&LinearizationStatus::CycleInconsistent)
    );
    assert_eq!(report.num_cycle_inconsistent(), 2);
}

#[test]
fn conflicting_precedence_carries_a_witness_pair() {
    let mut graph = ClassHierarchyGraph::new();
    insert(&mut graph, "a.X", &[]);
    insert(&mut graph, "a.Y", &[]);
    insert(&mut graph, "a.P", &["a.X", "a.Y"]);
    insert(&mut graph, "a.Q", &["a.Y", "a.X"]);
    insert(&mut graph, "a.R", &["a.P", "a.Q"]);

    let report = check_consistency(&graph);
    match report.linearizations.get(&cid("a.R")).unwrap() {
        LinearizationStatus::SourceLogicalInconsistent(witness) => {
            let names = [witness.x.as_str(), witness.y.as_str()];
            assert!(names.contains(&"a.X"));
            assert!(names.contains(&"a.Y"));
        }
        other => panic!("expected SourceLogicalInconsistent, got {other:?}"),
    }
    assert_eq!(report.num_source_logical_inconsistent(), 1);
}

#[test]
fn inherited_inconsistency_propagates_past_the_conflicted_class() {
    let mut graph = ClassHierarchyGraph::new();
    insert(&mut graph, "a.X", &[]);
    insert(&mut graph, "a.Y", &[]);
    insert(&mut graph, "a.P", &["a.X", "a.Y"]);
    insert(&mut graph, "a.Q", &["a.Y", "a.X"]);
    insert(&mut graph, "a.R", &["a.P", "a.Q"]);
    insert(&mut graph, "a.S", &["a.R"]);

    let report = check_consistency(&graph);
    assert_eq!(
        report.linearizations.get(&cid("a.S")),
        Some(&LinearizationStatus::InheritedLogicalInconsistent)
    );
    assert_eq!(report.num_inherited_logical_inconsistent(), 1);
}

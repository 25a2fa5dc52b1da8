//! Text report writers for the consistency checker CLI: one file per SCC
//! under `cycle_inconsistent_info/`, one per conflicting class under
//! `source_logical_inconsistent_info/`.

use std::fs;
use std::path::Path;

use crate::consistency::{ConsistencyReport, LinearizationStatus};
use crate::error::GraphError;
use crate::graph::ClassHierarchyGraph;

/// Writes both report directories under `out_dir`, creating them on demand
/// and overwriting any existing files, per the CLI's filesystem conventions.
pub fn write_reports(
    report: &ConsistencyReport,
    graph: &ClassHierarchyGraph,
    out_dir: &Path,
) -> Result<(), GraphError> {
    write_cycle_reports(report, graph, out_dir)?;
    write_precedence_reports(report, graph, out_dir)?;
    Ok(())
}

fn create_dir(dir: &Path) -> Result<(), GraphError> {
    fs::create_dir_all(dir).map_err(|source| GraphError::OutputDirCreate {
        path: dir.to_path_buf(),
        source,
    })
}

fn write_cycle_reports(
    report: &ConsistencyReport,
    graph: &ClassHierarchyGraph,
    out_dir: &Path,
) -> Result<(), GraphError> {
    let cycles: Vec<&Vec<_>> = report
        .sccs
        .iter()
        .filter(|scc| scc.iter().all(|c| report.classes_in_cycle.contains(c)))
        .collect();
    if cycles.is_empty() {
        return Ok(());
    }

    let dir = out_dir.join("cycle_inconsistent_info");
    create_dir(&dir)?;

    for scc in cycles {
        let name = scc
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join("_");
        let mut body = String::new();
        body.push_str("Classes in this strongly connected component form a cycle:\n");
        for member in scc {
            let source = graph
                .get(member)
                .map(|e| e.source_file.as_str())
                .unwrap_or("<unknown>");
            body.push_str(&format!("  {member} (defined in {source})\n"));
        }
        fs::write(dir.join(format!("{name}.txt")), body)?;
    }
    Ok(())
}

fn write_precedence_reports(
    report: &ConsistencyReport,
    graph: &ClassHierarchyGraph,
    out_dir: &Path,
) -> Result<(), GraphError> {
    let conflicts: Vec<_> = report
        .linearizations
        .iter()
        .filter_map(|(class_id, status)| match status {
            LinearizationStatus::SourceLogicalInconsistent(witness) => {
                Some((class_id, witness))
            }
            _ => None,
        })
        .collect();
    if conflicts.is_empty() {
        return Ok(());
    }

    let dir = out_dir.join("source_logical_inconsistent_info");
    create_dir(&dir)?;

    for (class_id, witness) in conflicts {
        let class_source = graph
            .get(class_id)
            .map(|e| e.source_file.as_str())
            .unwrap_or("<unknown>");
        let parent_source = graph
            .get(&witness.parent_with_differing_precedence)
            .map(|e| e.source_file.as_str())
            .unwrap_or("<unknown>");
        let body = format!(
            "{class_id} (defined in {class_source}) has an inconsistent precedence order:\n\
             \n\
             {x} is declared before {y} in {class_id}'s own base list,\n\
             but {y} is linearized before {x} in {parent}'s linearization\n\
             (defined in {parent_source}).\n",
            class_id = class_id,
            class_source = class_source,
            x = witness.x,
            y = witness.y,
            parent = witness.parent_with_differing_precedence,
            parent_source = parent_source,
        );
        fs::write(dir.join(format!("{}.txt", class_id.as_str())), body)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consistency::check_consistency;
    use crate::graph::ClassId;
    use tempfile::tempdir;

    fn cid(s: &str) -> ClassId {
        ClassId::new(s)
    }

    #[test]
    fn writes_cycle_report_for_two_node_cycle() {
        let mut g = ClassHierarchyGraph::new();
        g.insert_class(cid("m.M"), "m.py");
        g.insert_class(cid("n.N"), "n.py");
        g.add_parent(&cid("m.M"), cid("n.N"));
        g.add_parent(&cid("n.N"), cid("m.M"));

        let report = check_consistency(&g);
        let dir = tempdir().unwrap();
        write_reports(&report, &g, dir.path()).unwrap();

        let cycle_dir = dir.path().join("cycle_inconsistent_info");
        assert!(cycle_dir.is_dir());
        let entries: Vec<_> = fs::read_dir(&cycle_dir).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn writes_precedence_report_naming_both_classes_and_culprit() {
        let mut g = ClassHierarchyGraph::new();
        g.insert_class(cid("x.X"), "x.py");
        g.insert_class(cid("y.Y"), "y.py");
        g.insert_class(cid("p.P"), "p.py");
        g.insert_class(cid("q.Q"), "q.py");
        g.insert_class(cid("r.R"), "r.py");
        g.add_parent(&cid("p.P"), cid("x.X"));
        g.add_parent(&cid("p.P"), cid("y.Y"));
        g.add_parent(&cid("q.Q"), cid("y.Y"));
        g.add_parent(&cid("q.Q"), cid("x.X"));
        g.add_parent(&cid("r.R"), cid("p.P"));
        g.add_parent(&cid("r.R"), cid("q.Q"));

        let report = check_consistency(&g);
        let dir = tempdir().unwrap();
        write_reports(&report, &g, dir.path()).unwrap();

        let path = dir
            .path()
            .join("source_logical_inconsistent_info")
            .join("r.R.txt");
        let body = fs::read_to_string(path).unwrap();
        assert!(body.contains("x.X"));
        assert!(body.contains("y.Y"));
        assert!(body.contains("q.Q"));
    }

    #[test]
    fn no_directories_created_when_fully_consistent() {
        let mut g = ClassHierarchyGraph::new();
        g.insert_class(cid("a.A"), "a.py");
        let report = check_consistency(&g);
        let dir = tempdir().unwrap();
        write_reports(&report, &g, dir.path()).unwrap();
        assert!(!dir.path().join("cycle_inconsistent_info").exists());
        assert!(!dir.path().join("source_logical_inconsistent_info").exists());
    }
}

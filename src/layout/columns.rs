use std::collections::{BTreeMap, BTreeSet};

use crate::graph::SchemaGraph;

pub(super) struct ColumnAssignment {
    pub(super) columns: BTreeMap<String, usize>,
    /// Residual nodes: assigned column 0 without a dependency depth.
    pub(super) cyclic: BTreeSet<String>,
}

/// Columns express dependency depth: a table lands one column past the
/// deepest table it points at. Sinks (no outgoing relationships) seed
/// column 0 and assignments propagate to a fixpoint; whatever remains is
/// reachable from no sink, i.e. tangled in cycles, and collapses to
/// column 0.
pub(super) fn assign_columns(graph: &SchemaGraph) -> ColumnAssignment {
    let mut columns: BTreeMap<String, usize> = BTreeMap::new();
    let mut cyclic: BTreeSet<String> = BTreeSet::new();

    for (key, node) in &graph.nodes {
        if node.outgoing.is_empty() {
            columns.insert(key.clone(), 0);
        }
    }

    if columns.is_empty() {
        // Fully cyclic schema. Anchor the most-referenced node first so the
        // assignment order stays deterministic, then let the residual rule
        // flatten everything else alongside it.
        let mut anchor: Option<(String, usize)> = None;
        for node in graph.nodes.values() {
            let count = node.incoming.len();
            if anchor.as_ref().map_or(true, |(_, best)| count > *best) {
                anchor = Some((node.key.clone(), count));
            }
        }
        if let Some((anchor, _)) = anchor {
            columns.insert(anchor.clone(), 0);
            cyclic.insert(anchor);
        }
        for key in graph.nodes.keys() {
            columns.entry(key.clone()).or_insert(0);
            cyclic.insert(key.clone());
        }
        return ColumnAssignment { columns, cyclic };
    }

    loop {
        let mut changed = false;
        for (key, node) in &graph.nodes {
            if columns.contains_key(key) {
                continue;
            }
            let mut depth = 0usize;
            let mut ready = true;
            for target in &node.outgoing {
                match columns.get(target) {
                    Some(col) => depth = depth.max(col + 1),
                    None => {
                        ready = false;
                        break;
                    }
                }
            }
            if ready {
                columns.insert(key.clone(), depth);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    for key in graph.nodes.keys() {
        if !columns.contains_key(key) {
            columns.insert(key.clone(), 0);
            cyclic.insert(key.clone());
        }
    }

    ColumnAssignment { columns, cyclic }
}

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};

use crate::graph::{Node, SchemaGraph};

/// Placement accumulator threaded through row assignment.
#[derive(Default)]
struct PlacementGrid {
    occupied: HashSet<(usize, usize)>,
    row_members: BTreeMap<usize, Vec<String>>,
    placed: BTreeMap<String, (usize, usize)>,
}

impl PlacementGrid {
    fn place(&mut self, key: &str, column: usize, row: usize) {
        self.occupied.insert((column, row));
        self.row_members.entry(row).or_default().push(key.to_string());
        self.placed.insert(key.to_string(), (column, row));
    }

    fn next_row(&self) -> usize {
        self.row_members.keys().next_back().map_or(0, |last| last + 1)
    }
}

/// Assign one row per node. Connected nodes prefer sharing a row so the
/// horizontal runs of their edges stay short; multi-connected nodes only
/// join rows made of their own connections, which keeps backbones clean.
/// Row indices are compacted to a dense 0..R before returning.
pub(super) fn assign_rows(
    graph: &SchemaGraph,
    columns: &BTreeMap<String, usize>,
) -> BTreeMap<String, usize> {
    let mut by_column: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
    for (key, column) in columns {
        by_column.entry(*column).or_default().push(key);
    }
    for bucket in by_column.values_mut() {
        // Stable sort: ties keep schema iteration order.
        bucket.sort_by_key(|key| {
            Reverse(graph.nodes.get(*key).map_or(0, |n| n.connections.len()))
        });
    }

    let total = graph.nodes.len();
    let mut grid = PlacementGrid::default();
    for (column, bucket) in &by_column {
        for key in bucket {
            let Some(node) = graph.nodes.get(*key) else { continue };
            let row = pick_row(graph, columns, &grid, node, *column, total);
            grid.place(key, *column, row);
        }
    }

    compact(&grid)
}

fn pick_row(
    graph: &SchemaGraph,
    columns: &BTreeMap<String, usize>,
    grid: &PlacementGrid,
    node: &Node,
    column: usize,
    total: usize,
) -> usize {
    for connection in &node.connections {
        if let Some(&(_, row)) = grid.placed.get(connection) {
            if admissible(graph, columns, grid, node, column, row) {
                return row;
            }
        }
    }
    for row in 0..=total {
        if admissible(graph, columns, grid, node, column, row) {
            return row;
        }
    }
    grid.next_row()
}

fn admissible(
    graph: &SchemaGraph,
    columns: &BTreeMap<String, usize>,
    grid: &PlacementGrid,
    node: &Node,
    column: usize,
    row: usize,
) -> bool {
    if grid.occupied.contains(&(column, row)) {
        return false;
    }
    let members = grid.row_members.get(&row);
    if node.connections.len() <= 1 {
        // A leaf may share a row with its sole connection only when the
        // columns are adjacent; anything further would drag a long
        // horizontal run across the cells in between.
        if let Some(connection) = node.connections.first() {
            let in_row = members.is_some_and(|m| m.iter().any(|k| k == connection));
            if in_row {
                let conn_column = columns.get(connection).copied().unwrap_or(0);
                if column.abs_diff(conn_column) != 1 {
                    return false;
                }
            }
        }
        return true;
    }
    members.is_none_or(|m| {
        m.iter().all(|member| {
            node.connections.iter().any(|c| c == member)
                || graph.nodes.get(member).is_some_and(|n| n.has_self_connection)
        })
    })
}

fn compact(grid: &PlacementGrid) -> BTreeMap<String, usize> {
    let mut dense: BTreeMap<usize, usize> = BTreeMap::new();
    for row in grid.row_members.keys() {
        let next = dense.len();
        dense.insert(*row, next);
    }
    grid.placed
        .iter()
        .map(|(key, (_, row))| (key.clone(), dense.get(row).copied().unwrap_or(0)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::columns::assign_columns;
    use super::*;
    use crate::graph::SchemaGraph;
    use crate::schema::parse_schema;

    fn rows_for(json: &str) -> (SchemaGraph, BTreeMap<String, usize>) {
        let graph = SchemaGraph::build(&parse_schema(json).expect("fixture parse"));
        let assignment = assign_columns(&graph);
        let rows = assign_rows(&graph, &assignment.columns);
        (graph, rows)
    }

    const CHAIN: &str = r#"{"apps": {"p": {"models": {
        "a": {"fields": [], "relationships": [
            {"name": "next", "type": "foreign_key", "direction": "forward",
             "target_app": "p", "target_model": "b"}]},
        "b": {"fields": [], "relationships": [
            {"name": "next", "type": "foreign_key", "direction": "forward",
             "target_app": "p", "target_model": "c"}]},
        "c": {"fields": [], "relationships": []}
    }}}}"#;

    const DIAMOND: &str = r#"{"apps": {"p": {"models": {
        "a": {"fields": [], "relationships": []},
        "b": {"fields": [], "relationships": [
            {"name": "a", "type": "foreign_key", "direction": "forward",
             "target_app": "p", "target_model": "a"}]},
        "c": {"fields": [], "relationships": [
            {"name": "a", "type": "foreign_key", "direction": "forward",
             "target_app": "p", "target_model": "a"}]},
        "d": {"fields": [], "relationships": [
            {"name": "b", "type": "foreign_key", "direction": "forward",
             "target_app": "p", "target_model": "b"},
            {"name": "c", "type": "foreign_key", "direction": "forward",
             "target_app": "p", "target_model": "c"}]}
    }}}}"#;

    #[test]
    fn chain_shares_one_row() {
        let (_, rows) = rows_for(CHAIN);
        assert_eq!(rows["p.a"], 0);
        assert_eq!(rows["p.b"], 0);
        assert_eq!(rows["p.c"], 0);
    }

    #[test]
    fn diamond_splits_the_middle_column() {
        let (_, rows) = rows_for(DIAMOND);
        // b and c both connect to a without connecting to each other, so
        // they cannot share a row even across distinct columns.
        assert_eq!(rows["p.a"], 0);
        assert_eq!(rows["p.b"], 0);
        assert_ne!(rows["p.b"], rows["p.c"]);
        // d joins its first placeable connection's row: row 0 holds a,
        // which is not a connection of d, so d lands beside c.
        assert_eq!(rows["p.d"], rows["p.c"]);
    }

    #[test]
    fn rows_within_a_column_are_distinct() {
        let (graph, rows) = rows_for(DIAMOND);
        let assignment = assign_columns(&graph);
        let mut seen = HashSet::new();
        for (key, row) in &rows {
            assert!(
                seen.insert((assignment.columns[key], *row)),
                "cell collision for {key}"
            );
        }
    }

    #[test]
    fn compaction_renumbers_rows_densely() {
        let (_, rows) = rows_for(DIAMOND);
        let mut used: Vec<usize> = rows.values().copied().collect();
        used.sort_unstable();
        used.dedup();
        let expect: Vec<usize> = (0..used.len()).collect();
        assert_eq!(used, expect);
    }

    #[test]
    fn leaf_shares_row_with_adjacent_connection() {
        let (_, rows) = rows_for(
            r#"{"apps": {"p": {"models": {
                "a": {"fields": [], "relationships": []},
                "b": {"fields": [], "relationships": [
                    {"name": "a", "type": "foreign_key", "direction": "forward",
                     "target_app": "p", "target_model": "a"},
                    {"name": "d", "type": "foreign_key", "direction": "forward",
                     "target_app": "p", "target_model": "d"}]},
                "c": {"fields": [], "relationships": [
                    {"name": "b", "type": "foreign_key", "direction": "forward",
                     "target_app": "p", "target_model": "b"}]},
                "d": {"fields": [], "relationships": []}
            }}}}"#,
        );
        // b sits in column 1 between its two sinks; c, a leaf of b, may
        // share b's row only from the adjacent column 2.
        assert_eq!(rows["p.c"], rows["p.b"]);
    }
}

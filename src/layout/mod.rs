mod columns;
mod rows;
mod routing;
pub(crate) mod types;

pub use types::{Layout, NodeBox, Route};

use std::collections::BTreeMap;

use crate::config::LayoutConfig;
use crate::graph::SchemaGraph;

/// One-shot layout pass: measure, place on the grid, map to pixels, route.
/// Deterministic for a given schema; running it twice yields identical
/// positions and routes.
pub fn compute_layout(graph: &SchemaGraph, config: &LayoutConfig) -> Layout {
    let assignment = columns::assign_columns(graph);
    let row_of = rows::assign_rows(graph, &assignment.columns);

    let mut row_heights: BTreeMap<usize, f32> = BTreeMap::new();
    for (key, row) in &row_of {
        if let Some(node) = graph.nodes.get(key) {
            let entry = row_heights.entry(*row).or_insert(0.0);
            *entry = entry.max(node.height);
        }
    }

    let mut row_tops: BTreeMap<usize, f32> = BTreeMap::new();
    let mut y = config.margin;
    for (row, height) in &row_heights {
        row_tops.insert(*row, y);
        let height = if *height > 0.0 {
            *height
        } else {
            config.default_row_height
        };
        y += height + config.vertical_gap;
    }

    let mut nodes: BTreeMap<String, NodeBox> = BTreeMap::new();
    for (key, node) in &graph.nodes {
        let column = assignment.columns.get(key).copied().unwrap_or(0);
        let row = row_of.get(key).copied().unwrap_or(0);
        nodes.insert(
            key.clone(),
            NodeBox {
                key: key.clone(),
                column,
                row,
                x: column_x(column, config),
                y: row_tops.get(&row).copied().unwrap_or(config.margin),
                width: config.node_width,
                height: node.height,
            },
        );
    }

    let routes = routing::route_edges(graph, &nodes, config);
    let (width, height) = extent(&nodes, config);
    Layout {
        nodes,
        routes,
        cyclic: assignment.cyclic,
        width,
        height,
    }
}

fn column_x(column: usize, config: &LayoutConfig) -> f32 {
    config.margin + column as f32 * (config.node_width + config.horizontal_gap)
}

fn extent(nodes: &BTreeMap<String, NodeBox>, config: &LayoutConfig) -> (f32, f32) {
    let mut right: f32 = 0.0;
    let mut bottom: f32 = 0.0;
    for node in nodes.values() {
        right = right.max(node.x + node.width);
        bottom = bottom.max(node.y + node.height);
    }
    (right + config.margin, bottom + config.margin)
}

impl Layout {
    /// Drag update: move one node and re-route every edge against the new
    /// positions. Grid assignments are left as computed; only a fresh
    /// layout pass changes them.
    pub fn move_node(
        &mut self,
        graph: &SchemaGraph,
        key: &str,
        x: f32,
        y: f32,
        config: &LayoutConfig,
    ) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        node.x = x;
        node.y = y;
        self.routes = routing::route_edges(graph, &self.nodes, config);
        let (width, height) = extent(&self.nodes, config);
        self.width = width;
        self.height = height;
    }
}

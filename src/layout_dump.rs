use crate::graph::SchemaGraph;
use crate::layout::Layout;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub hub: Option<String>,
    pub nodes: Vec<NodeDump>,
    pub routes: Vec<RouteDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub key: String,
    pub app: String,
    pub column: usize,
    pub row: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub cyclic: bool,
    pub has_self_connection: bool,
}

#[derive(Debug, Serialize)]
pub struct RouteDump {
    pub source: String,
    pub target: String,
    pub rel_name: String,
    pub kind: String,
    pub points: Vec<[f32; 2]>,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout, graph: &SchemaGraph) -> Self {
        let nodes = layout
            .nodes
            .values()
            .map(|node| NodeDump {
                key: node.key.clone(),
                app: graph
                    .nodes
                    .get(&node.key)
                    .map(|n| n.app.clone())
                    .unwrap_or_default(),
                column: node.column,
                row: node.row,
                x: node.x,
                y: node.y,
                width: node.width,
                height: node.height,
                cyclic: layout.cyclic.contains(&node.key),
                has_self_connection: graph
                    .nodes
                    .get(&node.key)
                    .is_some_and(|n| n.has_self_connection),
            })
            .collect();

        let routes = layout
            .routes
            .iter()
            .map(|route| RouteDump {
                source: route.source.clone(),
                target: route.target.clone(),
                rel_name: route.rel_name.clone(),
                kind: format!("{:?}", route.kind),
                points: route.points.iter().map(|(x, y)| [*x, *y]).collect(),
            })
            .collect();

        LayoutDump {
            width: layout.width,
            height: layout.height,
            hub: graph.hub_key().map(str::to_string),
            nodes,
            routes,
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout, graph: &SchemaGraph) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, graph);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

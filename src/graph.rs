use std::collections::{BTreeMap, HashSet};

use crate::geometry;
use crate::schema::{ModelRecord, RelKind, Schema};

/// One schema table, with adjacency derived from forward relationships.
/// `outgoing`, `incoming` and `connections` keep insertion order; fan
/// offsets and row-candidate preference are defined in terms of it.
#[derive(Debug, Clone)]
pub struct Node {
    pub key: String,
    pub app: String,
    pub model_name: String,
    pub model: ModelRecord,
    pub height: f32,
    pub outgoing: Vec<String>,
    pub incoming: Vec<String>,
    pub connections: Vec<String>,
    pub has_self_connection: bool,
}

/// A forward relationship between two distinct nodes. The anchor field is
/// resolved once here so the router never re-derives name variants.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub rel_name: String,
    pub kind: RelKind,
    pub anchor_field: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct SchemaGraph {
    pub nodes: BTreeMap<String, Node>,
    pub edges: Vec<Edge>,
}

impl SchemaGraph {
    pub fn build(schema: &Schema) -> Self {
        let mut nodes: BTreeMap<String, Node> = BTreeMap::new();
        for (app_label, app) in &schema.apps {
            for (model_name, model) in &app.models {
                if model.is_abstract {
                    continue;
                }
                let key = format!("{app_label}.{model_name}");
                nodes.insert(
                    key.clone(),
                    Node {
                        key,
                        app: app_label.clone(),
                        model_name: model_name.clone(),
                        model: model.clone(),
                        height: geometry::node_height(model),
                        outgoing: Vec::new(),
                        incoming: Vec::new(),
                        connections: Vec::new(),
                        has_self_connection: false,
                    },
                );
            }
        }

        let mut edges = Vec::new();
        let mut seen: HashSet<(String, String, String)> = HashSet::new();
        let keys: Vec<String> = nodes.keys().cloned().collect();
        for key in &keys {
            let Some(node) = nodes.get(key) else { continue };
            let rels: Vec<_> = node
                .model
                .relationships
                .iter()
                .filter(|rel| rel.is_forward())
                .cloned()
                .collect();
            for rel in rels {
                let target = rel.target_key();
                if target == *key {
                    if let Some(source) = nodes.get_mut(key) {
                        source.has_self_connection = true;
                    }
                    continue;
                }
                // Relationships into filtered-out or unknown models are dropped.
                if !nodes.contains_key(&target) {
                    continue;
                }
                if !seen.insert((key.clone(), target.clone(), rel.name.clone())) {
                    continue;
                }
                if let Some(source) = nodes.get_mut(key) {
                    let anchor_field = geometry::anchor_field_index(&source.model, &rel.name);
                    edges.push(Edge {
                        source: key.clone(),
                        target: target.clone(),
                        rel_name: rel.name.clone(),
                        kind: rel.kind,
                        anchor_field,
                    });
                    push_unique(&mut source.outgoing, &target);
                    push_unique(&mut source.connections, &target);
                }
                if let Some(tgt) = nodes.get_mut(&target) {
                    push_unique(&mut tgt.incoming, key);
                    push_unique(&mut tgt.connections, key);
                }
            }
        }

        Self { nodes, edges }
    }

    /// The node with the greatest total connection count. Reported in the
    /// layout dump; placement does not use it.
    pub fn hub_key(&self) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        for (key, node) in &self.nodes {
            let count = node.connections.len();
            if best.map_or(true, |(_, most)| count > most) {
                best = Some((key, count));
            }
        }
        best.map(|(key, _)| key)
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

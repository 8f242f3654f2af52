use std::collections::{BTreeMap, HashMap};

use crate::config::LayoutConfig;
use crate::geometry::{self, Bounds};
use crate::graph::SchemaGraph;

use super::types::{NodeBox, Route};

// ── Candidate side pairs ────────────────────────────────────────────
// Every edge leaves a vertical side of its source and meets a vertical
// side of its target; the four combinations are tried in this order.
const SIDE_PAIRS: [(Side, Side); 4] = [
    (Side::Right, Side::Left),
    (Side::Right, Side::Right),
    (Side::Left, Side::Left),
    (Side::Left, Side::Right),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
}

impl Segment {
    fn horizontal(&self) -> bool {
        self.y1 == self.y2
    }

    fn length(&self) -> f32 {
        (self.x2 - self.x1).abs() + (self.y2 - self.y1).abs()
    }

    fn blocked_by(&self, bounds: &Bounds) -> bool {
        if self.horizontal() {
            self.y1 >= bounds.top
                && self.y1 <= bounds.bottom
                && self.x1.max(self.x2) > bounds.left
                && self.x1.min(self.x2) < bounds.right
        } else {
            self.x1 >= bounds.left
                && self.x1 <= bounds.right
                && self.y1.max(self.y2) > bounds.top
                && self.y1.min(self.y2) < bounds.bottom
        }
    }

    /// Proper perpendicular crossing; touching endpoints do not count.
    fn crosses(&self, other: &Segment) -> bool {
        let (h, v) = match (self.horizontal(), other.horizontal()) {
            (true, false) => (self, other),
            (false, true) => (other, self),
            _ => return false,
        };
        v.x1 > h.x1.min(h.x2)
            && v.x1 < h.x1.max(h.x2)
            && h.y1 > v.y1.min(v.y2)
            && h.y1 < v.y1.max(v.y2)
    }
}

fn segments_of(points: &[(f32, f32)]) -> Vec<Segment> {
    points
        .windows(2)
        .filter(|pair| pair[0] != pair[1])
        .map(|pair| Segment {
            x1: pair[0].0,
            y1: pair[0].1,
            x2: pair[1].0,
            y2: pair[1].1,
        })
        .collect()
}

/// Route every edge in iteration order. Crossing costs are charged
/// against routes already placed, so earlier edges shape later ones;
/// there is no backtracking.
pub(super) fn route_edges(
    graph: &SchemaGraph,
    nodes: &BTreeMap<String, NodeBox>,
    config: &LayoutConfig,
) -> Vec<Route> {
    let mut incoming_total: HashMap<&str, usize> = HashMap::new();
    for edge in &graph.edges {
        *incoming_total.entry(edge.target.as_str()).or_insert(0) += 1;
    }

    let mut fan_seen: HashMap<&str, usize> = HashMap::new();
    let mut placed: Vec<Segment> = Vec::new();
    let mut routes = Vec::with_capacity(graph.edges.len());

    for edge in &graph.edges {
        let slot = fan_seen.entry(edge.target.as_str()).or_insert(0);
        let fan_index = *slot;
        *slot += 1;

        let (Some(src), Some(tgt)) = (nodes.get(&edge.source), nodes.get(&edge.target)) else {
            continue;
        };
        let Some(target_node) = graph.nodes.get(&edge.target) else {
            continue;
        };

        let total = incoming_total.get(edge.target.as_str()).copied().unwrap_or(1);
        let fan = (fan_index as f32 - (total as f32 - 1.0) / 2.0) * config.fan_step;
        let start_y = src.y + geometry::field_anchor_y(edge.anchor_field);
        let end_y = tgt.y + geometry::pk_anchor_y(&target_node.model) + fan;

        let obstacles: Vec<Bounds> = nodes
            .values()
            .filter(|node| node.key != edge.source && node.key != edge.target)
            .map(NodeBox::bounds)
            .collect();

        let points = route_one(
            src.bounds(),
            tgt.bounds(),
            start_y,
            end_y,
            &obstacles,
            &placed,
            config,
        );
        placed.extend(segments_of(&points));
        routes.push(Route {
            source: edge.source.clone(),
            target: edge.target.clone(),
            rel_name: edge.rel_name.clone(),
            kind: edge.kind,
            points,
        });
    }

    routes
}

fn route_one(
    src: Bounds,
    tgt: Bounds,
    start_y: f32,
    end_y: f32,
    obstacles: &[Bounds],
    placed: &[Segment],
    config: &LayoutConfig,
) -> Vec<(f32, f32)> {
    let (left_runway, right_runway) = wrap_runways(src, tgt, obstacles, config);
    let mut best: Option<(f32, Vec<(f32, f32)>)> = None;

    for (src_side, tgt_side) in SIDE_PAIRS {
        let src_x = side_x(&src, src_side);
        let tgt_x = side_x(&tgt, tgt_side);

        let mut runways: Vec<f32> = Vec::new();
        let mid = (src_x + tgt_x) / 2.0;
        if direct_permitted(src_x, tgt_x, mid, start_y, end_y, src_side, tgt_side, obstacles, config)
        {
            runways.push(mid);
        }
        match (src_side, tgt_side) {
            (Side::Left, Side::Left) => runways.push(left_runway),
            (Side::Right, Side::Right) => runways.push(right_runway),
            _ => {}
        }
        // Last-resort candidates, always emitted; scoring charges them
        // for any node they cut through.
        runways.push(match src_side {
            Side::Right => src_x + config.jog_distance,
            Side::Left => src_x - config.jog_distance,
        });
        runways.push(match src_side {
            Side::Right => right_runway,
            Side::Left => left_runway,
        });

        let mut tried: Vec<f32> = Vec::new();
        for mid_x in runways {
            if tried.iter().any(|x| *x == mid_x) {
                continue;
            }
            tried.push(mid_x);
            let points = build_path_points(src_x, start_y, tgt_x, end_y, mid_x);
            let score = score_route(&points, obstacles, placed, config);
            if best.as_ref().map_or(true, |(lowest, _)| score < *lowest) {
                best = Some((score, points));
            }
        }
    }

    // Unreachable with the always-emitted jogs, but an edge must never be
    // dropped: wrap around the right of everything, unchecked.
    best.map(|(_, points)| points)
        .unwrap_or_else(|| build_path_points(src.right, start_y, tgt.right, end_y, right_runway))
}

fn side_x(bounds: &Bounds, side: Side) -> f32 {
    match side {
        Side::Left => bounds.left,
        Side::Right => bounds.right,
    }
}

/// True when `x` lies outward of the given side: past the right edge for
/// `Right`, before the left edge for `Left`. Used both for leaving the
/// source and for approaching the target from outside the chosen side.
fn heads_outward(side: Side, edge_x: f32, x: f32) -> bool {
    match side {
        Side::Right => x > edge_x,
        Side::Left => x < edge_x,
    }
}

fn direct_permitted(
    src_x: f32,
    tgt_x: f32,
    mid: f32,
    start_y: f32,
    end_y: f32,
    src_side: Side,
    tgt_side: Side,
    obstacles: &[Bounds],
    config: &LayoutConfig,
) -> bool {
    if (mid - src_x).abs() < config.min_direct_run || (tgt_x - mid).abs() < config.min_direct_run {
        return false;
    }
    if !heads_outward(src_side, src_x, mid) || !heads_outward(tgt_side, tgt_x, mid) {
        return false;
    }
    let segments = [
        Segment { x1: src_x, y1: start_y, x2: mid, y2: start_y },
        Segment { x1: mid, y1: start_y, x2: mid, y2: end_y },
        Segment { x1: mid, y1: end_y, x2: tgt_x, y2: end_y },
    ];
    !obstacles.iter().any(|bounds| {
        segments
            .iter()
            .any(|seg| seg.length() > 0.0 && seg.blocked_by(bounds))
    })
}

/// H-V-H template: out of the source at `start_y`, along the runway at
/// `mid_x`, into the target at `end_y`. Degenerate legs collapse so a
/// same-row hop reduces to a single straight segment.
pub(super) fn build_path_points(
    src_x: f32,
    src_y: f32,
    tgt_x: f32,
    tgt_y: f32,
    mid_x: f32,
) -> Vec<(f32, f32)> {
    let mut points = vec![(src_x, src_y)];
    if src_x != mid_x {
        points.push((mid_x, src_y));
    }
    if (src_y - tgt_y).abs() > 1.0 {
        points.push((mid_x, tgt_y));
    }
    if mid_x != tgt_x {
        points.push((tgt_x, tgt_y));
    }
    if points.last() != Some(&(tgt_x, tgt_y)) {
        points.push((tgt_x, tgt_y));
    }
    dedup_collinear(points)
}

fn axis_dir(delta: f32) -> i8 {
    if delta > 0.0 {
        1
    } else if delta < 0.0 {
        -1
    } else {
        0
    }
}

fn dedup_collinear(points: Vec<(f32, f32)>) -> Vec<(f32, f32)> {
    let mut out: Vec<(f32, f32)> = Vec::with_capacity(points.len());
    for point in points {
        if out.last() == Some(&point) {
            continue;
        }
        if out.len() >= 2 {
            let a = out[out.len() - 2];
            let b = out[out.len() - 1];
            let ab = (axis_dir(b.0 - a.0), axis_dir(b.1 - a.1));
            let bp = (axis_dir(point.0 - b.0), axis_dir(point.1 - b.1));
            if ab == bp {
                out.pop();
            }
        }
        out.push(point);
    }
    out
}

fn score_route(
    points: &[(f32, f32)],
    obstacles: &[Bounds],
    placed: &[Segment],
    config: &LayoutConfig,
) -> f32 {
    let segments = segments_of(points);
    let length: f32 = segments.iter().map(Segment::length).sum();
    let turns = segments
        .windows(2)
        .filter(|pair| pair[0].horizontal() != pair[1].horizontal())
        .count();
    let mut crossings = 0usize;
    for segment in &segments {
        for other in placed {
            if segment.crosses(other) {
                crossings += 1;
            }
        }
    }
    let touches = obstacles
        .iter()
        .filter(|bounds| segments.iter().any(|seg| seg.blocked_by(bounds)))
        .count();

    config.weights.length * length
        + config.weights.turn * turns as f32
        + config.weights.crossing * crossings as f32
        + config.weights.node_touch * touches as f32
}

/// Vertical runways just outside the obstacle extent. With no obstacles
/// the endpoints themselves bound the wrap.
fn wrap_runways(src: Bounds, tgt: Bounds, obstacles: &[Bounds], config: &LayoutConfig) -> (f32, f32) {
    let mut left = f32::INFINITY;
    let mut right = f32::NEG_INFINITY;
    for bounds in obstacles {
        left = left.min(bounds.left);
        right = right.max(bounds.right);
    }
    if obstacles.is_empty() {
        left = src.left.min(tgt.left);
        right = src.right.max(tgt.right);
    }
    (left - config.wrap_margin, right + config.wrap_margin)
}

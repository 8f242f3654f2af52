use crate::config::{LayoutConfig, RenderConfig};
use crate::geometry::{Bounds, FIELD_ROW_HEIGHT, HEADER_HEIGHT, MORE_ROW_HEIGHT, VISIBLE_FIELDS_MAX};
use crate::graph::{Node, SchemaGraph};
use crate::layout::Layout;
use crate::path::rounded_path;
use crate::schema::{FieldRecord, RelKind};
use crate::text_metrics::truncate_to_width;
use crate::theme::Theme;
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;

/// Horizontal reach of the self-loop rectangle past the node's right edge.
const SELF_LOOP_REACH: f32 = 40.0;
/// Inner padding of node boxes.
const BOX_PAD_X: f32 = 12.0;

pub fn render_svg(
    graph: &SchemaGraph,
    layout: &Layout,
    theme: &Theme,
    config: &LayoutConfig,
) -> String {
    let mut svg = String::new();
    let width = layout.width.max(200.0);
    let height = layout.height.max(200.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<marker id=\"crow\" viewBox=\"0 0 12 12\" refX=\"12\" refY=\"6\" markerWidth=\"14\" markerHeight=\"14\" markerUnits=\"userSpaceOnUse\" orient=\"auto-start-reverse\"><path d=\"M 12 6 L 0 0 M 12 6 L 0 6 M 12 6 L 0 12\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.2\"/></marker>",
        theme.line_color
    ));
    svg.push_str(&format!(
        "<marker id=\"one\" viewBox=\"0 0 12 12\" refX=\"12\" refY=\"6\" markerWidth=\"14\" markerHeight=\"14\" markerUnits=\"userSpaceOnUse\" orient=\"auto-start-reverse\"><path d=\"M 4 0 L 4 12\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.2\"/></marker>",
        theme.line_color
    ));
    svg.push_str("</defs>");

    for route in &layout.routes {
        svg.push_str(&edge_path_svg(
            &rounded_path(&route.points, config.corner_radius),
            route.kind,
            theme,
        ));
    }

    let accents = app_accent_indices(graph);
    for node in graph.nodes.values() {
        let Some(placed) = layout.nodes.get(&node.key) else {
            continue;
        };
        if node.has_self_connection {
            if let Some(kind) = self_relationship_kind(node) {
                let points = self_loop_points(placed.bounds());
                svg.push_str(&edge_path_svg(
                    &rounded_path(&points, config.corner_radius),
                    kind,
                    theme,
                ));
            }
        }
    }

    for node in graph.nodes.values() {
        let Some(placed) = layout.nodes.get(&node.key) else {
            continue;
        };
        let accent_index = accents.get(node.app.as_str()).copied().unwrap_or(0);
        svg.push_str(&node_svg(
            node,
            placed.bounds(),
            theme.app_accent(accent_index),
            theme,
        ));
    }

    svg.push_str("</svg>");
    svg
}

/// Rectangular loop on the right edge for a self-referential table,
/// spanning the middle third of the node's height.
pub fn self_loop_points(bounds: Bounds) -> Vec<(f32, f32)> {
    let height = bounds.bottom - bounds.top;
    let upper = bounds.top + height / 3.0;
    let lower = bounds.top + height * 2.0 / 3.0;
    vec![
        (bounds.right, upper),
        (bounds.right + SELF_LOOP_REACH, upper),
        (bounds.right + SELF_LOOP_REACH, lower),
        (bounds.right, lower),
    ]
}

fn self_relationship_kind(node: &Node) -> Option<RelKind> {
    node.model
        .relationships
        .iter()
        .find(|rel| rel.is_forward() && rel.target_key() == node.key)
        .map(|rel| rel.kind)
}

fn edge_path_svg(d: &str, kind: RelKind, theme: &Theme) -> String {
    // Crow's-foot notation: the "many" end gets the crow, the "one" end
    // the bar. Forward edges leave the many side for FK and one-to-one.
    let (start_marker, end_marker, dash) = match kind {
        RelKind::ForeignKey => ("crow", "one", ""),
        RelKind::OneToOne => ("one", "one", ""),
        RelKind::ManyToMany => ("crow", "crow", "stroke-dasharray=\"6 4\" "),
    };
    format!(
        "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.4\" {}marker-start=\"url(#{})\" marker-end=\"url(#{})\"/>",
        d, theme.line_color, dash, start_marker, end_marker
    )
}

fn app_accent_indices(graph: &SchemaGraph) -> BTreeMap<&str, usize> {
    let mut indices = BTreeMap::new();
    for node in graph.nodes.values() {
        let next = indices.len();
        indices.entry(node.app.as_str()).or_insert(next);
    }
    indices
}

fn node_svg(node: &Node, bounds: Bounds, accent: &str, theme: &Theme) -> String {
    let mut svg = String::new();
    let x = bounds.left;
    let y = bounds.top;
    let width = bounds.right - bounds.left;
    let height = bounds.bottom - bounds.top;
    let text_budget = width - BOX_PAD_X * 2.0;

    svg.push_str(&format!(
        "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{width:.2}\" height=\"{height:.2}\" rx=\"6\" ry=\"6\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.4\"/>",
        theme.node_fill, theme.node_border
    ));
    let separator_y = y + HEADER_HEIGHT;
    svg.push_str(&format!(
        "<line x1=\"{x:.2}\" y1=\"{separator_y:.2}\" x2=\"{:.2}\" y2=\"{separator_y:.2}\" stroke=\"{accent}\" stroke-width=\"2\"/>",
        x + width
    ));

    let title = truncate_to_width(
        node.model.display_name(&node.model_name),
        text_budget,
        theme.font_size,
        &theme.font_family,
    );
    svg.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{}\" font-weight=\"600\" fill=\"{}\">{}</text>",
        x + BOX_PAD_X,
        y + 22.0,
        theme.font_family,
        theme.font_size,
        theme.header_text,
        escape_xml(&title)
    ));
    let table = if node.model.db_table.is_empty() {
        node.model_name.clone()
    } else {
        node.model.db_table.clone()
    };
    let subtitle_size = theme.font_size * 0.85;
    let subtitle = truncate_to_width(
        &format!("{} · {}", node.app, table),
        text_budget,
        subtitle_size,
        &theme.font_family,
    );
    svg.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{subtitle_size}\" fill=\"{accent}\">{}</text>",
        x + BOX_PAD_X,
        y + 40.0,
        theme.font_family,
        escape_xml(&subtitle)
    ));

    let shown = node.model.fields.len().min(VISIBLE_FIELDS_MAX);
    for (index, field) in node.model.fields.iter().take(VISIBLE_FIELDS_MAX).enumerate() {
        svg.push_str(&field_row_svg(field, index, bounds, theme));
    }
    let hidden = node.model.fields.len().saturating_sub(VISIBLE_FIELDS_MAX);
    if hidden > 0 {
        let more_y =
            y + HEADER_HEIGHT + 16.0 + shown as f32 * FIELD_ROW_HEIGHT + MORE_ROW_HEIGHT / 2.0
                + theme.font_size * 0.35;
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{more_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{subtitle_size}\" fill=\"{}\">+{hidden} more</text>",
            x + width / 2.0,
            theme.font_family,
            theme.type_text
        ));
    }

    svg
}

fn field_row_svg(field: &FieldRecord, index: usize, bounds: Bounds, theme: &Theme) -> String {
    let mut svg = String::new();
    let baseline = bounds.top
        + HEADER_HEIGHT
        + 8.0
        + index as f32 * FIELD_ROW_HEIGHT
        + FIELD_ROW_HEIGHT / 2.0
        + theme.font_size * 0.35;
    let width = bounds.right - bounds.left;
    let half_budget = (width - BOX_PAD_X * 2.0) / 2.0;

    let (name_fill, name_weight) = if field.primary_key {
        (theme.pk_text.as_str(), " font-weight=\"600\"")
    } else {
        (theme.field_text.as_str(), "")
    };
    let name = truncate_to_width(&field.name, half_budget, theme.font_size, &theme.font_family);
    svg.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{baseline:.2}\" font-family=\"{}\" font-size=\"{}\"{name_weight} fill=\"{name_fill}\">{}</text>",
        bounds.left + BOX_PAD_X,
        theme.font_family,
        theme.font_size,
        escape_xml(&name)
    ));

    let mut type_label = field.field_type.clone();
    if let Some(max_length) = field.max_length {
        type_label.push_str(&format!("({max_length})"));
    }
    let type_size = theme.font_size * 0.85;
    let type_label = truncate_to_width(&type_label, half_budget, type_size, &theme.font_family);
    svg.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{baseline:.2}\" text-anchor=\"end\" font-family=\"{}\" font-size=\"{type_size}\" fill=\"{}\">{}</text>",
        bounds.right - BOX_PAD_X,
        theme.font_family,
        theme.type_text,
        escape_xml(&type_label)
    ));
    svg
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{svg}");
        }
    }
    Ok(())
}

pub fn write_output_png(
    svg: &str,
    output: &Path,
    render_cfg: &RenderConfig,
    theme: &Theme,
) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = primary_font(&theme.font_family);
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .unwrap_or(usvg::Size::from_wh(800.0, 600.0).expect("static raster size"));
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn primary_font(fonts: &str) -> String {
    fonts
        .split(',')
        .map(|s| s.trim().trim_matches('"'))
        .find(|s| !s.is_empty())
        .unwrap_or("Inter")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::compute_layout;
    use crate::schema::parse_schema;

    #[test]
    fn renders_nodes_edges_and_markers() {
        let schema = parse_schema(
            r#"{"apps": {"blog": {"models": {
                "post": {"verbose_name": "post", "db_table": "blog_post",
                  "fields": [
                    {"name": "id", "type": "AutoField", "primary_key": true},
                    {"name": "title", "type": "CharField", "max_length": 300}],
                  "relationships": [{"name": "author", "type": "foreign_key",
                    "direction": "forward", "target_app": "blog", "target_model": "user"}]},
                "user": {"fields": [
                    {"name": "id", "type": "AutoField", "primary_key": true}],
                  "relationships": []}
            }}}}"#,
        )
        .expect("fixture parse");
        let graph = SchemaGraph::build(&schema);
        let config = LayoutConfig::default();
        let layout = compute_layout(&graph, &config);
        let svg = render_svg(&graph, &layout, &Theme::modern(), &config);
        assert!(svg.contains("<svg"));
        assert!(svg.contains("blog_post"));
        assert!(svg.contains("CharField(300)"));
        assert!(svg.contains("marker-start=\"url(#crow)\""));
        assert!(svg.contains("marker-end=\"url(#one)\""));
    }

    #[test]
    fn self_loop_spans_the_middle_third() {
        let points = self_loop_points(Bounds::new(50.0, 50.0, 220.0, 90.0));
        assert_eq!(
            points,
            vec![(270.0, 80.0), (310.0, 80.0), (310.0, 110.0), (270.0, 110.0)]
        );
    }

    #[test]
    fn self_reference_is_drawn_without_a_route() {
        let schema = parse_schema(
            r#"{"apps": {"tree": {"models": {"node": {
                "fields": [{"name": "id", "type": "AutoField", "primary_key": true}],
                "relationships": [{"name": "parent", "type": "foreign_key",
                    "direction": "forward", "target_app": "tree", "target_model": "node"}]
            }}}}}"#,
        )
        .expect("fixture parse");
        let graph = SchemaGraph::build(&schema);
        let config = LayoutConfig::default();
        let layout = compute_layout(&graph, &config);
        assert!(layout.routes.is_empty());
        let svg = render_svg(&graph, &layout, &Theme::modern(), &config);
        // The loop still shows up with foreign-key markers.
        assert!(svg.contains("url(#crow)"));
    }

    #[test]
    fn overflowing_fields_collapse_into_a_more_row() {
        let fields: Vec<String> = (0..8)
            .map(|i| format!(r#"{{"name": "f{i}", "type": "CharField"}}"#))
            .collect();
        let schema = parse_schema(&format!(
            r#"{{"apps": {{"a": {{"models": {{"wide": {{
                "fields": [{}], "relationships": []}}}}}}}}}}"#,
            fields.join(",")
        ))
        .expect("fixture parse");
        let graph = SchemaGraph::build(&schema);
        let config = LayoutConfig::default();
        let layout = compute_layout(&graph, &config);
        let svg = render_svg(&graph, &layout, &Theme::modern(), &config);
        assert!(svg.contains("+3 more"));
        assert!(!svg.contains(">f7<"));
    }
}

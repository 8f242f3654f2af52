pub mod cli;
pub mod config;
pub mod geometry;
pub mod graph;
pub mod layout;
pub mod layout_dump;
pub mod path;
pub mod render;
pub mod schema;
pub mod text_metrics;
pub mod theme;

pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig};
pub use graph::SchemaGraph;
pub use layout::{Layout, compute_layout};
pub use render::render_svg;
pub use schema::{Schema, parse_schema};
pub use theme::Theme;

/// Everything `render_schema` needs besides the schema itself.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
}

impl RenderOptions {
    pub fn modern() -> Self {
        Self {
            theme: Theme::modern(),
            layout: LayoutConfig::default(),
        }
    }

    pub fn classic() -> Self {
        Self {
            theme: Theme::classic(),
            layout: LayoutConfig::default(),
        }
    }
}

/// One-call surface used by the wasm bindings: schema JSON in, SVG out.
pub fn render_schema(schema_json: &str, options: &RenderOptions) -> anyhow::Result<String> {
    let schema = parse_schema(schema_json)?;
    let graph = SchemaGraph::build(&schema);
    let layout = compute_layout(&graph, &options.layout);
    Ok(render_svg(&graph, &layout, &options.theme, &options.layout))
}

use erd_renderer::{RenderOptions, render_schema};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    node_width: Option<f32>,
}

fn build_render_options(options: SchemaRenderOptions) -> RenderOptions {
    let mut render_options = if options.theme.as_deref() == Some("classic") {
        RenderOptions::classic()
    } else {
        RenderOptions::modern()
    };

    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        render_options.theme.font_size = font_size;
    }
    if let Some(node_width) = options.node_width {
        render_options.layout.node_width = node_width;
    }

    render_options
}

#[wasm_bindgen]
pub fn render_schema_svg(schema_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<SchemaRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        SchemaRenderOptions::default()
    };

    let render_options = build_render_options(options);
    render_schema(schema_json, &render_options)
        .map_err(|error| JsValue::from_str(&error.to_string()))
}

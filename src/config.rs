use crate::theme::Theme;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Weights applied to routing candidates; lower total wins.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub length: f32,
    pub turn: f32,
    pub crossing: f32,
    pub node_touch: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            length: 1.0,
            turn: 50.0,
            crossing: 200.0,
            node_touch: 500.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Uniform node box width.
    pub node_width: f32,
    /// Horizontal gap between grid columns.
    pub horizontal_gap: f32,
    /// Vertical gap between grid rows.
    pub vertical_gap: f32,
    /// Offset of column 0 / row 0 from the canvas origin.
    pub margin: f32,
    /// Row height used when a row holds no measurable node.
    pub default_row_height: f32,
    /// Corner radius for emitted edge paths.
    pub corner_radius: f32,
    /// Vertical spread between parallel incoming edges at a shared target.
    pub fan_step: f32,
    /// Clearance of the outer-wrap runways beyond the obstacle extent.
    pub wrap_margin: f32,
    /// Runway offset of the short-jog fallback candidate.
    pub jog_distance: f32,
    /// Minimum horizontal run for a direct route to be considered.
    pub min_direct_run: f32,
    pub weights: ScoreWeights,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 220.0,
            horizontal_gap: 150.0,
            vertical_gap: 100.0,
            margin: 50.0,
            default_row_height: 180.0,
            corner_radius: 8.0,
            fan_step: 12.0,
            wrap_margin: 40.0,
            jog_distance: 30.0,
            min_direct_run: 20.0,
            weights: ScoreWeights::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Raster width for PNG output.
    pub width: f32,
    /// Raster height for PNG output.
    pub height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let raw = std::fs::read_to_string(path)?;
    let config = serde_json::from_str(&raw)?;
    Ok(config)
}

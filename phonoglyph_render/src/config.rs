// Layout configuration for the renderers and the geometry sketch.
//
// All page geometry lives in `LayoutConfig`: page size, margins, glyph
// radius, the arc/chevron score threshold, stress scaling, word and line
// spacing, plus the polycloud and sketch parameter groups. The renderers
// read every dimension from here rather than from constants, and the
// binary can override any subset from a JSON file (`--config`); missing
// fields fall back to `Default`.
//
// The config is built once per run and passed by reference; nothing in
// the render path mutates it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// Polycloud glyph dimensions. A syllable of `n` phones at stress `s` is a
/// `(base_width + width_per_phone * n) x (base_height + height_per_stress * s)`
/// bulge curve with `sides_per_phone * n` sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolycloudParams {
    pub base_width: f64,
    pub width_per_phone: f64,
    pub base_height: f64,
    pub height_per_stress: f64,
    pub sides_per_phone: usize,
    /// Horizontal advance per syllable, as a multiple of its width.
    pub advance_factor: f64,
    /// Gap between syllables within a word.
    pub syllable_gap: f64,
    /// Vertical offset of syllable centers below the word origin.
    pub baseline_offset: f64,
}

impl Default for PolycloudParams {
    fn default() -> Self {
        PolycloudParams {
            base_width: 5.0,
            width_per_phone: 2.0,
            base_height: 5.0,
            height_per_stress: 5.0,
            sides_per_phone: 3,
            advance_factor: 3.0,
            syllable_gap: 10.0,
            baseline_offset: 15.0,
        }
    }
}

/// The geometry sketch grid: one row per side count, one column per
/// roundness value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchParams {
    pub side_counts: Vec<usize>,
    pub roundness_steps: Vec<f64>,
    /// Edge length of each grid cell.
    pub cell_size: f64,
    /// Scale applied to the unit-circle curve inside a cell.
    pub curve_scale: f64,
}

impl Default for SketchParams {
    fn default() -> Self {
        SketchParams {
            side_counts: vec![3, 4, 5, 6, 8],
            roundness_steps: vec![0.0, 0.25, 0.5, 0.75, 1.0],
            cell_size: 110.0,
            curve_scale: 22.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub page_width: f64,
    pub page_height: f64,
    /// Cursor start and line-reset x.
    pub margin_x: f64,
    /// Cursor start y (first baseline).
    pub margin_y: f64,
    /// Radius of one phone glyph; each phone advances `2 * phone_radius`.
    pub phone_radius: f64,
    /// Phones scoring above this draw as arcs, otherwise chevrons.
    pub arc_threshold: f64,
    /// Vertical scale per stress level: `1 + stress * stress_scale_step`.
    pub stress_scale_step: f64,
    pub word_gap: f64,
    pub line_height: f64,
    pub polycloud: PolycloudParams,
    pub sketch: SketchParams,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            page_width: 612.0,
            page_height: 792.0,
            margin_x: 10.0,
            margin_y: 20.0,
            phone_radius: 5.0,
            arc_threshold: 0.5,
            stress_scale_step: 0.25,
            word_gap: 20.0,
            line_height: 60.0,
            polycloud: PolycloudParams::default(),
            sketch: SketchParams::default(),
        }
    }
}

impl LayoutConfig {
    /// Parse a (possibly partial) config from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let data = std::fs::read_to_string(path)?;
        let config = Self::from_json(&data).map_err(|source| RenderError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("loaded layout config from {}", path.display());
        Ok(config)
    }

    /// Vertical glyph scale for a stress level.
    pub fn stress_scale(&self, stress: u8) -> f64 {
        1.0 + f64::from(stress) * self.stress_scale_step
    }
}

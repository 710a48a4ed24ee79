// Glyph rendering crate for phonoglyph.
//
// Consumes a `StructuredCorpus` from `phonoglyph_lexicon` and draws one glyph
// per phone (arc style) or per syllable (polycloud style) onto a
// `DrawingSurface`, plus the standalone bulge-curve sketch.
//
// Architecture:
// - `geometry.rs`: `Point`, the perpendicular-bisector bulge construction,
//   and `bulge_curve()` for regular N-gons
// - `surface.rs`: `DrawingSurface` trait, `Transform`, and the buffered
//   `SvgSurface` that flushes on `finish()` or drop
// - `renderer.rs`: cursor-driven layout for both glyph styles and
//   `render_sketch()`
// - `config.rs`: `LayoutConfig` (serde, all-defaulted) with polycloud and
//   sketch parameter groups
// - `error.rs`: `RenderError`, the binary's unified error
//
// The `phonoglyph` binary (`main.rs`) wires cache build, corpus structuring
// and rendering together and writes the SVG to stdout.

pub mod config;
pub mod error;
pub mod geometry;
pub mod renderer;
pub mod surface;

pub use config::{LayoutConfig, PolycloudParams, SketchParams};
pub use error::RenderError;
pub use geometry::{BulgeCurve, CubicSegment, GeometryError, Point, bulge_curve};
pub use renderer::{GlyphStyle, LayoutSummary, render_corpus, render_sketch};
pub use surface::{ArcSweep, DrawingSurface, Rect, SvgSurface, Transform};

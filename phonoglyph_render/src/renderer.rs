// Glyph layout: structured corpus -> drawing surface.
//
// Two glyph styles share the same cursor discipline. The cursor starts at
// (margin_x, margin_y); each word is laid out left to right at the cursor,
// the cursor then advances by the word's width plus `word_gap`, and at the
// end of each corpus line x resets to the margin and y advances by
// `line_height`. Lines never wrap.
//
// - Arcs: every phone occupies a `2r`-wide cell. Phones scoring above
//   `arc_threshold` draw a half circle, the rest a chevron, and both flip
//   up/down with phone parity. Each syllable is drawn in a group scaled
//   vertically by `1 + stress * stress_scale_step`, and gets a bounding
//   rectangle; each word gets one around all of its syllables.
// - Polycloud: each syllable is one bulge curve (see `geometry.rs`) with
//   three sides per phone, its roundness the syllable's mean phone score,
//   scaled by phone count horizontally and stress vertically.
//
// Syllables without phones and words without syllables contribute zero
// width. Every phone must carry a baked score: a corpus with an unscored
// phone fails with `UnscoredPhone` before anything is drawn. Beyond that the
// arc style cannot fail, and the polycloud style only on geometry errors,
// which real lexicon data does not produce.
//
// `render_sketch()` draws the standalone grid of bulge curves used to study
// the construction across side counts and roundness values.

use std::str::FromStr;

use phonoglyph_lexicon::{StructuredCorpus, Syllabification, Syllable};

use crate::config::LayoutConfig;
use crate::error::RenderError;
use crate::geometry::{GeometryError, Point, bulge_curve};
use crate::surface::{ArcSweep, DrawingSurface, Rect, Transform};

/// Which glyph motif to draw syllables with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GlyphStyle {
    #[default]
    Arcs,
    Polycloud,
}

impl FromStr for GlyphStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "arcs" | "arc" => Ok(GlyphStyle::Arcs),
            "polycloud" | "cloud" => Ok(GlyphStyle::Polycloud),
            other => Err(format!("unknown glyph style {other:?} (expected arcs or polycloud)")),
        }
    }
}

/// Counts and extent of a finished layout.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutSummary {
    pub words: usize,
    pub syllables: usize,
    /// Individual phone glyphs (arcs and chevrons) or curves drawn.
    pub glyphs: usize,
    /// Rightmost x reached by any word.
    pub max_x: f64,
    /// Baseline of the last line laid out.
    pub last_baseline: f64,
}

/// Render `corpus` in the given style.
pub fn render_corpus(
    corpus: &StructuredCorpus,
    surface: &mut impl DrawingSurface,
    config: &LayoutConfig,
    style: GlyphStyle,
) -> Result<LayoutSummary, RenderError> {
    let summary = match style {
        GlyphStyle::Arcs => render_arcs(corpus, surface, config)?,
        GlyphStyle::Polycloud => render_polyclouds(corpus, surface, config)?,
    };
    if summary.max_x > config.page_width || summary.last_baseline > config.page_height {
        log::warn!(
            "layout extends past the {}x{} page (reached x={:.0}, y={:.0})",
            config.page_width,
            config.page_height,
            summary.max_x,
            summary.last_baseline
        );
    }
    log::info!(
        "rendered {} words, {} syllables, {} glyphs",
        summary.words,
        summary.syllables,
        summary.glyphs
    );
    Ok(summary)
}

/// Arc/chevron layout.
pub fn render_arcs(
    corpus: &StructuredCorpus,
    surface: &mut impl DrawingSurface,
    config: &LayoutConfig,
) -> Result<LayoutSummary, RenderError> {
    corpus.require_scored()?;
    let mut summary = LayoutSummary::default();
    let mut cursor = Point::new(config.margin_x, config.margin_y);

    for line in corpus.lines() {
        for word in line {
            let width = draw_arc_word(word, cursor, surface, config, &mut summary)?;
            summary.words += 1;
            summary.max_x = summary.max_x.max(cursor.x + width);
            cursor.x += width + config.word_gap;
        }
        summary.last_baseline = cursor.y;
        cursor.x = config.margin_x;
        cursor.y += config.line_height;
    }
    Ok(summary)
}

/// Draw one word with its baseline-left at `origin`; returns its width.
fn draw_arc_word(
    word: &Syllabification,
    origin: Point,
    surface: &mut impl DrawingSurface,
    config: &LayoutConfig,
    summary: &mut LayoutSummary,
) -> Result<f64, RenderError> {
    let r = config.phone_radius;
    let mut x = origin.x;
    let mut max_scale: f64 = 0.0;

    for syl in &word.syllables {
        if syl.phones.is_empty() {
            continue;
        }
        let scale = config.stress_scale(syl.stress.level());
        let width = 2.0 * r * syl.phones.len() as f64;

        surface.begin_group(Transform::translate(x, origin.y).then_scale(1.0, scale));
        draw_arc_syllable(&word.word, syl, surface, config)?;
        surface.end_group();
        surface.rect(Rect {
            x,
            y: origin.y - r * scale,
            width,
            height: 2.0 * r * scale,
        });

        summary.syllables += 1;
        summary.glyphs += syl.phones.len();
        max_scale = max_scale.max(scale);
        x += width;
    }

    let word_width = x - origin.x;
    if word_width > 0.0 {
        surface.rect(Rect {
            x: origin.x,
            y: origin.y - r * max_scale,
            width: word_width,
            height: 2.0 * r * max_scale,
        });
    }
    Ok(word_width)
}

/// Phone glyphs in syllable-local coordinates: cell `i` spans
/// `[2ri, 2r(i+1)]` on the baseline y = 0.
fn draw_arc_syllable(
    word: &str,
    syl: &Syllable,
    surface: &mut impl DrawingSurface,
    config: &LayoutConfig,
) -> Result<(), RenderError> {
    let r = config.phone_radius;
    for (i, phone) in syl.phones.iter().enumerate() {
        let left = Point::new(2.0 * r * i as f64, 0.0);
        let right = Point::new(left.x + 2.0 * r, 0.0);
        let sweep = ArcSweep::for_index(i);
        if phone.require_score(word)? > config.arc_threshold {
            surface.half_circle(left, right, sweep);
        } else {
            let apex_y = match sweep {
                ArcSweep::Up => -r,
                ArcSweep::Down => r,
            };
            surface.polyline(&[left, Point::new(left.x + r, apex_y), right]);
        }
    }
    Ok(())
}

/// Polycloud layout.
pub fn render_polyclouds(
    corpus: &StructuredCorpus,
    surface: &mut impl DrawingSurface,
    config: &LayoutConfig,
) -> Result<LayoutSummary, RenderError> {
    corpus.require_scored()?;
    let params = &config.polycloud;
    let mut summary = LayoutSummary::default();
    let mut cursor = Point::new(config.margin_x, config.margin_y);

    for line in corpus.lines() {
        for word in line {
            surface.begin_group(Transform::translate(cursor.x, cursor.y));
            let mut offset = params.syllable_gap;
            for syl in &word.syllables {
                let phones = syl.phones.len();
                if phones == 0 {
                    continue;
                }
                let width = params.base_width + params.width_per_phone * phones as f64;
                let height = params.base_height + params.height_per_stress * f64::from(syl.stress.level());
                let roundness = syl
                    .phones
                    .iter()
                    .map(|p| p.require_score(&word.word))
                    .sum::<Result<f64, _>>()?
                    / phones as f64;
                let curve = bulge_curve(params.sides_per_phone * phones, roundness)?;

                surface.begin_group(
                    Transform::translate(offset, params.baseline_offset).then_scale(width, height),
                );
                surface.cubic_path(curve.start, &curve.segments, true);
                surface.end_group();

                summary.syllables += 1;
                summary.glyphs += 1;
                offset += width * params.advance_factor + params.syllable_gap;
            }
            surface.end_group();

            let word_width = offset - params.syllable_gap;
            summary.words += 1;
            summary.max_x = summary.max_x.max(cursor.x + word_width);
            cursor.x += word_width + config.word_gap;
        }
        summary.last_baseline = cursor.y;
        cursor.x = config.margin_x;
        cursor.y += config.line_height;
    }
    Ok(summary)
}

/// Draw the bulge-curve study grid; returns the number of curves drawn.
pub fn render_sketch(
    surface: &mut impl DrawingSurface,
    config: &LayoutConfig,
) -> Result<usize, GeometryError> {
    let sketch = &config.sketch;
    let mut drawn = 0;
    for (row, &sides) in sketch.side_counts.iter().enumerate() {
        for (col, &roundness) in sketch.roundness_steps.iter().enumerate() {
            let curve = bulge_curve(sides, roundness)?;
            let center = Point::new(
                config.margin_x + sketch.cell_size * (col as f64 + 0.5),
                config.margin_y + sketch.cell_size * (row as f64 + 0.5),
            );
            surface.begin_group(
                Transform::translate(center.x, center.y)
                    .then_scale(sketch.curve_scale, sketch.curve_scale),
            );
            surface.cubic_path(curve.start, &curve.segments, true);
            surface.end_group();
            drawn += 1;
        }
    }
    log::info!("sketched {drawn} bulge curves");
    Ok(drawn)
}

// Drawing surface abstraction and its SVG implementation.
//
// Renderers only talk to `DrawingSurface`: grouped transforms, half-circle
// arcs, polylines, rectangles, and closed cubic paths. `SvgSurface` is the
// one production implementation; tests substitute a recording surface.
//
// `SvgSurface` buffers the document body in memory and writes the whole
// document to its sink on `finish()`. If it is dropped without `finish()`
// (an error unwound past it) the drop handler still closes any open groups,
// terminates the document, and flushes the sink, so the output is always a
// well-formed SVG.

use std::io::{self, Write};

use crate::geometry::{CubicSegment, Point};

/// Which way a half-circle bulges in page coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcSweep {
    Up,
    Down,
}

impl ArcSweep {
    /// Alternate by phone parity: even up, odd down.
    pub fn for_index(index: usize) -> Self {
        if index % 2 == 0 { ArcSweep::Up } else { ArcSweep::Down }
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A group transform: translate, then scale in the translated frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translate: (f64, f64),
    pub scale: (f64, f64),
}

impl Transform {
    pub fn translate(x: f64, y: f64) -> Self {
        Transform {
            translate: (x, y),
            scale: (1.0, 1.0),
        }
    }

    pub fn then_scale(self, sx: f64, sy: f64) -> Self {
        Transform {
            scale: (self.scale.0 * sx, self.scale.1 * sy),
            ..self
        }
    }

    /// Map a local point into the parent frame.
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.translate.0 + p.x * self.scale.0,
            self.translate.1 + p.y * self.scale.1,
        )
    }
}

/// The 2D drawing operations renderers need.
pub trait DrawingSurface {
    /// Push a transformed group; balanced by `end_group()`.
    fn begin_group(&mut self, transform: Transform);
    fn end_group(&mut self);
    /// Half circle with diameter `from -> to`.
    fn half_circle(&mut self, from: Point, to: Point, sweep: ArcSweep);
    fn polyline(&mut self, points: &[Point]);
    fn rect(&mut self, rect: Rect);
    fn cubic_path(&mut self, start: Point, segments: &[CubicSegment], closed: bool);
}

/// Format a coordinate compactly: at most 3 decimals, no trailing zeros.
pub(crate) fn num(v: f64) -> String {
    let s = format!("{v:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// SVG path data (`M ... C ... Z`) for a cubic path.
pub fn path_data(start: Point, segments: &[CubicSegment], closed: bool) -> String {
    let mut d = format!("M {} {}", num(start.x), num(start.y));
    for seg in segments {
        d.push_str(&format!(
            " C {} {}, {} {}, {} {}",
            num(seg.control1.x),
            num(seg.control1.y),
            num(seg.control2.x),
            num(seg.control2.y),
            num(seg.end.x),
            num(seg.end.y)
        ));
    }
    if closed {
        d.push_str(" Z");
    }
    d
}

/// SVG writer over any `io::Write` sink.
pub struct SvgSurface<W: Write> {
    sink: Option<W>,
    width: f64,
    height: f64,
    body: String,
    depth: usize,
}

impl<W: Write> SvgSurface<W> {
    pub fn new(sink: W, width: f64, height: f64) -> Self {
        SvgSurface {
            sink: Some(sink),
            width,
            height,
            body: String::new(),
            depth: 0,
        }
    }

    /// The document body written so far (without header or closing tags).
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Write the complete document, flush, and hand back the sink.
    pub fn finish(mut self) -> io::Result<W> {
        let Some(mut sink) = self.sink.take() else {
            return Err(io::Error::other("svg surface already finished"));
        };
        self.write_document(&mut sink)?;
        Ok(sink)
    }

    fn write_document(&self, sink: &mut W) -> io::Result<()> {
        let (w, h) = (num(self.width), num(self.height));
        writeln!(sink, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            sink,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        )?;
        writeln!(sink, r#"<g fill="none" stroke="black" stroke-width="1">"#)?;
        sink.write_all(self.body.as_bytes())?;
        for _ in 0..self.depth {
            writeln!(sink, "</g>")?;
        }
        writeln!(sink, "</g>")?;
        writeln!(sink, "</svg>")?;
        sink.flush()
    }

    fn line(&mut self, element: std::fmt::Arguments<'_>) {
        self.body.push_str(&element.to_string());
        self.body.push('\n');
    }
}

impl<W: Write> Drop for SvgSurface<W> {
    fn drop(&mut self) {
        if let Some(mut sink) = self.sink.take() {
            if let Err(e) = self.write_document(&mut sink) {
                log::warn!("failed to flush unfinished svg document: {e}");
            }
        }
    }
}

impl<W: Write> DrawingSurface for SvgSurface<W> {
    fn begin_group(&mut self, transform: Transform) {
        let mut parts = Vec::new();
        if transform.translate != (0.0, 0.0) {
            parts.push(format!(
                "translate({},{})",
                num(transform.translate.0),
                num(transform.translate.1)
            ));
        }
        if transform.scale != (1.0, 1.0) {
            parts.push(format!("scale({},{})", num(transform.scale.0), num(transform.scale.1)));
        }
        self.line(format_args!(r#"<g transform="{}">"#, parts.join(" ")));
        self.depth += 1;
    }

    fn end_group(&mut self) {
        if self.depth == 0 {
            log::warn!("end_group() without matching begin_group()");
            return;
        }
        self.depth -= 1;
        self.line(format_args!("</g>"));
    }

    fn half_circle(&mut self, from: Point, to: Point, sweep: ArcSweep) {
        let r = num(from.distance(to) / 2.0);
        let flag = match sweep {
            ArcSweep::Up => 1,
            ArcSweep::Down => 0,
        };
        self.line(format_args!(
            r#"<path d="M {} {} A {r} {r} 0 0 {flag} {} {}" vector-effect="non-scaling-stroke"/>"#,
            num(from.x),
            num(from.y),
            num(to.x),
            num(to.y)
        ));
    }

    fn polyline(&mut self, points: &[Point]) {
        let coords: Vec<String> = points
            .iter()
            .map(|p| format!("{},{}", num(p.x), num(p.y)))
            .collect();
        self.line(format_args!(
            r#"<polyline points="{}" vector-effect="non-scaling-stroke"/>"#,
            coords.join(" ")
        ));
    }

    fn rect(&mut self, rect: Rect) {
        self.line(format_args!(
            r##"<rect x="{}" y="{}" width="{}" height="{}" stroke="#999" stroke-width="0.5"/>"##,
            num(rect.x),
            num(rect.y),
            num(rect.width),
            num(rect.height)
        ));
    }

    fn cubic_path(&mut self, start: Point, segments: &[CubicSegment], closed: bool) {
        self.line(format_args!(
            r#"<path d="{}" vector-effect="non-scaling-stroke"/>"#,
            path_data(start, segments, closed)
        ));
    }
}

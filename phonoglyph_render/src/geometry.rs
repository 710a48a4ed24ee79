// Bulge-curve construction: regular polygons with outward-curving edges.
//
// A regular N-gon is laid out on the unit circle starting at (0, 1), each
// vertex rotated a further 2π/N. Every edge `from -> to` is replaced by a
// cubic Bézier whose control points are derived from two guide points:
//
// 1. Take the line perpendicular to the edge through each endpoint.
// 2. On each perpendicular, the circle of radius |edge| centered at the
//    endpoint meets the line twice: a point and its mirror through the
//    endpoint. `select_outward()` keeps the one farther from the origin.
// 3. The two guide points are blended by the roundness factor ρ:
//    control1 = lerp(far, near, ρ), control2 = lerp(near, far, ρ).
//    ρ = 1 puts each control point over its own endpoint (a rounded lobe),
//    ρ = 0 crosses them, and ρ = 0.5 collapses both onto the midpoint.
//
// Perpendiculars are classified before solving: a horizontal edge has a
// vertical perpendicular and a vertical edge a horizontal one, and both are
// solved directly instead of through the slope form (which would divide by
// zero). Edge orientation is judged relative to edge length with
// `AXIS_EPSILON`, because polygon vertices come from sin/cos and are almost
// never exactly axis-aligned.
//
// See also: `renderer.rs`, which draws these curves as polycloud syllable
// glyphs and in the geometry sketch.

use thiserror::Error;

/// Relative tolerance for treating an edge as axis-aligned.
pub const AXIS_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    #[error("a polygon needs at least 3 sides (got {0})")]
    TooFewSides(usize),

    /// Both endpoints coincide; the edge has no perpendicular.
    #[error("degenerate edge: ({0}, {1}) has zero length")]
    DegenerateEdge(f64, f64),

    #[error("roundness must be finite (got {0})")]
    InvalidRoundness(f64),
}

/// A point in the plane.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Distance from the origin.
    pub fn norm(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// `a + (b - a) * t`.
    pub fn lerp(a: Point, b: Point, t: f64) -> Point {
        Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

/// One cubic Bézier segment; the start is the previous segment's `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicSegment {
    pub control1: Point,
    pub control2: Point,
    pub end: Point,
}

/// The line perpendicular to an edge, classified by orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Perpendicular {
    /// Perpendicular with finite, non-zero slope.
    Sloped(f64),
    /// The edge is horizontal, so the perpendicular is vertical.
    Vertical,
    /// The edge is vertical, so the perpendicular is horizontal.
    Horizontal,
}

impl Perpendicular {
    /// Classify the perpendicular of the edge `from -> to`.
    pub fn of_edge(from: Point, to: Point) -> Result<Self, GeometryError> {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let length = dx.hypot(dy);
        if length <= f64::EPSILON {
            return Err(GeometryError::DegenerateEdge(from.x, from.y));
        }
        if dy.abs() <= AXIS_EPSILON * length {
            Ok(Perpendicular::Vertical)
        } else if dx.abs() <= AXIS_EPSILON * length {
            Ok(Perpendicular::Horizontal)
        } else {
            // Edge slope is dy/dx; the perpendicular's is its negative reciprocal.
            Ok(Perpendicular::Sloped(-dx / dy))
        }
    }

    /// The two points on the perpendicular through `anchor` at `distance`
    /// from it: the root on the positive-x (or positive-y) side, then its
    /// mirror through `anchor`.
    pub fn points_at_distance(self, anchor: Point, distance: f64) -> (Point, Point) {
        match self {
            Perpendicular::Vertical => (
                Point::new(anchor.x, anchor.y + distance),
                Point::new(anchor.x, anchor.y - distance),
            ),
            Perpendicular::Horizontal => (
                Point::new(anchor.x + distance, anchor.y),
                Point::new(anchor.x - distance, anchor.y),
            ),
            Perpendicular::Sloped(slope) => {
                // (x - ax)^2 + (slope * (x - ax))^2 = distance^2, anchor on the line.
                let dx = distance / (1.0 + slope * slope).sqrt();
                let dy = slope * dx;
                (
                    Point::new(anchor.x + dx, anchor.y + dy),
                    Point::new(anchor.x - dx, anchor.y - dy),
                )
            }
        }
    }
}

/// Pick the bulge guide point: whichever of `root` and `mirror` lies farther
/// from the origin. On an exact tie `root` is kept.
pub fn select_outward(root: Point, mirror: Point) -> Point {
    if root.norm() < mirror.norm() { mirror } else { root }
}

/// Outward guide points for the edge `from -> to`, anchored at `from` and
/// `to` respectively.
pub fn edge_guides(from: Point, to: Point) -> Result<(Point, Point), GeometryError> {
    let perpendicular = Perpendicular::of_edge(from, to)?;
    let length = from.distance(to);
    let (root, mirror) = perpendicular.points_at_distance(from, length);
    let near = select_outward(root, mirror);
    let (root, mirror) = perpendicular.points_at_distance(to, length);
    let far = select_outward(root, mirror);
    Ok((near, far))
}

/// The bulged Bézier replacing the edge `from -> to` at roundness `rho`.
pub fn bulge_segment(from: Point, to: Point, rho: f64) -> Result<CubicSegment, GeometryError> {
    let (near, far) = edge_guides(from, to)?;
    Ok(CubicSegment {
        control1: Point::lerp(far, near, rho),
        control2: Point::lerp(near, far, rho),
        end: to,
    })
}

/// Vertices of a regular polygon on the unit circle, starting at (0, 1).
pub fn regular_polygon(sides: usize) -> Vec<Point> {
    let step = std::f64::consts::TAU / sides as f64;
    (0..sides)
        .map(|i| {
            let angle = step * i as f64;
            Point::new(angle.sin(), angle.cos())
        })
        .collect()
}

/// A closed path of cubic segments.
#[derive(Debug, Clone, PartialEq)]
pub struct BulgeCurve {
    pub start: Point,
    pub segments: Vec<CubicSegment>,
}

/// Build the bulge curve for a regular `sides`-gon. `roundness` is clamped
/// to [0, 1].
pub fn bulge_curve(sides: usize, roundness: f64) -> Result<BulgeCurve, GeometryError> {
    if sides < 3 {
        return Err(GeometryError::TooFewSides(sides));
    }
    if !roundness.is_finite() {
        return Err(GeometryError::InvalidRoundness(roundness));
    }
    let rho = roundness.clamp(0.0, 1.0);
    let vertices = regular_polygon(sides);
    let segments = (0..sides)
        .map(|i| bulge_segment(vertices[i], vertices[(i + 1) % sides], rho))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(BulgeCurve {
        start: vertices[0],
        segments,
    })
}

//! Curve flattening.
//!
//! Converts path segments into polylines whose chords stay within a given
//! distance of the true curve. Béziers are subdivided recursively (de
//! Casteljau) until their control polygon is flat; arcs are sampled at a
//! fixed angular step derived from the tolerance and radius.
//!
//! Flattening never fails. Malformed segments degrade to a single point so
//! downstream stages keep working with whatever geometry is usable.

use std::f64::consts::PI;

use canvas_kernel_math::{distance, is_finite_point, lerp, Point2};

use crate::segment::{arc_point, arc_sweep, PathSegment};
use crate::Path;

/// Hard cap on arc samples per segment.
const MAX_ARC_STEPS: usize = 4096;

/// Options controlling curve flattening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlattenOptions {
    /// Maximum chord-to-curve deviation.
    pub tolerance: f64,
    /// Maximum recursion depth for Bézier subdivision.
    pub max_depth: u32,
}

impl FlattenOptions {
    /// Options with the given tolerance and the default depth.
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            tolerance: 0.01,
            max_depth: 12,
        }
    }
}

/// A flattened point tagged with its position in the source path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatPoint {
    /// Position.
    pub point: Point2,
    /// Index of the segment that produced the point.
    pub segment: usize,
    /// Curve parameter of the point within that segment (0..=1).
    pub t: f64,
}

/// A flattened subpath.
///
/// `points` forms a ring: the closing edge from the last point back to the
/// first is implicit and never stored as a duplicate point.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    /// Vertices in drawing order.
    pub points: Vec<FlatPoint>,
    /// Whether the subpath was explicitly closed.
    pub closed: bool,
    /// Index of the subpath within the path.
    pub subpath: usize,
}

impl Contour {
    /// Vertex positions without provenance.
    pub fn positions(&self) -> Vec<Point2> {
        self.points.iter().map(|p| p.point).collect()
    }

    /// Signed shoelace area, positive for counter-clockwise rings.
    pub fn signed_area(&self) -> f64 {
        polygon_signed_area(&self.positions())
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the contour has no vertices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Signed shoelace area of a closed ring, positive for counter-clockwise.
pub fn polygon_signed_area(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].y;
        area -= points[j].x * points[i].y;
    }
    area / 2.0
}

/// Flatten one segment into a polyline.
///
/// The result excludes `preceding` and ends at the segment's terminal anchor.
/// Degenerate segments produce a single point.
pub fn flatten_segment(segment: &PathSegment, preceding: Point2, tolerance: f64) -> Vec<Point2> {
    flatten_segment_with_params(segment, preceding, &FlattenOptions::with_tolerance(tolerance))
        .into_iter()
        .map(|(p, _)| p)
        .collect()
}

/// Flatten one segment, keeping the curve parameter of each output point.
pub fn flatten_segment_with_params(
    segment: &PathSegment,
    preceding: Point2,
    options: &FlattenOptions,
) -> Vec<(Point2, f64)> {
    let tolerance = if options.tolerance.is_finite() && options.tolerance > 0.0 {
        options.tolerance
    } else {
        FlattenOptions::default().tolerance
    };

    match segment {
        PathSegment::MoveTo { points } => match points.first() {
            Some(p) if is_finite_point(p) => vec![(*p, 1.0)],
            _ => vec![(preceding, 1.0)],
        },
        PathSegment::LineTo { points } => {
            let finite: Vec<Point2> = points.iter().copied().filter(is_finite_point).collect();
            if finite.is_empty() {
                return vec![(preceding, 1.0)];
            }
            let n = finite.len() as f64;
            finite
                .into_iter()
                .enumerate()
                .map(|(i, p)| (p, (i + 1) as f64 / n))
                .collect()
        }
        PathSegment::BezierCurveTo {
            points,
            control_points,
        } => {
            let Some(end) = points.last().copied().filter(is_finite_point) else {
                return vec![(preceding, 1.0)];
            };
            let controls: Vec<Point2> = control_points
                .iter()
                .copied()
                .filter(is_finite_point)
                .collect();
            match controls.as_slice() {
                [c1, c2, ..] => flatten_cubic(preceding, *c1, *c2, end, tolerance, options.max_depth),
                [c] => flatten_quadratic(preceding, *c, end, tolerance, options.max_depth),
                [] => vec![(end, 1.0)],
            }
        }
        PathSegment::QuadraticCurveTo {
            points,
            control_points,
        } => {
            let Some(end) = points.last().copied().filter(is_finite_point) else {
                return vec![(preceding, 1.0)];
            };
            match control_points.iter().copied().find(is_finite_point) {
                Some(c) => flatten_quadratic(preceding, c, end, tolerance, options.max_depth),
                None => vec![(end, 1.0)],
            }
        }
        PathSegment::Arc {
            points,
            radius,
            start_angle,
            end_angle,
            anticlockwise,
        } => flatten_arc(
            preceding,
            points.first().copied(),
            *radius,
            *start_angle,
            *end_angle,
            *anticlockwise,
            tolerance,
        ),
        PathSegment::ClosePath => vec![(preceding, 1.0)],
    }
}

fn flatten_cubic(
    p0: Point2,
    p1: Point2,
    p2: Point2,
    p3: Point2,
    tolerance: f64,
    max_depth: u32,
) -> Vec<(Point2, f64)> {
    let mut out = Vec::new();
    subdivide_cubic([p0, p1, p2, p3], 0.0, 1.0, tolerance, max_depth, &mut out);
    out
}

fn subdivide_cubic(
    c: [Point2; 4],
    t0: f64,
    t1: f64,
    tolerance: f64,
    depth: u32,
    out: &mut Vec<(Point2, f64)>,
) {
    let flat = point_line_distance(&c[1], &c[0], &c[3]).max(point_line_distance(&c[2], &c[0], &c[3]));
    if depth == 0 || flat <= tolerance {
        out.push((c[3], t1));
        return;
    }

    // de Casteljau split at 0.5
    let p01 = lerp(&c[0], &c[1], 0.5);
    let p12 = lerp(&c[1], &c[2], 0.5);
    let p23 = lerp(&c[2], &c[3], 0.5);
    let p012 = lerp(&p01, &p12, 0.5);
    let p123 = lerp(&p12, &p23, 0.5);
    let mid = lerp(&p012, &p123, 0.5);
    let tm = 0.5 * (t0 + t1);

    subdivide_cubic([c[0], p01, p012, mid], t0, tm, tolerance, depth - 1, out);
    subdivide_cubic([mid, p123, p23, c[3]], tm, t1, tolerance, depth - 1, out);
}

fn flatten_quadratic(
    p0: Point2,
    p1: Point2,
    p2: Point2,
    tolerance: f64,
    max_depth: u32,
) -> Vec<(Point2, f64)> {
    // Degree elevation keeps a single subdivision routine.
    let c1 = lerp(&p0, &p1, 2.0 / 3.0);
    let c2 = lerp(&p2, &p1, 2.0 / 3.0);
    flatten_cubic(p0, c1, c2, p2, tolerance, max_depth)
}

fn flatten_arc(
    preceding: Point2,
    center: Option<Point2>,
    radius: f64,
    start_angle: f64,
    end_angle: f64,
    anticlockwise: bool,
    tolerance: f64,
) -> Vec<(Point2, f64)> {
    let Some(center) = center.filter(is_finite_point) else {
        tracing::warn!("arc segment without a finite center, degrading to a point");
        return vec![(preceding, 1.0)];
    };
    if !radius.is_finite() || radius < 0.0 || !start_angle.is_finite() || !end_angle.is_finite() {
        tracing::warn!(radius, start_angle, end_angle, "degenerate arc, degrading to a point");
        return vec![(center, 1.0)];
    }
    if radius <= tolerance {
        return vec![(center, 1.0)];
    }

    let sweep = arc_sweep(start_angle, end_angle, anticlockwise);
    let mut out = Vec::new();

    if let Some(start) = arc_point(center, radius, start_angle) {
        if distance(&start, &preceding) > tolerance {
            out.push((start, 0.0));
        }
    }

    // Chord sagitta r * (1 - cos(step / 2)) bounded by the tolerance.
    let max_step = 2.0 * (1.0 - tolerance / radius).clamp(-1.0, 1.0).acos();
    let max_step = if max_step > 0.0 { max_step.min(PI / 2.0) } else { PI / 2.0 };
    let steps = ((sweep.abs() / max_step).ceil() as usize).clamp(1, MAX_ARC_STEPS);

    for k in 1..=steps {
        let t = k as f64 / steps as f64;
        if let Some(p) = arc_point(center, radius, start_angle + sweep * t) {
            out.push((p, t));
        }
    }
    if out.is_empty() {
        out.push((center, 1.0));
    }
    out
}

/// Distance from `p` to the infinite line through `a` and `b`.
///
/// Falls back to point distance when `a` and `b` coincide.
fn point_line_distance(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let ab = b - a;
    let len = ab.norm();
    if len < f64::EPSILON {
        return distance(p, a);
    }
    let ap = p - a;
    (ab.x * ap.y - ab.y * ap.x).abs() / len
}

/// Flatten every subpath of a path into contours.
///
/// Consecutive points closer than the tolerance are merged, a trailing point
/// that repeats the first one is dropped, and subpaths with no drawable
/// geometry are omitted.
pub fn flatten_path(path: &Path, options: &FlattenOptions) -> Vec<Contour> {
    let merge = options.tolerance.max(0.0) * 1e-3;
    let mut contours = Vec::new();

    for (subpath_index, subpath) in path.subpaths().into_iter().enumerate() {
        let mut points = vec![FlatPoint {
            point: subpath.start,
            segment: subpath.first_segment,
            t: 0.0,
        }];
        let mut current = subpath.start;

        for (offset, segment) in subpath.segments.iter().enumerate() {
            let segment_index = subpath.first_segment + offset;
            if segment.is_move_to() || segment.is_close() {
                continue;
            }
            if !segment.is_finite() {
                tracing::warn!(
                    segment = segment_index,
                    kind = segment.kind(),
                    "non-finite segment geometry, using usable points only"
                );
            }
            for (point, t) in flatten_segment_with_params(segment, current, options) {
                current = point;
                let last = points.last().map(|p| p.point).unwrap_or(point);
                if distance(&last, &point) <= merge {
                    continue;
                }
                points.push(FlatPoint {
                    point,
                    segment: segment_index,
                    t,
                });
            }
        }

        while points.len() > 1 {
            let first = points[0].point;
            let last = points[points.len() - 1].point;
            if distance(&first, &last) <= merge {
                points.pop();
            } else {
                break;
            }
        }

        if points.is_empty() {
            continue;
        }
        contours.push(Contour {
            points,
            closed: subpath.closed || path.closed,
            subpath: subpath_index,
        });
    }

    contours
}

/// Sum of the signed contour areas of a path after flattening.
///
/// Holes wound opposite to their outer contour subtract from the total,
/// which matches the filled area for non-overlapping nested contours.
pub fn path_signed_area(path: &Path, options: &FlattenOptions) -> f64 {
    flatten_path(path, options)
        .iter()
        .map(Contour::signed_area)
        .sum()
}

//! Point containment against flattened regions.
//!
//! Boundary proximity is tested first; otherwise the signed-crossing winding
//! number decides insideness through the operand's fill rule. Every subpath
//! counts as closed for fill purposes, as the canvas `fill()` does.

use canvas_kernel_math::{cross, distance, Point2};
use canvas_kernel_path::{flatten_path, FillRule, Path};

use crate::settings::BooleanSettings;

/// Where a point lies relative to a filled region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Containment {
    /// The point is in the filled interior (also true on the boundary).
    pub inside: bool,
    /// The point lies within the linear tolerance of some edge.
    pub on_boundary: bool,
}

impl Containment {
    /// Strictly outside.
    pub const OUTSIDE: Self = Self {
        inside: false,
        on_boundary: false,
    };
    /// Strictly inside.
    pub const INSIDE: Self = Self {
        inside: true,
        on_boundary: false,
    };
    /// On the boundary.
    pub const BOUNDARY: Self = Self {
        inside: true,
        on_boundary: true,
    };
}

/// Containment of `point` in `path` under `fill_rule`.
///
/// The path is flattened with the settings' flattening options before
/// testing.
pub fn contains(
    path: &Path,
    point: &Point2,
    fill_rule: FillRule,
    settings: &BooleanSettings,
) -> Containment {
    let rings: Vec<Vec<Point2>> = flatten_path(path, &settings.flatten_options())
        .iter()
        .map(|c| c.positions())
        .collect();
    ring_containment(&rings, point, fill_rule, settings.precision)
}

/// Containment of `point` in a set of closed rings.
pub fn ring_containment(
    rings: &[Vec<Point2>],
    point: &Point2,
    fill_rule: FillRule,
    tol: f64,
) -> Containment {
    if on_any_edge(rings, point, tol) {
        return Containment::BOUNDARY;
    }
    if fill_rule.is_inside(winding_number(rings, point)) {
        Containment::INSIDE
    } else {
        Containment::OUTSIDE
    }
}

/// Fill test without boundary detection.
pub(crate) fn is_filled(rings: &[Vec<Point2>], point: &Point2, fill_rule: FillRule) -> bool {
    fill_rule.is_inside(winding_number(rings, point))
}

/// Signed-crossing winding number of `point` with respect to `rings`.
///
/// Counter-clockwise rings (positive signed area) contribute `+1` around
/// their interior.
pub fn winding_number(rings: &[Vec<Point2>], point: &Point2) -> i32 {
    let mut winding = 0;
    for ring in rings {
        let n = ring.len();
        if n < 2 {
            continue;
        }
        for i in 0..n {
            let a = &ring[i];
            let b = &ring[(i + 1) % n];
            if a.y <= point.y {
                if b.y > point.y && side(a, b, point) > 0.0 {
                    winding += 1;
                }
            } else if b.y <= point.y && side(a, b, point) < 0.0 {
                winding -= 1;
            }
        }
    }
    winding
}

/// Positive when `p` is left of the directed line `a -> b`.
fn side(a: &Point2, b: &Point2, p: &Point2) -> f64 {
    cross(&(b - a), &(p - a))
}

fn on_any_edge(rings: &[Vec<Point2>], point: &Point2, tol: f64) -> bool {
    rings.iter().any(|ring| near_ring(ring, point, tol))
}

/// True when `point` lies within `tol` of an edge of the closed `ring`.
pub(crate) fn near_ring(ring: &[Point2], point: &Point2, tol: f64) -> bool {
    let n = ring.len();
    (0..n).any(|i| point_segment_distance(point, &ring[i], &ring[(i + 1) % n]) <= tol)
}

/// Distance from `p` to the closed segment `a..b`.
pub fn point_segment_distance(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    distance(p, &closest_on_segment(p, a, b).0)
}

/// Closest point on segment `a..b` to `p` and its parameter in `[0, 1]`.
pub(crate) fn closest_on_segment(p: &Point2, a: &Point2, b: &Point2) -> (Point2, f64) {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return (*a, 0.0);
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (a + ab * t, t)
}

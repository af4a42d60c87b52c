//! Fragment classification for path boolean operations.
//!
//! After splitting, each boundary fragment is classified as IN, OUT,
//! ON_SAME, or ON_OPPOSITE relative to the other operand. The boolean
//! operation then selects which fragments to keep.

use canvas_kernel_math::{distance, lerp, Point2, Vec2};

use crate::api::BooleanOp;
use crate::edges::{left_normal, PreparedPath};
use crate::settings::BooleanSettings;
use crate::split::Fragment;

/// Classification of a fragment relative to the other operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentClassification {
    /// Fragment is outside the other operand.
    Outside,
    /// Fragment is inside the other operand.
    Inside,
    /// Fragment lies on the other boundary, filled sides agree.
    OnSame,
    /// Fragment lies on the other boundary, filled sides oppose.
    OnOpposite,
}

/// Point halfway along a fragment by arc length, with the direction of the
/// edge it falls on and that edge's length.
pub fn fragment_midpoint(fragment: &Fragment) -> Option<(Point2, Vec2, f64)> {
    polyline_midpoint(&fragment.points, fragment.closed)
}

/// Arc-length midpoint of a polyline; `closed` adds the closing edge.
pub(crate) fn polyline_midpoint(pts: &[Point2], closed: bool) -> Option<(Point2, Vec2, f64)> {
    let n = pts.len();
    if n < 2 {
        return None;
    }
    let edge_count = if closed { n } else { n - 1 };
    let edge = |i: usize| (pts[i], pts[(i + 1) % n]);

    let total: f64 = (0..edge_count)
        .map(|i| {
            let (a, b) = edge(i);
            distance(&a, &b)
        })
        .sum();
    let half = total / 2.0;
    let mut walked = 0.0;
    for i in 0..edge_count {
        let (a, b) = edge(i);
        let len = distance(&a, &b);
        if len > 0.0 && walked + len >= half {
            let t = (half - walked) / len;
            return Some((lerp(&a, &b, t), b - a, len));
        }
        walked += len;
    }
    // Zero-length polyline: fall back to its first edge.
    let (a, b) = edge(0);
    Some((a, b - a, distance(&a, &b)))
}

/// Classify one fragment against `other`.
pub fn classify_fragment(
    fragment: &Fragment,
    other: &PreparedPath,
    settings: &BooleanSettings,
) -> FragmentClassification {
    let Some((mid, dir, edge_len)) = fragment_midpoint(fragment) else {
        return FragmentClassification::Outside;
    };
    let containment = other.containment(&mid, settings.precision);
    if !containment.on_boundary {
        return if containment.inside {
            FragmentClassification::Inside
        } else {
            FragmentClassification::Outside
        };
    }

    // Own filled side is on the left; check whether the other operand agrees.
    let probe = mid + left_normal(&dir) * settings.probe_distance(edge_len);
    if other.fills(&probe) {
        FragmentClassification::OnSame
    } else {
        FragmentClassification::OnOpposite
    }
}

/// Classify every fragment of one operand against the other.
pub fn classify_fragments(
    fragments: &[Fragment],
    other: &PreparedPath,
    settings: &BooleanSettings,
) -> Vec<FragmentClassification> {
    fragments
        .iter()
        .map(|f| {
            let class = classify_fragment(f, other, settings);
            tracing::trace!(ring = f.ring, points = f.points.len(), ?class, "classified fragment");
            class
        })
        .collect()
}

/// Select which fragments to keep for a boolean operation.
///
/// Returns `(index, reverse)` pairs for A and for B. Reversed fragments are
/// traversed backwards so their filled side stays on the left in the result.
pub fn select_fragments(
    op: BooleanOp,
    classes_a: &[FragmentClassification],
    classes_b: &[FragmentClassification],
) -> (Vec<(usize, bool)>, Vec<(usize, bool)>) {
    use FragmentClassification::*;

    let keep_a = classes_a
        .iter()
        .enumerate()
        .filter_map(|(i, c)| {
            let reverse = match (op, c) {
                (BooleanOp::Union, Outside | OnSame) => false,
                (BooleanOp::Intersection, Inside | OnSame) => false,
                (BooleanOp::Difference, Outside | OnOpposite) => false,
                (BooleanOp::Exclusion, Outside) => false,
                (BooleanOp::Exclusion, Inside) => true,
                _ => return None,
            };
            Some((i, reverse))
        })
        .collect();

    let keep_b = classes_b
        .iter()
        .enumerate()
        .filter_map(|(i, c)| {
            let reverse = match (op, c) {
                (BooleanOp::Union, Outside) => false,
                (BooleanOp::Intersection, Inside) => false,
                (BooleanOp::Difference, Inside) => true,
                (BooleanOp::Exclusion, Outside) => false,
                (BooleanOp::Exclusion, Inside) => true,
                _ => return None,
            };
            Some((i, reverse))
        })
        .collect();

    (keep_a, keep_b)
}

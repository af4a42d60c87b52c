//! Edge-edge intersection finding.
//!
//! Every edge of operand A is tested against every edge of operand B whose
//! bounding box it overlaps. Contacts within the linear tolerance count:
//! endpoints touching the other edge, proper crossings, and both ends of a
//! collinear overlap.

use std::cmp::Ordering;

use canvas_kernel_math::{cross, distance, Point2};

use crate::edges::FlattenedEdge;
use crate::error::{BooleanError, Result};
use crate::winding::closest_on_segment;

/// A point where an edge of A meets an edge of B.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionPoint {
    /// Location of the contact.
    pub point: Point2,
    /// Parameter along edge A in `[0, 1]`.
    pub param_a: f64,
    /// Parameter along edge B in `[0, 1]`.
    pub param_b: f64,
    /// Index of the edge in A's edge list.
    pub edge_a: usize,
    /// Index of the edge in B's edge list.
    pub edge_b: usize,
}

/// Contact between two segments: location and parameter on each.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    /// Contact location.
    pub point: Point2,
    /// Parameter on the first segment.
    pub t: f64,
    /// Parameter on the second segment.
    pub u: f64,
}

/// Contacts between segments `a0..a1` and `b0..b1`.
///
/// Endpoint contacts come first and reuse the endpoint's exact coordinates,
/// so touching vertices are never perturbed. A proper crossing is reported
/// only when it is not already covered by an endpoint contact. Collinear
/// overlaps yield both overlap ends.
pub fn segment_intersections(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
    tol: f64,
) -> Vec<SegmentHit> {
    let r = a1 - a0;
    let s = b1 - b0;
    let len_r = r.norm();
    let len_s = s.norm();
    if len_r <= tol || len_s <= tol {
        return Vec::new();
    }

    let mut hits: Vec<SegmentHit> = Vec::with_capacity(2);
    let push = |hit: SegmentHit, hits: &mut Vec<SegmentHit>| {
        if !hits.iter().any(|h| distance(&h.point, &hit.point) <= tol) {
            hits.push(hit);
        }
    };

    for (p, t) in [(a0, 0.0), (a1, 1.0)] {
        let (q, u) = closest_on_segment(p, b0, b1);
        if distance(p, &q) <= tol {
            push(SegmentHit { point: *p, t, u }, &mut hits);
        }
    }
    for (p, u) in [(b0, 0.0), (b1, 1.0)] {
        let (q, t) = closest_on_segment(p, a0, a1);
        if distance(p, &q) <= tol {
            push(SegmentHit { point: *p, t, u }, &mut hits);
        }
    }

    let collinear = (cross(&r, &(b0 - a0)) / len_r).abs() <= tol
        && (cross(&r, &(b1 - a0)) / len_r).abs() <= tol;
    let denom = cross(&r, &s);
    if !collinear && denom.abs() > f64::EPSILON * len_r * len_s {
        let qp = b0 - a0;
        let t = cross(&qp, &s) / denom;
        let u = cross(&qp, &r) / denom;
        if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
            let point = a0 + r * t;
            push(SegmentHit { point, t, u }, &mut hits);
        }
    }

    hits
}

/// Find every contact between the edges of A and the edges of B.
///
/// Results are deduplicated by location and ordered by position along A:
/// edge index first, then parameter within the edge, so the order follows
/// A's boundary from its first vertex.
pub fn find_intersections(
    edges_a: &[FlattenedEdge],
    edges_b: &[FlattenedEdge],
    tol: f64,
    max_pairs: usize,
) -> Result<Vec<IntersectionPoint>> {
    let pairs = edges_a.len().saturating_mul(edges_b.len());
    if pairs > max_pairs {
        return Err(BooleanError::TooComplex {
            pairs,
            limit: max_pairs,
        });
    }

    let boxes_b: Vec<_> = edges_b
        .iter()
        .map(|e| {
            let mut bbox = e.bounding_box();
            bbox.expand(tol);
            bbox
        })
        .collect();

    let mut found: Vec<IntersectionPoint> = Vec::new();
    for (ia, ea) in edges_a.iter().enumerate() {
        let box_a = ea.bounding_box();
        for (ib, eb) in edges_b.iter().enumerate() {
            if !box_a.overlaps(&boxes_b[ib]) {
                continue;
            }
            for hit in segment_intersections(&ea.start, &ea.end, &eb.start, &eb.end, tol) {
                found.push(IntersectionPoint {
                    point: hit.point,
                    param_a: hit.t,
                    param_b: hit.u,
                    edge_a: ia,
                    edge_b: ib,
                });
            }
        }
    }

    found.sort_by(compare_along_a);
    Ok(dedup_by_location(found, tol))
}

fn compare_along_a(x: &IntersectionPoint, y: &IntersectionPoint) -> Ordering {
    x.edge_a
        .cmp(&y.edge_a)
        .then(x.param_a.total_cmp(&y.param_a))
        .then(x.edge_b.cmp(&y.edge_b))
        .then(x.param_b.total_cmp(&y.param_b))
}

/// Drop contacts that coincide with an earlier one.
///
/// A contact at a shared vertex is found once per incident edge; only the
/// first in A-order survives. Points that coincide on A but lie on distinct
/// B edges are distinct crossings only if their locations differ.
fn dedup_by_location(points: Vec<IntersectionPoint>, tol: f64) -> Vec<IntersectionPoint> {
    let mut out: Vec<IntersectionPoint> = Vec::with_capacity(points.len());
    for ip in points {
        if out.iter().any(|kept| distance(&kept.point, &ip.point) <= tol) {
            continue;
        }
        out.push(ip);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn edge(a: Point2, b: Point2) -> FlattenedEdge {
        FlattenedEdge {
            start: a,
            end: b,
            ring: 0,
            segment: 0,
            t0: 0.0,
            t1: 1.0,
        }
    }

    fn square_edges(x: f64, y: f64, size: f64) -> Vec<FlattenedEdge> {
        let pts = [
            p(x, y),
            p(x + size, y),
            p(x + size, y + size),
            p(x, y + size),
        ];
        (0..4).map(|i| edge(pts[i], pts[(i + 1) % 4])).collect()
    }

    #[test]
    fn test_proper_crossing() {
        let hits = segment_intersections(&p(0.0, 0.0), &p(10.0, 10.0), &p(0.0, 10.0), &p(10.0, 0.0), 1e-9);
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].point.x, 5.0);
        assert_relative_eq!(hits[0].t, 0.5);
        assert_relative_eq!(hits[0].u, 0.5);
    }

    #[test]
    fn test_parallel_disjoint() {
        let hits = segment_intersections(&p(0.0, 0.0), &p(10.0, 0.0), &p(0.0, 1.0), &p(10.0, 1.0), 1e-9);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_collinear_overlap_reports_both_ends() {
        let hits = segment_intersections(&p(0.0, 0.0), &p(10.0, 0.0), &p(5.0, 0.0), &p(15.0, 0.0), 1e-9);
        assert_eq!(hits.len(), 2);
        // a1 lies inside b, b0 lies inside a
        assert_eq!(hits[0].point, p(10.0, 0.0));
        assert_relative_eq!(hits[0].u, 0.5);
        assert_eq!(hits[1].point, p(5.0, 0.0));
        assert_relative_eq!(hits[1].t, 0.5);
    }

    #[test]
    fn test_endpoint_touch_uses_exact_vertex() {
        let hits = segment_intersections(&p(0.0, 0.0), &p(10.0, 0.0), &p(10.0, 0.0), &p(10.0, 5.0), 1e-9);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].point, p(10.0, 0.0));
        assert_eq!(hits[0].t, 1.0);
        assert_eq!(hits[0].u, 0.0);
    }

    #[test]
    fn test_near_miss_within_tolerance() {
        let a1 = p(10.0, 0.0);
        let b0 = p(10.0 + 1e-7, 0.0);
        let hits = segment_intersections(&p(0.0, 0.0), &a1, &b0, &p(20.0, 0.0), 1e-6);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].point, a1);
        assert!(segment_intersections(&p(0.0, 0.0), &a1, &b0, &p(20.0, 0.0), 1e-9).is_empty());
    }

    #[test]
    fn test_overlapping_squares() {
        let a = square_edges(0.0, 0.0, 10.0);
        let b = square_edges(5.0, 5.0, 10.0);
        let found = find_intersections(&a, &b, 1e-9, 1_000).unwrap();
        assert_eq!(found.len(), 2);
        // ordered along A: right edge first, then top edge
        assert_eq!(found[0].point, p(10.0, 5.0));
        assert_eq!(found[0].edge_a, 1);
        assert_eq!(found[1].point, p(5.0, 10.0));
        assert_eq!(found[1].edge_a, 2);
    }

    #[test]
    fn test_shared_vertex_reported_once() {
        let a = square_edges(0.0, 0.0, 10.0);
        let b = square_edges(10.0, 10.0, 10.0);
        let found = find_intersections(&a, &b, 1e-9, 1_000).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].point, p(10.0, 10.0));
    }

    #[test]
    fn test_pair_budget() {
        let a = square_edges(0.0, 0.0, 10.0);
        let b = square_edges(5.0, 5.0, 10.0);
        let err = find_intersections(&a, &b, 1e-9, 15).unwrap_err();
        assert_eq!(err, BooleanError::TooComplex { pairs: 16, limit: 15 });
    }
}

//! Result reconstruction: stitch selected fragments into closed contours and
//! group the contours into output paths.
//!
//! Fragments are chained end-to-start within tolerance. Where several
//! fragments leave the same point (two result regions touching at a vertex),
//! the sharpest left turn is taken so each contour traces a single face.
//! Counter-clockwise contours become outer boundaries; clockwise contours are
//! holes attached to the smallest outer that encloses them.

use std::cmp::Ordering;

use canvas_kernel_math::{cross, distance, BoundingBox, Point2, Vec2};
use canvas_kernel_path::{polygon_signed_area, FillRule, Path, PathSegment};

use crate::split::Fragment;
use crate::winding::ring_containment;

/// Outcome of stitching.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StitchedContours {
    /// Closed contours, without a repeated closing point.
    pub contours: Vec<Vec<Point2>>,
    /// Non-fatal problems encountered.
    pub warnings: Vec<String>,
}

/// Chain fragments into closed contours.
///
/// Closed fragments pass through unchanged. A chain that cannot be closed is
/// dropped and reported as a warning.
pub fn stitch_fragments(fragments: Vec<Fragment>, tol: f64) -> StitchedContours {
    let mut result = StitchedContours::default();
    let mut open: Vec<Vec<Point2>> = Vec::new();
    for fragment in fragments {
        if fragment.points.is_empty() {
            continue;
        }
        if fragment.closed {
            result.contours.push(fragment.points);
        } else {
            open.push(fragment.points);
        }
    }

    let (closed, unclosed) = link_chains(&open, tol);
    for order in closed {
        let mut chain = concat_chain(&open, &order);
        chain.pop();
        result.contours.push(chain);
    }
    for order in unclosed {
        let chain = concat_chain(&open, &order);
        tracing::warn!(points = chain.len(), "could not close fragment chain");
        result.warnings.push(format!(
            "dropped an open boundary chain of {} points starting at ({}, {})",
            chain.len(),
            chain[0].x,
            chain[0].y
        ));
    }

    tracing::debug!(
        contours = result.contours.len(),
        dropped = result.warnings.len(),
        "stitched fragments"
    );
    result
}

/// Order open polylines into chains by linking each end to a start.
///
/// Returns the index sequences of the chains that close and of those that
/// do not. Empty polylines are skipped.
pub(crate) fn link_chains(open: &[Vec<Point2>], tol: f64) -> (Vec<Vec<usize>>, Vec<Vec<usize>>) {
    let mut closed = Vec::new();
    let mut unclosed = Vec::new();
    let mut used: Vec<bool> = open.iter().map(Vec::is_empty).collect();
    for first in 0..open.len() {
        if used[first] {
            continue;
        }
        used[first] = true;
        let mut order = vec![first];
        let start = open[first][0];
        let mut end = open[first][open[first].len() - 1];
        let mut incoming = incoming_direction(&open[first]);
        let mut points = open[first].len();

        loop {
            if points > 2 && distance(&end, &start) <= tol {
                closed.push(order);
                break;
            }
            let Some(next) = pick_next(open, &used, &end, incoming, tol) else {
                unclosed.push(order);
                break;
            };
            used[next] = true;
            order.push(next);
            let piece = &open[next];
            points += piece.len() - 1;
            end = piece[piece.len() - 1];
            let turn = incoming_direction(piece);
            if turn.norm_squared() > 0.0 {
                incoming = turn;
            }
        }
    }
    (closed, unclosed)
}

fn concat_chain(open: &[Vec<Point2>], order: &[usize]) -> Vec<Point2> {
    let mut chain = open[order[0]].clone();
    for &i in &order[1..] {
        chain.extend_from_slice(&open[i][1..]);
    }
    chain
}

fn incoming_direction(chain: &[Point2]) -> Vec2 {
    let end = chain[chain.len() - 1];
    chain
        .iter()
        .rev()
        .skip(1)
        .map(|p| end - p)
        .find(|d| d.norm_squared() > 0.0)
        .unwrap_or_else(Vec2::zeros)
}

/// Unused fragment starting at `end`, preferring the sharpest left turn and
/// then the lowest index.
fn pick_next(
    open: &[Vec<Point2>],
    used: &[bool],
    end: &Point2,
    incoming: Vec2,
    tol: f64,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (j, frag) in open.iter().enumerate() {
        if used[j] || distance(&frag[0], end) > tol {
            continue;
        }
        let outgoing = frag
            .iter()
            .skip(1)
            .map(|p| p - frag[0])
            .find(|d| d.norm_squared() > 0.0)
            .unwrap_or_else(Vec2::zeros);
        let turn = cross(&incoming, &outgoing).atan2(incoming.dot(&outgoing));
        if best.map_or(true, |(_, t)| turn > t) {
            best = Some((j, turn));
        }
    }
    best.map(|(j, _)| j)
}

/// Remove repeated vertices; `None` if the contour encloses no area.
pub fn clean_contour(points: Vec<Point2>, tol: f64) -> Option<Vec<Point2>> {
    let mut out: Vec<Point2> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().is_some_and(|last| distance(last, &p) <= tol) {
            continue;
        }
        out.push(p);
    }
    while out.len() > 1 && distance(&out[0], &out[out.len() - 1]) <= tol {
        out.pop();
    }
    if out.len() < 3 {
        return None;
    }
    let perimeter: f64 = (0..out.len())
        .map(|i| distance(&out[i], &out[(i + 1) % out.len()]))
        .sum();
    // A zero-width sliver has area on the order of tol * perimeter.
    if polygon_signed_area(&out).abs() <= tol * perimeter * 0.5 {
        return None;
    }
    Some(out)
}

struct Shape {
    rings: Vec<Vec<Point2>>,
    area: f64,
    bbox: BoundingBox,
}

/// Group contours into output paths and order them deterministically.
///
/// Each path holds one outer contour followed by its holes, written as
/// `moveTo`/`lineTo`/`closePath` with the non-zero fill rule. Paths are
/// ordered by bounding box (min x, then min y), then by area.
pub fn assemble_paths(contours: Vec<Vec<Point2>>, tol: f64) -> (Vec<Path>, Vec<String>) {
    let mut warnings = Vec::new();
    let mut outers: Vec<Shape> = Vec::new();
    let mut holes: Vec<(Vec<Point2>, f64)> = Vec::new();

    for contour in contours {
        let Some(ring) = clean_contour(contour, tol) else {
            tracing::trace!("dropping degenerate result contour");
            continue;
        };
        let area = polygon_signed_area(&ring);
        if area > 0.0 {
            outers.push(Shape {
                bbox: BoundingBox::from_points(&ring),
                rings: vec![ring],
                area,
            });
        } else {
            holes.push((ring, -area));
        }
    }

    for (hole, hole_area) in holes {
        let owner = outers
            .iter()
            .enumerate()
            .filter(|(_, outer)| outer.area >= hole_area && encloses(&outer.rings[0], &hole, tol))
            .min_by(|a, b| a.1.area.total_cmp(&b.1.area))
            .map(|(i, _)| i);
        match owner {
            Some(i) => outers[i].rings.push(hole),
            None => {
                tracing::warn!(points = hole.len(), "hole contour has no enclosing outer");
                warnings.push(format!(
                    "discarded a hole contour of {} points with no enclosing boundary",
                    hole.len()
                ));
            }
        }
    }

    outers.sort_by(compare_shapes);
    let paths = outers.into_iter().map(shape_to_path).collect();
    (paths, warnings)
}

fn encloses(outer: &[Point2], hole: &[Point2], tol: f64) -> bool {
    let rings = [outer.to_vec()];
    for p in hole {
        let c = ring_containment(&rings, p, FillRule::NonZero, tol);
        if !c.on_boundary {
            return c.inside;
        }
    }
    // Every vertex touches the outer: decide on an edge midpoint.
    let mid = Point2::from((hole[0].coords + hole[1].coords) * 0.5);
    ring_containment(&rings, &mid, FillRule::NonZero, tol).inside
}

fn compare_shapes(a: &Shape, b: &Shape) -> Ordering {
    a.bbox
        .min
        .x
        .total_cmp(&b.bbox.min.x)
        .then(a.bbox.min.y.total_cmp(&b.bbox.min.y))
        .then(a.area.total_cmp(&b.area))
}

fn shape_to_path(shape: Shape) -> Path {
    let mut segments = Vec::new();
    for ring in shape.rings {
        segments.push(PathSegment::move_to(ring[0]));
        segments.extend(ring[1..].iter().map(|p| PathSegment::line_to(*p)));
        segments.push(PathSegment::close());
    }
    Path::new(segments)
        .with_closed(true)
        .with_fill_rule(FillRule::NonZero)
}

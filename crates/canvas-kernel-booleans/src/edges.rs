//! Flattened operand preparation.
//!
//! A [`PreparedPath`] holds two views of an operand: the raw flattened rings
//! (used for containment, exactly as the path fills) and the boundary rings,
//! re-oriented so the filled side lies to the left of every edge.
//!
//! Subpaths of one operand may overlap. Where they cross, the rings are cut
//! at the crossings and only the pieces separating filled from unfilled
//! space under the operand's fill rule are kept, then stitched back into
//! rings. Interior edges never reach the boolean pipeline.

use canvas_kernel_math::{distance, BoundingBox, Point2, Vec2};
use canvas_kernel_path::{flatten_path, FillRule, FlatPoint, Path};

use crate::classify::polyline_midpoint;
use crate::error::{BooleanError, Result};
use crate::intersect::find_intersections;
use crate::settings::BooleanSettings;
use crate::sew::link_chains;
use crate::split::{split_cycle, SplitPoint};
use crate::winding::{is_filled, near_ring, Containment};

/// A straight edge of a flattened boundary ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlattenedEdge {
    /// Edge start.
    pub start: Point2,
    /// Edge end.
    pub end: Point2,
    /// Index of the boundary ring the edge belongs to.
    pub ring: usize,
    /// Index of the source segment in the original path.
    pub segment: usize,
    /// Parameter span on the source segment; `t0 > t1` when the edge runs
    /// against the drawing direction.
    pub t0: f64,
    /// Parameter span on the source segment.
    pub t1: f64,
}

impl FlattenedEdge {
    /// Edge length.
    pub fn length(&self) -> f64 {
        distance(&self.start, &self.end)
    }

    /// Bounding box of the edge.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points([&self.start, &self.end])
    }
}

/// A closed boundary ring with its filled side on the left.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryRing {
    /// Ring vertices, without a repeated closing point.
    pub points: Vec<Point2>,
    /// Global index of the ring's first edge in [`PreparedPath::edges`].
    pub first_edge: usize,
}

impl BoundaryRing {
    /// Number of edges (equal to the vertex count).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the ring has no vertices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// An operand flattened and ready for the boolean pipeline.
#[derive(Debug, Clone)]
pub struct PreparedPath {
    /// Fill rule the operand is evaluated with.
    pub fill_rule: FillRule,
    /// Flattened rings as drawn, used for containment.
    pub rings: Vec<Vec<Point2>>,
    /// Oriented boundary rings.
    pub boundary: Vec<BoundaryRing>,
    /// Edges of every boundary ring, ring after ring.
    pub edges: Vec<FlattenedEdge>,
    /// Bounding box of all rings.
    pub bbox: BoundingBox,
    /// Boundary pieces that could not be stitched back into rings.
    pub warnings: Vec<String>,
}

/// One edge of an oriented ring: its two tagged ends and its direction.
type TaggedEdge = (FlatPoint, FlatPoint, bool);

impl PreparedPath {
    /// Flatten, resolve overlapping subpaths, and orient a path.
    ///
    /// Rings with fewer than three distinct vertices or no enclosed area are
    /// dropped; they cannot bound a region. Fails with
    /// [`BooleanError::TooComplex`] when resolving overlaps between subpaths
    /// would test more edge pairs than the settings allow.
    pub fn new(path: &Path, settings: &BooleanSettings) -> Result<Self> {
        let tol = settings.precision;
        let contours = flatten_path(path, &settings.flatten_options());

        let mut flat_rings: Vec<Vec<FlatPoint>> = Vec::new();
        for contour in contours {
            let points = dedup_ring(contour.points, tol);
            if points.len() < 3 {
                tracing::trace!(subpath = contour.subpath, "dropping degenerate contour");
                continue;
            }
            flat_rings.push(points);
        }
        let rings: Vec<Vec<Point2>> = flat_rings
            .iter()
            .map(|r| r.iter().map(|fp| fp.point).collect())
            .collect();

        let splits = overlap_splits(&flat_rings, tol, settings.max_edge_pairs)?;
        let mut oriented: Vec<Vec<TaggedEdge>> = Vec::new();
        let mut pieces: Vec<BoundaryPiece> = Vec::new();
        for (ring, ring_splits) in flat_rings.iter().zip(&splits) {
            match split_cycle(ring, ring_splits, tol) {
                None => {
                    let positions: Vec<Point2> = ring.iter().map(|fp| fp.point).collect();
                    let side = filled_side(&positions, true, &rings, path.fill_rule, settings);
                    let reversed = match side {
                        Some(FilledSide::Left) => false,
                        Some(FilledSide::Right) => true,
                        None => {
                            tracing::trace!("ring does not separate filled from unfilled space");
                            continue;
                        }
                    };
                    oriented.push(ring_edges(ring, reversed));
                }
                Some(cut) => {
                    for piece in cut {
                        if let Some(piece) =
                            BoundaryPiece::new(piece, &rings, path.fill_rule, settings)
                        {
                            if !pieces.iter().any(|kept| kept.coincides(&piece, tol)) {
                                pieces.push(piece);
                            }
                        }
                    }
                }
            }
        }

        let mut warnings = Vec::new();
        if !pieces.is_empty() {
            let (stitched, mut dropped) = stitch_pieces(pieces, tol);
            tracing::debug!(rings = stitched.len(), "resolved overlapping subpaths");
            oriented.extend(stitched);
            warnings.append(&mut dropped);
        }

        let mut boundary = Vec::with_capacity(oriented.len());
        let mut edges = Vec::new();
        for ring in oriented {
            if ring.len() < 3 {
                continue;
            }
            let index = boundary.len();
            let first_edge = edges.len();
            let points: Vec<Point2> = ring.iter().map(|(from, _, _)| from.point).collect();
            let n = points.len();
            for (i, (from, to, reversed)) in ring.iter().enumerate() {
                let (segment, t0, t1) = edge_params(from, to, *reversed);
                edges.push(FlattenedEdge {
                    start: points[i],
                    end: points[(i + 1) % n],
                    ring: index,
                    segment,
                    t0,
                    t1,
                });
            }
            boundary.push(BoundaryRing { points, first_edge });
        }

        let bbox = BoundingBox::from_points(rings.iter().flatten());
        tracing::debug!(
            rings = rings.len(),
            boundary = boundary.len(),
            edges = edges.len(),
            "prepared operand"
        );

        Ok(Self {
            fill_rule: path.fill_rule,
            rings,
            boundary,
            edges,
            bbox,
            warnings,
        })
    }

    /// True when the operand encloses nothing.
    pub fn is_empty(&self) -> bool {
        self.boundary.is_empty()
    }

    /// Fill test against the operand as drawn.
    pub fn fills(&self, point: &Point2) -> bool {
        is_filled(&self.rings, point, self.fill_rule)
    }

    /// Containment of `point`, with the boundary taken from the oriented
    /// rings so edges buried inside the fill do not count.
    pub fn containment(&self, point: &Point2, tol: f64) -> Containment {
        if self
            .boundary
            .iter()
            .any(|ring| near_ring(&ring.points, point, tol))
        {
            Containment::BOUNDARY
        } else if self.fills(point) {
            Containment::INSIDE
        } else {
            Containment::OUTSIDE
        }
    }
}

/// Split points where the rings of one operand meet each other, per ring.
fn overlap_splits(
    flat_rings: &[Vec<FlatPoint>],
    tol: f64,
    max_pairs: usize,
) -> Result<Vec<Vec<SplitPoint>>> {
    let mut splits = vec![Vec::new(); flat_rings.len()];
    if flat_rings.len() < 2 {
        return Ok(splits);
    }

    let mut pairs = 0usize;
    for (i, a) in flat_rings.iter().enumerate() {
        for b in &flat_rings[i + 1..] {
            pairs = pairs.saturating_add(a.len().saturating_mul(b.len()));
        }
    }
    if pairs > max_pairs {
        return Err(BooleanError::TooComplex {
            pairs,
            limit: max_pairs,
        });
    }

    let edges: Vec<Vec<FlattenedEdge>> = flat_rings
        .iter()
        .enumerate()
        .map(|(index, ring)| {
            let n = ring.len();
            (0..n)
                .map(|i| {
                    let (from, to) = (&ring[i], &ring[(i + 1) % n]);
                    let (segment, t0, t1) = edge_params(from, to, false);
                    FlattenedEdge {
                        start: from.point,
                        end: to.point,
                        ring: index,
                        segment,
                        t0,
                        t1,
                    }
                })
                .collect()
        })
        .collect();
    let boxes: Vec<BoundingBox> = flat_rings
        .iter()
        .map(|ring| {
            let mut bbox = BoundingBox::from_points(ring.iter().map(|fp| &fp.point));
            bbox.expand(tol);
            bbox
        })
        .collect();

    for i in 0..edges.len() {
        for j in i + 1..edges.len() {
            if !boxes[i].overlaps(&boxes[j]) {
                continue;
            }
            for ip in find_intersections(&edges[i], &edges[j], tol, usize::MAX)? {
                splits[i].push(SplitPoint {
                    edge: ip.edge_a,
                    t: ip.param_a,
                    point: ip.point,
                });
                splits[j].push(SplitPoint {
                    edge: ip.edge_b,
                    t: ip.param_b,
                    point: ip.point,
                });
            }
        }
    }
    Ok(splits)
}

/// A cut piece of a ring that separates filled from unfilled space,
/// oriented with the fill on its left.
struct BoundaryPiece {
    points: Vec<FlatPoint>,
    reversed: bool,
    mid: Point2,
}

impl BoundaryPiece {
    fn new(
        mut points: Vec<FlatPoint>,
        rings: &[Vec<Point2>],
        fill_rule: FillRule,
        settings: &BooleanSettings,
    ) -> Option<Self> {
        let positions: Vec<Point2> = points.iter().map(|fp| fp.point).collect();
        let (mid, _, _) = polyline_midpoint(&positions, false)?;
        let reversed = match filled_side(&positions, false, rings, fill_rule, settings) {
            Some(FilledSide::Left) => false,
            Some(FilledSide::Right) => true,
            None => {
                tracing::trace!(points = points.len(), "dropping interior boundary piece");
                return None;
            }
        };
        if reversed {
            points.reverse();
        }
        Some(Self {
            points,
            reversed,
            mid,
        })
    }

    fn start(&self) -> Point2 {
        self.points[0].point
    }

    fn end(&self) -> Point2 {
        self.points[self.points.len() - 1].point
    }

    /// Same span of boundary traced by another ring.
    fn coincides(&self, other: &Self, tol: f64) -> bool {
        distance(&self.start(), &other.start()) <= tol
            && distance(&self.end(), &other.end()) <= tol
            && distance(&self.mid, &other.mid) <= tol
    }
}

/// Stitch kept pieces into rings; unclosable chains come back as warnings.
fn stitch_pieces(pieces: Vec<BoundaryPiece>, tol: f64) -> (Vec<Vec<TaggedEdge>>, Vec<String>) {
    let polylines: Vec<Vec<Point2>> = pieces
        .iter()
        .map(|p| p.points.iter().map(|fp| fp.point).collect())
        .collect();
    let (closed, unclosed) = link_chains(&polylines, tol);

    let rings: Vec<Vec<TaggedEdge>> = closed
        .into_iter()
        .map(|order| {
            order
                .iter()
                .flat_map(|&i| {
                    let piece = &pieces[i];
                    piece
                        .points
                        .windows(2)
                        .map(move |w| (w[0], w[1], piece.reversed))
                })
                .collect()
        })
        .collect();

    let warnings: Vec<String> = unclosed
        .into_iter()
        .map(|order| {
            let start = pieces[order[0]].start();
            tracing::warn!(pieces = order.len(), "could not close operand boundary");
            format!(
                "dropped an open operand boundary of {} pieces starting at ({}, {})",
                order.len(),
                start.x,
                start.y
            )
        })
        .collect();
    (rings, warnings)
}

/// Edges of a whole ring, walked forward or backward.
fn ring_edges(ring: &[FlatPoint], reversed: bool) -> Vec<TaggedEdge> {
    let n = ring.len();
    if reversed {
        (0..n)
            .rev()
            .map(|i| (ring[i], ring[(i + n - 1) % n], true))
            .collect()
    } else {
        (0..n).map(|i| (ring[i], ring[(i + 1) % n], false)).collect()
    }
}

enum FilledSide {
    Left,
    Right,
}

/// Probe just off the midpoint of the longest edge of a ring or polyline.
///
/// The midpoint of an edge stays clear of the corners, where a probe could
/// run along the neighbouring edge.
fn filled_side(
    points: &[Point2],
    closed: bool,
    rings: &[Vec<Point2>],
    fill_rule: FillRule,
    settings: &BooleanSettings,
) -> Option<FilledSide> {
    let n = points.len();
    let edge_count = if closed { n } else { n.saturating_sub(1) };
    let (i, len) = (0..edge_count)
        .map(|i| (i, distance(&points[i], &points[(i + 1) % n])))
        .max_by(|a, b| a.1.total_cmp(&b.1))?;
    let a = points[i];
    let b = points[(i + 1) % n];
    let mid = Point2::from((a.coords + b.coords) * 0.5);
    probe_sides(&mid, &(b - a), len, rings, fill_rule, settings)
}

/// Which side of an edge through `mid` along `dir` is filled, if exactly one.
fn probe_sides(
    mid: &Point2,
    dir: &Vec2,
    len: f64,
    rings: &[Vec<Point2>],
    fill_rule: FillRule,
    settings: &BooleanSettings,
) -> Option<FilledSide> {
    if len <= settings.precision {
        return None;
    }
    let offset = left_normal(dir) * settings.probe_distance(len);
    let left = is_filled(rings, &(mid + offset), fill_rule);
    let right = is_filled(rings, &(mid - offset), fill_rule);
    match (left, right) {
        (true, false) => Some(FilledSide::Left),
        (false, true) => Some(FilledSide::Right),
        _ => None,
    }
}

/// Unit normal pointing to the left of `dir`.
pub(crate) fn left_normal(dir: &Vec2) -> Vec2 {
    let len = dir.norm();
    if len == 0.0 {
        return Vec2::zeros();
    }
    Vec2::new(-dir.y / len, dir.x / len)
}

fn edge_params(from: &FlatPoint, to: &FlatPoint, reversed: bool) -> (usize, f64, f64) {
    // Forward, the edge belongs to the segment of its end vertex.
    let (owner, other) = if reversed { (from, to) } else { (to, from) };
    let start = if other.segment == owner.segment {
        other.t
    } else {
        0.0
    };
    if reversed {
        (owner.segment, owner.t, start)
    } else {
        (owner.segment, start, owner.t)
    }
}

fn dedup_ring(points: Vec<FlatPoint>, tol: f64) -> Vec<FlatPoint> {
    let mut out: Vec<FlatPoint> = Vec::with_capacity(points.len());
    for fp in points {
        if out
            .last()
            .is_some_and(|last| distance(&last.point, &fp.point) <= tol)
        {
            continue;
        }
        out.push(fp);
    }
    while out.len() > 1 && distance(&out[0].point, &out[out.len() - 1].point) <= tol {
        out.pop();
    }
    out
}

//! Splitting boundary rings into fragments at intersection points.

use canvas_kernel_math::{distance, Point2};
use canvas_kernel_path::FlatPoint;

use crate::edges::{BoundaryRing, PreparedPath};

/// A piece of an operand's boundary between two consecutive split points.
///
/// A ring without any split point becomes a single closed fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// Polyline vertices in boundary direction.
    pub points: Vec<Point2>,
    /// True for a whole, unsplit ring.
    pub closed: bool,
    /// Boundary ring the fragment came from.
    pub ring: usize,
}

impl Fragment {
    /// First vertex.
    pub fn start(&self) -> Option<&Point2> {
        self.points.first()
    }

    /// Last vertex.
    pub fn end(&self) -> Option<&Point2> {
        self.points.last()
    }

    /// Total polyline length, including the closing edge of a closed fragment.
    pub fn length(&self) -> f64 {
        let open: f64 = self
            .points
            .windows(2)
            .map(|w| distance(&w[0], &w[1]))
            .sum();
        match (self.closed, self.points.first(), self.points.last()) {
            (true, Some(first), Some(last)) => open + distance(last, first),
            _ => open,
        }
    }

    /// Reverse traversal direction.
    pub fn reverse(&mut self) {
        self.points.reverse();
    }
}

/// A split location on an operand edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitPoint {
    /// Global edge index.
    pub edge: usize,
    /// Parameter along the edge.
    pub t: f64,
    /// Location; replaces the vertex when the split falls on one.
    pub point: Point2,
}

/// Split every boundary ring of `operand` at `splits`.
pub fn split_operand(operand: &PreparedPath, splits: &[SplitPoint], tol: f64) -> Vec<Fragment> {
    let mut per_ring: Vec<Vec<SplitPoint>> = vec![Vec::new(); operand.boundary.len()];
    for split in splits {
        if let Some(edge) = operand.edges.get(split.edge) {
            let ring = &operand.boundary[edge.ring];
            per_ring[edge.ring].push(SplitPoint {
                edge: split.edge - ring.first_edge,
                ..*split
            });
        }
    }

    let mut fragments = Vec::new();
    for (index, (ring, ring_splits)) in operand.boundary.iter().zip(&per_ring).enumerate() {
        split_ring(ring, index, ring_splits, tol, &mut fragments);
    }
    tracing::debug!(
        splits = splits.len(),
        fragments = fragments.len(),
        "split operand"
    );
    fragments
}

/// Split one ring; `splits` use ring-local edge indices.
fn split_ring(
    ring: &BoundaryRing,
    index: usize,
    splits: &[SplitPoint],
    tol: f64,
    out: &mut Vec<Fragment>,
) {
    match split_cycle(&ring.points, splits, tol) {
        None => out.push(Fragment {
            points: ring.points.clone(),
            closed: true,
            ring: index,
        }),
        Some(pieces) => out.extend(pieces.into_iter().map(|points| Fragment {
            points,
            closed: false,
            ring: index,
        })),
    }
}

/// A ring vertex that can be moved or cut between two neighbours.
pub(crate) trait RingVertex: Copy {
    /// Vertex position.
    fn position(&self) -> Point2;

    /// The same vertex relocated to `point`.
    fn moved(&self, point: Point2) -> Self;

    /// A new vertex at `point`, fraction `t` of the way towards `next`.
    fn cut(&self, next: &Self, t: f64, point: Point2) -> Self;
}

impl RingVertex for Point2 {
    fn position(&self) -> Point2 {
        *self
    }

    fn moved(&self, point: Point2) -> Self {
        point
    }

    fn cut(&self, _next: &Self, _t: f64, point: Point2) -> Self {
        point
    }
}

impl RingVertex for FlatPoint {
    fn position(&self) -> Point2 {
        self.point
    }

    fn moved(&self, point: Point2) -> Self {
        FlatPoint { point, ..*self }
    }

    fn cut(&self, next: &Self, t: f64, point: Point2) -> Self {
        // The edge belongs to the segment of its end vertex.
        let start = if self.segment == next.segment {
            self.t
        } else {
            0.0
        };
        FlatPoint {
            point,
            segment: next.segment,
            t: start + (next.t - start) * t,
        }
    }
}

/// Cut a closed ring into open pieces running from split to split.
///
/// Returns `None` when no split lands on the ring. A single split yields one
/// piece that starts and ends at the same point.
pub(crate) fn split_cycle<V: RingVertex>(
    ring: &[V],
    splits: &[SplitPoint],
    tol: f64,
) -> Option<Vec<Vec<V>>> {
    let n = ring.len();
    if splits.is_empty() || n == 0 {
        return None;
    }

    let mut at_vertex: Vec<Option<Point2>> = vec![None; n];
    let mut on_edge: Vec<Vec<(f64, Point2)>> = vec![Vec::new(); n];
    for split in splits.iter().filter(|s| s.edge < n) {
        let from = ring[split.edge].position();
        let to = ring[(split.edge + 1) % n].position();
        let len = distance(&from, &to);
        if split.t * len <= tol {
            at_vertex[split.edge] = Some(split.point);
        } else if (1.0 - split.t) * len <= tol {
            at_vertex[(split.edge + 1) % n] = Some(split.point);
        } else {
            on_edge[split.edge].push((split.t, split.point));
        }
    }

    // Vertices interleaved with interior splits; flag marks a split.
    let mut augmented: Vec<(V, bool)> = Vec::with_capacity(n + splits.len());
    for i in 0..n {
        let vertex = match at_vertex[i] {
            Some(p) => (ring[i].moved(p), true),
            None => (ring[i], false),
        };
        push_merged(&mut augmented, vertex, tol);
        on_edge[i].sort_by(|a, b| a.0.total_cmp(&b.0));
        let next = &ring[(i + 1) % n];
        for &(t, p) in &on_edge[i] {
            push_merged(&mut augmented, (ring[i].cut(next, t, p), true), tol);
        }
    }
    if augmented.len() > 1 {
        let last = augmented[augmented.len() - 1];
        if distance(&last.0.position(), &augmented[0].0.position()) <= tol {
            augmented.pop();
            if last.1 {
                augmented[0] = last;
            }
        }
    }

    let first = augmented.iter().position(|&(_, is_split)| is_split)?;
    augmented.rotate_left(first);

    let len = augmented.len();
    let mut pieces = Vec::new();
    let mut current = vec![augmented[0].0];
    for j in 1..=len {
        let (v, is_split) = augmented[j % len];
        current.push(v);
        if is_split {
            pieces.push(std::mem::replace(&mut current, vec![v]));
        }
    }
    Some(pieces)
}

fn push_merged<V: RingVertex>(points: &mut Vec<(V, bool)>, next: (V, bool), tol: f64) {
    if let Some(last) = points.last_mut() {
        if distance(&last.0.position(), &next.0.position()) <= tol {
            if next.1 {
                *last = next;
            }
            return;
        }
    }
    points.push(next);
}

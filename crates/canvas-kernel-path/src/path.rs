//! The path container and subpath iteration.

use std::f64::consts::TAU;

use canvas_kernel_math::{is_finite_point, BoundingBox, Point2};
use serde::{Deserialize, Serialize};

use crate::error::PathError;
use crate::flatten::{flatten_path, path_signed_area, FlattenOptions};
use crate::segment::PathSegment;

/// Policy deciding which regions of a path count as inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FillRule {
    /// Inside where the winding number is not zero.
    #[default]
    #[serde(rename = "nonzero")]
    NonZero,
    /// Inside where a ray crosses the boundary an odd number of times.
    #[serde(rename = "evenodd")]
    EvenOdd,
}

impl FillRule {
    /// Apply the rule to a winding number.
    pub fn is_inside(self, winding: i32) -> bool {
        match self {
            FillRule::NonZero => winding != 0,
            FillRule::EvenOdd => winding % 2 != 0,
        }
    }
}

/// An ordered stream of segments, possibly holding several subpaths.
///
/// Each `moveTo` starts a new subpath. Operations never mutate a path they
/// receive; results are always fresh values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Path {
    /// Segments in drawing order.
    #[serde(default)]
    pub segments: Vec<PathSegment>,
    /// Close every subpath back to its start.
    #[serde(default)]
    pub closed: bool,
    /// Fill rule used to decide the path's interior.
    #[serde(default)]
    pub fill_rule: FillRule,
}

/// A borrowed run of segments between two `moveTo`s.
#[derive(Debug, Clone, Copy)]
pub struct Subpath<'a> {
    /// Anchor the subpath starts from.
    pub start: Point2,
    /// Index of `segments[0]` within the owning path.
    pub first_segment: usize,
    /// The segments of this subpath, including its leading `moveTo`.
    pub segments: &'a [PathSegment],
    /// True if a `closePath` segment ends the subpath.
    pub closed: bool,
}

impl Path {
    /// Create a path from segments with the default fill rule.
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self {
            segments,
            closed: false,
            fill_rule: FillRule::NonZero,
        }
    }

    /// The empty path.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Replace the fill rule.
    pub fn with_fill_rule(mut self, fill_rule: FillRule) -> Self {
        self.fill_rule = fill_rule;
        self
    }

    /// Set the closed flag.
    pub fn with_closed(mut self, closed: bool) -> Self {
        self.closed = closed;
        self
    }

    /// Axis-aligned rectangle traced counter-clockwise (in y-up terms).
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::polygon(&[
            Point2::new(x, y),
            Point2::new(x + width, y),
            Point2::new(x + width, y + height),
            Point2::new(x, y + height),
        ])
    }

    /// Closed polygon through the given vertices.
    pub fn polygon(points: &[Point2]) -> Self {
        let Some((first, rest)) = points.split_first() else {
            return Self::empty();
        };
        let mut segments = Vec::with_capacity(points.len() + 1);
        segments.push(PathSegment::move_to(*first));
        segments.extend(rest.iter().map(|p| PathSegment::line_to(*p)));
        segments.push(PathSegment::close());
        Self::new(segments).with_closed(true)
    }

    /// Full circle as a single arc segment.
    pub fn circle(center: Point2, radius: f64) -> Self {
        Self::new(vec![
            PathSegment::move_to(Point2::new(center.x + radius, center.y)),
            PathSegment::arc(center, radius, 0.0, TAU, false),
            PathSegment::close(),
        ])
        .with_closed(true)
    }

    /// True if the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Structural validity check.
    ///
    /// A path is valid when its first segment (if any) is a `moveTo` and every
    /// `moveTo`, `lineTo`, and curve segment carries at least one point.
    pub fn validate(&self) -> bool {
        self.check().is_ok()
    }

    /// Like [`Path::validate`], but reports the first problem found.
    pub fn check(&self) -> Result<(), PathError> {
        if let Some(first) = self.segments.first() {
            if !first.is_move_to() {
                return Err(PathError::MissingMoveTo(first.kind()));
            }
        }
        for (index, segment) in self.segments.iter().enumerate() {
            if !segment.is_close() && segment.points().is_empty() {
                return Err(PathError::MissingPoints {
                    index,
                    kind: segment.kind(),
                });
            }
            if !segment.is_finite() {
                return Err(PathError::NonFinite(index));
            }
        }
        Ok(())
    }

    /// Split the segment stream into subpaths.
    ///
    /// A `moveTo` without a usable point is ignored. Drawing segments that
    /// appear with no current point start a subpath at their own first anchor,
    /// as canvas does; after a `closePath`, drawing continues from the closed
    /// subpath's start.
    pub fn subpaths(&self) -> Vec<Subpath<'_>> {
        let mut result = Vec::new();
        let mut current: Option<(Point2, usize, bool)> = None;
        let mut last_start: Option<Point2> = None;

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::MoveTo { points } => {
                    let Some(p) = points.first().copied().filter(is_finite_point) else {
                        tracing::warn!(segment = i, "moveTo without a usable point, skipped");
                        continue;
                    };
                    if let Some((start, first, closed)) = current.take() {
                        result.push(Subpath {
                            start,
                            first_segment: first,
                            segments: &self.segments[first..i],
                            closed,
                        });
                    }
                    current = Some((p, i, false));
                    last_start = Some(p);
                }
                PathSegment::ClosePath => {
                    if let Some((_, _, closed)) = current.as_mut() {
                        *closed = true;
                    }
                }
                _ => {
                    if let Some((start, first, true)) = current {
                        result.push(Subpath {
                            start,
                            first_segment: first,
                            segments: &self.segments[first..i],
                            closed: true,
                        });
                        current = Some((start, i, false));
                    }
                    if current.is_none() {
                        let implicit = last_start.or_else(|| {
                            segment
                                .points()
                                .iter()
                                .copied()
                                .find(is_finite_point)
                        });
                        if let Some(p) = implicit {
                            current = Some((p, i, false));
                            last_start = Some(p);
                        }
                    }
                }
            }
        }

        if let Some((start, first, closed)) = current {
            result.push(Subpath {
                start,
                first_segment: first,
                segments: &self.segments[first..],
                closed,
            });
        }
        result
    }

    /// Anchor points of every subpath, in order.
    ///
    /// Curves contribute only their terminal anchors. When the subpath is
    /// closed (by `closePath` or the path's `closed` flag) its start point is
    /// repeated at the end.
    pub fn subpath_anchors(&self) -> Vec<Vec<Point2>> {
        self.subpaths()
            .into_iter()
            .map(|sub| {
                let mut anchors = vec![sub.start];
                for segment in sub.segments {
                    match segment {
                        PathSegment::MoveTo { .. } | PathSegment::ClosePath => {}
                        PathSegment::LineTo { points } => {
                            anchors.extend(points.iter().copied().filter(is_finite_point))
                        }
                        PathSegment::Arc { .. } => {
                            if let Some(start) = segment.start_point() {
                                anchors.push(start);
                            }
                            if let Some(end) = segment.end_point() {
                                anchors.push(end);
                            }
                        }
                        _ => {
                            if let Some(end) = segment.end_point() {
                                anchors.push(end);
                            }
                        }
                    }
                }
                if sub.closed || self.closed {
                    anchors.push(sub.start);
                }
                anchors
            })
            .collect()
    }

    /// Bounding box of the flattened geometry.
    pub fn bounding_box(&self, tolerance: f64) -> BoundingBox {
        let mut bbox = BoundingBox::empty();
        for contour in flatten_path(self, &FlattenOptions::with_tolerance(tolerance)) {
            for p in &contour.points {
                bbox.include_point(&p.point);
            }
        }
        bbox
    }

    /// Sum of signed contour areas after flattening.
    pub fn signed_area(&self, tolerance: f64) -> f64 {
        path_signed_area(self, &FlattenOptions::with_tolerance(tolerance))
    }

    /// Number of subpaths.
    pub fn subpath_count(&self) -> usize {
        self.subpaths().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_empty_path_is_valid() {
        assert!(Path::empty().validate());
        assert!(Path::empty().subpaths().is_empty());
    }

    #[test]
    fn test_rect_is_valid() {
        let path = Path::rect(0.0, 0.0, 10.0, 10.0);
        assert!(path.validate());
        assert_eq!(path.subpath_count(), 1);
    }

    #[test]
    fn test_first_segment_must_be_move_to() {
        let path = Path::new(vec![PathSegment::line_to(Point2::new(1.0, 1.0))]);
        assert_eq!(path.check(), Err(PathError::MissingMoveTo("lineTo")));
        assert!(!path.validate());
    }

    #[test]
    fn test_zero_point_move_to_is_invalid() {
        let path = Path::new(vec![
            PathSegment::MoveTo { points: vec![] },
            PathSegment::line_to(Point2::new(1.0, 1.0)),
        ]);
        assert_eq!(
            path.check(),
            Err(PathError::MissingPoints {
                index: 0,
                kind: "moveTo"
            })
        );
    }

    #[test]
    fn test_subpath_split_on_move_to() {
        let path = Path::new(vec![
            PathSegment::move_to(Point2::new(0.0, 0.0)),
            PathSegment::line_to(Point2::new(1.0, 0.0)),
            PathSegment::close(),
            PathSegment::move_to(Point2::new(5.0, 5.0)),
            PathSegment::line_to(Point2::new(6.0, 5.0)),
        ]);
        let subs = path.subpaths();
        assert_eq!(subs.len(), 2);
        assert!(subs[0].closed);
        assert!(!subs[1].closed);
        assert_eq!(subs[1].first_segment, 3);
        assert_eq!(subs[1].start, Point2::new(5.0, 5.0));
    }

    #[test]
    fn test_anchors_close_back_to_start() {
        let path = Path::rect(0.0, 0.0, 2.0, 1.0);
        let anchors = path.subpath_anchors();
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].len(), 5);
        assert_eq!(anchors[0].first(), anchors[0].last());
    }

    #[test]
    fn test_open_path_closed_flag() {
        let open = Path::new(vec![
            PathSegment::move_to(Point2::new(0.0, 0.0)),
            PathSegment::line_to(Point2::new(1.0, 0.0)),
        ]);
        assert_eq!(open.subpath_anchors()[0].len(), 2);
        assert_eq!(open.with_closed(true).subpath_anchors()[0].len(), 3);
    }

    #[test]
    fn test_drawing_after_close_restarts_at_start() {
        let path = Path::new(vec![
            PathSegment::move_to(Point2::new(0.0, 0.0)),
            PathSegment::line_to(Point2::new(1.0, 0.0)),
            PathSegment::line_to(Point2::new(1.0, 1.0)),
            PathSegment::close(),
            PathSegment::line_to(Point2::new(-1.0, 0.0)),
        ]);
        let subs = path.subpaths();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[1].start, Point2::new(0.0, 0.0));
    }

    #[test]
    fn test_zero_point_move_to_is_skipped() {
        let path = Path::new(vec![
            PathSegment::MoveTo { points: vec![] },
            PathSegment::line_to(Point2::new(1.0, 1.0)),
            PathSegment::line_to(Point2::new(2.0, 0.0)),
        ]);
        let subs = path.subpaths();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].start, Point2::new(1.0, 1.0));
    }

    #[test]
    fn test_fill_rule_inside() {
        assert!(FillRule::NonZero.is_inside(2));
        assert!(!FillRule::EvenOdd.is_inside(2));
        assert!(FillRule::EvenOdd.is_inside(-1));
        assert!(!FillRule::NonZero.is_inside(0));
    }

    #[test]
    fn test_circle_bbox() {
        let path = Path::circle(Point2::new(5.0, 5.0), 5.0);
        let bbox = path.bounding_box(0.001);
        assert_abs_diff_eq!(bbox.min.x, 0.0, epsilon = 1e-2);
        assert_abs_diff_eq!(bbox.max.y, 10.0, epsilon = 1e-2);
    }

    #[test]
    fn test_json_round_trip() {
        let path = Path::rect(1.0, 2.0, 3.0, 4.0).with_fill_rule(FillRule::EvenOdd);
        let json = serde_json::to_string(&path).unwrap();
        assert!(json.contains("\"fillRule\":\"evenodd\""));
        let back: Path = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }
}

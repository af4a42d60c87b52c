//! Path segment types.

use std::f64::consts::TAU;

use canvas_kernel_math::{is_finite_point, Point2};
use serde::{Deserialize, Serialize};

/// A segment of a canvas path.
///
/// Segments follow the canvas 2D drawing commands. Every drawing variant
/// carries its anchor `points`; the last entry is the terminal anchor. For
/// `Arc`, `points[0]` is the center of the circle instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PathSegment {
    /// Start a new subpath at `points[0]`.
    MoveTo {
        /// Anchor of the new subpath.
        #[serde(default)]
        points: Vec<Point2>,
    },
    /// Straight line(s) through each point in order.
    LineTo {
        /// Anchors reached in order.
        #[serde(default)]
        points: Vec<Point2>,
    },
    /// Cubic Bézier curve ending at `points[0]`.
    #[serde(rename_all = "camelCase")]
    BezierCurveTo {
        /// Terminal anchor.
        #[serde(default)]
        points: Vec<Point2>,
        /// The two control points.
        #[serde(default)]
        control_points: Vec<Point2>,
    },
    /// Quadratic Bézier curve ending at `points[0]`.
    #[serde(rename_all = "camelCase")]
    QuadraticCurveTo {
        /// Terminal anchor.
        #[serde(default)]
        points: Vec<Point2>,
        /// The single control point.
        #[serde(default)]
        control_points: Vec<Point2>,
    },
    /// Circular arc around `points[0]`.
    ///
    /// Like the canvas `arc()` call, a straight line joins the current point
    /// to the arc's start before the arc is traced.
    #[serde(rename_all = "camelCase")]
    Arc {
        /// `points[0]` is the arc center.
        #[serde(default)]
        points: Vec<Point2>,
        /// Circle radius.
        radius: f64,
        /// Start angle in radians.
        start_angle: f64,
        /// End angle in radians.
        end_angle: f64,
        /// Sweep direction.
        #[serde(default)]
        anticlockwise: bool,
    },
    /// Close the current subpath back to its start.
    ClosePath,
}

impl PathSegment {
    /// Create a `moveTo` segment.
    pub fn move_to(p: Point2) -> Self {
        PathSegment::MoveTo { points: vec![p] }
    }

    /// Create a `lineTo` segment.
    pub fn line_to(p: Point2) -> Self {
        PathSegment::LineTo { points: vec![p] }
    }

    /// Create a cubic `bezierCurveTo` segment.
    pub fn bezier_curve_to(c1: Point2, c2: Point2, end: Point2) -> Self {
        PathSegment::BezierCurveTo {
            points: vec![end],
            control_points: vec![c1, c2],
        }
    }

    /// Create a `quadraticCurveTo` segment.
    pub fn quadratic_curve_to(control: Point2, end: Point2) -> Self {
        PathSegment::QuadraticCurveTo {
            points: vec![end],
            control_points: vec![control],
        }
    }

    /// Create an `arc` segment.
    pub fn arc(
        center: Point2,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    ) -> Self {
        PathSegment::Arc {
            points: vec![center],
            radius,
            start_angle,
            end_angle,
            anticlockwise,
        }
    }

    /// Create a `closePath` segment.
    pub fn close() -> Self {
        PathSegment::ClosePath
    }

    /// Canvas command name of this segment.
    pub fn kind(&self) -> &'static str {
        match self {
            PathSegment::MoveTo { .. } => "moveTo",
            PathSegment::LineTo { .. } => "lineTo",
            PathSegment::BezierCurveTo { .. } => "bezierCurveTo",
            PathSegment::QuadraticCurveTo { .. } => "quadraticCurveTo",
            PathSegment::Arc { .. } => "arc",
            PathSegment::ClosePath => "closePath",
        }
    }

    /// Anchor points carried by the segment (empty for `closePath`).
    pub fn points(&self) -> &[Point2] {
        match self {
            PathSegment::MoveTo { points }
            | PathSegment::LineTo { points }
            | PathSegment::BezierCurveTo { points, .. }
            | PathSegment::QuadraticCurveTo { points, .. }
            | PathSegment::Arc { points, .. } => points,
            PathSegment::ClosePath => &[],
        }
    }

    /// True for `moveTo`.
    pub fn is_move_to(&self) -> bool {
        matches!(self, PathSegment::MoveTo { .. })
    }

    /// True for `closePath`.
    pub fn is_close(&self) -> bool {
        matches!(self, PathSegment::ClosePath)
    }

    /// First point this segment draws from, when it differs from the
    /// preceding anchor by construction (only arcs have one).
    pub fn start_point(&self) -> Option<Point2> {
        match self {
            PathSegment::Arc {
                points,
                radius,
                start_angle,
                ..
            } => arc_point(*points.first()?, *radius, *start_angle),
            _ => self.end_point(),
        }
    }

    /// Terminal anchor of the segment, if it has a well-defined one.
    pub fn end_point(&self) -> Option<Point2> {
        match self {
            PathSegment::Arc {
                points,
                radius,
                start_angle,
                end_angle,
                anticlockwise,
            } => {
                let sweep = arc_sweep(*start_angle, *end_angle, *anticlockwise);
                arc_point(*points.first()?, *radius, start_angle + sweep)
            }
            PathSegment::ClosePath => None,
            _ => self.points().last().copied().filter(is_finite_point),
        }
    }

    /// True if every coordinate and parameter is finite.
    pub fn is_finite(&self) -> bool {
        let points_ok = self.points().iter().all(is_finite_point);
        match self {
            PathSegment::BezierCurveTo { control_points, .. }
            | PathSegment::QuadraticCurveTo { control_points, .. } => {
                points_ok && control_points.iter().all(is_finite_point)
            }
            PathSegment::Arc {
                radius,
                start_angle,
                end_angle,
                ..
            } => points_ok && radius.is_finite() && start_angle.is_finite() && end_angle.is_finite(),
            _ => points_ok,
        }
    }
}

/// Signed sweep of a canvas arc in radians.
///
/// Follows the canvas rules: a request spanning a full turn or more in the
/// drawing direction yields exactly one full turn; otherwise the sweep is the
/// angular distance from start to end travelled in the drawing direction.
pub fn arc_sweep(start_angle: f64, end_angle: f64, anticlockwise: bool) -> f64 {
    if anticlockwise {
        if start_angle - end_angle >= TAU {
            -TAU
        } else {
            -(start_angle - end_angle).rem_euclid(TAU)
        }
    } else if end_angle - start_angle >= TAU {
        TAU
    } else {
        (end_angle - start_angle).rem_euclid(TAU)
    }
}

/// Point on a circle at `angle`, or `None` if the geometry is not finite.
pub(crate) fn arc_point(center: Point2, radius: f64, angle: f64) -> Option<Point2> {
    let p = Point2::new(
        center.x + radius * angle.cos(),
        center.y + radius * angle.sin(),
    );
    is_finite_point(&p).then_some(p)
}

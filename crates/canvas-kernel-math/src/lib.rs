#![warn(missing_docs)]

//! Math types for the canvas path kernel.
//!
//! Thin wrappers around nalgebra providing the 2D types used by the path
//! model and the boolean engine: points, vectors, bounding boxes, and the
//! tolerance predicates every other stage builds on.

use serde::{Deserialize, Serialize};

/// A point in the 2D canvas plane.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in the 2D canvas plane.
pub type Vec2 = nalgebra::Vector2<f64>;

/// Default linear tolerance used when the host has not called `set_precision`.
pub const DEFAULT_PRECISION: f64 = 1e-9;

/// Euclidean distance between two points.
pub fn distance(p1: &Point2, p2: &Point2) -> f64 {
    (p2 - p1).norm()
}

/// Compare two scalars with an absolute epsilon.
pub fn almost_equal(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() <= epsilon
}

/// 2D cross product (z component of the 3D cross product).
pub fn cross(a: &Vec2, b: &Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Linear interpolation between two points.
pub fn lerp(a: &Point2, b: &Point2, t: f64) -> Point2 {
    a + (b - a) * t
}

/// Check that both coordinates of a point are finite.
pub fn is_finite_point(p: &Point2) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

/// Axis-aligned bounding box in 2D.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum corner.
    pub min: Point2,
    /// Maximum corner.
    pub max: Point2,
}

impl BoundingBox {
    /// Create a box from min and max corners.
    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    /// Create an empty (inverted) box suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point2::new(f64::INFINITY, f64::INFINITY),
            max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Smallest box containing every point.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.include_point(p);
        }
        bbox
    }

    /// True if no point has been included yet.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Expand this box to include a point.
    pub fn include_point(&mut self, p: &Point2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Expand this box to include another box.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Test if two boxes overlap (touching counts as overlap).
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Grow the box by a tolerance in all directions.
    pub fn expand(&mut self, tol: f64) {
        self.min.x -= tol;
        self.min.y -= tol;
        self.max.x += tol;
        self.max.y += tol;
    }

    /// Width of the box (zero when empty).
    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max.x - self.min.x
        }
    }

    /// Height of the box (zero when empty).
    pub fn height(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max.y - self.min.y
        }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

/// Bounding box of a set of points.
///
/// An empty input yields [`BoundingBox::empty`].
pub fn bounding_box(points: &[Point2]) -> BoundingBox {
    BoundingBox::from_points(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_distance() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(3.0, 4.0);
        assert_relative_eq!(distance(&a, &b), 5.0);
    }

    #[test]
    fn test_almost_equal() {
        assert!(almost_equal(1.0, 1.0 + 1e-10, DEFAULT_PRECISION));
        assert!(!almost_equal(1.0, 1.0 + 1e-6, DEFAULT_PRECISION));
        assert!(almost_equal(1.0, 1.0 + 1e-7, 1e-6));
    }

    #[test]
    fn test_cross_sign() {
        let x = Vec2::new(1.0, 0.0);
        let y = Vec2::new(0.0, 1.0);
        assert_relative_eq!(cross(&x, &y), 1.0);
        assert_relative_eq!(cross(&y, &x), -1.0);
    }

    #[test]
    fn test_bounding_box() {
        let pts = [
            Point2::new(1.0, 5.0),
            Point2::new(-2.0, 3.0),
            Point2::new(4.0, -1.0),
        ];
        let bbox = bounding_box(&pts);
        assert_eq!(bbox.min, Point2::new(-2.0, -1.0));
        assert_eq!(bbox.max, Point2::new(4.0, 5.0));
        assert_relative_eq!(bbox.width(), 6.0);
        assert_relative_eq!(bbox.height(), 6.0);
    }

    #[test]
    fn test_empty_bounding_box() {
        let bbox = bounding_box(&[]);
        assert!(bbox.is_empty());
        assert_eq!(bbox.width(), 0.0);
        let other = BoundingBox::new(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
        assert!(!bbox.overlaps(&other));
    }

    #[test]
    fn test_overlap_touching() {
        let a = BoundingBox::new(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0));
        let b = BoundingBox::new(Point2::new(10.0, 0.0), Point2::new(20.0, 10.0));
        let c = BoundingBox::new(Point2::new(20.0, 20.0), Point2::new(30.0, 30.0));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));

        let mut grown = a;
        grown.expand(10.0);
        assert!(grown.overlaps(&c));
    }
}

#![warn(missing_docs)]

//! Boolean operations on canvas paths.
//!
//! Implements union, intersection, difference, and exclusion of
//! [`Path`](canvas_kernel_path::Path) values.
//!
//! The boolean pipeline has 5 stages:
//! 1. **Flatten**: curves become polylines, overlapping subpaths are merged
//!    under the fill rule, rings are oriented fill-left
//! 2. **Intersect**: edge pairs are tested for crossings and overlaps
//! 3. **Split**: both boundaries are cut into fragments at the contacts
//! 4. **Classify**: fragments are labelled IN/OUT/ON against the other path
//! 5. **Stitch**: selected fragments are chained into closed contours
//!
//! Empty operands and disjoint bounding boxes skip straight to the answer.
//!
//! ```
//! use canvas_kernel_booleans::PathBooleanOperations;
//! use canvas_kernel_path::Path;
//!
//! let engine = PathBooleanOperations::new();
//! let a = Path::rect(0.0, 0.0, 10.0, 10.0);
//! let b = Path::rect(5.0, 5.0, 10.0, 10.0);
//! let result = engine.intersection(&a, &b);
//! assert!(result.success);
//! assert_eq!(result.paths.len(), 1);
//! ```

mod api;
pub mod classify;
pub mod edges;
mod error;
pub mod events;
pub mod intersect;
mod pipeline;
mod settings;
pub mod sew;
pub mod split;
pub mod winding;

pub use api::{boolean_op, BooleanOp, OperationResult, PathBooleanOperations};
pub use error::{BooleanError, Result};
pub use events::{EventBus, EventLog, OPERATION_COMPLETED, OPERATION_FAILED, OPERATION_STARTED};
pub use intersect::{find_intersections, IntersectionPoint};
pub use settings::BooleanSettings;
pub use winding::{contains, Containment};

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use canvas_kernel_math::{BoundingBox, Point2};
    use canvas_kernel_path::{FillRule, Path, PathSegment};
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    const TOL: f64 = 1e-9;

    fn area(paths: &[Path]) -> f64 {
        paths.iter().map(|p| p.signed_area(TOL)).sum()
    }

    fn bbox(paths: &[Path]) -> BoundingBox {
        paths
            .iter()
            .map(|p| p.bounding_box(TOL))
            .fold(BoundingBox::empty(), |acc, b| acc.union(&b))
    }

    fn recording_engine() -> (PathBooleanOperations, Arc<EventLog>) {
        let log = Arc::new(EventLog::new());
        let mut engine = PathBooleanOperations::new();
        engine.set_event_bus(log.clone());
        (engine, log)
    }

    #[test]
    fn test_disjoint_rectangles() {
        let engine = PathBooleanOperations::new();
        let a = Path::rect(0.0, 0.0, 10.0, 10.0);
        let b = Path::rect(20.0, 20.0, 10.0, 10.0);

        let union = engine.union(&a, &b);
        assert!(union.success);
        assert_eq!(union.paths, vec![a.clone(), b.clone()]);

        let inter = engine.intersection(&a, &b);
        assert!(inter.success);
        assert!(inter.paths.is_empty());

        assert_eq!(engine.difference(&a, &b).paths, vec![a.clone()]);
        assert_eq!(engine.exclusion(&a, &b).paths.len(), 2);
    }

    #[test]
    fn test_overlapping_rectangles() {
        let engine = PathBooleanOperations::new();
        let a = Path::rect(0.0, 0.0, 10.0, 10.0);
        let b = Path::rect(5.0, 5.0, 10.0, 10.0);

        let union = engine.union(&a, &b);
        assert!(union.success);
        assert_eq!(union.paths.len(), 1);
        assert_abs_diff_eq!(area(&union.paths), 175.0, epsilon = 1e-9);

        let inter = engine.intersection(&a, &b);
        assert_eq!(inter.paths.len(), 1);
        let b = bbox(&inter.paths);
        assert_eq!(b.min, Point2::new(5.0, 5.0));
        assert_eq!(b.max, Point2::new(10.0, 10.0));
        assert_abs_diff_eq!(area(&inter.paths), 25.0, epsilon = 1e-9);
    }

    #[test]
    fn test_exclusion_keeps_wings() {
        let engine = PathBooleanOperations::new();
        let a = Path::rect(0.0, 0.0, 10.0, 10.0);
        let b = Path::rect(5.0, 5.0, 10.0, 10.0);

        let excl = engine.exclusion(&a, &b);
        assert!(excl.success);
        assert!(excl.warnings.is_empty());
        assert_eq!(excl.paths.len(), 2);
        assert_abs_diff_eq!(area(&excl.paths), 150.0, epsilon = 1e-9);
        for path in &excl.paths {
            assert_abs_diff_eq!(path.signed_area(TOL), 75.0, epsilon = 1e-9);
        }
        // the overlap's center is not covered
        let center = Point2::new(7.5, 7.5);
        let settings = BooleanSettings::default();
        assert!(excl
            .paths
            .iter()
            .all(|p| !contains(p, &center, FillRule::NonZero, &settings).inside));
    }

    #[test]
    fn test_zero_point_move_to_does_not_fail() {
        let (engine, log) = recording_engine();
        let broken = Path::new(vec![
            PathSegment::MoveTo { points: vec![] },
            PathSegment::line_to(Point2::new(10.0, 0.0)),
            PathSegment::line_to(Point2::new(10.0, 10.0)),
            PathSegment::line_to(Point2::new(0.0, 10.0)),
            PathSegment::close(),
        ]);
        assert!(!broken.validate());

        let result = engine.union(&broken, &Path::rect(5.0, 5.0, 10.0, 10.0));
        assert!(result.success);
        assert!(!result.paths.is_empty());
        let events = log.drain();
        assert_eq!(events.last().unwrap().0, OPERATION_COMPLETED);
    }

    #[test]
    fn test_precision_merges_near_coincident_edges() {
        let mut engine = PathBooleanOperations::new();
        let a = Path::rect(0.0, 0.0, 10.0, 10.0);
        let b = Path::rect(10.0 + 1e-7, 0.0, 10.0, 10.0);

        // default precision keeps the sliver gap
        assert_eq!(engine.union(&a, &b).paths.len(), 2);

        engine.set_precision(1e-6).unwrap();
        let union = engine.union(&a, &b);
        assert!(union.success);
        assert_eq!(union.paths.len(), 1);
        assert_eq!(union.paths[0].subpath_count(), 1);
        assert_abs_diff_eq!(area(&union.paths), 200.0, epsilon = 1e-5);
    }

    #[test]
    fn test_identity_with_empty() {
        let engine = PathBooleanOperations::new();
        let p = Path::circle(Point2::new(3.0, 4.0), 5.0);
        let empty = Path::empty();

        assert_eq!(engine.union(&p, &empty).paths, vec![p.clone()]);
        assert_eq!(engine.union(&empty, &p).paths, vec![p.clone()]);
        assert_eq!(engine.difference(&p, &empty).paths, vec![p.clone()]);
        assert!(engine.difference(&empty, &p).paths.is_empty());
        assert!(engine.intersection(&p, &empty).paths.is_empty());
        assert_eq!(engine.exclusion(&empty, &p).paths, vec![p]);
    }

    #[test]
    fn test_commutativity() {
        let engine = PathBooleanOperations::new();
        let a = Path::circle(Point2::new(0.0, 0.0), 10.0);
        let b = Path::rect(5.0, -3.0, 12.0, 6.0);
        for op in [BooleanOp::Union, BooleanOp::Intersection] {
            let ab = engine.execute(op, &a, &b);
            let ba = engine.execute(op, &b, &a);
            assert!(ab.success && ba.success);
            assert_abs_diff_eq!(area(&ab.paths), area(&ba.paths), epsilon = 1e-6);
            let (bab, bba) = (bbox(&ab.paths), bbox(&ba.paths));
            assert_abs_diff_eq!(bab.min.x, bba.min.x, epsilon = 1e-9);
            assert_abs_diff_eq!(bab.max.y, bba.max.y, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_complementarity_of_areas() {
        let engine = PathBooleanOperations::new();
        let a = Path::circle(Point2::new(0.0, 0.0), 10.0);
        let b = Path::circle(Point2::new(10.0, 0.0), 10.0);

        let union = area(&engine.union(&a, &b).paths);
        let inter = area(&engine.intersection(&a, &b).paths);
        let excl = area(&engine.exclusion(&a, &b).paths);
        assert_abs_diff_eq!(union, inter + excl, epsilon = 1e-6);

        // lens area for two unit-spaced circles of radius 10
        let lens = 200.0 * (0.5f64).acos() - 5.0 * 300.0f64.sqrt();
        assert_abs_diff_eq!(inter, lens, epsilon = 1.0);
        assert_abs_diff_eq!(union, 2.0 * std::f64::consts::PI * 100.0 - lens, epsilon = 2.0);
    }

    #[test]
    fn test_containment_shortcut() {
        let engine = PathBooleanOperations::new();
        let a = Path::rect(0.0, 0.0, 10.0, 10.0);
        let b = Path::rect(3.0, 3.0, 2.0, 2.0);

        let union = engine.union(&a, &b);
        assert_eq!(union.paths.len(), 1);
        assert_abs_diff_eq!(area(&union.paths), 100.0, epsilon = 1e-9);

        let inter = engine.intersection(&a, &b);
        assert_eq!(inter.paths.len(), 1);
        assert_abs_diff_eq!(area(&inter.paths), 4.0, epsilon = 1e-9);
        assert_eq!(bbox(&inter.paths).min, Point2::new(3.0, 3.0));

        let diff = engine.difference(&a, &b);
        assert_eq!(diff.paths.len(), 1);
        assert_eq!(diff.paths[0].subpath_count(), 2);
        assert_abs_diff_eq!(area(&diff.paths), 96.0, epsilon = 1e-9);
        let settings = BooleanSettings::default();
        assert!(!contains(&diff.paths[0], &Point2::new(4.0, 4.0), FillRule::NonZero, &settings).inside);
        assert!(contains(&diff.paths[0], &Point2::new(1.0, 1.0), FillRule::NonZero, &settings).inside);
    }

    #[test]
    fn test_difference_cuts_corner() {
        let engine = PathBooleanOperations::new();
        let a = Path::rect(0.0, 0.0, 10.0, 10.0);
        let b = Path::rect(5.0, 5.0, 10.0, 10.0);
        let diff = engine.difference(&a, &b);
        assert_eq!(diff.paths.len(), 1);
        assert_abs_diff_eq!(area(&diff.paths), 75.0, epsilon = 1e-9);
        assert!(diff.paths[0].closed);
        assert_eq!(diff.paths[0].fill_rule, FillRule::NonZero);
    }

    #[test]
    fn test_shared_edge_union() {
        let engine = PathBooleanOperations::new();
        let a = Path::rect(0.0, 0.0, 10.0, 10.0);
        let b = Path::rect(10.0, 0.0, 10.0, 10.0);
        let union = engine.union(&a, &b);
        assert_eq!(union.paths.len(), 1);
        assert_abs_diff_eq!(area(&union.paths), 200.0, epsilon = 1e-9);
        assert!(engine.intersection(&a, &b).paths.is_empty());
    }

    #[test]
    fn test_identical_paths() {
        let engine = PathBooleanOperations::new();
        let a = Path::rect(0.0, 0.0, 10.0, 10.0);
        let union = engine.union(&a, &a);
        assert_eq!(union.paths.len(), 1);
        assert_abs_diff_eq!(area(&union.paths), 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(area(&engine.intersection(&a, &a).paths), 100.0, epsilon = 1e-9);
        assert!(engine.difference(&a, &a).paths.is_empty());
        assert!(engine.exclusion(&a, &a).paths.is_empty());
    }

    #[test]
    fn test_clockwise_and_evenodd_operands() {
        let engine = PathBooleanOperations::new();
        let cw = Path::polygon(&[
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 10.0),
            Point2::new(10.0, 10.0),
            Point2::new(10.0, 0.0),
        ]);
        let mut ring = Path::rect(-5.0, -5.0, 30.0, 30.0);
        ring.segments.extend(Path::rect(5.0, 5.0, 10.0, 10.0).segments);
        let ring = ring.with_fill_rule(FillRule::EvenOdd);

        // the square overlaps the frame except where the hole covers it
        let inter = engine.intersection(&cw, &ring);
        assert!(inter.success);
        assert_abs_diff_eq!(area(&inter.paths), 75.0, epsilon = 1e-9);
    }

    #[test]
    fn test_events_on_success() {
        let (engine, log) = recording_engine();
        engine.union(&Path::rect(0.0, 0.0, 10.0, 10.0), &Path::rect(5.0, 5.0, 10.0, 10.0));
        let log = log.drain();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].0, OPERATION_STARTED);
        assert_eq!(log[0].1, serde_json::json!({"operation": "union", "pathCount": 2}));
        assert_eq!(log[1].0, OPERATION_COMPLETED);
        assert_eq!(
            log[1].1,
            serde_json::json!({"operation": "union", "resultPathCount": 1})
        );
    }

    #[test]
    fn test_failure_is_reported_not_raised() {
        let settings = BooleanSettings {
            max_edge_pairs: 4,
            ..Default::default()
        };
        let mut engine = PathBooleanOperations::with_settings(settings).unwrap();
        let log = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = Arc::clone(&log);
        engine.set_event_bus(Arc::new(move |event: &str, payload: Value| {
            sink.lock().unwrap().push(format!("{event}:{}", payload["operation"]));
        }));

        let result = engine.intersection(
            &Path::rect(0.0, 0.0, 10.0, 10.0),
            &Path::rect(5.0, 5.0, 10.0, 10.0),
        );
        assert!(!result.success);
        assert!(result.paths.is_empty());
        assert!(result.error.as_deref().unwrap().contains("too complex"));
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "operation-started:\"intersection\"".to_string(),
                "operation-failed:\"intersection\"".to_string()
            ]
        );
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let engine = PathBooleanOperations::new();
        let a = Path::circle(Point2::new(0.0, 0.0), 4.0);
        let b = Path::rect(1.0, 1.0, 5.0, 5.0);
        let (a0, b0) = (a.clone(), b.clone());
        for op in BooleanOp::ALL {
            engine.execute(op, &a, &b);
        }
        assert_eq!(a, a0);
        assert_eq!(b, b0);
    }

    #[test]
    fn test_deterministic_output() {
        let engine = PathBooleanOperations::new();
        let a = Path::circle(Point2::new(0.0, 0.0), 10.0);
        let b = Path::circle(Point2::new(10.0, 0.0), 10.0);
        let first = engine.exclusion(&a, &b);
        let second = engine.exclusion(&a, &b);
        assert_eq!(first, second);
        assert_eq!(first.paths.len(), 2);
        // ordered by bounding box min x
        let x0 = first.paths[0].bounding_box(TOL).min.x;
        let x1 = first.paths[1].bounding_box(TOL).min.x;
        assert!(x0 < x1);
    }

    #[test]
    fn test_svg_operands() {
        let engine = PathBooleanOperations::new();
        let result = engine.execute_svg(
            BooleanOp::Difference,
            "M0 0 H10 V10 H0 Z",
            "M5 -5 h10 v20 h-10 z",
        );
        assert!(result.success);
        assert_abs_diff_eq!(area(&result.paths), 50.0, epsilon = 1e-9);
    }

    fn two_squares(fill_rule: FillRule) -> Path {
        let mut path = Path::rect(0.0, 0.0, 10.0, 10.0);
        path.segments.extend(Path::rect(5.0, 5.0, 10.0, 10.0).segments);
        path.with_fill_rule(fill_rule)
    }

    #[test]
    fn test_overlapping_subpaths_evenodd() {
        let engine = PathBooleanOperations::new();
        let a = two_squares(FillRule::EvenOdd);
        let big = Path::rect(-1.0, -1.0, 20.0, 20.0);

        let inter = engine.intersection(&a, &big);
        assert!(inter.success);
        assert!(inter.warnings.is_empty());
        assert_abs_diff_eq!(area(&inter.paths), 150.0, epsilon = 1e-9);

        let diff = engine.difference(&big, &a);
        assert_abs_diff_eq!(area(&diff.paths), 250.0, epsilon = 1e-9);
        let settings = BooleanSettings::default();
        let overlap = Point2::new(7.5, 7.5);
        assert!(contains(&diff.paths[0], &overlap, FillRule::NonZero, &settings).inside);
        assert!(!contains(&diff.paths[0], &Point2::new(2.0, 2.0), FillRule::NonZero, &settings).inside);
    }

    #[test]
    fn test_overlapping_subpaths_nonzero() {
        let engine = PathBooleanOperations::new();
        let a = two_squares(FillRule::NonZero);
        let big = Path::rect(-1.0, -1.0, 20.0, 20.0);
        let strip = Path::rect(12.0, -2.0, 6.0, 20.0);

        let inter = engine.intersection(&a, &big);
        assert_abs_diff_eq!(area(&inter.paths), 175.0, epsilon = 1e-9);
        assert_eq!(inter.paths.len(), 1);

        let union = engine.union(&a, &strip);
        assert!(union.warnings.is_empty());
        assert_eq!(union.paths.len(), 1);
        assert_abs_diff_eq!(area(&union.paths), 265.0, epsilon = 1e-9);

        let excl = area(&engine.exclusion(&a, &strip).paths);
        let shared = area(&engine.intersection(&a, &strip).paths);
        assert_abs_diff_eq!(shared, 30.0, epsilon = 1e-9);
        assert_abs_diff_eq!(excl, 265.0 - 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_curved_operands() {
        let engine = PathBooleanOperations::new();
        let blob = Path::new(vec![
            PathSegment::move_to(Point2::new(0.0, 0.0)),
            PathSegment::quadratic_curve_to(Point2::new(10.0, -5.0), Point2::new(20.0, 0.0)),
            PathSegment::bezier_curve_to(
                Point2::new(25.0, 5.0),
                Point2::new(25.0, 15.0),
                Point2::new(20.0, 20.0),
            ),
            PathSegment::line_to(Point2::new(0.0, 20.0)),
            PathSegment::close(),
        ]);
        let rect = Path::rect(10.0, 5.0, 20.0, 10.0);
        let blob_area = blob.signed_area(0.01);

        let union = engine.union(&blob, &rect);
        let inter = engine.intersection(&blob, &rect);
        let excl = engine.exclusion(&blob, &rect);
        let diff = engine.difference(&blob, &rect);
        for result in [&union, &inter, &excl, &diff] {
            assert!(result.success);
            assert!(result.warnings.is_empty());
        }

        let (u, i, x, d) = (
            area(&union.paths),
            area(&inter.paths),
            area(&excl.paths),
            area(&diff.paths),
        );
        assert_abs_diff_eq!(u, i + x, epsilon = 1e-6);
        assert_abs_diff_eq!(d + i, blob_area, epsilon = 1e-6);
        assert_abs_diff_eq!(u, blob_area + 200.0 - i, epsilon = 1e-6);
        // the cubic bulges past x = 20 inside the rectangle's band
        assert!(i > 100.0 && i < 200.0);
        assert_eq!(union.paths.len(), 1);
    }
}

#![warn(missing_docs)]

//! Path model for the canvas path kernel.
//!
//! A [`Path`] is an ordered stream of canvas drawing segments (`moveTo`,
//! `lineTo`, `bezierCurveTo`, `quadraticCurveTo`, `arc`, `closePath`) plus a
//! closed flag and a [`FillRule`]. This crate validates paths, iterates their
//! subpaths, flattens curves into polylines, and converts to and from SVG
//! path data.
//!
//! # Example
//!
//! ```
//! use canvas_kernel_path::{flatten_path, FlattenOptions, Path};
//!
//! let path = Path::rect(0.0, 0.0, 10.0, 5.0);
//! assert!(path.validate());
//!
//! let contours = flatten_path(&path, &FlattenOptions::default());
//! assert_eq!(contours.len(), 1);
//! assert!((contours[0].signed_area() - 50.0).abs() < 1e-9);
//! ```

pub mod error;
pub mod flatten;
mod path;
mod segment;
mod svg;

pub use error::{PathError, Result};
pub use flatten::{
    flatten_path, flatten_segment, flatten_segment_with_params, path_signed_area,
    polygon_signed_area, Contour, FlatPoint, FlattenOptions,
};
pub use path::{FillRule, Path, Subpath};
pub use segment::{arc_sweep, PathSegment};

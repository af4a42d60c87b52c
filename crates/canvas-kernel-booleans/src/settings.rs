//! Engine configuration.

use canvas_kernel_math::DEFAULT_PRECISION;
use canvas_kernel_path::FlattenOptions;
use serde::{Deserialize, Serialize};

use crate::error::{BooleanError, Result};

/// Tunables shared by every stage of a boolean operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BooleanSettings {
    /// Linear tolerance for point coincidence, intersection slack,
    /// boundary detection, and fragment stitching.
    pub precision: f64,
    /// Maximum chord deviation when flattening curves. The effective value is
    /// never below `precision`.
    pub flatten_tolerance: f64,
    /// Recursion limit for Bézier subdivision.
    pub max_subdivision_depth: u32,
    /// Upper bound on edge pairs tested by the intersection finder.
    pub max_edge_pairs: usize,
}

impl Default for BooleanSettings {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            flatten_tolerance: 0.01,
            max_subdivision_depth: 12,
            max_edge_pairs: 4_000_000,
        }
    }
}

impl BooleanSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !self.precision.is_finite() || self.precision <= 0.0 {
            return Err(BooleanError::InvalidSettings(format!(
                "precision must be a positive finite number, got {}",
                self.precision
            )));
        }
        if !self.flatten_tolerance.is_finite() || self.flatten_tolerance <= 0.0 {
            return Err(BooleanError::InvalidSettings(format!(
                "flatten_tolerance must be a positive finite number, got {}",
                self.flatten_tolerance
            )));
        }
        if self.max_subdivision_depth > 24 {
            return Err(BooleanError::InvalidSettings(
                "max_subdivision_depth must be at most 24".into(),
            ));
        }
        if self.max_edge_pairs == 0 {
            return Err(BooleanError::InvalidSettings(
                "max_edge_pairs must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Flattening options derived from these settings.
    pub fn flatten_options(&self) -> FlattenOptions {
        FlattenOptions {
            tolerance: self.flatten_tolerance.max(self.precision),
            max_depth: self.max_subdivision_depth,
        }
    }

    /// Offset used to probe which side of an edge is filled.
    ///
    /// Must clear the boundary band of width `precision` while staying small
    /// relative to the edge being probed.
    pub fn probe_distance(&self, edge_length: f64) -> f64 {
        (edge_length * 1e-3).max(self.precision * 8.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(BooleanSettings::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_precision() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let settings = BooleanSettings {
                precision: bad,
                ..Default::default()
            };
            assert!(matches!(
                settings.validate(),
                Err(BooleanError::InvalidSettings(_))
            ));
        }
    }

    #[test]
    fn test_flatten_tolerance_floor() {
        let settings = BooleanSettings {
            precision: 0.5,
            flatten_tolerance: 0.01,
            ..Default::default()
        };
        assert_eq!(settings.flatten_options().tolerance, 0.5);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: BooleanSettings = serde_json::from_str(r#"{"precision":1e-6}"#).unwrap();
        assert_eq!(settings.precision, 1e-6);
        assert_eq!(settings.max_subdivision_depth, 12);
    }
}

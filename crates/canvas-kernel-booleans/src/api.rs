//! Public API types and entry points for path boolean operations.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use canvas_kernel_path::Path;
use serde::{Deserialize, Serialize};

use crate::error::{BooleanError, Result};
use crate::events::{Emitter, EventBus};
use crate::pipeline::{path_boolean, BooleanOutput};
use crate::settings::BooleanSettings;

/// Boolean operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanOp {
    /// Union: area covered by either path.
    Union,
    /// Intersection: area covered by both paths.
    Intersection,
    /// Difference: area of the first path not covered by the second.
    Difference,
    /// Exclusion: area covered by exactly one path.
    Exclusion,
}

impl BooleanOp {
    /// Every operation, in canonical order.
    pub const ALL: [BooleanOp; 4] = [
        BooleanOp::Union,
        BooleanOp::Intersection,
        BooleanOp::Difference,
        BooleanOp::Exclusion,
    ];

    /// Operation name as reported in results and events.
    pub fn name(self) -> &'static str {
        match self {
            BooleanOp::Union => "union",
            BooleanOp::Intersection => "intersection",
            BooleanOp::Difference => "difference",
            BooleanOp::Exclusion => "exclusion",
        }
    }
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of a boolean operation as seen by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    /// Whether the operation completed.
    pub success: bool,
    /// Which operation ran.
    pub operation: BooleanOp,
    /// Result paths; empty on failure.
    pub paths: Vec<Path>,
    /// Failure description, present only when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Non-fatal problems, such as boundary chains that could not be closed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl OperationResult {
    fn succeeded(operation: BooleanOp, output: BooleanOutput) -> Self {
        Self {
            success: true,
            operation,
            paths: output.paths,
            error: None,
            warnings: output.warnings,
        }
    }

    fn failed(operation: BooleanOp, error: &BooleanError) -> Self {
        Self {
            success: false,
            operation,
            paths: Vec::new(),
            error: Some(error.to_string()),
            warnings: Vec::new(),
        }
    }
}

/// Perform a boolean operation on two paths.
///
/// Uses a flatten-and-classify pipeline:
/// 1. Empty operands and disjoint bounding boxes are answered directly
/// 2. Edge-edge intersections split both boundaries into fragments
/// 3. Each fragment is classified against the other operand
/// 4. Fragments are selected for the operation
/// 5. Selected fragments are stitched into closed contours and grouped
pub fn boolean_op(
    a: &Path,
    b: &Path,
    op: BooleanOp,
    settings: &BooleanSettings,
) -> Result<Vec<Path>> {
    settings.validate()?;
    path_boolean(a, b, op, settings).map(|output| output.paths)
}

/// Stateful boolean engine.
///
/// Holds the settings and an optional event bus. Every operation is
/// synchronous, never mutates its inputs, and never panics into the caller:
/// failures are reported as an unsuccessful [`OperationResult`] and an
/// `operation-failed` event.
#[derive(Default, Clone)]
pub struct PathBooleanOperations {
    settings: BooleanSettings,
    bus: Option<Arc<dyn EventBus>>,
}

impl fmt::Debug for PathBooleanOperations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathBooleanOperations")
            .field("settings", &self.settings)
            .field("bus", &self.bus.is_some())
            .finish()
    }
}

impl PathBooleanOperations {
    /// Engine with default settings and no event bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with custom settings.
    pub fn with_settings(settings: BooleanSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            bus: None,
        })
    }

    /// Current settings.
    pub fn settings(&self) -> &BooleanSettings {
        &self.settings
    }

    /// Current linear tolerance.
    pub fn precision(&self) -> f64 {
        self.settings.precision
    }

    /// Set the linear tolerance used by every stage.
    ///
    /// Rejects non-positive or non-finite values and leaves the previous
    /// tolerance in place.
    pub fn set_precision(&mut self, epsilon: f64) -> Result<()> {
        let settings = BooleanSettings {
            precision: epsilon,
            ..self.settings
        };
        settings.validate()?;
        tracing::debug!(precision = epsilon, "precision updated");
        self.settings = settings;
        Ok(())
    }

    /// Install the bus that receives lifecycle events.
    pub fn set_event_bus(&mut self, bus: Arc<dyn EventBus>) {
        self.bus = Some(bus);
    }

    /// Remove the event bus.
    pub fn clear_event_bus(&mut self) {
        self.bus = None;
    }

    /// Area covered by either path.
    pub fn union(&self, a: &Path, b: &Path) -> OperationResult {
        self.execute(BooleanOp::Union, a, b)
    }

    /// Area covered by both paths.
    pub fn intersection(&self, a: &Path, b: &Path) -> OperationResult {
        self.execute(BooleanOp::Intersection, a, b)
    }

    /// Area of `a` not covered by `b`.
    pub fn difference(&self, a: &Path, b: &Path) -> OperationResult {
        self.execute(BooleanOp::Difference, a, b)
    }

    /// Area covered by exactly one of the paths.
    pub fn exclusion(&self, a: &Path, b: &Path) -> OperationResult {
        self.execute(BooleanOp::Exclusion, a, b)
    }

    /// Run `op` on `a` and `b`, reporting lifecycle events.
    pub fn execute(&self, op: BooleanOp, a: &Path, b: &Path) -> OperationResult {
        let emitter = Emitter::new(self.bus.as_deref());
        emitter.started(op);

        let outcome = catch_unwind(AssertUnwindSafe(|| path_boolean(a, b, op, &self.settings)))
            .unwrap_or_else(|panic| Err(BooleanError::Internal(panic_message(panic.as_ref()))));
        self.finish(op, outcome, emitter)
    }

    /// Run `op` on two operands given as SVG path data.
    ///
    /// Parse failures are reported like any other failure.
    pub fn execute_svg(&self, op: BooleanOp, a: &str, b: &str) -> OperationResult {
        let emitter = Emitter::new(self.bus.as_deref());
        emitter.started(op);

        let outcome = Path::from_svg_path_data(a)
            .and_then(|a| Ok((a, Path::from_svg_path_data(b)?)))
            .map_err(BooleanError::from)
            .and_then(|(a, b)| {
                catch_unwind(AssertUnwindSafe(|| path_boolean(&a, &b, op, &self.settings)))
                    .unwrap_or_else(|panic| {
                        Err(BooleanError::Internal(panic_message(panic.as_ref())))
                    })
            });
        self.finish(op, outcome, emitter)
    }

    fn finish(
        &self,
        op: BooleanOp,
        outcome: Result<BooleanOutput>,
        emitter: Emitter<'_>,
    ) -> OperationResult {
        match outcome {
            Ok(output) => {
                for warning in &output.warnings {
                    tracing::warn!(%op, "{warning}");
                }
                emitter.completed(op, output.paths.len());
                OperationResult::succeeded(op, output)
            }
            Err(err) => {
                tracing::warn!(%op, error = %err, "boolean operation failed");
                emitter.failed(op, &err.to_string());
                OperationResult::failed(op, &err)
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected panic".to_string()
    }
}

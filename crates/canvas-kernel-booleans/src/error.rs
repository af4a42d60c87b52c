//! Error types for boolean operations.

use canvas_kernel_path::PathError;
use thiserror::Error;

/// Errors that can occur while configuring or running a boolean operation.
///
/// Public operations never return these directly; they are folded into a
/// failed [`OperationResult`](crate::OperationResult).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BooleanError {
    /// A configuration value is out of range.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// The operands exceed the pairwise intersection budget.
    #[error("operation too complex: {pairs} edge pairs exceeds the limit of {limit}")]
    TooComplex {
        /// Edge pairs the finder would have to test.
        pairs: usize,
        /// Configured limit.
        limit: usize,
    },

    /// An operand could not be parsed.
    #[error("invalid path: {0}")]
    Path(#[from] PathError),

    /// Unexpected failure inside the pipeline.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for boolean operations.
pub type Result<T> = std::result::Result<T, BooleanError>;

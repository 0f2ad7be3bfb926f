//! Module containing the universal error type
use thiserror::Error;

/// Universal error type for this crate
#[derive(Error, Debug, PartialEq)]
pub enum Error {
    /// Node is not present in this `Context`
    #[error("node is not present in this `Context`")]
    BadNode,

    /// Batch slot is outside of the evaluator's buffers
    #[error("slot index ({0}) exceeds batch size ({1})")]
    BadSlot(usize, usize),

    /// Requested batch is larger than the evaluator's buffers
    #[error("batch of {0} points exceeds batch size ({1})")]
    BatchTooLarge(usize, usize),

    /// `pop` was called without a matching `push`
    #[error("`pop` called with an empty prune stack")]
    EmptyPruneStack,

    /// Matrix coefficient slice has the wrong length
    #[error("matrix must have 12 coefficients, got {0}")]
    BadMatrix(usize),

    /// Region bounds must be finite and increasing
    #[error("bad region bounds [{0}, {1}]")]
    BadBounds(f32, f32),

    /// Region resolution exponent is too large
    #[error("resolution exponent {0} is too large (max {1})")]
    BadResolution(u8, u8),

    /// Minimum cell size must be a nonzero power of two
    #[error("minimum cell size {0} is not a power of two")]
    BadCellSize(u32),
}

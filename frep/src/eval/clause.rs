use crate::context::{BinaryOpcode, UnaryOpcode, Var};

/// Index of a clause within a [`ClauseSchedule`](super::ClauseSchedule)
pub type ClauseIndex = usize;

/// Operation performed by a single [`Clause`]
///
/// Operands are indices into the schedule's clause arena.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ClauseOp {
    /// Raw (untransformed) input coordinate, written before each evaluation
    Input(Var),
    /// Coefficient of the 3x4 affine transform, in row-major order (0-11)
    Matrix(u8),
    /// Constant value, written once when an evaluator is built
    Const(f32),
    Unary(UnaryOpcode, ClauseIndex),
    Binary(BinaryOpcode, ClauseIndex, ClauseIndex),
}

impl ClauseOp {
    /// Checks whether this clause's value is injected rather than computed
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            ClauseOp::Input(..) | ClauseOp::Matrix(..) | ClauseOp::Const(..)
        )
    }

    /// Iterates over operands, producing 0, 1, or 2 values
    pub fn iter_args(&self) -> impl Iterator<Item = ClauseIndex> {
        let out = match *self {
            ClauseOp::Binary(_, a, b) => [Some(a), Some(b)],
            ClauseOp::Unary(_, a) => [Some(a), None],
            ClauseOp::Input(..)
            | ClauseOp::Matrix(..)
            | ClauseOp::Const(..) => [None, None],
        };
        out.into_iter().flatten()
    }

    /// Returns a copy of this operation with operands remapped
    pub(crate) fn remap(self, map: &[ClauseIndex]) -> Self {
        match self {
            ClauseOp::Unary(op, a) => ClauseOp::Unary(op, map[a]),
            ClauseOp::Binary(op, a, b) => ClauseOp::Binary(op, map[a], map[b]),
            op => op,
        }
    }
}

/// One scheduled operation
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Clause {
    /// Operation and operands
    pub op: ClauseOp,
    /// Topological depth: 0 for leaves, `1 + max(operand weights)` otherwise
    pub weight: usize,
}

/// A contiguous run of clauses sharing a weight
///
/// Clauses within a row never depend on each other.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    weight: usize,
    range: std::ops::Range<ClauseIndex>,
}

impl Row {
    pub(crate) fn new(
        weight: usize,
        range: std::ops::Range<ClauseIndex>,
    ) -> Self {
        Self { weight, range }
    }
    /// Returns the weight shared by every clause in this row
    pub fn weight(&self) -> usize {
        self.weight
    }
    /// Returns the range of clause indices in this row
    pub fn range(&self) -> std::ops::Range<ClauseIndex> {
        self.range.clone()
    }
    /// Returns the number of clauses in this row
    pub fn len(&self) -> usize {
        self.range.len()
    }
    /// Checks whether the row is empty (which never happens for built rows)
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

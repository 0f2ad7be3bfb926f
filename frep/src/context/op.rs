use crate::context::Node;
use ordered_float::OrderedFloat;

/// Spatial input
#[derive(
    Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, strum::EnumIter,
)]
#[allow(missing_docs)]
pub enum Var {
    X,
    Y,
    Z,
}

impl Var {
    /// Position of this input in an `[x, y, z]` triple
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Opcode taking a single argument
#[derive(
    Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, strum::EnumIter,
)]
#[allow(missing_docs)]
pub enum UnaryOpcode {
    Neg,
    Abs,
    Recip,
    Sqrt,
    Square,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Exp,
    Ln,
}

impl UnaryOpcode {
    /// Applies the operation to a single value
    pub fn apply(self, a: f64) -> f64 {
        match self {
            Self::Neg => -a,
            Self::Abs => a.abs(),
            Self::Recip => 1.0 / a,
            Self::Sqrt => a.sqrt(),
            Self::Square => a * a,
            Self::Sin => a.sin(),
            Self::Cos => a.cos(),
            Self::Tan => a.tan(),
            Self::Asin => a.asin(),
            Self::Acos => a.acos(),
            Self::Atan => a.atan(),
            Self::Exp => a.exp(),
            Self::Ln => a.ln(),
        }
    }
}

/// Opcode taking two arguments
#[derive(
    Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, strum::EnumIter,
)]
#[allow(missing_docs)]
pub enum BinaryOpcode {
    Add,
    Sub,
    Mul,
    Div,
    Min,
    Max,
}

impl BinaryOpcode {
    /// Applies the operation to a pair of values
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mul => a * b,
            Self::Div => a / b,
            _ if a.is_nan() || b.is_nan() => f64::NAN,
            Self::Min => a.min(b),
            Self::Max => a.max(b),
        }
    }

    /// Checks whether swapping the arguments leaves the result unchanged
    pub fn is_commutative(self) -> bool {
        matches!(self, Self::Add | Self::Mul | Self::Min | Self::Max)
    }
}

/// Node in an expression graph
///
/// Child handles refer to the [`Context`](crate::context::Context) that
/// built the node, and are meaningless elsewhere.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum Op {
    /// Spatial input
    Input(Var),
    /// Constant value
    Const(OrderedFloat<f64>),
    /// Operation on two child nodes
    Binary(BinaryOpcode, Node, Node),
    /// Operation on one child node
    Unary(UnaryOpcode, Node),
}

impl Op {
    /// Returns this node's arguments, in order
    pub fn iter_children(&self) -> impl Iterator<Item = Node> {
        let (a, b) = match *self {
            Op::Binary(_, a, b) => (Some(a), Some(b)),
            Op::Unary(_, a) => (Some(a), None),
            Op::Input(..) | Op::Const(..) => (None, None),
        };
        a.into_iter().chain(b)
    }
}

//! Expression graphs
//!
//! A [`Context`] is an arena of deduplicated [`Op`] nodes.  Identical
//! operations share a single [`Node`], and operations on constants are
//! folded as they are built; no other simplification is done.
//!
//! ```
//! use frep::context::Context;
//!
//! let mut ctx = Context::new();
//! let x = ctx.x();
//! let y = ctx.y();
//! let a = ctx.mul(x, y)?;
//! let b = ctx.mul(y, x)?;
//! assert_eq!(a, b);
//!
//! let half = ctx.div(a, 2.0)?;
//! assert_eq!(ctx.eval_xyz(half, 3.0, 5.0, 0.0)?, 7.5);
//! # Ok::<(), frep::Error>(())
//! ```
mod indexed;
mod op;

use indexed::{define_index, IndexMap, IndexVec};
pub use op::{BinaryOpcode, Op, UnaryOpcode, Var};

use crate::Error;

use ordered_float::OrderedFloat;

define_index!(Node, "Handle to an [`Op`] stored in a [`Context`]");

/// Arena of expression nodes
///
/// Nodes are never removed; the whole graph is freed when the context is
/// dropped.
#[derive(Debug, Default)]
pub struct Context {
    ops: IndexMap<Op, Node>,
}

/// Builds a method for each unary opcode
macro_rules! unary_builders {
    ($($(#[$meta:meta])* $name:ident => $op:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $name<A: IntoNode>(&mut self, a: A) -> Result<Node, Error> {
                let a = a.into_node(self)?;
                self.unary(UnaryOpcode::$op, a)
            }
        )*
    };
}

impl Context {
    /// Builds an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of nodes in the context
    ///
    /// ```
    /// # let mut ctx = frep::context::Context::new();
    /// let x = ctx.x();
    /// let again = ctx.x();
    /// assert_eq!(x, again);
    /// assert_eq!(ctx.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Checks whether the context has no nodes
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Looks up the operation behind a node
    pub fn get_op(&self, node: Node) -> Option<&Op> {
        self.ops.get_by_index(node)
    }

    /// Returns `Some(v)` if the node is a constant, or `None` otherwise
    ///
    /// Nodes from other contexts return [`Error::BadNode`].
    pub fn const_value(&self, node: Node) -> Result<Option<f64>, Error> {
        match self.get_op(node).ok_or(Error::BadNode)? {
            Op::Const(c) => Ok(Some(c.0)),
            _ => Ok(None),
        }
    }

    ////////////////////////////////////////////////////////////////////////////
    // Leaves

    /// Returns the node for a spatial input
    pub fn input(&mut self, v: Var) -> Node {
        self.ops.insert(Op::Input(v))
    }

    /// Returns the `X` input
    pub fn x(&mut self) -> Node {
        self.input(Var::X)
    }

    /// Returns the `Y` input
    pub fn y(&mut self) -> Node {
        self.input(Var::Y)
    }

    /// Returns the `Z` input
    pub fn z(&mut self) -> Node {
        self.input(Var::Z)
    }

    /// Returns a node for a constant value
    pub fn constant(&mut self, f: f64) -> Node {
        self.ops.insert(Op::Const(OrderedFloat(f)))
    }

    ////////////////////////////////////////////////////////////////////////////
    // Folding constructors

    fn unary(&mut self, op: UnaryOpcode, a: Node) -> Result<Node, Error> {
        Ok(match self.const_value(a)? {
            Some(v) => self.constant(op.apply(v)),
            None => self.ops.insert(Op::Unary(op, a)),
        })
    }

    fn binary(
        &mut self,
        op: BinaryOpcode,
        a: Node,
        b: Node,
    ) -> Result<Node, Error> {
        let out = match (self.const_value(a)?, self.const_value(b)?) {
            (Some(va), Some(vb)) => self.constant(op.apply(va, vb)),
            // Sorted arguments let `a + b` and `b + a` share a node
            _ if op.is_commutative() => {
                self.ops.insert(Op::Binary(op, a.min(b), a.max(b)))
            }
            _ => self.ops.insert(Op::Binary(op, a, b)),
        };
        Ok(out)
    }

    ////////////////////////////////////////////////////////////////////////////
    // Binary operations

    /// Builds `a + b`
    ///
    /// ```
    /// # let mut ctx = frep::context::Context::new();
    /// let x = ctx.x();
    /// let sum = ctx.add(x, 0.0).unwrap();
    /// assert_eq!(sum, x);
    /// ```
    pub fn add<A: IntoNode, B: IntoNode>(
        &mut self,
        a: A,
        b: B,
    ) -> Result<Node, Error> {
        let a = a.into_node(self)?;
        let b = b.into_node(self)?;
        if a == b {
            return self.mul(a, 2.0);
        }
        match (self.const_value(a)?, self.const_value(b)?) {
            (Some(z), _) if z == 0.0 => Ok(b),
            (_, Some(z)) if z == 0.0 => Ok(a),
            _ => self.binary(BinaryOpcode::Add, a, b),
        }
    }

    /// Builds `a - b`
    pub fn sub<A: IntoNode, B: IntoNode>(
        &mut self,
        a: A,
        b: B,
    ) -> Result<Node, Error> {
        let a = a.into_node(self)?;
        let b = b.into_node(self)?;
        match (self.const_value(a)?, self.const_value(b)?) {
            (Some(z), None) if z == 0.0 => self.neg(b),
            (_, Some(z)) if z == 0.0 => Ok(a),
            _ => self.binary(BinaryOpcode::Sub, a, b),
        }
    }

    /// Builds `a * b`
    ///
    /// Multiplying by a constant zero returns that zero, which discards any
    /// NaN the other argument could produce.
    pub fn mul<A: IntoNode, B: IntoNode>(
        &mut self,
        a: A,
        b: B,
    ) -> Result<Node, Error> {
        let a = a.into_node(self)?;
        let b = b.into_node(self)?;
        if a == b {
            return self.square(a);
        }
        match (self.const_value(a)?, self.const_value(b)?) {
            (Some(v), _) if v == 1.0 => Ok(b),
            (_, Some(v)) if v == 1.0 => Ok(a),
            (Some(v), _) if v == 0.0 => Ok(a),
            (_, Some(v)) if v == 0.0 => Ok(b),
            _ => self.binary(BinaryOpcode::Mul, a, b),
        }
    }

    /// Builds `a / b`
    pub fn div<A: IntoNode, B: IntoNode>(
        &mut self,
        a: A,
        b: B,
    ) -> Result<Node, Error> {
        let a = a.into_node(self)?;
        let b = b.into_node(self)?;
        match self.const_value(b)? {
            Some(v) if v == 1.0 => Ok(a),
            _ => self.binary(BinaryOpcode::Div, a, b),
        }
    }

    /// Builds `min(a, b)`, which is the union of two shapes
    pub fn min<A: IntoNode, B: IntoNode>(
        &mut self,
        a: A,
        b: B,
    ) -> Result<Node, Error> {
        let a = a.into_node(self)?;
        let b = b.into_node(self)?;
        if a == b {
            Ok(a)
        } else {
            self.binary(BinaryOpcode::Min, a, b)
        }
    }

    /// Builds `max(a, b)`, which is the intersection of two shapes
    pub fn max<A: IntoNode, B: IntoNode>(
        &mut self,
        a: A,
        b: B,
    ) -> Result<Node, Error> {
        let a = a.into_node(self)?;
        let b = b.into_node(self)?;
        if a == b {
            Ok(a)
        } else {
            self.binary(BinaryOpcode::Max, a, b)
        }
    }

    /// Builds `a * x + b * y + c * z + d`
    ///
    /// ```
    /// # let mut ctx = frep::context::Context::new();
    /// let op = ctx.affine(1.0, 0.0, 2.0, 0.5).unwrap();
    /// assert_eq!(ctx.eval_xyz(op, 1.0, 10.0, 2.0).unwrap(), 5.5);
    /// ```
    pub fn affine(
        &mut self,
        a: f64,
        b: f64,
        c: f64,
        d: f64,
    ) -> Result<Node, Error> {
        let mut sum = self.constant(d);
        for (v, k) in [(Var::X, a), (Var::Y, b), (Var::Z, c)] {
            let v = self.input(v);
            let term = self.mul(v, k)?;
            sum = self.add(term, sum)?;
        }
        Ok(sum)
    }

    ////////////////////////////////////////////////////////////////////////////
    // Unary operations

    unary_builders! {
        /// Builds `-a`
        neg => Neg,
        /// Builds `|a|`
        abs => Abs,
        /// Builds `1 / a`
        recip => Recip,
        /// Builds `sqrt(a)`
        sqrt => Sqrt,
        /// Builds `a * a`
        square => Square,
        /// Builds `sin(a)`
        sin => Sin,
        /// Builds `cos(a)`
        cos => Cos,
        /// Builds `tan(a)`
        tan => Tan,
        /// Builds `asin(a)`
        asin => Asin,
        /// Builds `acos(a)`
        acos => Acos,
        /// Builds `atan(a)`
        atan => Atan,
        /// Builds `e^a`
        exp => Exp,
        /// Builds `ln(a)`
        ln => Ln,
    }

    ////////////////////////////////////////////////////////////////////////////

    /// Evaluates a node at a single point, in double precision
    ///
    /// This walks the graph directly and is slow; it's meant as a reference
    /// for the [`Evaluator`](crate::eval::Evaluator).
    pub fn eval_xyz(
        &self,
        root: Node,
        x: f64,
        y: f64,
        z: f64,
    ) -> Result<f64, Error> {
        let mut seen: IndexVec<_, Node> = vec![None; self.len()].into();
        self.eval_node(root, [x, y, z], &mut seen)
    }

    fn eval_node(
        &self,
        node: Node,
        xyz: [f64; 3],
        seen: &mut IndexVec<Option<f64>, Node>,
    ) -> Result<f64, Error> {
        let op = *self.get_op(node).ok_or(Error::BadNode)?;
        if let Some(v) = seen[node] {
            return Ok(v);
        }
        let v = match op {
            Op::Input(v) => xyz[v.index()],
            Op::Const(c) => c.0,
            Op::Unary(op, a) => op.apply(self.eval_node(a, xyz, seen)?),
            Op::Binary(op, a, b) => {
                let a = self.eval_node(a, xyz, seen)?;
                let b = self.eval_node(b, xyz, seen)?;
                op.apply(a, b)
            }
        };
        seen[node] = Some(v);
        Ok(v)
    }
}

////////////////////////////////////////////////////////////////////////////////

/// Values which can be used as arguments to [`Context`] builders
///
/// Numbers become constant nodes, so `ctx.add(x, 1.0)` works without an
/// explicit call to [`Context::constant`].
pub trait IntoNode {
    /// Returns a node in `ctx` for this value
    fn into_node(self, ctx: &mut Context) -> Result<Node, Error>;
}

impl IntoNode for Node {
    fn into_node(self, ctx: &mut Context) -> Result<Node, Error> {
        ctx.get_op(self).ok_or(Error::BadNode)?;
        Ok(self)
    }
}

impl IntoNode for f32 {
    fn into_node(self, ctx: &mut Context) -> Result<Node, Error> {
        Ok(ctx.constant(self.into()))
    }
}

impl IntoNode for f64 {
    fn into_node(self, ctx: &mut Context) -> Result<Node, Error> {
        Ok(ctx.constant(self))
    }
}

use std::collections::BTreeMap;

use log::debug;

use super::clause::{Clause, ClauseIndex, ClauseOp, Row};
use crate::{
    context::{BinaryOpcode, Context, Node, Op, Var},
    Error,
};

/// Number of affine transform coefficients (a 3x4 matrix, row-major)
pub const MATRIX_SIZE: usize = 12;

/// A flattened, weight-ordered expression graph
///
/// Every distinct graph node is compiled to exactly one [`Clause`].  Clauses
/// are stored in a single arena sorted by weight, so evaluating them in index
/// order evaluates every clause after its operands; [`Row`]s mark the runs of
/// equal weight.
///
/// The graph's `X`, `Y`, and `Z` inputs are compiled to transformed
/// coordinates (e.g. `m0 * x + m1 * y + m2 * z + m3`), built from raw input
/// leaves and the 12 matrix coefficient leaves.  These leaves are always
/// present, so that a transform can be installed on any evaluator.
///
/// A schedule is immutable once built and may be shared between evaluators.
#[derive(Debug)]
pub struct ClauseSchedule {
    clauses: Vec<Clause>,
    rows: Vec<Row>,
    root: ClauseIndex,
    inputs: [ClauseIndex; 3],
    matrix: [ClauseIndex; MATRIX_SIZE],
    constants: Vec<(ClauseIndex, f32)>,
}

static_assertions::assert_impl_all!(ClauseSchedule: Send, Sync);

/// Helper to accumulate unsorted clauses
#[derive(Default)]
struct Builder {
    clauses: Vec<Clause>,
    transformed: [Option<ClauseIndex>; 3],
}

impl Builder {
    fn push(&mut self, op: ClauseOp) -> ClauseIndex {
        let weight = op
            .iter_args()
            .map(|a| self.clauses[a].weight + 1)
            .max()
            .unwrap_or(0);
        self.clauses.push(Clause { op, weight });
        self.clauses.len() - 1
    }

    /// Returns the clause for a transformed coordinate, building it if needed
    ///
    /// Raw inputs live at indices 0-2 and matrix coefficients at 3-14.
    fn transformed(&mut self, v: Var) -> ClauseIndex {
        let r = v.index();
        if let Some(i) = self.transformed[r] {
            return i;
        }
        let m = |c: usize| 3 + 4 * r + c;
        let tx = self.push(ClauseOp::Binary(BinaryOpcode::Mul, m(0), 0));
        let ty = self.push(ClauseOp::Binary(BinaryOpcode::Mul, m(1), 1));
        let tz = self.push(ClauseOp::Binary(BinaryOpcode::Mul, m(2), 2));
        let s = self.push(ClauseOp::Binary(BinaryOpcode::Add, tx, ty));
        let s = self.push(ClauseOp::Binary(BinaryOpcode::Add, s, tz));
        let out = self.push(ClauseOp::Binary(BinaryOpcode::Add, s, m(3)));
        self.transformed[r] = Some(out);
        out
    }
}

impl ClauseSchedule {
    /// Builds a schedule for the given root node
    ///
    /// Returns [`Error::BadNode`] if the root (or any node it references) is
    /// not a valid node in the context, or if an operand does not precede its
    /// parent in the context (which would allow a cycle).
    pub fn new(ctx: &Context, root: Node) -> Result<Self, Error> {
        ctx.get_op(root).ok_or(Error::BadNode)?;

        let mut b = Builder::default();
        for v in [Var::X, Var::Y, Var::Z] {
            b.push(ClauseOp::Input(v));
        }
        for i in 0..MATRIX_SIZE {
            b.push(ClauseOp::Matrix(i as u8));
        }

        // Depth-first recursion on the heap, to protect against stack overflows
        enum Action {
            Down,
            Up,
        }
        let mut seen: BTreeMap<Node, ClauseIndex> = BTreeMap::new();
        let mut todo = vec![(Action::Down, root)];
        while let Some((action, node)) = todo.pop() {
            let op = *ctx.get_op(node).ok_or(Error::BadNode)?;
            match action {
                Action::Down => {
                    if seen.contains_key(&node) {
                        continue;
                    }
                    todo.push((Action::Up, node));
                    for c in op.iter_children() {
                        if c >= node {
                            return Err(Error::BadNode);
                        }
                        todo.push((Action::Down, c));
                    }
                }
                Action::Up => {
                    let i = match op {
                        Op::Input(v) => b.transformed(v),
                        Op::Const(c) => b.push(ClauseOp::Const(c.0 as f32)),
                        Op::Unary(op, a) => {
                            b.push(ClauseOp::Unary(op, seen[&a]))
                        }
                        Op::Binary(op, lhs, rhs) => b.push(ClauseOp::Binary(
                            op,
                            seen[&lhs],
                            seen[&rhs],
                        )),
                    };
                    seen.insert(node, i);
                }
            }
        }
        let root = seen[&root];

        // Stable sort by weight, then remap operands into the new order
        let mut order: Vec<ClauseIndex> = (0..b.clauses.len()).collect();
        order.sort_by_key(|&i| b.clauses[i].weight);
        let mut remap = vec![0; order.len()];
        for (new, &old) in order.iter().enumerate() {
            remap[old] = new;
        }
        let clauses: Vec<Clause> = order
            .iter()
            .map(|&old| {
                let c = b.clauses[old];
                Clause {
                    op: c.op.remap(&remap),
                    weight: c.weight,
                }
            })
            .collect();

        let mut rows = vec![];
        let mut start = 0;
        for i in 1..=clauses.len() {
            if i == clauses.len() || clauses[i].weight != clauses[start].weight
            {
                rows.push(Row::new(clauses[start].weight, start..i));
                start = i;
            }
        }

        let constants = clauses
            .iter()
            .enumerate()
            .filter_map(|(i, c)| match c.op {
                ClauseOp::Const(v) => Some((i, v)),
                _ => None,
            })
            .collect();

        debug!(
            "built schedule with {} clauses in {} rows",
            clauses.len(),
            rows.len()
        );
        Ok(Self {
            clauses,
            rows,
            root: remap[root],
            inputs: [remap[0], remap[1], remap[2]],
            matrix: std::array::from_fn(|i| remap[3 + i]),
            constants,
        })
    }

    /// Returns the total number of clauses
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Checks whether the schedule is empty (which never happens)
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Returns the clause arena, sorted by weight
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Returns rows in ascending weight order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns the index of the root clause
    pub fn root(&self) -> ClauseIndex {
        self.root
    }

    /// Returns the indices of the raw `x`, `y`, `z` input clauses
    pub fn inputs(&self) -> [ClauseIndex; 3] {
        self.inputs
    }

    /// Returns the indices of the 12 matrix coefficient clauses
    pub fn matrix(&self) -> [ClauseIndex; MATRIX_SIZE] {
        self.matrix
    }

    /// Returns `(index, value)` pairs for every constant clause
    pub fn constants(&self) -> &[(ClauseIndex, f32)] {
        &self.constants
    }
}

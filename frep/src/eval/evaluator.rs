use std::sync::Arc;

use nalgebra::Matrix4;

use super::{
    choice::Choice,
    clause::{ClauseIndex, ClauseOp},
    schedule::{ClauseSchedule, MATRIX_SIZE},
    value::Value,
};
use crate::{
    context::{BinaryOpcode, Context, Node},
    types::{Grad, Interval},
    Error,
};

/// Number of slots in an evaluator's batch buffers
pub const BATCH_SIZE: usize = 256;

/// Saved pruning state
#[derive(Clone, Default)]
struct Frame {
    enabled: Vec<bool>,
    choices: Vec<Choice>,
    active: usize,
}

/// Evaluates a [`ClauseSchedule`] at points, batches, and intervals
///
/// The schedule is shared; everything else (result buffers for each kind of
/// evaluation, the enable mask, per-clause choices, and the stack of saved
/// pruning frames) belongs to this evaluator.  Use one evaluator per thread.
///
/// ```
/// # use frep::{context::Context, eval::Evaluator, types::Interval};
/// let mut ctx = Context::new();
/// let x = ctx.x();
/// let y = ctx.y();
/// let root = ctx.min(x, y)?;
///
/// let mut eval = Evaluator::new(&ctx, root)?;
/// assert_eq!(eval.eval(1.0, 2.0, 0.0), 1.0);
///
/// // Over this box, x is always less than y, so `y` is pruned
/// eval.set_interval(
///     Interval::new(-1.0, 0.0),
///     Interval::new(1.0, 2.0),
///     Interval::new(0.0, 0.0),
/// );
/// eval.push();
/// assert!(eval.utilization() < 1.0);
/// assert_eq!(eval.eval(-0.5, 1.5, 0.0), -0.5);
/// eval.pop()?;
/// # Ok::<(), frep::Error>(())
/// ```
pub struct Evaluator {
    schedule: Arc<ClauseSchedule>,

    point: Vec<f32>,
    interval: Vec<Interval>,
    values: Vec<f32>,
    grads: Vec<Grad>,

    enabled: Vec<bool>,
    choices: Vec<Choice>,
    active: usize,

    /// Saved frames; slots at and above `depth` are reused scratch space
    stack: Vec<Frame>,
    depth: usize,
}

static_assertions::assert_impl_all!(Evaluator: Send);

impl Evaluator {
    /// Builds a schedule for the given root and an evaluator around it
    pub fn new(ctx: &Context, root: Node) -> Result<Self, Error> {
        let schedule = ClauseSchedule::new(ctx, root)?;
        Ok(Self::from_schedule(Arc::new(schedule)))
    }

    /// Builds an evaluator with an initial transform matrix
    pub fn with_matrix(
        ctx: &Context,
        root: Node,
        mat: &Matrix4<f32>,
    ) -> Result<Self, Error> {
        let mut out = Self::new(ctx, root)?;
        out.set_matrix(mat);
        Ok(out)
    }

    /// Builds an evaluator for an existing (possibly shared) schedule
    ///
    /// Constants are written into every buffer and the transform is reset to
    /// the identity.
    pub fn from_schedule(schedule: Arc<ClauseSchedule>) -> Self {
        let n = schedule.len();
        let mut out = Self {
            point: vec![0.0; n],
            interval: vec![Interval::new(0.0, 0.0); n],
            values: vec![0.0; n * BATCH_SIZE],
            grads: vec![Grad::default(); n * BATCH_SIZE],
            enabled: vec![true; n],
            choices: vec![Choice::Both; n],
            active: n,
            stack: vec![],
            depth: 0,
            schedule,
        };
        let schedule = out.schedule.clone();
        for &(i, v) in schedule.constants() {
            out.write_leaf(i, v);
        }
        out.set_matrix(&Matrix4::identity());
        out
    }

    /// Returns the shared schedule
    pub fn schedule(&self) -> &Arc<ClauseSchedule> {
        &self.schedule
    }

    /// Writes a fixed value into every buffer for the given clause
    fn write_leaf(&mut self, i: ClauseIndex, v: f32) {
        self.point[i] = v;
        self.interval[i] = v.into();
        self.values[i * BATCH_SIZE..(i + 1) * BATCH_SIZE].fill(v);
        self.grads[i * BATCH_SIZE..(i + 1) * BATCH_SIZE].fill(v.into());
    }

    /// Installs the upper 3x4 block of a homogeneous transform
    ///
    /// Inputs are transformed by this matrix before reaching the expression,
    /// i.e. the expression is evaluated at `mat * [x, y, z, 1]`.
    pub fn set_matrix(&mut self, mat: &Matrix4<f32>) {
        let matrix = self.schedule.matrix();
        for r in 0..3 {
            for c in 0..4 {
                self.write_leaf(matrix[r * 4 + c], mat[(r, c)]);
            }
        }
    }

    /// Installs a transform from 12 row-major coefficients
    pub fn set_matrix_coefficients(
        &mut self,
        m: &[f32],
    ) -> Result<(), Error> {
        if m.len() != MATRIX_SIZE {
            return Err(Error::BadMatrix(m.len()));
        }
        let matrix = self.schedule.matrix();
        for (&i, &v) in matrix.iter().zip(m) {
            self.write_leaf(i, v);
        }
        Ok(())
    }

    /// Evaluates a single point
    pub fn eval(&mut self, x: f32, y: f32, z: f32) -> f32 {
        for (i, v) in self.schedule.inputs().into_iter().zip([x, y, z]) {
            self.point[i] = v;
        }
        run(
            &self.schedule,
            &self.enabled,
            &self.choices,
            &mut self.point,
            1,
            1,
            false,
        );
        self.point[self.schedule.root()]
    }

    /// Loads an axis-aligned box for interval evaluation and [`push`]
    ///
    /// [`push`]: Self::push
    pub fn set_interval(&mut self, x: Interval, y: Interval, z: Interval) {
        let [ix, iy, iz] = self.schedule.inputs();
        self.interval[ix] = x;
        self.interval[iy] = y;
        self.interval[iz] = z;
    }

    /// Evaluates the loaded box, returning the root's interval
    pub fn interval(&mut self) -> Interval {
        run(
            &self.schedule,
            &self.enabled,
            &self.choices,
            &mut self.interval,
            1,
            1,
            false,
        );
        self.interval[self.schedule.root()]
    }

    /// Loads a box and evaluates it
    pub fn eval_interval(
        &mut self,
        x: Interval,
        y: Interval,
        z: Interval,
    ) -> Interval {
        self.set_interval(x, y, z);
        self.interval()
    }

    /// Loads a point into slot `index` of the batch buffers
    ///
    /// The point is loaded for both [`values`](Self::values) and
    /// [`derivs`](Self::derivs); its derivatives are seeded with the unit
    /// vector along each raw input.
    pub fn set(
        &mut self,
        x: f32,
        y: f32,
        z: f32,
        index: usize,
    ) -> Result<(), Error> {
        if index >= BATCH_SIZE {
            return Err(Error::BadSlot(index, BATCH_SIZE));
        }
        let inputs = self.schedule.inputs();
        for (k, (i, v)) in inputs.into_iter().zip([x, y, z]).enumerate() {
            let mut d = [0.0; 3];
            d[k] = 1.0;
            self.values[i * BATCH_SIZE + index] = v;
            self.grads[i * BATCH_SIZE + index] =
                Grad::new(v, d[0], d[1], d[2]);
        }
        Ok(())
    }

    /// Evaluates slots `0..count`, returning their values
    ///
    /// With `vectorize`, each clause is run over every slot before moving to
    /// the next clause; otherwise each slot is run through every clause in
    /// turn.  Only the loop order differs.
    pub fn values(
        &mut self,
        count: usize,
        vectorize: bool,
    ) -> Result<&[f32], Error> {
        if count > BATCH_SIZE {
            return Err(Error::BatchTooLarge(count, BATCH_SIZE));
        }
        run(
            &self.schedule,
            &self.enabled,
            &self.choices,
            &mut self.values,
            BATCH_SIZE,
            count,
            vectorize,
        );
        let root = self.schedule.root() * BATCH_SIZE;
        Ok(&self.values[root..root + count])
    }

    /// Evaluates slots `0..count`, returning values and partial derivatives
    ///
    /// Derivatives are taken with respect to the raw (untransformed) inputs.
    pub fn derivs(
        &mut self,
        count: usize,
        vectorize: bool,
    ) -> Result<&[Grad], Error> {
        if count > BATCH_SIZE {
            return Err(Error::BatchTooLarge(count, BATCH_SIZE));
        }
        run(
            &self.schedule,
            &self.enabled,
            &self.choices,
            &mut self.grads,
            BATCH_SIZE,
            count,
            vectorize,
        );
        let root = self.schedule.root() * BATCH_SIZE;
        Ok(&self.grads[root..root + count])
    }

    /// Evaluates the loaded box and prunes clauses that it proves unused
    ///
    /// `min` and `max` clauses where one operand always wins, and `mul`
    /// clauses with an operand that is exactly zero, are locked to that
    /// operand; clauses which are then unreachable from the root are
    /// disabled.  The previous state is saved and restored by [`pop`].
    ///
    /// Returns the root's interval over the box.
    ///
    /// [`pop`]: Self::pop
    pub fn push(&mut self) -> Interval {
        let out = self.interval();

        if self.stack.len() == self.depth {
            self.stack.push(Frame::default());
        }
        let frame = &mut self.stack[self.depth];
        frame.enabled.clone_from(&self.enabled);
        frame.choices.clone_from(&self.choices);
        frame.active = self.active;
        self.depth += 1;

        let clauses = self.schedule.clauses();
        for (i, c) in clauses.iter().enumerate() {
            if !self.enabled[i] || self.choices[i] != Choice::Both {
                continue;
            }
            if let ClauseOp::Binary(op, a, b) = c.op {
                let (lhs, rhs) = (self.interval[a], self.interval[b]);
                self.choices[i] = match op {
                    BinaryOpcode::Min => lhs.min_choice(rhs).1,
                    BinaryOpcode::Max => lhs.max_choice(rhs).1,
                    BinaryOpcode::Mul => lhs.mul_choice(rhs).1,
                    _ => continue,
                };
            }
        }
        self.mark_enabled();
        out
    }

    /// Restores the state saved by the matching [`push`](Self::push)
    pub fn pop(&mut self) -> Result<(), Error> {
        if self.depth == 0 {
            return Err(Error::EmptyPruneStack);
        }
        self.depth -= 1;
        let frame = &mut self.stack[self.depth];
        std::mem::swap(&mut self.enabled, &mut frame.enabled);
        std::mem::swap(&mut self.choices, &mut frame.choices);
        self.active = frame.active;
        Ok(())
    }

    /// Rebuilds the enable mask from the root, following chosen operands
    fn mark_enabled(&mut self) {
        let clauses = self.schedule.clauses();
        self.enabled.fill(false);
        self.enabled[self.schedule.root()] = true;
        for i in (0..clauses.len()).rev() {
            if !self.enabled[i] {
                continue;
            }
            match clauses[i].op {
                ClauseOp::Unary(_, a) => self.enabled[a] = true,
                ClauseOp::Binary(_, a, b) => {
                    let c = self.choices[i];
                    if c.uses_left() {
                        self.enabled[a] = true;
                    }
                    if c.uses_right() {
                        self.enabled[b] = true;
                    }
                }
                ClauseOp::Input(..)
                | ClauseOp::Matrix(..)
                | ClauseOp::Const(..) => (),
            }
        }
        self.active = self.enabled.iter().filter(|e| **e).count();
    }

    /// Returns the fraction of clauses which are currently enabled
    pub fn utilization(&self) -> f64 {
        self.active as f64 / self.enabled.len() as f64
    }

    /// Returns the number of active [`push`](Self::push) calls
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Runs every enabled clause over slots `0..count` of a buffer
///
/// Clause `i` owns `buf[i * stride..(i + 1) * stride]`.
fn run<T: Value>(
    schedule: &ClauseSchedule,
    enabled: &[bool],
    choices: &[Choice],
    buf: &mut [T],
    stride: usize,
    count: usize,
    vectorize: bool,
) {
    let clauses = schedule.clauses();
    if vectorize {
        for row in schedule.rows() {
            for i in row.range() {
                if enabled[i] {
                    let (op, c) = (clauses[i].op, choices[i]);
                    eval_clause(op, c, buf, stride, i, 0, count);
                }
            }
        }
    } else {
        for s in 0..count {
            for (i, c) in clauses.iter().enumerate() {
                if enabled[i] {
                    eval_clause(c.op, choices[i], buf, stride, i, s, s + 1);
                }
            }
        }
    }
}

/// Evaluates one clause over slots `lo..hi`
#[inline]
fn eval_clause<T: Value>(
    op: ClauseOp,
    choice: Choice,
    buf: &mut [T],
    stride: usize,
    i: ClauseIndex,
    lo: usize,
    hi: usize,
) {
    let (args, rest) = buf.split_at_mut(i * stride);
    let args: &[T] = args;
    let out = &mut rest[lo..hi];
    let arg = move |a: ClauseIndex| &args[a * stride + lo..a * stride + hi];
    match op {
        ClauseOp::Input(..) | ClauseOp::Matrix(..) | ClauseOp::Const(..) => (),
        ClauseOp::Unary(op, a) => T::unary(op, arg(a), out),
        ClauseOp::Binary(op, a, b) => match choice {
            Choice::Left => out.copy_from_slice(arg(a)),
            Choice::Right => out.copy_from_slice(arg(b)),
            Choice::Both => T::binary(op, arg(a), arg(b), out),
        },
    }
}

//! Clause scheduling and evaluation
//!
//! A [`ClauseSchedule`] flattens an expression graph into a weight-sorted
//! arena of [`Clause`]s.  An [`Evaluator`] owns the per-clause buffers for a
//! schedule and evaluates it at single points, in batches of up to
//! [`BATCH_SIZE`] points (with or without derivatives), and over intervals.
//!
//! Interval evaluation drives pruning: [`Evaluator::push`] records a
//! [`Choice`] for every `min`, `max`, and `mul` clause whose result is decided
//! over the current box, then disables clauses that can no longer reach the
//! root.  [`Evaluator::pop`] undoes the most recent `push`.
mod choice;
mod clause;
mod evaluator;
mod schedule;
mod value;

pub use choice::Choice;
pub use clause::{Clause, ClauseIndex, ClauseOp, Row};
pub use evaluator::{Evaluator, BATCH_SIZE};
pub use schedule::{ClauseSchedule, MATRIX_SIZE};
pub use value::Value;

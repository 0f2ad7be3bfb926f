//! Evaluation and meshing of implicit surfaces
//!
//! Shapes are scalar fields built as expression graphs in a
//! [`Context`](context::Context), where negative values are inside the shape
//! and positive values are outside.  The graph is flattened into a
//! [`ClauseSchedule`](eval::ClauseSchedule), which an
//! [`Evaluator`](eval::Evaluator) samples at points, in batches, over
//! intervals, and with derivatives.
//!
//! ```
//! use frep::{context::Context, eval::Evaluator, types::Interval};
//!
//! let mut ctx = Context::new();
//! let x = ctx.x();
//! let y = ctx.y();
//! let x2 = ctx.square(x)?;
//! let y2 = ctx.square(y)?;
//! let r = ctx.add(x2, y2)?;
//! let circle = ctx.sub(r, 1.0)?;
//!
//! let mut eval = Evaluator::new(&ctx, circle)?;
//! assert_eq!(eval.eval(0.0, 0.0, 0.0), -1.0);
//! assert_eq!(eval.eval(1.0, 0.0, 0.0), 0.0);
//!
//! // Interval evaluation bounds the field over a box
//! let i = eval.eval_interval(
//!     Interval::new(2.0, 3.0),
//!     Interval::new(0.0, 1.0),
//!     Interval::new(0.0, 0.0),
//! );
//! assert!(i.lower() > 0.0);
//! # Ok::<(), frep::Error>(())
//! ```
//!
//! The [`mesh`] module uses interval evaluation and pruning to extract
//! triangle meshes (or 2D contours) over a sampled [`Region`](region::Region).
#![warn(missing_docs)]

pub mod context;
pub mod eval;
pub mod mesh;
pub mod pool;
pub mod region;
pub mod types;

mod error;

pub use error::Error;

//! Leaf cells and vertex placement
use arrayvec::ArrayVec;
use nalgebra::Vector3;

use super::{
    qef::QuadraticErrorSolver,
    types::{CellMask, Corner, Edge, X, Y, Z},
};
use crate::{
    eval::{Evaluator, BATCH_SIZE},
    region::Subregion,
    types::Grad,
    Error,
};

/// Integer coordinates of a leaf cell, in units of the leaf size
///
/// The Z coordinate is always 0 for 2D cells.
pub type CellKey = [u32; 3];

/// Number of segments each edge is divided into per search pass
const SEARCH_STEPS: usize = 16;

/// Number of interior samples per edge per search pass
const SEARCH_SAMPLES: usize = SEARCH_STEPS - 1;

/// Number of refinement passes when locating an edge crossing
const SEARCH_PASSES: usize = 4;

static_assertions::const_assert!(12 * SEARCH_SAMPLES <= BATCH_SIZE);

/// A leaf cell which contains the surface
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Leaf<const D: usize> {
    /// Corners which are inside the shape
    pub mask: CellMask<D>,
    /// Vertex position
    pub pos: Vector3<f32>,
    /// Unit normal at the vertex (or zero if the gradient is unusable)
    pub normal: Vector3<f32>,
    /// Dense index, assigned once every leaf has been collected
    pub index: usize,
}

/// A sign change along an edge, narrowed by successive passes
struct Crossing {
    lo: Vector3<f32>,
    hi: Vector3<f32>,
    vlo: f32,
    vhi: f32,
}

impl Crossing {
    /// Interpolates between the current bounds to place the crossing
    fn pos(&self) -> Vector3<f32> {
        let t = self.vlo / (self.vlo - self.vhi);
        let t = if (0.0..=1.0).contains(&t) { t } else { 0.5 };
        self.lo + (self.hi - self.lo) * t
    }
}

/// Returns the position of a cell corner
fn corner<const D: usize>(cell: &Subregion, c: Corner<D>) -> Vector3<f32> {
    let pick = |lo: f32, hi: f32, up: bool| if up { hi } else { lo };
    Vector3::new(
        pick(cell.x.lower(), cell.x.upper(), c & X),
        pick(cell.y.lower(), cell.y.upper(), c & Y),
        pick(cell.z.lower(), cell.z.upper(), c & Z),
    )
}

/// Checks whether a position is within the cell (on its first `D` axes)
fn contains<const D: usize>(cell: &Subregion, p: Vector3<f32>) -> bool {
    let axes = [cell.x, cell.y, cell.z];
    axes.iter()
        .zip(p.iter())
        .take(D)
        .all(|(a, v)| v.is_finite() && a.lower() <= *v && *v <= a.upper())
}

/// Samples a leaf cell, returning a vertex if the surface passes through it
///
/// Corners with a negative value are inside.  Crossings on every edge with a
/// sign change are located together in batches, then the vertex is placed by
/// a QEF fit to their tangent planes.  If the fit leaves the cell, the vertex
/// falls back to the crossings' centroid.
///
/// In 2D, the Z gradient is ignored and the vertex stays on the slice.
pub fn sample<const D: usize>(
    eval: &mut Evaluator,
    cell: &Subregion,
) -> Result<Option<Leaf<D>>, Error> {
    for c in Corner::<D>::iter() {
        let p = corner(cell, c);
        eval.set(p.x, p.y, p.z, c.index())?;
    }
    let values: ArrayVec<f32, 8> =
        eval.values(1 << D, true)?.iter().copied().collect();

    let mut mask = CellMask::<D>::default();
    for c in Corner::<D>::iter() {
        if values[c.index()] < 0.0 {
            mask.set(c);
        }
    }
    if mask.is_uniform() {
        return Ok(None);
    }

    let mut crossings: ArrayVec<Crossing, 12> = Edge::<D>::iter()
        .filter(|e| mask.crosses(*e))
        .map(|e| Crossing {
            lo: corner(cell, e.start),
            hi: corner(cell, e.end()),
            vlo: values[e.start.index()],
            vhi: values[e.end().index()],
        })
        .collect();

    for _ in 0..SEARCH_PASSES {
        for (i, c) in crossings.iter().enumerate() {
            let d = c.hi - c.lo;
            for j in 0..SEARCH_SAMPLES {
                let p = c.lo + d * ((j + 1) as f32 / SEARCH_STEPS as f32);
                eval.set(p.x, p.y, p.z, i * SEARCH_SAMPLES + j)?;
            }
        }
        let out = eval.values(crossings.len() * SEARCH_SAMPLES, true)?;
        let chunks = out.chunks(SEARCH_SAMPLES);
        for (c, samples) in crossings.iter_mut().zip(chunks) {
            let inside = c.vlo < 0.0;
            let (lo, d) = (c.lo, c.hi - c.lo);
            let at = |k: usize| lo + d * (k as f32 / SEARCH_STEPS as f32);
            match samples.iter().position(|v| (*v < 0.0) != inside) {
                Some(j) => {
                    if j > 0 {
                        c.lo = at(j);
                        c.vlo = samples[j - 1];
                    }
                    c.hi = at(j + 1);
                    c.vhi = samples[j];
                }
                None => {
                    c.lo = at(SEARCH_SAMPLES);
                    c.vlo = samples[SEARCH_SAMPLES - 1];
                }
            }
        }
    }

    for (i, c) in crossings.iter().enumerate() {
        let p = c.pos();
        eval.set(p.x, p.y, p.z, i)?;
    }
    let grads = eval.derivs(crossings.len(), true)?;
    let mut qef = QuadraticErrorSolver::new();
    for (c, g) in crossings.iter().zip(grads) {
        qef.add_intersection(c.pos(), flatten::<D>(*g).normal());
    }

    let pos = qef.solve();
    let mut pos = if contains::<D>(cell, pos) {
        pos
    } else {
        qef.mass_point()
    };
    if D == 2 {
        pos.z = cell.z.lower();
    }

    eval.set(pos.x, pos.y, pos.z, 0)?;
    let g = flatten::<D>(eval.derivs(1, true)?[0]);
    let normal = g.normal().unwrap_or_else(Vector3::zeros);

    Ok(Some(Leaf {
        mask,
        pos,
        normal,
        index: 0,
    }))
}

/// Drops the Z derivative for 2D cells
fn flatten<const D: usize>(g: Grad) -> Grad {
    if D == 2 {
        Grad::new(g.v, g.dx, g.dy, 0.0)
    } else {
        g
    }
}

//! Adaptive surface extraction
//!
//! This module implements dual contouring over an adaptively subdivided
//! [`Region`].  Cells are classified with interval arithmetic, pruning the
//! expression as the recursion narrows; cells which are entirely inside or
//! outside the shape are skipped.  Leaf cells which contain the surface get
//! one vertex each, placed with a quadratic error function fit to the
//! surface's tangent planes, and a dual pass connects the vertices around
//! every grid edge with a sign change.
//!
//! The resulting meshes are watertight away from the region's boundary, but
//! are not guaranteed to be manifold where a cell has ambiguous corners, and
//! will miss features which are thinner than a leaf cell.
//!
//! ```
//! use frep::{
//!     context::Context,
//!     mesh::{self, Settings},
//!     region::Region,
//!     types::Interval,
//! };
//!
//! let mut ctx = Context::new();
//! let x = ctx.x();
//! let root = ctx.add(x, 0.75)?;
//!
//! let i = Interval::new(-1.0, 1.0);
//! let region = Region::new(i, i, i, 2)?;
//! let mesh = mesh::render(&ctx, root, &region, &Settings::default())?;
//! assert_eq!(mesh.triangles.len(), 18);
//! # Ok::<(), frep::Error>(())
//! ```
mod builder;
mod cell;
mod contour;
mod dc;
mod qef;
mod worker;

#[doc(hidden)]
pub mod types;

pub use contour::Contours;

use std::sync::Arc;

use nalgebra::{Matrix4, Vector3};

use crate::{
    context::{Context, Node},
    eval::ClauseSchedule,
    pool::ThreadPool,
    region::Region,
    Error,
};

////////////////////////////////////////////////////////////////////////////////

/// An indexed 3D mesh
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    /// Triangles, as indexes into [`self.vertices`](Self::vertices)
    pub triangles: Vec<Vector3<usize>>,
    /// Vertex positions
    pub vertices: Vec<Vector3<f32>>,
    /// Unit normals at each vertex (or zero if the gradient was unusable)
    pub normals: Vec<Vector3<f32>>,
}

impl Mesh {
    /// Returns the unit face normal of the given triangle
    ///
    /// # Panics
    /// If `i` is not a valid triangle index
    pub fn norm(&self, i: usize) -> Vector3<f32> {
        let [a, b, c] = self.triangles[i].data.0[0].map(|j| self.vertices[j]);
        (b - a).cross(&(c - a)).normalize()
    }
}

/// Settings when extracting a mesh or contours
pub struct Settings<'a> {
    /// Size of a leaf cell, in voxels along each axis
    ///
    /// This must be a power of two.
    pub min_cell_size: u32,

    /// Thread pool to use for extraction
    ///
    /// If this is `None`, then extraction is done in a single thread;
    /// otherwise, the provided pool is used.
    pub threads: Option<&'a ThreadPool>,

    /// Prune the expression during subdivision
    ///
    /// This does not change the output; disabling it is mainly useful for
    /// testing and benchmarking.
    pub prune: bool,

    /// Transform applied to every point before evaluation
    pub world_to_model: Matrix4<f32>,
}

impl Default for Settings<'_> {
    fn default() -> Self {
        Self {
            min_cell_size: 1,
            threads: Some(&ThreadPool::Global),
            prune: true,
            world_to_model: Matrix4::identity(),
        }
    }
}

/// Extracts a triangle mesh of the given node's zero level set
pub fn render(
    ctx: &Context,
    root: Node,
    region: &Region,
    settings: &Settings,
) -> Result<Mesh, Error> {
    let schedule = Arc::new(ClauseSchedule::new(ctx, root)?);
    render_with(schedule, region, settings)
}

/// Extracts a triangle mesh from an existing schedule
///
/// The schedule is shared between every worker thread.
pub fn render_with(
    schedule: Arc<ClauseSchedule>,
    region: &Region,
    settings: &Settings,
) -> Result<Mesh, Error> {
    let leaves = worker::extract::<3>(schedule, region, settings)?;
    let mesh = dc::triangulate(&leaves);
    log::debug!(
        "meshed {} vertices and {} triangles",
        mesh.vertices.len(),
        mesh.triangles.len()
    );
    Ok(mesh)
}

/// Extracts 2D contours of the given node's zero level set
///
/// Contours are traced at the lower Z bound of the region, which is normally
/// built with [`Region::slice`].
pub fn contour(
    ctx: &Context,
    root: Node,
    region: &Region,
    settings: &Settings,
) -> Result<Contours, Error> {
    let schedule = Arc::new(ClauseSchedule::new(ctx, root)?);
    let leaves = worker::extract::<2>(schedule, region, settings)?;
    let out = contour::trace(&leaves);
    log::debug!(
        "traced {} points and {} segments",
        out.points.len(),
        out.segments.len()
    );
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::Interval;

    #[test]
    fn test_norm() {
        let mesh = Mesh {
            triangles: vec![Vector3::new(0, 1, 2), Vector3::new(0, 2, 1)],
            vertices: vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(2.0, 0.0, 0.0),
                Vector3::new(0.0, 2.0, 0.0),
            ],
            normals: vec![],
        };
        assert_eq!(mesh.norm(0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(mesh.norm(1), Vector3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert_eq!(s.min_cell_size, 1);
        assert!(s.prune);
        assert!(matches!(s.threads, Some(ThreadPool::Global)));
        assert_eq!(s.world_to_model, Matrix4::identity());
    }

    #[test]
    fn test_bad_node() {
        let mut a = Context::new();
        let mut b = Context::new();
        let _ = a.x();
        let _ = a.y();
        let root = b.x();
        let root = b.add(root, 1.0).unwrap();
        let i = Interval::new(-1.0, 1.0);
        let region = Region::new(i, i, i, 1).unwrap();
        assert_eq!(
            render(&a, root, &region, &Settings::default()),
            Err(Error::BadNode)
        );
    }
}

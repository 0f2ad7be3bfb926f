//! Vertex placement by least-squares fitting of tangent planes
use nalgebra::{Matrix3, Vector3};

/// Singular values smaller than this fraction of the largest one are treated
/// as zero when solving
const RANK_CUTOFF: f32 = 1e-3;

/// Accumulates the tangent planes at a cell's surface crossings, then finds
/// the point closest to all of them
///
/// The error being minimized is `sum((n_i . (p - p_i))^2)`, stored in its
/// normal-equation form `p^T (A^T A) p - 2 p^T (A^T b) + ...`.
#[derive(Copy, Clone, Debug, Default)]
pub struct QuadraticErrorSolver {
    ata: Matrix3<f32>,
    atb: Vector3<f32>,
    sum: Vector3<f32>,
    count: u32,
}

impl QuadraticErrorSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a surface crossing
    ///
    /// Every position counts towards the mass point, but only crossings with
    /// a usable `normal` contribute a plane.
    pub fn add_intersection(
        &mut self,
        pos: Vector3<f32>,
        normal: Option<Vector3<f32>>,
    ) {
        self.sum += pos;
        self.count += 1;
        if let Some(n) = normal {
            self.ata += n * n.transpose();
            self.atb += n * n.dot(&pos);
        }
    }

    /// Average of every recorded position
    pub fn mass_point(&self) -> Vector3<f32> {
        if self.count == 0 {
            Vector3::zeros()
        } else {
            self.sum / self.count as f32
        }
    }

    /// Returns the position which minimizes the error
    ///
    /// The system is solved relative to the mass point with a truncated
    /// pseudo-inverse, so directions which the planes leave unconstrained
    /// (along an edge, or across a flat face) stay at the mass point.
    pub fn solve(&self) -> Vector3<f32> {
        let center = self.mass_point();
        let rhs = self.atb - self.ata * center;
        let svd = self.ata.svd(true, true);
        let largest = svd
            .singular_values
            .iter()
            .fold(0.0f32, |a, b| a.max(*b));
        match svd.solve(&rhs, largest * RANK_CUTOFF) {
            Ok(d) if d.iter().all(|v| v.is_finite()) => center + d,
            _ => center,
        }
    }
}

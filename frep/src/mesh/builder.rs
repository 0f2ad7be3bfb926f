use nalgebra::{Vector2, Vector3};

use super::{cell::Leaf, Contours, Mesh};

/// Container used during construction of a [`Mesh`]
pub struct MeshBuilder {
    /// Map from leaf indices to `out.vertices`
    ///
    /// `usize::MAX` is used a marker for an unmapped vertex
    map: Vec<usize>,
    out: Mesh,
}

impl MeshBuilder {
    /// Builds a new mesh builder for the given number of leaves
    pub fn new(leaves: usize) -> Self {
        Self {
            map: vec![usize::MAX; leaves],
            out: Mesh::default(),
        }
    }

    /// Looks up the vertex of the given leaf, adding it on first use
    pub fn vertex(&mut self, leaf: &Leaf<3>) -> usize {
        match self.map[leaf.index] {
            usize::MAX => {
                let next_vert = self.out.vertices.len();
                self.out.vertices.push(leaf.pos);
                self.out.normals.push(leaf.normal);
                self.map[leaf.index] = next_vert;
                next_vert
            }
            u => u,
        }
    }

    pub fn triangle(&mut self, a: usize, b: usize, c: usize) {
        self.out.triangles.push(Vector3::new(a, b, c))
    }

    pub fn take(self) -> Mesh {
        self.out
    }
}

/// Container used during construction of a set of [`Contours`]
pub struct ContourBuilder {
    map: Vec<usize>,
    out: Contours,
}

impl ContourBuilder {
    /// Builds a new contour builder for the given number of leaves
    pub fn new(leaves: usize) -> Self {
        Self {
            map: vec![usize::MAX; leaves],
            out: Contours::default(),
        }
    }

    /// Looks up the point of the given leaf, adding it on first use
    pub fn point(&mut self, leaf: &Leaf<2>) -> usize {
        match self.map[leaf.index] {
            usize::MAX => {
                let next = self.out.points.len();
                self.out.points.push(Vector2::new(leaf.pos.x, leaf.pos.y));
                self.map[leaf.index] = next;
                next
            }
            u => u,
        }
    }

    pub fn segment(&mut self, a: usize, b: usize) {
        self.out.segments.push([a, b])
    }

    pub fn take(self) -> Contours {
        self.out
    }
}

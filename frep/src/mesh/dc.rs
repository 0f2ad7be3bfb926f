//! Dual contouring over a set of leaf cells
use super::{
    builder::MeshBuilder,
    cell::CellKey,
    types::{Axis, Edge, FRAMES},
    worker::Leaves,
    Mesh,
};

/// Returns the key of the cell offset by one along each of the given axes
pub(super) fn neighbor(key: CellKey, axes: &[Axis]) -> CellKey {
    let mut out = key;
    for a in axes {
        out[a.index()] += 1;
    }
    out
}

/// Builds a mesh with one quad per grid edge with a sign change
///
/// Each cell checks its edge at the upper corner of the `(u, v)` face, for
/// each right-handed frame `(t, u, v)`.  The four cells around that edge are
/// visited in the order `[c, c + u, c + u + v, c + v]`, which winds
/// counter-clockwise about `+t`; the winding is flipped when the field
/// decreases along `+t`, so that faces point towards the outside of the
/// shape.  Edges on the boundary of the region are skipped.
pub fn triangulate(leaves: &Leaves<3>) -> Mesh {
    let mut out = MeshBuilder::new(leaves.len());
    for (key, leaf) in leaves {
        for (t, u, v) in FRAMES {
            let e = Edge {
                start: u | v,
                axis: t,
            };
            if !leaf.mask.crosses(e) {
                continue;
            }
            let quad = [
                *key,
                neighbor(*key, &[u]),
                neighbor(*key, &[u, v]),
                neighbor(*key, &[v]),
            ]
            .map(|k| leaves.get(&k));
            let [Some(a), Some(b), Some(c), Some(d)] = quad else {
                continue;
            };
            let [a, b, c, d] = [a, b, c, d].map(|leaf| out.vertex(leaf));
            if leaf.mask & e.start {
                out.triangle(a, b, c);
                out.triangle(a, c, d);
            } else {
                out.triangle(a, c, b);
                out.triangle(a, d, c);
            }
        }
    }
    out.take()
}

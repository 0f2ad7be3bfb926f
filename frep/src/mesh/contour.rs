//! 2D contours of a slice
use nalgebra::Vector2;

use super::{
    builder::ContourBuilder,
    dc::neighbor,
    types::{Corner, Edge, X, Y},
    worker::Leaves,
};

/// A set of closed (or boundary-terminated) 2D contours
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Contours {
    /// Contour points, one per leaf cell
    pub points: Vec<Vector2<f32>>,
    /// Directed segments, as indexes into [`self.points`](Self::points)
    ///
    /// The inside of the shape is on the left of each segment.
    pub segments: Vec<[usize; 2]>,
}

/// Builds contours with one segment per grid edge with a sign change
///
/// Segments are oriented with the inside of the shape on their left.
pub fn trace(leaves: &Leaves<2>) -> Contours {
    let mut out = ContourBuilder::new(leaves.len());
    for (key, leaf) in leaves {
        // Upper X edge, shared with the cell above
        let e = Edge {
            start: Corner::new(0) | Y,
            axis: X,
        };
        if leaf.mask.crosses(e) {
            if let Some(up) = leaves.get(&neighbor(*key, &[Y])) {
                let (a, b) = (out.point(leaf), out.point(up));
                if leaf.mask & e.start {
                    out.segment(a, b);
                } else {
                    out.segment(b, a);
                }
            }
        }

        // Right Y edge, shared with the cell to the right
        let e = Edge {
            start: Corner::new(0) | X,
            axis: Y,
        };
        if leaf.mask.crosses(e) {
            if let Some(right) = leaves.get(&neighbor(*key, &[X])) {
                let (a, b) = (out.point(leaf), out.point(right));
                if leaf.mask & e.start {
                    out.segment(b, a);
                } else {
                    out.segment(a, b);
                }
            }
        }
    }
    out.take()
}

//! Axes, corners, and edges of a leaf cell
//!
//! Cells are 2D (`D = 2`, a pixel in a Z slice) or 3D (`D = 3`, a voxel).
//! A corner is a bitfield with one bit per axis, set when the corner is at
//! the upper end of that axis.

/// Unit axis, stored as the corner bit that it toggles
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Axis(u8);

/// `+x`
pub const X: Axis = Axis(0b001);
/// `+y`
pub const Y: Axis = Axis(0b010);
/// `+z`
pub const Z: Axis = Axis(0b100);

/// Right-handed frames `(t, u, v)`, one per edge direction `t`
pub const FRAMES: [(Axis, Axis, Axis); 3] = [(X, Y, Z), (Y, Z, X), (Z, X, Y)];

impl Axis {
    /// Position of this axis in an `[x, y, z]` triple
    pub fn index(self) -> usize {
        self.0.trailing_zeros() as usize
    }
}

/// Corner of a `D`-dimensional cell
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Corner<const D: usize>(u8);

impl<const D: usize> Corner<D> {
    const COUNT: u8 = 1 << D;

    /// # Panics
    /// If `i` is not below `2^D`
    pub const fn new(i: u8) -> Self {
        assert!(i < Self::COUNT, "corner out of range");
        Self(i)
    }

    /// Position of this corner in a `2^D` array of corner values
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// Every corner, in index order
    pub fn iter() -> impl Iterator<Item = Self> {
        (0..Self::COUNT).map(Self)
    }
}

impl std::ops::BitOr for Axis {
    type Output = Corner<3>;
    fn bitor(self, rhs: Axis) -> Corner<3> {
        Corner(self.0 | rhs.0)
    }
}

impl<const D: usize> std::ops::BitOr<Axis> for Corner<D> {
    type Output = Self;
    fn bitor(self, rhs: Axis) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Checks whether the corner is at the upper end of the axis
impl<const D: usize> std::ops::BitAnd<Axis> for Corner<D> {
    type Output = bool;
    fn bitand(self, rhs: Axis) -> bool {
        (self.0 & rhs.0) != 0
    }
}

/// Cell edge from `start` in the `+axis` direction
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Edge<const D: usize> {
    /// Lower corner, which is on the lower end of `axis`
    pub start: Corner<D>,
    /// Direction of the edge
    pub axis: Axis,
}

impl<const D: usize> Edge<D> {
    /// Upper corner
    pub fn end(self) -> Corner<D> {
        self.start | self.axis
    }

    /// Every edge of the cell, grouped by axis
    pub fn iter() -> impl Iterator<Item = Self> {
        [X, Y, Z].into_iter().take(D).flat_map(|axis| {
            Corner::<D>::iter()
                .filter(move |&c| !(c & axis))
                .map(move |start| Edge { start, axis })
        })
    }
}

/// Set of the corners of a cell which are inside the shape
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CellMask<const D: usize>(u8);

impl<const D: usize> CellMask<D> {
    const FULL: u8 = u8::MAX >> (8 - (1 << D));

    /// # Panics
    /// If a bit is set for a corner that doesn't exist, which is only
    /// possible in 2D
    pub fn new(bits: u8) -> Self {
        assert_eq!(bits & !Self::FULL, 0, "invalid cell mask {bits:#x}");
        Self(bits)
    }

    /// Marks a corner as inside
    pub fn set(&mut self, c: Corner<D>) {
        self.0 |= 1 << c.0;
    }

    /// Checks whether the corners are all inside or all outside
    pub fn is_uniform(&self) -> bool {
        self.0 == 0 || self.0 == Self::FULL
    }

    /// Checks whether the edge's corners are on opposite sides of the surface
    pub fn crosses(&self, e: Edge<D>) -> bool {
        (*self & e.start) != (*self & e.end())
    }
}

/// Checks whether the corner is inside
impl<const D: usize> std::ops::BitAnd<Corner<D>> for CellMask<D> {
    type Output = bool;
    fn bitand(self, c: Corner<D>) -> bool {
        (self.0 >> c.0) & 1 == 1
    }
}

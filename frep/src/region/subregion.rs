use crate::types::Interval;

/// One axis of a [`Subregion`]
///
/// Borrows a contiguous run of sample coordinates from its parent
/// [`Region`](super::Region); `min` is the offset of the first sample within
/// the full region.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Axis<'a> {
    bounds: Interval,
    min: usize,
    values: &'a [f32],
}

impl<'a> Axis<'a> {
    pub(crate) fn new(
        bounds: Interval,
        min: usize,
        values: &'a [f32],
    ) -> Self {
        Self {
            bounds,
            min,
            values,
        }
    }

    /// Lower bound
    pub fn lower(&self) -> f32 {
        self.bounds.lower()
    }

    /// Upper bound
    pub fn upper(&self) -> f32 {
        self.bounds.upper()
    }

    /// Bounds as an interval
    pub fn bounds(&self) -> Interval {
        self.bounds
    }

    /// Offset of the first sample within the full region
    pub fn min(&self) -> usize {
        self.min
    }

    /// Number of samples along this axis
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// Sample coordinates
    pub fn values(&self) -> &'a [f32] {
        self.values
    }

    /// Splits into two halves by sample count
    ///
    /// The split point is placed proportionally to the sample counts, so an
    /// odd-sized axis is not split at its midpoint.
    pub fn split(&self) -> (Self, Self) {
        debug_assert!(self.size() >= 2, "cannot split a single sample");
        let half = self.size() / 2;
        let frac = half as f32 / self.size() as f32;
        let middle = self.upper() * frac + self.lower() * (1.0 - frac);
        let (lo, hi) = self.values.split_at(half);
        (
            Axis::new(Interval::new(self.lower(), middle), self.min, lo),
            Axis::new(Interval::new(middle, self.upper()), self.min + half, hi),
        )
    }
}

/// A rectangular block of a [`Region`](super::Region)
///
/// Subregions are cheap to copy; each is three borrowed [`Axis`] values.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Subregion<'a> {
    /// X axis
    pub x: Axis<'a>,
    /// Y axis
    pub y: Axis<'a>,
    /// Z axis
    pub z: Axis<'a>,
}

impl Subregion<'_> {
    /// Splits along the longest axis (by sample count)
    ///
    /// Ties prefer X, then Y.
    pub fn split(&self) -> (Self, Self) {
        let (x, y, z) = (self.x.size(), self.y.size(), self.z.size());
        if z > y && z > x {
            let (lo, hi) = self.z.split();
            (Self { z: lo, ..*self }, Self { z: hi, ..*self })
        } else if y > x {
            let (lo, hi) = self.y.split();
            (Self { y: lo, ..*self }, Self { y: hi, ..*self })
        } else {
            let (lo, hi) = self.x.split();
            (Self { x: lo, ..*self }, Self { x: hi, ..*self })
        }
    }

    /// Splits along the longer of the X and Y axes
    pub fn split_xy(&self) -> (Self, Self) {
        if self.y.size() > self.x.size() {
            let (lo, hi) = self.y.split();
            (Self { y: lo, ..*self }, Self { y: hi, ..*self })
        } else {
            let (lo, hi) = self.x.split();
            (Self { x: lo, ..*self }, Self { x: hi, ..*self })
        }
    }

    /// Splits into eight children
    ///
    /// Child `i` covers the upper X half if bit 2 of `i` is set, the upper Y
    /// half if bit 1 is set, and the upper Z half if bit 0 is set.
    pub fn octsect(&self) -> [Self; 8] {
        debug_assert!(self.can_octsect());
        let (x0, x1) = self.split();
        let (x0y0, x0y1) = x0.split();
        let (x1y0, x1y1) = x1.split();
        let (a, b) = x0y0.split();
        let (c, d) = x0y1.split();
        let (e, f) = x1y0.split();
        let (g, h) = x1y1.split();
        [a, b, c, d, e, f, g, h]
    }

    /// Checks whether any axis has more than one sample
    pub fn can_split(&self) -> bool {
        self.x.size() > 1 || self.y.size() > 1 || self.z.size() > 1
    }

    /// Checks whether the X or Y axis has more than one sample
    pub fn can_split_xy(&self) -> bool {
        self.x.size() > 1 || self.y.size() > 1
    }

    /// Checks whether all three axes have the same even sample count
    pub fn can_octsect(&self) -> bool {
        let s = self.x.size();
        s >= 2 && s % 2 == 0 && self.y.size() == s && self.z.size() == s
    }

    /// Returns the total number of samples
    pub fn voxels(&self) -> usize {
        self.x.size() * self.y.size() * self.z.size()
    }

    /// Returns the bounds of each axis
    pub fn bounds(&self) -> [Interval; 3] {
        [self.x.bounds(), self.y.bounds(), self.z.bounds()]
    }
}

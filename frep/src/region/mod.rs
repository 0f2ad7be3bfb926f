//! Sampled axis-aligned regions
//!
//! A [`Region`] is a box with a fixed grid of sample coordinates (the voxel
//! centers) along each axis.  Recursive algorithms walk it through borrowed
//! [`Subregion`]s, which split without copying samples.
//!
//! ```
//! # use frep::{region::Region, types::Interval};
//! let i = Interval::new(-1.0, 1.0);
//! let r = Region::new(i, i, i, 2)?;
//! assert_eq!(r.x(), &[-0.75, -0.25, 0.25, 0.75]);
//!
//! let s = r.subregion();
//! assert!(s.can_octsect());
//! let children = s.octsect();
//! assert_eq!(children[0].voxels(), 8);
//! # Ok::<(), frep::Error>(())
//! ```
mod subregion;

pub use subregion::{Axis, Subregion};

use crate::{types::Interval, Error};

/// An axis-aligned box with per-axis sample coordinates
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    bounds: [Interval; 3],
    samples: [Vec<f32>; 3],
}

impl Region {
    /// Largest supported resolution exponent
    pub const MAX_RESOLUTION: u8 = 16;

    /// Builds a cubic-resolution region with `2^resolution` samples per axis
    pub fn new(
        x: Interval,
        y: Interval,
        z: Interval,
        resolution: u8,
    ) -> Result<Self, Error> {
        Self::with_resolution(x, y, z, [resolution; 3])
    }

    /// Builds a region with a separate resolution exponent for each axis
    pub fn with_resolution(
        x: Interval,
        y: Interval,
        z: Interval,
        resolution: [u8; 3],
    ) -> Result<Self, Error> {
        let mut samples: [Vec<f32>; 3] = Default::default();
        for ((s, b), r) in samples.iter_mut().zip([x, y, z]).zip(resolution) {
            *s = sample(b, r)?;
        }
        Ok(Self {
            bounds: [x, y, z],
            samples,
        })
    }

    /// Builds a 2D region at a fixed Z height
    ///
    /// The Z axis has bounds `[z, z]` and a single sample.
    pub fn slice(
        x: Interval,
        y: Interval,
        z: f32,
        resolution: u8,
    ) -> Result<Self, Error> {
        if !z.is_finite() {
            return Err(Error::BadBounds(z, z));
        }
        Ok(Self {
            bounds: [x, y, Interval::new(z, z)],
            samples: [sample(x, resolution)?, sample(y, resolution)?, vec![z]],
        })
    }

    /// Returns the bounds of each axis
    pub fn bounds(&self) -> [Interval; 3] {
        self.bounds
    }

    /// Sample coordinates along the X axis
    pub fn x(&self) -> &[f32] {
        &self.samples[0]
    }

    /// Sample coordinates along the Y axis
    pub fn y(&self) -> &[f32] {
        &self.samples[1]
    }

    /// Sample coordinates along the Z axis
    pub fn z(&self) -> &[f32] {
        &self.samples[2]
    }

    /// Checks whether this is a 2D region (a single Z sample)
    pub fn is_slice(&self) -> bool {
        self.samples[2].len() == 1
    }

    /// Returns the total number of samples
    pub fn voxels(&self) -> usize {
        self.samples.iter().map(Vec::len).product()
    }

    /// Returns a subregion covering the entire region
    pub fn subregion(&self) -> Subregion<'_> {
        let axis = |i: usize| Axis::new(self.bounds[i], 0, &self.samples[i]);
        Subregion {
            x: axis(0),
            y: axis(1),
            z: axis(2),
        }
    }
}

/// Computes voxel-center samples along one axis
fn sample(bounds: Interval, resolution: u8) -> Result<Vec<f32>, Error> {
    let (lower, upper) = (bounds.lower(), bounds.upper());
    if !(lower.is_finite() && upper.is_finite() && lower < upper) {
        return Err(Error::BadBounds(lower, upper));
    }
    if resolution > Region::MAX_RESOLUTION {
        return Err(Error::BadResolution(resolution, Region::MAX_RESOLUTION));
    }
    let n = 1usize << resolution;
    let step = (upper - lower) / n as f32;
    Ok((0..n).map(|i| lower + (i as f32 + 0.5) * step).collect())
}

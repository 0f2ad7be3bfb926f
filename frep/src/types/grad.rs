use nalgebra::Vector3;

/// Field value at a point, along with its partial derivatives
///
/// Arithmetic on `Grad` applies the chain rule, which is forward-mode
/// automatic differentiation.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Grad {
    /// Value
    pub v: f32,
    /// `d/dx`
    pub dx: f32,
    /// `d/dy`
    pub dy: f32,
    /// `d/dz`
    pub dz: f32,
}

impl Grad {
    /// Builds a value with the given partial derivatives
    pub fn new(v: f32, dx: f32, dy: f32, dz: f32) -> Self {
        Self { v, dx, dy, dz }
    }

    fn with_d(v: f32, d: Vector3<f32>) -> Self {
        Self::new(v, d.x, d.y, d.z)
    }

    /// Returns the partial derivatives as a vector
    pub fn d(&self) -> Vector3<f32> {
        Vector3::new(self.dx, self.dy, self.dz)
    }

    /// Applies the chain rule for a unary function
    ///
    /// `v` is the function's value and `slope` its derivative at `self.v`.
    fn chain(self, v: f32, slope: f32) -> Self {
        Self::with_d(v, self.d() * slope)
    }

    /// Absolute value
    pub fn abs(self) -> Self {
        if self.v < 0.0 { -self } else { self }
    }

    /// Square root
    pub fn sqrt(self) -> Self {
        let v = self.v.sqrt();
        self.chain(v, 0.5 / v)
    }

    /// Sine
    pub fn sin(self) -> Self {
        self.chain(self.v.sin(), self.v.cos())
    }

    /// Cosine
    pub fn cos(self) -> Self {
        self.chain(self.v.cos(), -self.v.sin())
    }

    /// Tangent
    pub fn tan(self) -> Self {
        self.chain(self.v.tan(), self.v.cos().powi(2).recip())
    }

    /// Arcsine
    pub fn asin(self) -> Self {
        let r = (1.0 - self.v * self.v).sqrt();
        self.chain(self.v.asin(), r.recip())
    }

    /// Arccosine
    pub fn acos(self) -> Self {
        let r = (1.0 - self.v * self.v).sqrt();
        self.chain(self.v.acos(), -r.recip())
    }

    /// Arctangent
    pub fn atan(self) -> Self {
        self.chain(self.v.atan(), (self.v * self.v + 1.0).recip())
    }

    /// `e^v`
    pub fn exp(self) -> Self {
        let v = self.v.exp();
        self.chain(v, v)
    }

    /// Natural log
    pub fn ln(self) -> Self {
        self.chain(self.v.ln(), self.v.recip())
    }

    /// `1 / v`
    pub fn recip(self) -> Self {
        self.chain(1.0 / self.v, -(self.v * self.v).recip())
    }

    /// `v * v`
    pub fn square(self) -> Self {
        self.chain(self.v * self.v, 2.0 * self.v)
    }

    /// Minimum, with the derivatives of the argument which supplied it
    ///
    /// If either value is `NaN`, the whole result is `NaN`.
    pub fn min(self, rhs: Self) -> Self {
        if self.v.is_nan() || rhs.v.is_nan() {
            Self::new(f32::NAN, f32::NAN, f32::NAN, f32::NAN)
        } else if self.v < rhs.v {
            self
        } else {
            Self::with_d(self.v.min(rhs.v), rhs.d())
        }
    }

    /// Maximum, with the derivatives of the argument which supplied it
    ///
    /// If either value is `NaN`, the whole result is `NaN`.
    pub fn max(self, rhs: Self) -> Self {
        if self.v.is_nan() || rhs.v.is_nan() {
            Self::new(f32::NAN, f32::NAN, f32::NAN, f32::NAN)
        } else if self.v > rhs.v {
            self
        } else {
            Self::with_d(self.v.max(rhs.v), rhs.d())
        }
    }

    /// Returns the normalized gradient vector, or `None` if it is zero or
    /// not finite
    pub fn normal(&self) -> Option<Vector3<f32>> {
        let g = self.d();
        let n = g.norm();
        if n > 0.0 && n.is_finite() {
            Some(g / n)
        } else {
            None
        }
    }

    /// Checks that every component matches to within `1e-6`
    #[cfg(test)]
    pub(crate) fn compare_eq(&self, other: Self) {
        let err = (self.v - other.v).abs().max((self.d() - other.d()).amax());
        assert!(err < 1e-6, "{self:?} != {other:?}");
    }
}

impl From<f32> for Grad {
    fn from(v: f32) -> Self {
        Self::new(v, 0.0, 0.0, 0.0)
    }
}

impl std::ops::Neg for Grad {
    type Output = Self;
    fn neg(self) -> Self {
        Self::with_d(-self.v, -self.d())
    }
}

impl std::ops::Add for Grad {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::with_d(self.v + rhs.v, self.d() + rhs.d())
    }
}

impl std::ops::Sub for Grad {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::with_d(self.v - rhs.v, self.d() - rhs.d())
    }
}

impl std::ops::Mul for Grad {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        let d = self.d() * rhs.v + rhs.d() * self.v;
        Self::with_d(self.v * rhs.v, d)
    }
}

impl std::ops::Div for Grad {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        // Quotient rule
        let d = (self.d() * rhs.v - rhs.d() * self.v) / (rhs.v * rhs.v);
        Self::with_d(self.v / rhs.v, d)
    }
}

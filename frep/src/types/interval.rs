use crate::eval::Choice;

/// Closed range `[lower, upper]` of `f32` values
///
/// Arithmetic is conservative: the result of an operation contains the
/// result for every value in the inputs, up to floating-point rounding.  The
/// only other valid state is `[NaN, NaN]`, which is produced whenever a
/// result could be `NaN` anywhere in the inputs; an interval which is not
/// `NaN` guarantees that every point within it evaluates to a number.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Interval {
    lower: f32,
    upper: f32,
}

impl From<f32> for Interval {
    fn from(f: f32) -> Self {
        Self { lower: f, upper: f }
    }
}

impl From<[f32; 2]> for Interval {
    fn from([lower, upper]: [f32; 2]) -> Self {
        Self::new(lower, upper)
    }
}

impl Interval {
    const NAN: Self = Self {
        lower: f32::NAN,
        upper: f32::NAN,
    };

    /// Builds an interval from its bounds
    ///
    /// # Panics
    /// If `lower > upper`, or if exactly one bound is `NaN`
    pub fn new(lower: f32, upper: f32) -> Self {
        let valid = lower <= upper || (lower.is_nan() && upper.is_nan());
        assert!(valid, "invalid interval [{lower}, {upper}]");
        Self { lower, upper }
    }

    /// Returns `[-inf, inf]`
    pub const fn unbounded() -> Self {
        Self {
            lower: f32::NEG_INFINITY,
            upper: f32::INFINITY,
        }
    }

    /// Builds an interval from computed bounds, collapsing to `NaN` if
    /// either bound is `NaN`
    fn checked(lower: f32, upper: f32) -> Self {
        if lower.is_nan() || upper.is_nan() {
            Self::NAN
        } else {
            Self::new(lower, upper)
        }
    }

    /// Applies a monotonically increasing function to both bounds
    fn rising(self, f: impl Fn(f32) -> f32) -> Self {
        Self::checked(f(self.lower), f(self.upper))
    }

    /// Lower bound
    #[inline]
    pub fn lower(&self) -> f32 {
        self.lower
    }

    /// Upper bound
    #[inline]
    pub fn upper(&self) -> f32 {
        self.upper
    }

    /// Checks whether `v` is within the bounds
    pub fn contains(&self, v: f32) -> bool {
        self.lower <= v && v <= self.upper
    }

    /// Checks whether either bound is `NaN`
    pub fn has_nan(&self) -> bool {
        self.lower.is_nan() || self.upper.is_nan()
    }

    /// Checks whether both bounds are finite
    pub fn is_finite(&self) -> bool {
        self.lower.is_finite() && self.upper.is_finite()
    }

    /// Checks whether this is exactly `[0, 0]`
    pub fn is_zero(&self) -> bool {
        self.lower == 0.0 && self.upper == 0.0
    }

    /// Checks whether the interval has values of both signs (or zero)
    fn straddles_zero(&self) -> bool {
        self.lower <= 0.0 && self.upper >= 0.0
    }

    /// Checks whether either bound is infinite
    fn has_inf(&self) -> bool {
        self.lower.is_infinite() || self.upper.is_infinite()
    }

    /// Interpolates between the bounds, with `0` at `lower` and `1` at
    /// `upper`
    ///
    /// ```
    /// # use frep::types::Interval;
    /// let i = Interval::new(1.0, 3.0);
    /// assert_eq!(i.lerp(0.25), 1.5);
    /// ```
    pub fn lerp(self, frac: f32) -> f32 {
        self.lower * (1.0 - frac) + self.upper * frac
    }

    ////////////////////////////////////////////////////////////////////////////
    // Unary operations

    /// Absolute value
    pub fn abs(self) -> Self {
        if self.lower >= 0.0 || self.has_nan() {
            self
        } else if self.upper <= 0.0 {
            -self
        } else {
            Self::new(0.0, self.upper.max(-self.lower))
        }
    }

    /// Squares the interval
    ///
    /// This is tighter than `self * self`, which can't tell that both
    /// operands take the same value.
    pub fn square(self) -> Self {
        let a = self.abs();
        a.rising(|v| v * v)
    }

    /// Returns `NaN` if the interval contains values below zero
    pub fn sqrt(self) -> Self {
        if self.lower < 0.0 {
            Self::NAN
        } else {
            self.rising(f32::sqrt)
        }
    }

    /// Returns `[-inf, inf]` if the interval touches zero
    pub fn recip(self) -> Self {
        if self.has_nan() {
            Self::NAN
        } else if self.straddles_zero() {
            Self::unbounded()
        } else {
            Self::new(self.upper.recip(), self.lower.recip())
        }
    }

    /// Returns `[-1, 1]`, or `NaN` if either bound is not finite
    pub fn sin(self) -> Self {
        if self.is_finite() {
            Self::new(-1.0, 1.0)
        } else {
            Self::NAN
        }
    }

    /// Returns `[-1, 1]`, or `NaN` if either bound is not finite
    pub fn cos(self) -> Self {
        self.sin()
    }

    /// Returns `NaN` if the interval contains an asymptote
    pub fn tan(self) -> Self {
        use std::f32::consts::{FRAC_PI_2, PI};
        if !self.is_finite() {
            return Self::NAN;
        }
        // Index of the first asymptote at or above `lower`
        let k = ((self.lower - FRAC_PI_2) / PI).ceil();
        let (lower, upper) = (self.lower.tan(), self.upper.tan());
        if k * PI + FRAC_PI_2 <= self.upper || upper < lower {
            Self::NAN
        } else {
            Self::new(lower, upper)
        }
    }

    /// Returns `NaN` if the interval leaves `[-1, 1]`
    pub fn asin(self) -> Self {
        if self.lower < -1.0 || self.upper > 1.0 {
            Self::NAN
        } else {
            self.rising(f32::asin)
        }
    }

    /// Returns `NaN` if the interval leaves `[-1, 1]`
    pub fn acos(self) -> Self {
        if self.lower < -1.0 || self.upper > 1.0 {
            Self::NAN
        } else {
            Self::checked(self.upper.acos(), self.lower.acos())
        }
    }

    /// Arctangent
    pub fn atan(self) -> Self {
        self.rising(f32::atan)
    }

    /// `e^x`
    pub fn exp(self) -> Self {
        self.rising(f32::exp)
    }

    /// Returns `NaN` unless the interval is strictly positive
    pub fn ln(self) -> Self {
        if self.lower > 0.0 {
            self.rising(f32::ln)
        } else {
            Self::NAN
        }
    }

    ////////////////////////////////////////////////////////////////////////////
    // Choices

    /// Compares two intervals, returning `Left` if `self` is strictly below
    /// `rhs`, `Right` if `rhs` is strictly below `self`, and `Both`
    /// otherwise
    fn order(self, rhs: Self) -> Choice {
        if self.upper < rhs.lower {
            Choice::Left
        } else if rhs.upper < self.lower {
            Choice::Right
        } else {
            Choice::Both
        }
    }

    /// Computes `min(self, rhs)`, along with the operand that decides it
    ///
    /// The choice is [`Choice::Both`] unless one interval is entirely below
    /// the other; `NaN` inputs give a `NaN` result and [`Choice::Both`].
    pub fn min_choice(self, rhs: Self) -> (Self, Choice) {
        if self.has_nan() || rhs.has_nan() {
            return (Self::NAN, Choice::Both);
        }
        let v = Self::new(self.lower.min(rhs.lower), self.upper.min(rhs.upper));
        (v, self.order(rhs))
    }

    /// Computes `max(self, rhs)`, along with the operand that decides it
    ///
    /// This mirrors [`min_choice`](Self::min_choice).
    pub fn max_choice(self, rhs: Self) -> (Self, Choice) {
        if self.has_nan() || rhs.has_nan() {
            return (Self::NAN, Choice::Both);
        }
        let v = Self::new(self.lower.max(rhs.lower), self.upper.max(rhs.upper));
        (v, rhs.order(self))
    }

    /// Computes `self * rhs`, along with the operand that decides it
    ///
    /// An operand which is exactly `[0, 0]` decides the product if the other
    /// operand is finite.
    ///
    /// ```
    /// # use frep::{eval::Choice, types::Interval};
    /// let zero = Interval::from(0.0);
    /// let (v, c) = zero.mul_choice(Interval::new(-3.0, 2.0));
    /// assert_eq!(v, zero);
    /// assert_eq!(c, Choice::Left);
    /// ```
    pub fn mul_choice(self, rhs: Self) -> (Self, Choice) {
        match (self.is_zero(), rhs.is_zero()) {
            (true, _) if rhs.is_finite() => (self, Choice::Left),
            (_, true) if self.is_finite() => (rhs, Choice::Right),
            _ => (self * rhs, Choice::Both),
        }
    }

    /// Checks that two intervals are equal to within `1e-6`
    #[cfg(test)]
    pub(crate) fn compare_eq(&self, other: Self) {
        let d = (self.lower - other.lower)
            .abs()
            .max((self.upper - other.upper).abs());
        assert!(d < 1e-6, "{self:?} != {other:?}");
    }
}

/// Hull of `f` applied to every pair of bounds
fn hull(a: Interval, b: Interval, f: impl Fn(f32, f32) -> f32) -> Interval {
    if a.has_nan() || b.has_nan() {
        return Interval::NAN;
    }
    let vs = [
        f(a.lower, b.lower),
        f(a.lower, b.upper),
        f(a.upper, b.lower),
        f(a.upper, b.upper),
    ];
    let lower = vs.iter().copied().fold(f32::INFINITY, f32::min);
    let upper = vs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    Interval::checked(lower, upper)
}

impl std::ops::Neg for Interval {
    type Output = Self;
    fn neg(self) -> Self {
        Self::checked(-self.upper, -self.lower)
    }
}

/// `inf + -inf` is `NaN`, so opposite infinities can't be added
impl std::ops::Add for Interval {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        let inf = f32::INFINITY;
        if (self.upper == inf && rhs.lower == -inf)
            || (self.lower == -inf && rhs.upper == inf)
        {
            Self::NAN
        } else {
            Self::checked(self.lower + rhs.lower, self.upper + rhs.upper)
        }
    }
}

impl std::ops::Sub for Interval {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        self + -rhs
    }
}

/// `0 * inf` is `NaN`, so zero can't meet an infinite bound
impl std::ops::Mul for Interval {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        if (self.straddles_zero() && rhs.has_inf())
            || (rhs.straddles_zero() && self.has_inf())
        {
            Interval::NAN
        } else {
            hull(self, rhs, |a, b| a * b)
        }
    }
}

/// `0 / 0` and `inf / inf` are `NaN`; any other division by an interval
/// containing zero is unbounded
impl std::ops::Div for Interval {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        if self.has_nan() || rhs.has_nan() {
            Self::NAN
        } else if (self.straddles_zero() && rhs.straddles_zero())
            || (self.has_inf() && rhs.has_inf())
        {
            Self::NAN
        } else if rhs.straddles_zero() {
            Self::unbounded()
        } else {
            hull(self, rhs, |a, b| a / b)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_min_max_choice() {
        let a = Interval::new(0.0, 1.0);
        let (v, c) = a.min_choice([0.5, 1.5].into());
        assert_eq!(v, a);
        assert_eq!(c, Choice::Both);

        let b = Interval::new(2.0, 3.0);
        assert_eq!(a.min_choice(b), (a, Choice::Left));
        assert_eq!(a.max_choice(b), (b, Choice::Right));
        assert_eq!(b.max_choice(a), (b, Choice::Left));

        // Touching intervals are not strictly ordered
        let t = Interval::new(1.0, 2.0);
        assert_eq!(a.min_choice(t).1, Choice::Both);
        assert_eq!(a.max_choice(t).1, Choice::Both);

        let (v, c) = a.min_choice(f32::NAN.into());
        assert!(v.has_nan());
        assert_eq!(c, Choice::Both);
    }

    #[test]
    fn test_mul_choice() {
        let zero = Interval::from(0.0);
        let a = Interval::new(-1.0, 2.0);
        assert_eq!(a.mul_choice(zero), (zero, Choice::Right));
        assert_eq!(zero.mul_choice(a), (zero, Choice::Left));

        let (v, c) = zero.mul_choice(Interval::unbounded());
        assert!(v.has_nan());
        assert_eq!(c, Choice::Both);
        let (v, c) = zero.mul_choice(Interval::NAN);
        assert!(v.has_nan());
        assert_eq!(c, Choice::Both);
        assert_eq!(a.mul_choice(a), ([-2.0, 4.0].into(), Choice::Both));
    }

    #[test]
    fn test_div_by_zero() {
        let a = Interval::new(1.0, 2.0);
        assert_eq!(a / Interval::new(-1.0, 1.0), Interval::unbounded());
        assert_eq!(a / Interval::new(0.0, 1.0), Interval::unbounded());
        assert_eq!(Interval::new(-1.0, 0.0).recip(), Interval::unbounded());
        (a / Interval::new(2.0, 4.0)).compare_eq([0.25, 1.0].into());
        (a / Interval::new(-4.0, -2.0)).compare_eq([-1.0, -0.25].into());
        Interval::new(2.0, 4.0).recip().compare_eq([0.25, 0.5].into());

        let z = Interval::new(-1.0, 1.0);
        assert!((z / z).has_nan());
        assert!((Interval::from(0.0) / Interval::new(0.0, 2.0)).has_nan());
        let p = Interval::new(1.0, f32::INFINITY);
        assert!((p / p).has_nan());
        assert_eq!(p / a, [0.5, f32::INFINITY].into());
    }

    #[test]
    fn test_sqrt() {
        assert_eq!(Interval::new(4.0, 9.0).sqrt(), [2.0, 3.0].into());
        assert_eq!(Interval::new(0.0, 4.0).sqrt(), [0.0, 2.0].into());
        assert!(Interval::new(-2.0, 4.0).sqrt().has_nan());
        assert!(Interval::new(-4.0, -1.0).sqrt().has_nan());
        assert!(Interval::new(-1e-9, 1.0).sqrt().has_nan());
    }

    #[test]
    fn test_unbounded_arithmetic() {
        let u = Interval::unbounded();
        let a = Interval::new(1.0, 2.0);
        assert_eq!(u + a, u);
        assert_eq!(u - a, u);
        assert_eq!(-u, u);
        assert!((u * Interval::from(0.0)).has_nan());
        let p = Interval::from(f32::INFINITY);
        assert!((p - p).has_nan());
        assert!((u + u).has_nan());
        assert!((u - u).has_nan());
        assert_eq!(p + p, p);
        assert_eq!(p - (-p), p);

        let h = Interval::new(1.0, f32::INFINITY);
        assert!((h * Interval::new(-1.0, 1.0)).has_nan());
        assert!((Interval::new(0.0, 1.0) * h).has_nan());
        assert_eq!(h * a, [1.0, f32::INFINITY].into());
    }

    #[test]
    fn test_square_abs() {
        assert_eq!(Interval::new(-3.0, 2.0).square(), [0.0, 9.0].into());
        assert_eq!(Interval::new(-3.0, -2.0).square(), [4.0, 9.0].into());
        assert_eq!(Interval::new(-3.0, 2.0).abs(), [0.0, 3.0].into());
        assert_eq!(Interval::new(-3.0, -2.0).abs(), [2.0, 3.0].into());
        assert!(Interval::from(f32::NAN).square().has_nan());
    }

    #[test]
    fn test_transcendental() {
        assert!(Interval::new(0.0, 2.0).tan().has_nan());
        Interval::new(-0.5, 0.5)
            .tan()
            .compare_eq([-(0.5f32.tan()), 0.5f32.tan()].into());
        assert!(Interval::new(0.0, 1.0).ln().has_nan());
        assert!(Interval::new(0.5, 1.5).asin().has_nan());
        Interval::new(0.0, 1.0)
            .acos()
            .compare_eq([0.0, std::f32::consts::FRAC_PI_2].into());
        assert_eq!(Interval::new(-7.0, 9.0).cos(), [-1.0, 1.0].into());
        assert!(Interval::new(0.0, f32::INFINITY).sin().has_nan());
        assert!(Interval::unbounded().cos().has_nan());
    }
}

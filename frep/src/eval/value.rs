use crate::{
    context::{BinaryOpcode, UnaryOpcode},
    types::{Grad, Interval},
};

/// A type which can be stored in evaluator buffers and computed by clauses
///
/// Implemented for `f32` (point and batch evaluation), [`Interval`] (interval
/// evaluation and pruning), and [`Grad`] (forward-mode derivatives).
pub trait Value: Copy + Send + Sync + From<f32> + 'static {
    /// Applies a unary operation elementwise, writing to `out`
    fn unary(op: UnaryOpcode, a: &[Self], out: &mut [Self]) {
        match op {
            UnaryOpcode::Neg => map1(a, out, Self::neg),
            UnaryOpcode::Abs => map1(a, out, Self::abs),
            UnaryOpcode::Recip => map1(a, out, Self::recip),
            UnaryOpcode::Sqrt => map1(a, out, Self::sqrt),
            UnaryOpcode::Square => map1(a, out, Self::square),
            UnaryOpcode::Sin => map1(a, out, Self::sin),
            UnaryOpcode::Cos => map1(a, out, Self::cos),
            UnaryOpcode::Tan => map1(a, out, Self::tan),
            UnaryOpcode::Asin => map1(a, out, Self::asin),
            UnaryOpcode::Acos => map1(a, out, Self::acos),
            UnaryOpcode::Atan => map1(a, out, Self::atan),
            UnaryOpcode::Exp => map1(a, out, Self::exp),
            UnaryOpcode::Ln => map1(a, out, Self::ln),
        }
    }

    /// Applies a binary operation elementwise, writing to `out`
    fn binary(op: BinaryOpcode, a: &[Self], b: &[Self], out: &mut [Self]) {
        match op {
            BinaryOpcode::Add => map2(a, b, out, Self::add),
            BinaryOpcode::Sub => map2(a, b, out, Self::sub),
            BinaryOpcode::Mul => map2(a, b, out, Self::mul),
            BinaryOpcode::Div => map2(a, b, out, Self::div),
            BinaryOpcode::Min => map2(a, b, out, Self::min),
            BinaryOpcode::Max => map2(a, b, out, Self::max),
        }
    }

    fn neg(self) -> Self;
    fn abs(self) -> Self;
    fn recip(self) -> Self;
    fn sqrt(self) -> Self;
    fn square(self) -> Self;
    fn sin(self) -> Self;
    fn cos(self) -> Self;
    fn tan(self) -> Self;
    fn asin(self) -> Self;
    fn acos(self) -> Self;
    fn atan(self) -> Self;
    fn exp(self) -> Self;
    fn ln(self) -> Self;

    fn add(self, rhs: Self) -> Self;
    fn sub(self, rhs: Self) -> Self;
    fn mul(self, rhs: Self) -> Self;
    fn div(self, rhs: Self) -> Self;
    fn min(self, rhs: Self) -> Self;
    fn max(self, rhs: Self) -> Self;
}

#[inline]
fn map1<T: Copy>(a: &[T], out: &mut [T], f: impl Fn(T) -> T) {
    for (o, a) in out.iter_mut().zip(a) {
        *o = f(*a);
    }
}

#[inline]
fn map2<T: Copy>(a: &[T], b: &[T], out: &mut [T], f: impl Fn(T, T) -> T) {
    for ((o, a), b) in out.iter_mut().zip(a).zip(b) {
        *o = f(*a, *b);
    }
}

impl Value for f32 {
    fn neg(self) -> Self {
        -self
    }
    fn abs(self) -> Self {
        f32::abs(self)
    }
    fn recip(self) -> Self {
        1.0 / self
    }
    fn sqrt(self) -> Self {
        f32::sqrt(self)
    }
    fn square(self) -> Self {
        self * self
    }
    fn sin(self) -> Self {
        f32::sin(self)
    }
    fn cos(self) -> Self {
        f32::cos(self)
    }
    fn tan(self) -> Self {
        f32::tan(self)
    }
    fn asin(self) -> Self {
        f32::asin(self)
    }
    fn acos(self) -> Self {
        f32::acos(self)
    }
    fn atan(self) -> Self {
        f32::atan(self)
    }
    fn exp(self) -> Self {
        f32::exp(self)
    }
    fn ln(self) -> Self {
        f32::ln(self)
    }

    fn add(self, rhs: Self) -> Self {
        self + rhs
    }
    fn sub(self, rhs: Self) -> Self {
        self - rhs
    }
    fn mul(self, rhs: Self) -> Self {
        self * rhs
    }
    fn div(self, rhs: Self) -> Self {
        self / rhs
    }
    fn min(self, rhs: Self) -> Self {
        if self.is_nan() || rhs.is_nan() {
            f32::NAN
        } else {
            f32::min(self, rhs)
        }
    }
    fn max(self, rhs: Self) -> Self {
        if self.is_nan() || rhs.is_nan() {
            f32::NAN
        } else {
            f32::max(self, rhs)
        }
    }
}

impl Value for Interval {
    fn neg(self) -> Self {
        -self
    }
    fn abs(self) -> Self {
        Interval::abs(self)
    }
    fn recip(self) -> Self {
        Interval::recip(self)
    }
    fn sqrt(self) -> Self {
        Interval::sqrt(self)
    }
    fn square(self) -> Self {
        Interval::square(self)
    }
    fn sin(self) -> Self {
        Interval::sin(self)
    }
    fn cos(self) -> Self {
        Interval::cos(self)
    }
    fn tan(self) -> Self {
        Interval::tan(self)
    }
    fn asin(self) -> Self {
        Interval::asin(self)
    }
    fn acos(self) -> Self {
        Interval::acos(self)
    }
    fn atan(self) -> Self {
        Interval::atan(self)
    }
    fn exp(self) -> Self {
        Interval::exp(self)
    }
    fn ln(self) -> Self {
        Interval::ln(self)
    }

    fn add(self, rhs: Self) -> Self {
        self + rhs
    }
    fn sub(self, rhs: Self) -> Self {
        self - rhs
    }
    fn mul(self, rhs: Self) -> Self {
        self * rhs
    }
    fn div(self, rhs: Self) -> Self {
        self / rhs
    }
    fn min(self, rhs: Self) -> Self {
        self.min_choice(rhs).0
    }
    fn max(self, rhs: Self) -> Self {
        self.max_choice(rhs).0
    }
}

impl Value for Grad {
    fn neg(self) -> Self {
        -self
    }
    fn abs(self) -> Self {
        Grad::abs(self)
    }
    fn recip(self) -> Self {
        Grad::recip(self)
    }
    fn sqrt(self) -> Self {
        Grad::sqrt(self)
    }
    fn square(self) -> Self {
        Grad::square(self)
    }
    fn sin(self) -> Self {
        Grad::sin(self)
    }
    fn cos(self) -> Self {
        Grad::cos(self)
    }
    fn tan(self) -> Self {
        Grad::tan(self)
    }
    fn asin(self) -> Self {
        Grad::asin(self)
    }
    fn acos(self) -> Self {
        Grad::acos(self)
    }
    fn atan(self) -> Self {
        Grad::atan(self)
    }
    fn exp(self) -> Self {
        Grad::exp(self)
    }
    fn ln(self) -> Self {
        Grad::ln(self)
    }

    fn add(self, rhs: Self) -> Self {
        self + rhs
    }
    fn sub(self, rhs: Self) -> Self {
        self - rhs
    }
    fn mul(self, rhs: Self) -> Self {
        self * rhs
    }
    fn div(self, rhs: Self) -> Self {
        self / rhs
    }
    fn min(self, rhs: Self) -> Self {
        Grad::min(self, rhs)
    }
    fn max(self, rhs: Self) -> Self {
        Grad::max(self, rhs)
    }
}

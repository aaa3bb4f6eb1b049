//! Fixed-dimension floating-point vectors.
//!
//! Positions, velocities and accelerations are all `Vector<D>` with `D = 2`
//! or `D = 3`. Every operation returns a new value; operands are never mutated
//! except through the explicit `*Assign` operators.

use std::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, Neg, Sub, SubAssign};

/// Index of the x component.
pub const X: usize = 0;
/// Index of the y component.
pub const Y: usize = 1;
/// Index of the z component (3D only).
pub const Z: usize = 2;

/// A `D`-dimensional vector of `f64` components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector<const D: usize>(pub [f64; D]);

/// Planar vector.
pub type Vec2 = Vector<2>;

/// Spatial vector.
pub type Vec3 = Vector<3>;

/// Construct a 2D vector.
pub const fn vec2(x: f64, y: f64) -> Vec2 {
    Vector([x, y])
}

/// Construct a 3D vector.
pub const fn vec3(x: f64, y: f64, z: f64) -> Vec3 {
    Vector([x, y, z])
}

impl<const D: usize> Default for Vector<D> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const D: usize> From<[f64; D]> for Vector<D> {
    fn from(components: [f64; D]) -> Self {
        Self(components)
    }
}

impl<const D: usize> Vector<D> {
    /// Create a vector from its components.
    pub const fn new(components: [f64; D]) -> Self {
        Self(components)
    }

    /// The zero vector.
    pub const fn zero() -> Self {
        Self([0.0; D])
    }

    /// Component array.
    pub const fn as_array(&self) -> &[f64; D] {
        &self.0
    }

    fn map2(self, other: Self, f: impl Fn(f64, f64) -> f64) -> Self {
        Self(std::array::from_fn(|i| f(self.0[i], other.0[i])))
    }

    /// Multiply-add: `self + s * b`.
    #[inline]
    pub fn madd(self, s: f64, b: Self) -> Self {
        self.map2(b, |x, y| x + s * y)
    }

    /// Dot product.
    #[inline]
    pub fn dot(self, b: Self) -> f64 {
        self.0.iter().zip(b.0.iter()).map(|(x, y)| x * y).sum()
    }

    /// Component-wise product.
    #[inline]
    pub fn mul_elem(self, b: Self) -> Self {
        self.map2(b, |x, y| x * y)
    }

    /// Squared magnitude.
    #[inline]
    pub fn norm_squared(self) -> f64 {
        self.dot(self)
    }

    /// Magnitude (Euclidean length).
    #[inline]
    pub fn norm(self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// Copy of `self` scaled to unit length.
    ///
    /// # Precondition
    /// `self` must not be the zero vector. A zero vector yields NaN
    /// components; it is never silently mapped to zero. Use
    /// [`Vector::try_normalized`] when the input may be degenerate.
    #[inline]
    pub fn normalized(self) -> Self {
        let inv = 1.0 / self.norm();
        self * inv
    }

    /// Unit vector in the direction of `self`, or `None` when the length is
    /// zero or not finite.
    pub fn try_normalized(self) -> Option<Self> {
        let len = self.norm();
        if len == 0.0 || !len.is_finite() {
            return None;
        }
        Some(self / len)
    }

    /// True when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|c| c.is_finite())
    }
}

impl<const D: usize> Add for Vector<D> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        self.map2(rhs, |x, y| x + y)
    }
}

impl<const D: usize> Sub for Vector<D> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self.map2(rhs, |x, y| x - y)
    }
}

impl<const D: usize> Neg for Vector<D> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self(self.0.map(|c| -c))
    }
}

impl<const D: usize> Mul<f64> for Vector<D> {
    type Output = Self;

    #[inline]
    fn mul(self, s: f64) -> Self {
        Self(self.0.map(|c| s * c))
    }
}

impl<const D: usize> Mul<Vector<D>> for f64 {
    type Output = Vector<D>;

    #[inline]
    fn mul(self, v: Vector<D>) -> Vector<D> {
        v * self
    }
}

impl<const D: usize> Div<f64> for Vector<D> {
    type Output = Self;

    #[inline]
    fn div(self, s: f64) -> Self {
        self * (1.0 / s)
    }
}

impl<const D: usize> AddAssign for Vector<D> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<const D: usize> SubAssign for Vector<D> {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<const D: usize> Index<usize> for Vector<D> {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.0[i]
    }
}

impl<const D: usize> IndexMut<usize> for Vector<D> {
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        &mut self.0[i]
    }
}

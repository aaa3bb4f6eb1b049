//! Acceleration fields.
//!
//! The integrator only needs `a(p, t)`. Any closure of the form
//! `Fn(Vector<D>, f64) -> Vector<D>` is a field; the types here cover the
//! common gravitational cases.

use crate::vector::Vector;

/// Acceleration [m/s²] as a function of position and time: d²p/dt² = a(p, t)
///
/// Implementations must be pure. The adaptive stepper evaluates the field
/// twice per step and assumes repeated calls with the same arguments agree.
pub trait AccelerationField<const D: usize> {
    /// Evaluate the acceleration at `position` and `time`
    fn acceleration(&self, position: Vector<D>, time: f64) -> Vector<D>;
}

impl<F, const D: usize> AccelerationField<D> for F
where
    F: Fn(Vector<D>, f64) -> Vector<D>,
{
    #[inline]
    fn acceleration(&self, position: Vector<D>, time: f64) -> Vector<D> {
        self(position, time)
    }
}

/// Newtonian gravity of a point mass with gravitational parameter `mu` (G·M).
///
/// Singular at `center`: positions must never coincide with it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMass<const D: usize> {
    /// Gravitational parameter [m³/s²]
    pub mu: f64,
    /// Location of the attracting mass
    pub center: Vector<D>,
}

impl<const D: usize> PointMass<D> {
    /// Point mass at `center`.
    pub fn new(mu: f64, center: Vector<D>) -> Self {
        Self { mu, center }
    }

    /// Point mass located at the origin.
    pub fn at_origin(mu: f64) -> Self {
        Self::new(mu, Vector::zero())
    }
}

impl<const D: usize> AccelerationField<D> for PointMass<D> {
    #[inline]
    fn acceleration(&self, position: Vector<D>, _time: f64) -> Vector<D> {
        let r = position - self.center;
        let len2 = r.norm_squared();
        let len3 = len2 * len2.sqrt();
        r * (-self.mu / len3)
    }
}

/// Sum of several independent fields.
pub struct Superposition<const D: usize> {
    fields: Vec<Box<dyn AccelerationField<D> + Send + Sync>>,
}

impl<const D: usize> Default for Superposition<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const D: usize> Superposition<D> {
    /// Empty superposition (zero field).
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Add a field to the sum.
    pub fn with<F>(mut self, field: F) -> Self
    where
        F: AccelerationField<D> + Send + Sync + 'static,
    {
        self.fields.push(Box::new(field));
        self
    }

    /// Number of summed fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when no field has been added.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<const D: usize> AccelerationField<D> for Superposition<D> {
    fn acceleration(&self, position: Vector<D>, time: f64) -> Vector<D> {
        self.fields
            .iter()
            .fold(Vector::zero(), |acc, f| acc + f.acceleration(position, time))
    }
}

/// Speed of a circular orbit of radius `sma` around a body with
/// gravitational parameter `mu`.
pub fn orbital_velocity(mu: f64, sma: f64) -> f64 {
    (mu / sma).sqrt()
}

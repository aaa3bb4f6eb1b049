//! Single-step advance policies for d²p/dt² = a(p, t).
//!
//! Three interchangeable steppers share one signature:
//!
//! ```text
//! step(p, v, a, t, dt, control) -> (p', v', dt_next)
//! ```
//!
//! - [`SymplecticEuler`]: first order, one field evaluation, `dt_next = dt`.
//! - [`VelocityVerlet`]: second order, two field evaluations, `dt_next = dt`.
//! - [`AdaptiveVerlet`]: the Verlet update plus a curvature-driven step-size
//!   suggestion. `control` is the target deflection per step (dtheta).
//!
//! Steppers never fail. A field that returns NaN or Inf produces a
//! non-finite state, which the driver reports as an error.

use crate::error::IntegrationError;
use crate::field::AccelerationField;
use crate::vector::Vector;

/// Outcome of a single step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult<const D: usize> {
    /// Position after the step
    pub position: Vector<D>,
    /// Velocity after the step
    pub velocity: Vector<D>,
    /// Suggested step size for the next step
    pub dt_next: f64,
    /// Curvature measure `da` of the step (adaptive stepper only, otherwise 0)
    pub curvature: f64,
}

/// Step-size controller for the adaptive stepper
///
/// dt_next = dt * clamp(control / da, min_factor, max_factor)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StepController {
    /// Largest shrink per step
    pub min_factor: f64,
    /// Largest growth per step
    pub max_factor: f64,
}

impl Default for StepController {
    fn default() -> Self {
        Self {
            min_factor: 0.5,
            max_factor: 2.0,
        }
    }
}

impl StepController {
    /// Check that the factors are finite, positive and ordered.
    pub fn validate(&self) -> Result<(), IntegrationError> {
        let finite = self.min_factor.is_finite() && self.max_factor.is_finite();
        if !finite || self.min_factor <= 0.0 || self.min_factor > self.max_factor {
            return Err(IntegrationError::invalid(format!(
                "step factors must satisfy 0 < min_factor <= max_factor, got [{}, {}]",
                self.min_factor, self.max_factor
            )));
        }
        Ok(())
    }

    /// Compute the step size adjustment factor.
    ///
    /// A curvature of exactly zero grows by `max_factor`; the ratio is
    /// always clamped before use so it can never be infinite. A NaN
    /// curvature yields NaN.
    pub fn compute_factor(&self, control: f64, curvature: f64) -> f64 {
        if curvature == 0.0 {
            return self.max_factor;
        }
        if curvature.is_nan() {
            return f64::NAN;
        }
        // f64::clamp panics on inverted bounds
        (control / curvature).max(self.min_factor).min(self.max_factor)
    }
}

/// Relative change of acceleration across a step:
/// `|a1 − a2| / (0.5·|a1 + a2|)`.
///
/// Zero when the acceleration did not change at all, including inside a
/// zero-field region where the ratio would otherwise be 0/0.
pub fn curvature<const D: usize>(a1: Vector<D>, a2: Vector<D>) -> f64 {
    let diff = (a1 - a2).norm();
    if diff == 0.0 {
        return 0.0;
    }
    diff / (0.5 * (a1 + a2).norm())
}

/// One-step integration method.
pub trait Stepper {
    /// Advance `(position, velocity)` from `t` by `dt`.
    fn step<F, const D: usize>(
        &self,
        position: Vector<D>,
        velocity: Vector<D>,
        field: &F,
        t: f64,
        dt: f64,
        control: f64,
    ) -> StepResult<D>
    where
        F: AccelerationField<D> + ?Sized;

    /// Field evaluations per step.
    fn evaluations(&self) -> u64;

    /// Order of accuracy of the global error.
    fn order(&self) -> u32;

    /// Human-readable name.
    fn name(&self) -> &'static str;
}

/// Symplectic (semi-implicit) Euler: velocity first, then position.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymplecticEuler;

impl Stepper for SymplecticEuler {
    fn step<F, const D: usize>(
        &self,
        position: Vector<D>,
        velocity: Vector<D>,
        field: &F,
        t: f64,
        dt: f64,
        _control: f64,
    ) -> StepResult<D>
    where
        F: AccelerationField<D> + ?Sized,
    {
        let velocity = velocity.madd(dt, field.acceleration(position, t));
        let position = position.madd(dt, velocity);
        StepResult {
            position,
            velocity,
            dt_next: dt,
            curvature: 0.0,
        }
    }

    fn evaluations(&self) -> u64 {
        1
    }

    fn order(&self) -> u32 {
        1
    }

    fn name(&self) -> &'static str {
        "Symplectic Euler"
    }
}

/// Fixed-step velocity Verlet.
#[derive(Debug, Clone, Copy, Default)]
pub struct VelocityVerlet;

impl Stepper for VelocityVerlet {
    fn step<F, const D: usize>(
        &self,
        position: Vector<D>,
        velocity: Vector<D>,
        field: &F,
        t: f64,
        dt: f64,
        _control: f64,
    ) -> StepResult<D>
    where
        F: AccelerationField<D> + ?Sized,
    {
        let (position, velocity, _, _) = verlet_update(position, velocity, field, t, dt);
        StepResult {
            position,
            velocity,
            dt_next: dt,
            curvature: 0.0,
        }
    }

    fn evaluations(&self) -> u64 {
        2
    }

    fn order(&self) -> u32 {
        2
    }

    fn name(&self) -> &'static str {
        "Velocity Verlet"
    }
}

/// Velocity Verlet with curvature-controlled step size.
///
/// `control` is the largest acceptable per-step deflection of the
/// acceleration (dtheta), not a time. For a circular orbit the measured
/// curvature equals the angle swept per step, so the step settles where
/// each step turns by about `control` radians.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdaptiveVerlet {
    /// Step-size controller
    pub controller: StepController,
}

impl AdaptiveVerlet {
    /// Adaptive stepper with a custom controller.
    pub fn with_controller(controller: StepController) -> Self {
        Self { controller }
    }
}

impl Stepper for AdaptiveVerlet {
    fn step<F, const D: usize>(
        &self,
        position: Vector<D>,
        velocity: Vector<D>,
        field: &F,
        t: f64,
        dt: f64,
        control: f64,
    ) -> StepResult<D>
    where
        F: AccelerationField<D> + ?Sized,
    {
        let (position, velocity, a1, a2) = verlet_update(position, velocity, field, t, dt);
        let da = curvature(a1, a2);
        StepResult {
            position,
            velocity,
            dt_next: dt * self.controller.compute_factor(control, da),
            curvature: da,
        }
    }

    fn evaluations(&self) -> u64 {
        2
    }

    fn order(&self) -> u32 {
        2
    }

    fn name(&self) -> &'static str {
        "Adaptive Velocity Verlet"
    }
}

/// The two-evaluation Verlet update shared by the fixed and adaptive steppers.
/// Returns the new state and both accelerations.
#[inline]
fn verlet_update<F, const D: usize>(
    p: Vector<D>,
    v: Vector<D>,
    field: &F,
    t: f64,
    dt: f64,
) -> (Vector<D>, Vector<D>, Vector<D>, Vector<D>)
where
    F: AccelerationField<D> + ?Sized,
{
    let dt2_2 = dt * dt / 2.0;
    let dt_2 = dt / 2.0;

    let a1 = field.acceleration(p, t);
    let p = p.madd(dt, v).madd(dt2_2, a1);
    let a2 = field.acceleration(p, t);
    let v = v.madd(dt_2, a1 + a2);

    (p, v, a1, a2)
}

/// Stepper selected at runtime.
#[derive(Debug, Clone, Copy)]
pub enum Method {
    /// [`SymplecticEuler`]
    SymplecticEuler,
    /// [`VelocityVerlet`]
    Verlet,
    /// [`AdaptiveVerlet`]
    AdaptiveVerlet(StepController),
}

impl Default for Method {
    fn default() -> Self {
        Self::AdaptiveVerlet(StepController::default())
    }
}

impl Stepper for Method {
    fn step<F, const D: usize>(
        &self,
        position: Vector<D>,
        velocity: Vector<D>,
        field: &F,
        t: f64,
        dt: f64,
        control: f64,
    ) -> StepResult<D>
    where
        F: AccelerationField<D> + ?Sized,
    {
        match self {
            Method::SymplecticEuler => {
                SymplecticEuler.step(position, velocity, field, t, dt, control)
            }
            Method::Verlet => VelocityVerlet.step(position, velocity, field, t, dt, control),
            Method::AdaptiveVerlet(controller) => AdaptiveVerlet::with_controller(*controller)
                .step(position, velocity, field, t, dt, control),
        }
    }

    fn evaluations(&self) -> u64 {
        match self {
            Method::SymplecticEuler => SymplecticEuler.evaluations(),
            Method::Verlet => VelocityVerlet.evaluations(),
            Method::AdaptiveVerlet(_) => AdaptiveVerlet::default().evaluations(),
        }
    }

    fn order(&self) -> u32 {
        match self {
            Method::SymplecticEuler => SymplecticEuler.order(),
            Method::Verlet | Method::AdaptiveVerlet(_) => 2,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Method::SymplecticEuler => SymplecticEuler.name(),
            Method::Verlet => VelocityVerlet.name(),
            Method::AdaptiveVerlet(_) => AdaptiveVerlet::default().name(),
        }
    }
}

/// Symplectic Euler step. Used as a low-accuracy reference.
///
/// <https://en.wikipedia.org/wiki/Semi-implicit_Euler_method>
pub fn sym_euler<F, const D: usize>(
    p: Vector<D>,
    v: Vector<D>,
    field: &F,
    t: f64,
    dt: f64,
    control: f64,
) -> StepResult<D>
where
    F: AccelerationField<D> + ?Sized,
{
    SymplecticEuler.step(p, v, field, t, dt, control)
}

/// Fixed-step velocity Verlet step.
///
/// <https://en.wikipedia.org/wiki/Verlet_integration>
pub fn verlet<F, const D: usize>(
    p: Vector<D>,
    v: Vector<D>,
    field: &F,
    t: f64,
    dt: f64,
    control: f64,
) -> StepResult<D>
where
    F: AccelerationField<D> + ?Sized,
{
    VelocityVerlet.step(p, v, field, t, dt, control)
}

/// Adaptive velocity Verlet step with the default controller.
pub fn a_verlet<F, const D: usize>(
    p: Vector<D>,
    v: Vector<D>,
    field: &F,
    t: f64,
    dt: f64,
    dtheta: f64,
) -> StepResult<D>
where
    F: AccelerationField<D> + ?Sized,
{
    AdaptiveVerlet::default().step(p, v, field, t, dt, dtheta)
}

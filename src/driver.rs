//! Driver loop: chain stepper calls from `t0` to `tmax`.
//!
//! Full steps are taken while they stay strictly short of `tmax`; a final
//! partial step then lands exactly on `tmax`. Time advances by the step size
//! that was in effect when the stepper was invoked, never by its suggestion.

use tracing::{trace, warn};

use crate::error::IntegrationError;
use crate::field::AccelerationField;
use crate::stepper::Stepper;
use crate::vector::Vector;

/// Integration statistics for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Total number of field evaluations
    pub fn_evals: u64,
    /// Number of stepper invocations, landing steps included
    pub steps: u64,
}

impl Stats {
    /// Add the counts of another run.
    pub fn accumulate(&mut self, other: &Stats) {
        self.fn_evals += other.fn_evals;
        self.steps += other.steps;
    }
}

/// Bounds applied by the driver to the stepper's suggestions
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Limits {
    /// Smallest step size a suggestion is raised to
    pub dt_min: f64,
    /// Largest step size a suggestion is lowered to
    pub dt_max: f64,
    /// Maximum number of full steps per call
    pub max_steps: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            dt_min: 0.0,
            dt_max: f64::INFINITY,
            max_steps: 10_000_000,
        }
    }
}

impl Limits {
    /// Set minimum and maximum step sizes
    pub fn with_step_limits(mut self, dt_min: f64, dt_max: f64) -> Self {
        self.dt_min = dt_min;
        self.dt_max = dt_max;
        self
    }

    /// Set the step budget
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps;
        self
    }

    fn validate(&self) -> Result<(), IntegrationError> {
        if !self.dt_min.is_finite() || self.dt_min < 0.0 {
            return Err(IntegrationError::invalid(
                "dt_min must be non-negative and finite",
            ));
        }
        if self.dt_max.is_nan() || self.dt_max <= 0.0 || self.dt_max < self.dt_min {
            return Err(IntegrationError::invalid(
                "dt_max must be positive and not below dt_min",
            ));
        }
        Ok(())
    }
}

/// Final state of a driver run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Integrated<const D: usize> {
    /// Position at `time`
    pub position: Vector<D>,
    /// Velocity at `time`
    pub velocity: Vector<D>,
    /// Final time; always equal to the requested `tmax`
    pub time: f64,
    /// Step size to resume with: the suggestion of the last full step,
    /// or the initial step when no full step fit before `tmax`
    pub dt_next: f64,
    /// Work done by this run
    pub stats: Stats,
}

/// Integrate d²p/dt² = a(p, t) from `t0` to `tmax` with default [`Limits`].
///
/// # Arguments
/// * `stepper` - The single-step method
/// * `p0`, `v0` - Initial position and velocity
/// * `field` - The acceleration field
/// * `t0` - Initial time
/// * `tmax` - Final time
/// * `dt0` - Initial step size
/// * `control` - Error-control parameter passed to every step (dtheta)
///
/// # Returns
/// * `Ok(Integrated)` with `time == tmax`
/// * `Err(IntegrationError)` on invalid input or a non-finite state
#[allow(clippy::too_many_arguments)]
pub fn integrate<S, F, const D: usize>(
    stepper: &S,
    p0: Vector<D>,
    v0: Vector<D>,
    field: &F,
    t0: f64,
    tmax: f64,
    dt0: f64,
    control: f64,
) -> Result<Integrated<D>, IntegrationError>
where
    S: Stepper,
    F: AccelerationField<D> + ?Sized,
{
    integrate_with_limits(
        &Limits::default(),
        stepper,
        p0,
        v0,
        field,
        t0,
        tmax,
        dt0,
        control,
    )
}

/// Integrate from `t0` to `tmax`, clamping suggested step sizes to `limits`.
#[allow(clippy::too_many_arguments)]
pub fn integrate_with_limits<S, F, const D: usize>(
    limits: &Limits,
    stepper: &S,
    p0: Vector<D>,
    v0: Vector<D>,
    field: &F,
    t0: f64,
    tmax: f64,
    dt0: f64,
    control: f64,
) -> Result<Integrated<D>, IntegrationError>
where
    S: Stepper,
    F: AccelerationField<D> + ?Sized,
{
    validate_inputs(&p0, &v0, t0, tmax, dt0, control)?;
    limits.validate()?;

    let mut stats = Stats::default();
    if t0 == tmax {
        return Ok(Integrated {
            position: p0,
            velocity: v0,
            time: t0,
            dt_next: dt0,
            stats,
        });
    }

    let mut t = t0;
    let mut dt = dt0;
    let mut p = p0;
    let mut v = v0;

    while t + dt < tmax {
        let result = stepper.step(p, v, field, t, dt, control);
        stats.steps += 1;
        stats.fn_evals += stepper.evaluations();

        if !result.position.is_finite() || !result.velocity.is_finite() {
            warn!(t, dt, stepper = stepper.name(), "non-finite state");
            return Err(IntegrationError::NonFiniteState { t });
        }
        p = result.position;
        v = result.velocity;
        t += dt;
        dt = result.dt_next.clamp(limits.dt_min, limits.dt_max);

        // A step that no longer moves t would spin forever.
        if dt.is_nan() || dt <= 0.0 || t + dt == t {
            return Err(IntegrationError::StepSizeTooSmall { t, dt });
        }
        if stats.steps > limits.max_steps {
            return Err(IntegrationError::MaxStepsExceeded {
                max_steps: limits.max_steps,
            });
        }
    }

    // Shorter final step to reach exactly tmax. Its suggestion is dropped so
    // that resuming is not biased by the artificially short landing step.
    let dt_next = dt;
    let remaining = tmax - t;
    if remaining > 0.0 {
        trace!(t, remaining, dt_next, "landing step");
        let result = stepper.step(p, v, field, t, remaining, control);
        stats.steps += 1;
        stats.fn_evals += stepper.evaluations();

        if !result.position.is_finite() || !result.velocity.is_finite() {
            warn!(t, dt = remaining, stepper = stepper.name(), "non-finite state");
            return Err(IntegrationError::NonFiniteState { t });
        }
        p = result.position;
        v = result.velocity;
    }

    Ok(Integrated {
        position: p,
        velocity: v,
        time: tmax,
        dt_next,
        stats,
    })
}

/// Validate integration inputs
fn validate_inputs<const D: usize>(
    p0: &Vector<D>,
    v0: &Vector<D>,
    t0: f64,
    tmax: f64,
    dt0: f64,
    control: f64,
) -> Result<(), IntegrationError> {
    if !t0.is_finite() || !tmax.is_finite() || !dt0.is_finite() {
        return Err(IntegrationError::invalid("t0, tmax and dt0 must be finite"));
    }
    if dt0 <= 0.0 {
        return Err(IntegrationError::invalid("dt0 must be positive"));
    }
    if tmax < t0 {
        return Err(IntegrationError::invalid(format!(
            "tmax ({tmax}) must not precede t0 ({t0})"
        )));
    }
    if !control.is_finite() || control < 0.0 {
        return Err(IntegrationError::invalid(
            "control must be non-negative and finite",
        ));
    }
    if !p0.is_finite() {
        return Err(IntegrationError::invalid("p0 is not finite"));
    }
    if !v0.is_finite() {
        return Err(IntegrationError::invalid("v0 is not finite"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::PointMass;
    use crate::stepper::{AdaptiveVerlet, SymplecticEuler, VelocityVerlet};
    use crate::vector::{vec2, Vec2};
    use std::cell::RefCell;

    #[test]
    fn test_lands_exactly_on_tmax() {
        let field = PointMass::at_origin(1.0);
        let cases = [
            (0.0, 1.0, 0.3),
            (0.0, 1.0, 0.1),
            (0.1, 0.7, 0.01),
            (2.5, 2.5 + std::f64::consts::PI, 1e-3),
            (1e3, 1e3 + 1.0 / 3.0, 0.07),
        ];

        for (t0, tmax, dt0) in cases {
            let r = integrate(
                &VelocityVerlet,
                vec2(0.0, 1.0),
                vec2(1.0, 0.0),
                &field,
                t0,
                tmax,
                dt0,
                0.0,
            )
            .unwrap();
            assert_eq!(r.time, tmax, "t0={t0} tmax={tmax} dt0={dt0}");
            assert_eq!(r.dt_next, dt0);
        }
    }

    #[test]
    fn test_time_is_monotonic_and_bounded() {
        let times = RefCell::new(Vec::new());
        let field = |p: Vec2, t: f64| {
            times.borrow_mut().push(t);
            p * (-1.0 / (p.norm_squared() * p.norm()))
        };

        let tmax = 2.0;
        integrate(
            &AdaptiveVerlet::default(),
            vec2(0.0, 1.0),
            vec2(1.0, 0.0),
            &field,
            0.0,
            tmax,
            1e-4,
            1e-2,
        )
        .unwrap();

        let times = times.into_inner();
        assert!(times.len() > 2);
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
        assert!(times.iter().all(|&t| (0.0..tmax).contains(&t)));
    }

    #[test]
    fn test_oversized_first_step_is_single_step() {
        let field = PointMass::at_origin(1.0);
        let p0 = vec2(0.0, 1.0);
        let v0 = vec2(1.0, 0.0);

        let r = integrate(&VelocityVerlet, p0, v0, &field, 0.0, 0.5, 10.0, 0.0).unwrap();
        let direct = crate::stepper::verlet(p0, v0, &field, 0.0, 0.5, 0.0);

        assert_eq!(r.position, direct.position);
        assert_eq!(r.velocity, direct.velocity);
        assert_eq!(r.stats.steps, 1);
        assert_eq!(r.stats.fn_evals, 2);
        // No full step was taken, the initial guess is handed back.
        assert_eq!(r.dt_next, 10.0);
    }

    #[test]
    fn test_dt_next_excludes_landing_step() {
        // A uniform field always doubles the step: 0.1, 0.2, 0.4 fit before
        // t = 1.0, the landing step covers the remaining 0.3.
        let uniform = |_p: Vec2, _t: f64| vec2(0.0, -1.0);
        let r = integrate(
            &AdaptiveVerlet::default(),
            vec2(0.0, 0.0),
            vec2(1.0, 0.0),
            &uniform,
            0.0,
            1.0,
            0.1,
            1e-3,
        )
        .unwrap();
        assert_eq!(r.stats.steps, 4);
        assert!((r.dt_next - 0.8).abs() < 1e-12, "dt_next = {}", r.dt_next);
        // Constant acceleration is integrated exactly by Verlet.
        assert!((r.position[0] - 1.0).abs() < 1e-12);
        assert!((r.position[1] + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_duration() {
        let field = PointMass::at_origin(1.0);
        let r = integrate(
            &SymplecticEuler,
            vec2(0.0, 1.0),
            vec2(1.0, 0.0),
            &field,
            3.0,
            3.0,
            0.1,
            0.0,
        )
        .unwrap();
        assert_eq!(r.position, vec2(0.0, 1.0));
        assert_eq!(r.time, 3.0);
        assert_eq!(r.stats, Stats::default());
    }

    #[test]
    fn test_invalid_inputs() {
        let field = PointMass::at_origin(1.0);
        let p0 = vec2(0.0, 1.0);
        let v0 = vec2(1.0, 0.0);
        let stepper = VelocityVerlet;

        let bad = [
            integrate(&stepper, p0, v0, &field, 0.0, 1.0, 0.0, 0.0),
            integrate(&stepper, p0, v0, &field, 0.0, 1.0, -0.1, 0.0),
            integrate(&stepper, p0, v0, &field, 1.0, 0.0, 0.1, 0.0),
            integrate(&stepper, p0, v0, &field, 0.0, f64::NAN, 0.1, 0.0),
            integrate(&stepper, p0, v0, &field, 0.0, 1.0, 0.1, -1.0),
            integrate(&stepper, p0, v0, &field, 0.0, 1.0, 0.1, f64::INFINITY),
            integrate(&stepper, vec2(f64::NAN, 0.0), v0, &field, 0.0, 1.0, 0.1, 0.0),
            integrate(&stepper, p0, vec2(0.0, f64::INFINITY), &field, 0.0, 1.0, 0.1, 0.0),
        ];
        for (i, r) in bad.into_iter().enumerate() {
            assert!(
                matches!(r, Err(IntegrationError::InvalidInput { .. })),
                "case {i}: {r:?}"
            );
        }

        let limits = Limits::default().with_step_limits(1.0, 0.5);
        let r = integrate_with_limits(&limits, &stepper, p0, v0, &field, 0.0, 1.0, 0.1, 0.0);
        assert!(matches!(r, Err(IntegrationError::InvalidInput { .. })));
    }

    #[test]
    fn test_non_finite_state_detected() {
        // Starting on the force center.
        let field = PointMass::at_origin(1.0);
        let r = integrate(
            &VelocityVerlet,
            vec2(0.0, 0.0),
            vec2(1.0, 0.0),
            &field,
            0.0,
            1.0,
            0.1,
            0.0,
        );
        assert_eq!(r, Err(IntegrationError::NonFiniteState { t: 0.0 }));
    }

    #[test]
    fn test_zero_control_underflows() {
        // control = 0 halves the step every time until it stops moving t.
        let field = PointMass::at_origin(1.0);
        let r = integrate(
            &AdaptiveVerlet::default(),
            vec2(0.0, 1.0),
            vec2(1.0, 0.0),
            &field,
            0.0,
            1.0,
            1e-3,
            0.0,
        );
        assert!(
            matches!(r, Err(IntegrationError::StepSizeTooSmall { .. })),
            "{r:?}"
        );
    }

    #[test]
    fn test_max_steps() {
        let field = PointMass::at_origin(1.0);
        let limits = Limits::default().with_max_steps(10);
        let r = integrate_with_limits(
            &limits,
            &VelocityVerlet,
            vec2(0.0, 1.0),
            vec2(1.0, 0.0),
            &field,
            0.0,
            1.0,
            1e-3,
            0.0,
        );
        assert_eq!(r, Err(IntegrationError::MaxStepsExceeded { max_steps: 10 }));
    }

    #[test]
    fn test_max_steps_exactly_met() {
        // 8 full steps of 0.125 reach t = 1.0, the landing step covers 0.1
        let field = PointMass::at_origin(1.0);
        let run = |max_steps| {
            integrate_with_limits(
                &Limits::default().with_max_steps(max_steps),
                &VelocityVerlet,
                vec2(0.0, 1.0),
                vec2(1.0, 0.0),
                &field,
                0.0,
                1.1,
                0.125,
                0.0,
            )
        };

        let r = run(8).unwrap();
        assert_eq!(r.stats.steps, 9);
        assert_eq!(r.time, 1.1);
        assert_eq!(run(7), Err(IntegrationError::MaxStepsExceeded { max_steps: 7 }));
    }

    #[test]
    fn test_step_limits_clamp_suggestion() {
        let uniform = |_p: Vec2, _t: f64| vec2(0.0, -1.0);
        let limits = Limits::default().with_step_limits(0.0, 0.25);
        let r = integrate_with_limits(
            &limits,
            &AdaptiveVerlet::default(),
            vec2(0.0, 0.0),
            vec2(1.0, 0.0),
            &uniform,
            0.0,
            10.0,
            0.1,
            1e-3,
        )
        .unwrap();
        assert_eq!(r.dt_next, 0.25);
        assert_eq!(r.time, 10.0);
    }
}

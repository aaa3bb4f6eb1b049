//! Stateful integrator session.
//!
//! An [`Integrator`] owns one trajectory and advances it in place. Each
//! [`Integrator::advance`] runs the driver with the adaptive Verlet stepper
//! and carries the step size over to the next call.

use tracing::debug;

use crate::driver::{integrate_with_limits, Limits, Stats};
use crate::error::IntegrationError;
use crate::field::AccelerationField;
use crate::stepper::{AdaptiveVerlet, StepController};
use crate::vector::Vector;

/// Time, position and velocity of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct State<const D: usize> {
    /// Current time [s]
    pub time: f64,
    /// Position [m]
    pub position: Vector<D>,
    /// Velocity [m/s]
    pub velocity: Vector<D>,
}

impl<const D: usize> State<D> {
    /// State at `time`.
    pub fn new(time: f64, position: Vector<D>, velocity: Vector<D>) -> Self {
        Self {
            time,
            position,
            velocity,
        }
    }

    /// True when position and velocity are finite.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}

/// Tuning of an [`Integrator`] session.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IntegratorConfig {
    /// Step size of the very first step [s]
    pub initial_dt: f64,
    /// Step-size controller of the adaptive stepper
    pub controller: StepController,
    /// Driver limits applied on every advance
    pub limits: Limits,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            initial_dt: 1e-5,
            controller: StepController::default(),
            limits: Limits::default(),
        }
    }
}

/// Adaptive Verlet integrator session for one trajectory.
///
/// # Example
/// ```
/// use averlet::{vec2, Integrator, PointMass};
///
/// let mut s = Integrator::new(PointMass::at_origin(1.0), 1e-3)
///     .with_state(vec2(1.0, 0.0), vec2(0.0, 1.0));
/// s.advance(std::f64::consts::PI).unwrap();
///
/// assert_eq!(s.time(), std::f64::consts::PI);
/// assert!((s.position() - vec2(-1.0, 0.0)).norm() < 1e-4);
/// ```
#[derive(Clone)]
pub struct Integrator<F, const D: usize> {
    field: F,
    dtheta: f64,
    state: State<D>,
    dt: f64,
    config: IntegratorConfig,
    stats: Stats,
}

impl<F, const D: usize> Integrator<F, D>
where
    F: AccelerationField<D>,
{
    /// New session at t = 0 with zero position and velocity.
    ///
    /// `dtheta` is the per-step curvature budget of the adaptive stepper.
    pub fn new(field: F, dtheta: f64) -> Self {
        let config = IntegratorConfig::default();
        Self {
            field,
            dtheta,
            state: State::default(),
            dt: config.initial_dt,
            config,
            stats: Stats::default(),
        }
    }

    /// Replace the configuration. Resets the carried step size to
    /// `config.initial_dt`.
    pub fn with_config(mut self, config: IntegratorConfig) -> Self {
        self.dt = config.initial_dt;
        self.config = config;
        self
    }

    /// Set the initial position and velocity.
    pub fn with_state(mut self, position: Vector<D>, velocity: Vector<D>) -> Self {
        self.state.position = position;
        self.state.velocity = velocity;
        self
    }

    /// Overwrite the position.
    pub fn set_position(&mut self, position: Vector<D>) {
        self.state.position = position;
    }

    /// Overwrite the velocity.
    pub fn set_velocity(&mut self, velocity: Vector<D>) {
        self.state.velocity = velocity;
    }

    /// Move the session to a new epoch. This starts a new trajectory:
    /// time only moves forward through [`Integrator::advance`].
    pub fn set_time(&mut self, time: f64) {
        self.state.time = time;
    }

    /// Overwrite the whole state.
    pub fn set_state(&mut self, state: State<D>) {
        self.state = state;
    }

    /// Advance the trajectory by `duration`.
    ///
    /// On success the session time is exactly `time + duration` and the
    /// carried step size is the last full-step suggestion, so the next call
    /// resumes at the trajectory's current curvature. On error the session
    /// is left untouched.
    pub fn advance(&mut self, duration: f64) -> Result<(), IntegrationError> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(IntegrationError::invalid(format!(
                "duration must be non-negative and finite, got {duration}"
            )));
        }
        if !self.dtheta.is_finite() || self.dtheta <= 0.0 {
            return Err(IntegrationError::invalid(format!(
                "dtheta must be positive and finite, got {}",
                self.dtheta
            )));
        }

        self.config.controller.validate()?;

        let t0 = self.state.time;
        let stepper = AdaptiveVerlet::with_controller(self.config.controller);
        let result = integrate_with_limits(
            &self.config.limits,
            &stepper,
            self.state.position,
            self.state.velocity,
            &self.field,
            t0,
            t0 + duration,
            self.dt,
            self.dtheta,
        )?;

        self.state = State::new(result.time, result.position, result.velocity);
        self.dt = result.dt_next;
        self.stats.accumulate(&result.stats);

        debug!(
            t0,
            t = result.time,
            steps = result.stats.steps,
            dt_next = result.dt_next,
            "advanced trajectory"
        );
        Ok(())
    }

    /// Advance the trajectory up to absolute time `time`.
    pub fn advance_to(&mut self, time: f64) -> Result<(), IntegrationError> {
        if time < self.state.time {
            return Err(IntegrationError::invalid(format!(
                "cannot advance backwards from t = {} to t = {time}",
                self.state.time
            )));
        }
        self.advance(time - self.state.time)
    }

    /// Advance `count` times by `interval`, recording the state after each
    /// advance.
    pub fn sample(
        &mut self,
        interval: f64,
        count: usize,
    ) -> Result<Vec<State<D>>, IntegrationError> {
        let mut samples = Vec::with_capacity(count);
        for _ in 0..count {
            self.advance(interval)?;
            samples.push(self.state);
        }
        Ok(samples)
    }

    /// Current time.
    pub fn time(&self) -> f64 {
        self.state.time
    }

    /// Current position.
    pub fn position(&self) -> Vector<D> {
        self.state.position
    }

    /// Current velocity.
    pub fn velocity(&self) -> Vector<D> {
        self.state.velocity
    }

    /// Current state.
    pub fn state(&self) -> State<D> {
        self.state
    }

    /// Step size the next advance starts with.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Curvature budget per step.
    pub fn dtheta(&self) -> f64 {
        self.dtheta
    }

    /// Session configuration.
    pub fn config(&self) -> &IntegratorConfig {
        &self.config
    }

    /// Accumulated statistics over all advances.
    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// The acceleration field.
    pub fn field(&self) -> &F {
        &self.field
    }
}

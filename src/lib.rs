//! # averlet: Adaptive Velocity Verlet Integrator
//!
//! Trajectory integration of a point mass under one or more gravitational
//! accelerations, `d²p/dt² = a(p, t)`, in 2 or 3 dimensions.
//!
//! ## Features
//!
//! - Velocity Verlet with curvature-controlled step size and a single
//!   error-control knob (`dtheta`)
//! - Fixed-step Verlet and symplectic Euler for reference and testing
//! - Driver loop that always lands exactly on the requested end time
//! - Stateful sessions that can be advanced incrementally
//! - Parallel batch propagation of independent trajectories (`parallel` feature)
//!
//! ## Basic Usage
//!
//! ```rust
//! use averlet::constants::{EARTH_PERIOD, EARTH_SMA, SUN_MU};
//! use averlet::{orbital_velocity, vec2, Integrator, PointMass};
//!
//! // Earth on a circular heliocentric orbit
//! let mut earth = Integrator::new(PointMass::at_origin(SUN_MU), 1e-3)
//!     .with_state(vec2(EARTH_SMA, 0.0), vec2(0.0, orbital_velocity(SUN_MU, EARTH_SMA)));
//!
//! // Half a year later it is on the other side of the Sun
//! earth.advance(EARTH_PERIOD / 2.0).unwrap();
//! assert!((earth.position() - vec2(-EARTH_SMA, 0.0)).norm() < EARTH_SMA / 1e4);
//! ```
//!
//! ## Step-Size Control
//!
//! After each Verlet step the relative change of acceleration
//!
//! ```text
//! da = |a1 − a2| / (0.5·|a1 + a2|)
//! ```
//!
//! measures how sharply the trajectory bends. The next step is scaled by
//! `clamp(dtheta / da, 0.5, 2)`. On a circular orbit `da` is the angle swept
//! per step, so `dtheta` is roughly the angular resolution of the
//! trajectory. Position error scales as `dtheta²`.
//!
//! ## Driving Steppers Directly
//!
//! ```rust
//! use averlet::{integrate, vec2, Vec2, VelocityVerlet};
//!
//! // Unit circular orbit, a quarter turn with dt = 1e-3
//! let unit = |p: Vec2, _t: f64| p * (-1.0 / (p.norm_squared() * p.norm()));
//! let end = integrate(
//!     &VelocityVerlet,
//!     vec2(0.0, 1.0),
//!     vec2(1.0, 0.0),
//!     &unit,
//!     0.0,
//!     std::f64::consts::FRAC_PI_2,
//!     1e-3,
//!     0.0,
//! )
//! .unwrap();
//!
//! assert_eq!(end.time, std::f64::consts::FRAC_PI_2);
//! assert!((end.position - vec2(1.0, 0.0)).norm() < 3e-7);
//! ```
//!
//! ## Errors
//!
//! Steppers propagate NaN/Inf and never fail on their own. The driver
//! validates its inputs and stops with [`IntegrationError::NonFiniteState`]
//! as soon as a step produces a non-finite position or velocity, e.g. when
//! a trajectory passes through a singular force center.
//!
//! ## References
//!
//! 1. Verlet, L. (1967). "Computer Experiments on Classical Fluids".
//!    Physical Review 159, 98.
//!
//! 2. Hairer, E., Lubich, C., & Wanner, G. (2003). "Geometric numerical
//!    integration illustrated by the Störmer–Verlet method". Acta Numerica.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod batch;
pub mod constants;
pub mod driver;
pub mod error;
pub mod field;
pub mod session;
pub mod stepper;
pub mod vector;

pub use batch::propagate_batch;
pub use driver::{integrate, integrate_with_limits, Integrated, Limits, Stats};
pub use error::IntegrationError;
pub use field::{orbital_velocity, AccelerationField, PointMass, Superposition};
pub use session::{Integrator, IntegratorConfig, State};
pub use stepper::{
    a_verlet, curvature, sym_euler, verlet, AdaptiveVerlet, Method, StepController, StepResult,
    Stepper, SymplecticEuler, VelocityVerlet,
};
pub use vector::{vec2, vec3, Vec2, Vec3, Vector};

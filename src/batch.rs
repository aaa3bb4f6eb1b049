//! Batch propagation of independent trajectories.
//!
//! Every trajectory runs in its own [`Integrator`] session; only the field
//! is shared, read-only. With the `parallel` feature (on by default) the
//! batch is spread over the rayon thread pool.

use crate::error::IntegrationError;
use crate::field::AccelerationField;
use crate::session::{Integrator, State};
use crate::vector::Vector;

/// Propagate every initial state by `duration` with the adaptive stepper.
///
/// Results are returned in input order. A failing trajectory does not
/// affect the others.
pub fn propagate_batch<F, const D: usize>(
    field: &F,
    dtheta: f64,
    initial: &[State<D>],
    duration: f64,
) -> Vec<Result<State<D>, IntegrationError>>
where
    F: AccelerationField<D> + Sync,
{
    #[cfg(feature = "parallel")]
    let results: Vec<_> = {
        use rayon::prelude::*;

        initial
            .par_iter()
            .map(|state| propagate_one(field, dtheta, state, duration))
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let results: Vec<_> = initial
        .iter()
        .map(|state| propagate_one(field, dtheta, state, duration))
        .collect();

    results
}

fn propagate_one<F, const D: usize>(
    field: &F,
    dtheta: f64,
    state: &State<D>,
    duration: f64,
) -> Result<State<D>, IntegrationError>
where
    F: AccelerationField<D>,
{
    let shared = |p: Vector<D>, t: f64| field.acceleration(p, t);
    let mut session = Integrator::new(shared, dtheta);
    session.set_state(*state);
    session.advance(duration)?;
    Ok(session.state())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::PointMass;
    use crate::vector::{vec2, Vec2};

    #[test]
    fn test_batch_matches_sessions() {
        let field = PointMass::at_origin(1.0);
        let initial: Vec<State<2>> = (1..=8)
            .map(|i| {
                let r = i as f64;
                State::new(0.0, vec2(r, 0.0), vec2(0.0, r.powf(-0.5)))
            })
            .collect();

        let results = propagate_batch(&field, 1e-3, &initial, 2.0);
        assert_eq!(results.len(), initial.len());

        for (state, result) in initial.iter().zip(&results) {
            let mut session = Integrator::new(field, 1e-3);
            session.set_state(*state);
            session.advance(2.0).unwrap();

            let got = result.as_ref().unwrap();
            assert_eq!(got.time, 2.0);
            assert_eq!(*got, session.state());
        }
    }

    #[test]
    fn test_batch_isolates_failures() {
        let field = PointMass::at_origin(1.0);
        let initial = [
            State::new(0.0, vec2(1.0, 0.0), vec2(0.0, 1.0)),
            State::new(0.0, Vec2::zero(), vec2(0.0, 1.0)),
            State::new(5.0, vec2(0.0, 2.0), vec2(0.5f64.sqrt(), 0.0)),
        ];

        let results = propagate_batch(&field, 1e-3, &initial, 1.0);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(IntegrationError::NonFiniteState { .. })
        ));
        assert_eq!(results[2].as_ref().unwrap().time, 6.0);
    }
}

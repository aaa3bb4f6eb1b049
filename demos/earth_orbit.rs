//! Earth around the Sun and the Moon around the Earth.
//!
//! Samples Earth's heliocentric orbit once a month for a year, then
//! propagates a small family of circular orbits in one batch.
//!
//! Run with:
//!   cargo run --example earth_orbit

use averlet::constants::{DAY, EARTH_MU, EARTH_PERIOD, EARTH_SMA, MOON_PERIOD, MOON_SMA, SUN_MU};
use averlet::{orbital_velocity, propagate_batch, vec2, Integrator, PointMass, State, Vec2};

fn energy(mu: f64, position: Vec2, velocity: Vec2) -> f64 {
    0.5 * velocity.norm_squared() - mu / position.norm()
}

fn main() {
    let dtheta = 1e-3;
    let v0 = orbital_velocity(SUN_MU, EARTH_SMA);
    let mut earth = Integrator::new(PointMass::at_origin(SUN_MU), dtheta)
        .with_state(vec2(EARTH_SMA, 0.0), vec2(0.0, v0));
    let e0 = energy(SUN_MU, earth.position(), earth.velocity());

    println!("Earth, circular heliocentric orbit (dtheta = {dtheta:e})");
    println!("  {:>8}  {:>16}  {:>16}  {:>10}", "day", "x [m]", "y [m]", "dE/E");
    let samples = earth
        .sample(EARTH_PERIOD / 12.0, 12)
        .expect("Earth orbit propagation failed");
    for s in &samples {
        let de = (energy(SUN_MU, s.position, s.velocity) - e0) / e0;
        println!(
            "  {:>8.2}  {:>16.6e}  {:>16.6e}  {:>10.2e}",
            s.time / DAY,
            s.position[0],
            s.position[1],
            de
        );
    }
    let miss = (earth.position() - vec2(EARTH_SMA, 0.0)).norm();
    println!("  Return miss: {miss:.3e} m ({:.2e} of the orbit radius)", miss / EARTH_SMA);
    println!(
        "  Steps: {}, field evaluations: {}",
        earth.stats().steps,
        earth.stats().fn_evals
    );
    println!();

    // The Moon's sidereal period includes the Earth-Moon mass ratio, a
    // point-mass Earth does not, so the orbit does not close exactly.
    let mut moon = Integrator::new(PointMass::at_origin(EARTH_MU), dtheta).with_state(
        vec2(MOON_SMA, 0.0),
        vec2(0.0, orbital_velocity(EARTH_MU, MOON_SMA)),
    );
    moon.advance(MOON_PERIOD).expect("Moon orbit propagation failed");
    let p = moon.position();
    println!("Moon after one sidereal month");
    println!("  Angle short of a full turn: {:.4} rad", -p[1].atan2(p[0]));
    println!("  Radius drift: {:.3e} m", p.norm() - MOON_SMA);
    println!();

    // Orbits from 0.4 to 5.2 AU, one year each
    let radii = [0.4, 0.7, 1.0, 1.5, 5.2];
    let initial: Vec<State<2>> = radii
        .iter()
        .map(|&au| {
            let r = au * EARTH_SMA;
            State::new(0.0, vec2(r, 0.0), vec2(0.0, orbital_velocity(SUN_MU, r)))
        })
        .collect();
    let field = PointMass::at_origin(SUN_MU);
    let results = propagate_batch(&field, dtheta, &initial, EARTH_PERIOD);

    println!("Batch, one Earth year");
    println!("  {:>6}  {:>12}  {:>12}", "a [AU]", "angle [rad]", "dr/r");
    for (au, result) in radii.iter().zip(results) {
        match result {
            Ok(s) => {
                let r = au * EARTH_SMA;
                let angle = s.position[1].atan2(s.position[0]);
                println!(
                    "  {:>6.1}  {:>12.6}  {:>12.2e}",
                    au,
                    angle,
                    (s.position.norm() - r) / r
                );
            }
            Err(e) => println!("  {au:>6.1}  failed: {e}"),
        }
    }
}

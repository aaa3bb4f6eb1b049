//! Error tables for the three steppers on a unit circular orbit.
//!
//! A quarter turn from (0, 1) should end at (1, 0). Fixed-step Verlet
//! errors fall 100x per decade of step size, symplectic Euler 10x, and
//! adaptive Verlet 100x per decade of dtheta.
//!
//! Run with:
//!   cargo run --example convergence

use std::f64::consts::FRAC_PI_2;

use averlet::{integrate, vec2, Method, StepController, Stepper, Vec2};

fn unit_field(p: Vec2, _t: f64) -> Vec2 {
    p * (-1.0 / (p.norm_squared() * p.norm()))
}

fn main() {
    let methods = [
        Method::SymplecticEuler,
        Method::Verlet,
        Method::AdaptiveVerlet(StepController::default()),
    ];

    for method in methods {
        let adaptive = matches!(method, Method::AdaptiveVerlet(_));
        println!("{} (order {})", method.name(), method.order());
        println!(
            "  {:>8}  {:>12}  {:>8}  {:>8}",
            if adaptive { "dtheta" } else { "dt" },
            "error",
            "ratio",
            "steps"
        );

        let mut previous: Option<f64> = None;
        for k in 1..=5 {
            let h = 10f64.powi(-k);
            let (dt0, control) = if adaptive { (1e-6, h) } else { (h, 0.0) };

            let end = match integrate(
                &method,
                vec2(0.0, 1.0),
                vec2(1.0, 0.0),
                &unit_field,
                0.0,
                FRAC_PI_2,
                dt0,
                control,
            ) {
                Ok(end) => end,
                Err(e) => {
                    println!("  {h:>8.0e}  failed: {e}");
                    continue;
                }
            };

            let err = (end.position - vec2(1.0, 0.0)).norm();
            let ratio = previous.map_or(String::from("-"), |p| format!("{:.1}", p / err));
            println!(
                "  {:>8.0e}  {:>12.3e}  {:>8}  {:>8}",
                h, err, ratio, end.stats.steps
            );
            previous = Some(err);
        }
        println!();
    }
}

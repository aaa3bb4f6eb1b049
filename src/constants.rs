//! Physical constants for the Sun, Earth and Moon (SI units).

/// Seconds per Earth day.
pub const DAY: f64 = 24.0 * 3600.0;

/// Gravitational constant [m³/(kg·s²)].
pub const G: f64 = 6.674e-11;

/// Standard gravitational parameter of the Sun, G·M [m³/s²].
pub const SUN_MU: f64 = 1.32712440042e20;

/// Standard gravitational parameter of the Earth [m³/s²].
pub const EARTH_MU: f64 = 3.986004418e14;
/// Semi-major axis of the Earth's heliocentric orbit [m].
pub const EARTH_SMA: f64 = 149_598_023_000.0;
/// Sidereal orbital period of the Earth [s].
pub const EARTH_PERIOD: f64 = 365.256363004 * DAY;

/// Semi-major axis of the Moon's geocentric orbit [m].
pub const MOON_SMA: f64 = 384_399_000.0;
/// Sidereal orbital period of the Moon [s].
pub const MOON_PERIOD: f64 = 27.321661 * DAY;
/// Synodic period of the Moon [s].
pub const MOON_SYNODIC_PERIOD: f64 = 29.530589 * DAY;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sun_mass() {
        let mass = SUN_MU / G;
        assert!((mass / 1.989e30 - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_earth_period_is_keplerian() {
        let kepler = 2.0 * std::f64::consts::PI * (EARTH_SMA.powi(3) / SUN_MU).sqrt();
        assert!((kepler - EARTH_PERIOD).abs() / EARTH_PERIOD < 1e-5);
    }

    #[test]
    fn test_synodic_month() {
        let synodic = 1.0 / (1.0 / MOON_PERIOD - 1.0 / EARTH_PERIOD);
        assert!((synodic - MOON_SYNODIC_PERIOD).abs() / MOON_SYNODIC_PERIOD < 1e-5);
    }
}

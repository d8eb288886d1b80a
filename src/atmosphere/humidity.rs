//! Humidity model: Magnus-formula saturated vapor pressure and the derived
//! dew point / relative humidity / vapor mass fraction setters, using the
//! literature-standard Magnus-formula triplet.

use crate::math::Table1D;

/// Magnus formula constants: `(a, b, c)`.
const MAGNUS_A_PA: f64 = 611.2;
const MAGNUS_B: f64 = 17.62;
const MAGNUS_C_DEG_C: f64 = 243.12;

/// Saturated vapor pressure (Pa) at temperature `t_celsius`, via the Magnus
/// formula.
pub fn saturated_vapor_pressure_pa(t_celsius: f64) -> f64 {
    MAGNUS_A_PA * (MAGNUS_B * t_celsius / (MAGNUS_C_DEG_C + t_celsius)).exp()
}

/// Inverts the Magnus formula to recover dew point (°C) from a vapor
/// pressure (Pa).
pub fn dew_point_from_vapor_pressure(vapor_pressure_pa: f64) -> f64 {
    let ratio = (vapor_pressure_pa / MAGNUS_A_PA).ln();
    MAGNUS_C_DEG_C * ratio / (MAGNUS_B - ratio)
}

/// Altitude-dependent maximum vapor mass fraction (parts per million):
/// humidity capacity falls off sharply with altitude as temperature and
/// saturation pressure drop.
pub fn max_vapor_mass_fraction_ppm(geometric_altitude_ft: f64) -> f64 {
    let table = Table1D::new([
        (0.0, 40_000.0),
        (5_000.0, 25_000.0),
        (10_000.0, 12_000.0),
        (20_000.0, 3_000.0),
        (30_000.0, 500.0),
        (50_000.0, 20.0),
        (100_000.0, 0.0),
    ]);
    table.lookup(geometric_altitude_ft)
}

/// Converts a relative humidity fraction (0–1) at temperature `t_celsius`
/// into a vapor pressure (Pa).
pub fn vapor_pressure_from_relative_humidity(relative_humidity: f64, t_celsius: f64) -> f64 {
    relative_humidity.clamp(0.0, 1.0) * saturated_vapor_pressure_pa(t_celsius)
}

/// Converts a vapor pressure (Pa) and total static pressure (Pa) into a
/// vapor mass fraction (dimensionless), using the standard dry-air/water-
/// vapor molar-mass ratio (0.622).
pub fn vapor_mass_fraction_from_pressure(vapor_pressure_pa: f64, static_pressure_pa: f64) -> f64 {
    const EPSILON: f64 = 0.622;
    if static_pressure_pa <= vapor_pressure_pa {
        return 1.0;
    }
    EPSILON * vapor_pressure_pa / (static_pressure_pa - vapor_pressure_pa)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn magnus_round_trips_dew_point() {
        let t = 15.0;
        let es = saturated_vapor_pressure_pa(t);
        let recovered = dew_point_from_vapor_pressure(es);
        assert_relative_eq!(recovered, t, epsilon = 1e-9);
    }

    #[test]
    fn saturated_vapor_pressure_increases_with_temperature() {
        assert!(saturated_vapor_pressure_pa(30.0) > saturated_vapor_pressure_pa(0.0));
    }

    #[test]
    fn max_vapor_fraction_decreases_with_altitude() {
        assert!(max_vapor_mass_fraction_ppm(0.0) > max_vapor_mass_fraction_ppm(30_000.0));
    }
}

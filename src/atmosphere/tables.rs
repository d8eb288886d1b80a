//! 1976 U.S. Standard Atmosphere breakpoints (component B).
//!
//! Values are the standard public-domain 1976 USSA layer boundaries
//! (geopotential altitude in feet, base temperature in Rankine) and their
//! lapse rates, the same constants a JSBSim-family atmosphere model
//! tabulates. The table shape (parallel breakpoint/lapse-rate vectors plus
//! a recursive pressure fill) follows the breakpoint-interpolation-table
//! responsibility `math::Table1D` declares for component A.

/// Geopotential-altitude breakpoints (ft) of the 1976 USSA layers 0–91 km,
/// paired with the base temperature (R) at each breakpoint.
pub const LAYER_ALTITUDES_FT: [f64; 8] = [
    0.0, 36_089.0, 65_617.0, 104_987.0, 154_199.0, 167_323.0, 232_940.0, 278_385.0,
];

pub const LAYER_BASE_TEMPS_R: [f64; 8] = [
    518.67, 389.97, 389.97, 411.57, 487.17, 487.17, 386.17, 336.50,
];

/// Lapse rate (R/ft) within each of the 7 layers bounded by the 8
/// breakpoints above.
pub const LAPSE_RATES_R_PER_FT: [f64; 7] = [
    -3.566_16e-3,
    0.0,
    5.487_5e-4,
    1.536_3e-3,
    0.0,
    -1.539_2e-3,
    -1.092_9e-3,
];

/// Standard gravitational acceleration at sea level (ft/s²).
pub const STANDARD_GRAVITY_FT_S2: f64 = 32.174_05;

/// Specific gas constant for dry air (ft·lbf / (slug·R)).
pub const DRY_AIR_GAS_CONSTANT: f64 = 1716.59;

/// Ratio of specific heats for dry air.
pub const GAMMA_AIR: f64 = 1.4;

/// Sutherland's-law viscosity constants.
pub const VISCOSITY_BETA: f64 = 2.2697e-8;
pub const VISCOSITY_S: f64 = 198.72;

/// Standard sea-level pressure (psf) and density (slug/ft³).
pub const STANDARD_SEA_LEVEL_PRESSURE_PSF: f64 = 2116.228;

/// Finds the layer index `b` such that `H` falls in `[Hb, Hb+1)`, clamping
/// to the first/last layer outside the table's range.
pub fn layer_index(altitude_ft: f64) -> usize {
    let n = LAYER_ALTITUDES_FT.len();
    if altitude_ft <= LAYER_ALTITUDES_FT[0] {
        return 0;
    }
    for b in 0..n - 1 {
        if altitude_ft < LAYER_ALTITUDES_FT[b + 1] {
            return b;
        }
    }
    n - 2
}

/// Precomputed pressure (psf) at each breakpoint, filled recursively from
/// `p0` using the layer equations so later lookups are exactly reproducible
/// from the breakpoint at layer 0 (Testable Property 4).
pub fn pressure_breakpoints(p0_psf: f64) -> Vec<f64> {
    let mut p = vec![0.0; LAYER_ALTITUDES_FT.len()];
    p[0] = p0_psf;
    for b in 0..LAPSE_RATES_R_PER_FT.len() {
        let h0 = LAYER_ALTITUDES_FT[b];
        let h1 = LAYER_ALTITUDES_FT[b + 1];
        let t0 = LAYER_BASE_TEMPS_R[b];
        let l = LAPSE_RATES_R_PER_FT[b];
        p[b + 1] = layer_pressure(p[b], t0, l, h1 - h0);
    }
    p
}

/// Pressure at geopotential-altitude offset `dh` above a layer's base,
/// given the base pressure `p_b`, base temperature `t_b`, and lapse rate `l`.
pub fn layer_pressure(p_b: f64, t_b: f64, l: f64, dh: f64) -> f64 {
    if l.abs() > 1e-12 {
        p_b * (t_b / (t_b + l * dh)).powf(STANDARD_GRAVITY_FT_S2 / (DRY_AIR_GAS_CONSTANT * l))
    } else {
        p_b * (-STANDARD_GRAVITY_FT_S2 * dh / (DRY_AIR_GAS_CONSTANT * t_b)).exp()
    }
}

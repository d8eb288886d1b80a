//! Atmosphere (component B): 1976 U.S. Standard Atmosphere with user
//! bias/gradient, Magnus-formula humidity, and a Mars variant.

pub mod humidity;
pub mod tables;

use crate::error::FlightCoreError;
use crate::math::Unit;
use tables::{
    layer_index, layer_pressure, pressure_breakpoints, DRY_AIR_GAS_CONSTANT, GAMMA_AIR,
    LAPSE_RATES_R_PER_FT, LAYER_ALTITUDES_FT, LAYER_BASE_TEMPS_R, STANDARD_GRAVITY_FT_S2,
    STANDARD_SEA_LEVEL_PRESSURE_PSF, VISCOSITY_BETA, VISCOSITY_S,
};

/// Planet an [`Atmosphere`] models, fixed to exactly these two rather than
/// left as an open extension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Planet {
    Earth,
    Mars,
}

/// Humidity state, carried alongside the dry-air thermodynamic model.
#[derive(Debug, Clone, Copy, Default)]
struct Humidity {
    /// Vapor mass fraction (dimensionless, 0 for dry air).
    vapor_mass_fraction: f64,
}

/// Standard Atmosphere model: temperature/pressure/density/sound-speed as a
/// function of geometric altitude, with user bias, graded fade-out
/// gradient, and humidity.
#[derive(Debug, Clone)]
pub struct Atmosphere {
    planet: Planet,
    sea_level_temperature_r: f64,
    temperature_bias_r: f64,
    /// `(graded_slope_r_per_ft, fade_altitude_ft)`; the slope is chosen at
    /// set-time so the graded term is exactly `delta` at the altitude it
    /// was set at and zero at `fade_altitude_ft`.
    graded_delta: Option<(f64, f64)>,
    sea_level_pressure_psf: f64,
    pressure_breakpoints: Vec<f64>,
    humidity: Humidity,
    humidity_reference_altitude_ft: f64,
}

impl Default for Atmosphere {
    fn default() -> Self {
        Self::new(Planet::Earth)
    }
}

impl Atmosphere {
    pub fn new(planet: Planet) -> Self {
        let sea_level_temperature_r = LAYER_BASE_TEMPS_R[0];
        let sea_level_pressure_psf = STANDARD_SEA_LEVEL_PRESSURE_PSF;
        let pressure_breakpoints = pressure_breakpoints(sea_level_pressure_psf);
        Self {
            planet,
            sea_level_temperature_r,
            temperature_bias_r: 0.0,
            graded_delta: None,
            sea_level_pressure_psf,
            pressure_breakpoints,
            humidity: Humidity::default(),
            humidity_reference_altitude_ft: 0.0,
        }
    }

    fn fade_altitude_ft(&self) -> f64 {
        *LAYER_ALTITUDES_FT.last().unwrap()
    }

    /// Sets the sea-level temperature. Temperature itself is not in the
    /// unit map's closed vocabulary, so temperature values are taken
    /// directly in Rankine here and the caller is responsible for
    /// converting Celsius/Fahrenheit/Kelvin inputs before calling.
    pub fn set_sea_level_temperature_r(&mut self, t_r: f64) {
        self.sea_level_temperature_r = t_r;
    }

    pub fn set_temperature_bias_r(&mut self, delta_t_r: f64) {
        self.temperature_bias_r = delta_t_r;
    }

    /// Establishes a bias at altitude `h_ft` that fades linearly to zero at
    /// the topmost table altitude.
    pub fn set_graded_delta_temperature(&mut self, delta_r: f64, h_ft: f64) {
        let fade = self.fade_altitude_ft();
        let denom = fade - h_ft;
        let slope = if denom.abs() > 1e-9 { delta_r / denom } else { 0.0 };
        self.graded_delta = Some((slope, fade));
    }

    pub fn set_sea_level_pressure_psf(&mut self, p_psf: f64) {
        self.sea_level_pressure_psf = p_psf;
        self.pressure_breakpoints = pressure_breakpoints(p_psf);
    }

    pub fn reset_sea_level_pressure(&mut self) {
        self.set_sea_level_pressure_psf(STANDARD_SEA_LEVEL_PRESSURE_PSF);
    }

    // -- Humidity -----------------------------------------------------
    //
    // The humidity setters (`setDewPoint`, `setRelativeHumidity`,
    // `setVaporMassFractionPPM`, `setVaporPressure`) are unparameterized by
    // altitude, so they evaluate against a tracked reference altitude
    // (`set_humidity_reference_altitude`) the way the IC solver's current
    // altitude would in the full system; this keeps the altitude-dependent
    // maximum-fraction clamp meaningful without threading an extra argument
    // through every humidity setter.

    pub fn set_humidity_reference_altitude_ft(&mut self, geometric_altitude_ft: f64) {
        self.humidity_reference_altitude_ft = geometric_altitude_ft;
    }

    pub fn set_vapor_mass_fraction_ppm(&mut self, ppm: f64) {
        let max_ppm = humidity::max_vapor_mass_fraction_ppm(self.humidity_reference_altitude_ft);
        self.humidity.vapor_mass_fraction = ppm.clamp(0.0, max_ppm) * 1e-6;
    }

    pub fn set_vapor_pressure(&mut self, vapor_pressure_pa: f64) {
        let static_pressure_pa = self
            .pressure(self.humidity_reference_altitude_ft)
            .unwrap_or(0.0)
            * 47.880_26;
        let fraction =
            humidity::vapor_mass_fraction_from_pressure(vapor_pressure_pa, static_pressure_pa);
        self.set_vapor_mass_fraction_ppm(fraction * 1e6);
    }

    pub fn set_relative_humidity(&mut self, relative_humidity: f64) {
        let t_celsius = (self
            .temperature(self.humidity_reference_altitude_ft)
            .unwrap_or(518.67)
            - 491.67)
            * 5.0
            / 9.0;
        let vapor_pressure_pa =
            humidity::vapor_pressure_from_relative_humidity(relative_humidity, t_celsius);
        self.set_vapor_pressure(vapor_pressure_pa);
    }

    pub fn set_dew_point(&mut self, dew_point_celsius: f64) {
        let vapor_pressure_pa = humidity::saturated_vapor_pressure_pa(dew_point_celsius);
        self.set_vapor_pressure(vapor_pressure_pa);
    }

    pub fn vapor_mass_fraction(&self) -> f64 {
        self.humidity.vapor_mass_fraction
    }

    /// Gas constant for moist air (ft·lbf / (slug·R)), via the standard
    /// virtual-temperature correction (Mars humidity is treated as zero,
    /// see DESIGN.md).
    fn moist_gas_constant(&self) -> f64 {
        match self.planet {
            Planet::Earth => DRY_AIR_GAS_CONSTANT * (1.0 + 0.6078 * self.humidity.vapor_mass_fraction),
            Planet::Mars => mars::CO2_GAS_CONSTANT,
        }
    }

    // -- Public contract ------------------------------------------------

    pub fn temperature(&self, h_geometric_ft: f64) -> Result<f64, FlightCoreError> {
        match self.planet {
            Planet::Earth => Ok(self.earth_temperature(h_geometric_ft)),
            Planet::Mars => Ok(mars::temperature(h_geometric_ft)),
        }
    }

    pub fn pressure(&self, h_geometric_ft: f64) -> Result<f64, FlightCoreError> {
        match self.planet {
            Planet::Earth => Ok(self.earth_pressure(h_geometric_ft)),
            Planet::Mars => Ok(mars::pressure(h_geometric_ft)),
        }
    }

    pub fn density(&self, h_geometric_ft: f64) -> Result<f64, FlightCoreError> {
        let p = self.pressure(h_geometric_ft)?;
        let t = self.temperature(h_geometric_ft)?.max(1.0);
        Ok(p / (self.moist_gas_constant() * t))
    }

    pub fn sound_speed(&self, h_geometric_ft: f64) -> Result<f64, FlightCoreError> {
        let t = self.temperature(h_geometric_ft)?.max(1.0);
        Ok((GAMMA_AIR * DRY_AIR_GAS_CONSTANT * t).sqrt())
    }

    pub fn absolute_viscosity(&self, h_geometric_ft: f64) -> Result<f64, FlightCoreError> {
        let t = self.temperature(h_geometric_ft)?.max(1.0);
        Ok(VISCOSITY_BETA * t.powf(1.5) / (VISCOSITY_S + t))
    }

    pub fn kinematic_viscosity(&self, h_geometric_ft: f64) -> Result<f64, FlightCoreError> {
        let mu = self.absolute_viscosity(h_geometric_ft)?;
        let rho = self.density(h_geometric_ft)?;
        Ok(mu / rho)
    }

    /// Altitude (geometric ft) at which standard density equals the density
    /// actually present at `h_geometric_ft`, found by the same breakpoint
    /// search used by `density` (Testable Property 4).
    pub fn density_altitude(&self, h_geometric_ft: f64) -> Result<f64, FlightCoreError> {
        let target_density = self.density(h_geometric_ft)?;
        self.altitude_for_density(target_density)
    }

    pub fn pressure_altitude(&self, h_geometric_ft: f64) -> Result<f64, FlightCoreError> {
        let target_pressure = self.pressure(h_geometric_ft)?;
        self.altitude_for_pressure(target_pressure)
    }

    // -- Earth implementation --------------------------------------------

    fn earth_temperature(&self, h_ft: f64) -> f64 {
        let b = layer_index(h_ft);
        let delta_from_sea_level = self.sea_level_temperature_r - LAYER_BASE_TEMPS_R[0];
        let base = LAYER_BASE_TEMPS_R[b] + delta_from_sea_level;
        let lapse_term = LAPSE_RATES_R_PER_FT[b] * (h_ft - LAYER_ALTITUDES_FT[b]);
        let graded_term = match self.graded_delta {
            Some((slope, fade)) => slope * (fade - h_ft),
            None => 0.0,
        };
        let t = base + lapse_term + self.temperature_bias_r + graded_term;
        if t.is_finite() && t > 0.0 {
            t
        } else {
            LAYER_BASE_TEMPS_R[b]
        }
    }

    /// Standard (no bias/gradient) temperature, used by Testable Property 5.
    pub fn standard_temperature(&self, h_ft: f64) -> f64 {
        let b = layer_index(h_ft);
        LAYER_BASE_TEMPS_R[b] + LAPSE_RATES_R_PER_FT[b] * (h_ft - LAYER_ALTITUDES_FT[b])
    }

    fn earth_pressure(&self, h_ft: f64) -> f64 {
        let b = layer_index(h_ft);
        layer_pressure(
            self.pressure_breakpoints[b],
            LAYER_BASE_TEMPS_R[b],
            LAPSE_RATES_R_PER_FT[b],
            h_ft - LAYER_ALTITUDES_FT[b],
        )
    }

    fn altitude_for_pressure(&self, target_pressure_psf: f64) -> Result<f64, FlightCoreError> {
        if target_pressure_psf <= 0.0 || !target_pressure_psf.is_finite() {
            return Err(FlightCoreError::OutOfRange(
                "pressure must be positive and finite".into(),
            ));
        }
        let b = self
            .pressure_breakpoints
            .iter()
            .rposition(|&p| p >= target_pressure_psf)
            .unwrap_or(0)
            .min(LAPSE_RATES_R_PER_FT.len() - 1);
        let p_b = self.pressure_breakpoints[b];
        let t_b = LAYER_BASE_TEMPS_R[b];
        let l = LAPSE_RATES_R_PER_FT[b];
        let dh = if l.abs() > 1e-12 {
            (t_b / (target_pressure_psf / p_b).powf(DRY_AIR_GAS_CONSTANT * l / STANDARD_GRAVITY_FT_S2) - t_b) / l
        } else {
            -(target_pressure_psf / p_b).ln() * DRY_AIR_GAS_CONSTANT * t_b / STANDARD_GRAVITY_FT_S2
        };
        Ok(LAYER_ALTITUDES_FT[b] + dh)
    }

    fn altitude_for_density(&self, target_density: f64) -> Result<f64, FlightCoreError> {
        // Density isn't piecewise-invertible in closed form once bias/humidity
        // are in play, so fall back to the shared root finder over the same
        // breakpoint-backed `density` function.
        use crate::math::rootfinder::{solve, SolverConfig};
        let cfg = SolverConfig {
            bounds: (-5_000.0, 300_000.0),
            initial_step: 1_000.0,
            func_tolerance: 1e-9,
            width_tolerance: 1e-6,
            ..Default::default()
        };
        match solve(
            |h| self.density(h).unwrap_or(f64::NAN) - target_density,
            0.0,
            &cfg,
        ) {
            crate::math::RootOutcome::Converged(h) => Ok(h),
            _ => Err(FlightCoreError::NoSolution(
                "density altitude did not converge".into(),
            )),
        }
    }

    /// `pressure`/`density` report their native units (psf, slug/ft³)
    /// directly; pressure and density are not in component A's unit map,
    /// so a caller-supplied `unit` here is only ever meaningful for the
    /// setters that *do* live in that map (`set_sea_level_pressure`).
    /// Passing `None` models the "unit = undefined" case and fails with
    /// [`FlightCoreError::BadUnit`].
    pub fn set_sea_level_pressure(
        &mut self,
        value: f64,
        unit: Option<Unit>,
    ) -> Result<(), FlightCoreError> {
        let unit = unit.ok_or_else(|| FlightCoreError::BadUnit("undefined unit".into()))?;
        let psf = crate::math::units::convert(value, unit, Unit::PoundPerFoot)
            .map_err(|_| FlightCoreError::BadUnit(format!("cannot convert {unit:?} to psf")))?;
        self.set_sea_level_pressure_psf(psf);
        Ok(())
    }
}

/// Mars atmosphere: a one-piece polynomial temperature model with two linear
/// branches and an exponential pressure law.
mod mars {
    const BRANCH_ALTITUDE_FT: f64 = 22_960.0;

    /// Specific gas constant for CO2 (ft·lbf / (slug·R)), used since Mars
    /// atmosphere is ~95% CO2 and Mars humidity is left undefined (assumed
    /// zero, see DESIGN.md).
    pub const CO2_GAS_CONSTANT: f64 = 1149.0;

    pub fn temperature(h_ft: f64) -> f64 {
        if h_ft < BRANCH_ALTITUDE_FT {
            434.02 - 0.001822 * h_ft
        } else {
            450.0 - 0.002222 * h_ft
        }
    }

    pub fn pressure(h_ft: f64) -> f64 {
        14.62 * (-3e-5 * h_ft).exp()
    }
}

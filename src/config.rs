//! Host-facing configuration: `serde` + `serde_yaml`-deserializable defaults
//! for the atmosphere bias/gradient, turbulence, and trim-solver tunables,
//! following the same `*Config` + `load`/`save` shape as
//! `resources::config::{PhysicsConfig, SimulationConfig}`.

use serde::{Deserialize, Serialize};

use crate::atmosphere::Planet;
use crate::winds::TurbulenceType;

/// Sea-level bias and graded fade-out gradient a host applies to
/// [`crate::atmosphere::Atmosphere`] at startup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtmosphereConfig {
    pub planet: PlanetConfig,
    pub temperature_bias_r: f64,
    pub graded_delta_r: f64,
    pub graded_delta_altitude_ft: f64,
    pub sea_level_pressure_psf: f64,
}

/// Mirrors [`Planet`] for serde; `Planet` itself is left un-derived since it
/// is a runtime enum switched on in hot atmosphere code, not a
/// configuration-only type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanetConfig {
    Earth,
    Mars,
}

impl From<PlanetConfig> for Planet {
    fn from(value: PlanetConfig) -> Self {
        match value {
            PlanetConfig::Earth => Planet::Earth,
            PlanetConfig::Mars => Planet::Mars,
        }
    }
}

impl Default for AtmosphereConfig {
    fn default() -> Self {
        Self {
            planet: PlanetConfig::Earth,
            temperature_bias_r: 0.0,
            graded_delta_r: 0.0,
            graded_delta_altitude_ft: 0.0,
            sea_level_pressure_psf: crate::atmosphere::tables::STANDARD_SEA_LEVEL_PRESSURE_PSF,
        }
    }
}

/// Turbulence spectrum selection and severity a host sets before a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurbulenceConfig {
    pub kind: TurbulenceKindConfig,
    pub severity: f64,
    pub rng_seed: u64,
}

/// Mirrors [`TurbulenceType`] for serde, for the same reason as
/// [`PlanetConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurbulenceKindConfig {
    None,
    Culp,
    Milspec,
    Tustin,
}

impl From<TurbulenceKindConfig> for TurbulenceType {
    fn from(value: TurbulenceKindConfig) -> Self {
        match value {
            TurbulenceKindConfig::None => TurbulenceType::None,
            TurbulenceKindConfig::Culp => TurbulenceType::Culp,
            TurbulenceKindConfig::Milspec => TurbulenceType::Milspec,
            TurbulenceKindConfig::Tustin => TurbulenceType::Tustin,
        }
    }
}

impl Default for TurbulenceConfig {
    fn default() -> Self {
        Self {
            kind: TurbulenceKindConfig::None,
            severity: 3.0,
            rng_seed: 0,
        }
    }
}

/// Trim-solver tolerances and iteration caps, overridable
/// from a host config file rather than hardcoded at `TrimEngine::new`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimSolverConfig {
    pub max_cycles: usize,
    pub max_subcycles: usize,
    pub tolerance_override: Option<f64>,
    pub target_load_factor: f64,
    pub fallback_enabled: bool,
}

impl Default for TrimSolverConfig {
    fn default() -> Self {
        Self {
            max_cycles: 60,
            max_subcycles: 50,
            tolerance_override: None,
            target_load_factor: 1.0,
            fallback_enabled: true,
        }
    }
}

/// Top-level configuration bundle, following the `SimulationConfig`
/// aggregate-of-sub-configs shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct FlightCoreConfig {
    pub atmosphere: AtmosphereConfig,
    pub turbulence: TurbulenceConfig,
    pub trim: TrimSolverConfig,
}

impl FlightCoreConfig {
    /// Loads a config from a YAML file, the same way `SimulationConfig::load`
    /// does.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let file = std::fs::File::open(path)?;
        let config = serde_yaml::from_reader(file)?;
        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let file = std::fs::File::create(path)?;
        serde_yaml::to_writer(file, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_yaml() {
        let cfg = FlightCoreConfig::default();
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let back: FlightCoreConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(cfg, back);
    }

    #[test]
    fn planet_config_converts_into_runtime_planet() {
        let planet: Planet = PlanetConfig::Mars.into();
        assert_eq!(planet, Planet::Mars);
    }

    #[test]
    fn turbulence_kind_config_converts_into_runtime_type() {
        let kind: TurbulenceType = TurbulenceKindConfig::Tustin.into();
        assert_eq!(kind, TurbulenceType::Tustin);
    }
}

//! Winds & Turbulence (component C).

pub mod burst;
pub mod gust;
pub mod turbulence;

use nalgebra::Vector3;

pub use burst::{BurstField, BurstFieldModel, BurstRing, VortexRingModel};
pub use gust::{GustFrame, GustProfile, OneMinusCosineGust};
pub use turbulence::{Turbulence, TurbulenceOutput, TurbulenceType};

/// Aggregated wind state: steady wind, 1-cos gust, turbulence, and their
/// ordered sum.
pub struct WindsTurbulence {
    pub steady_wind_ned: Vector3<f64>,
    pub cosine_gust: OneMinusCosineGust,
    pub burst_field: BurstField,
    pub burst_model: Box<dyn BurstFieldModel>,
    pub turbulence: Turbulence,
    last_burst_field_ned: Vector3<f64>,
    last_cosine_gust_ned: Vector3<f64>,
    last_turbulence: TurbulenceOutput,
    total_wind_ned: Vector3<f64>,
}

impl WindsTurbulence {
    pub fn new(turbulence_kind: TurbulenceType, seed: u64) -> Self {
        Self {
            steady_wind_ned: Vector3::zeros(),
            cosine_gust: OneMinusCosineGust::default(),
            burst_field: BurstField::default(),
            burst_model: Box::new(VortexRingModel),
            turbulence: Turbulence::new(turbulence_kind, seed),
            last_burst_field_ned: Vector3::zeros(),
            last_cosine_gust_ned: Vector3::zeros(),
            last_turbulence: TurbulenceOutput::default(),
            total_wind_ned: Vector3::zeros(),
        }
    }

    /// Heading of the steady wind, derived solely from the NED steady-wind
    /// vector (not the total).
    pub fn steady_wind_heading_rad(&self) -> f64 {
        self.steady_wind_ned.y.atan2(self.steady_wind_ned.x)
    }

    /// Advances gust/turbulence state and recomputes the ordered sum:
    /// steady wind, then gust, then cosine gust, then turbulence, then
    /// their sum.
    #[allow(clippy::too_many_arguments)]
    pub fn tick(
        &mut self,
        dt: f64,
        location_ned: Vector3<f64>,
        agl_ft: f64,
        true_airspeed_fps: f64,
        wingspan_ft: f64,
        wind_at_20ft_fps: f64,
    ) -> Vector3<f64> {
        let steady = self.steady_wind_ned;
        self.last_burst_field_ned = self
            .burst_field
            .evaluate(location_ned, self.burst_model.as_ref());
        self.last_cosine_gust_ned = self.cosine_gust.tick(dt);
        self.last_turbulence =
            self.turbulence
                .tick(dt, agl_ft, true_airspeed_fps, wingspan_ft, wind_at_20ft_fps);
        let turbulence_ned = Vector3::new(
            self.last_turbulence.u_fps,
            self.last_turbulence.v_fps,
            self.last_turbulence.w_fps,
        );

        self.total_wind_ned =
            steady + self.last_burst_field_ned + self.last_cosine_gust_ned + turbulence_ned;
        self.total_wind_ned
    }

    pub fn total_wind_ned(&self) -> Vector3<f64> {
        self.total_wind_ned
    }

    pub fn turbulence_angular_rates_rps(&self) -> (f64, f64, f64) {
        (
            self.last_turbulence.p_rps,
            self.last_turbulence.q_rps,
            self.last_turbulence.r_rps,
        )
    }
}

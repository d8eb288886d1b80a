//! Data model for the Initial-Condition Solver.

use nalgebra::{UnitQuaternion, Vector3};

use crate::math::quaternion::{
    dcm_local_to_body, euler_from_quaternion, quaternion_from_euler,
};

/// Equatorial radius used to derive geodetic quantities from geocentric
/// ones; matches the geopotential-altitude reference radius used by
/// [`crate::atmosphere`].
pub const EQUATORIAL_RADIUS_FT: f64 = 20_925_646.32;

/// Geocentric position plus the geodetic quantities derived from it.
///
/// Invariant: `radius_ft >= EQUATORIAL_RADIUS_FT` is not enforced as a hard
/// floor (polar radius is slightly smaller), but latitude is always kept in
/// `[-PI/2, PI/2]`.
#[derive(Debug, Clone, Copy)]
pub struct Location {
    pub geocentric_latitude_rad: f64,
    pub longitude_rad: f64,
    pub radius_ft: f64,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            geocentric_latitude_rad: 0.0,
            longitude_rad: 0.0,
            radius_ft: EQUATORIAL_RADIUS_FT,
        }
    }
}

impl Location {
    /// Geodetic latitude, computed from the geocentric one via the standard
    /// oblate-spheroid correction (flattening of WGS-84, `1/298.257223563`).
    pub fn geodetic_latitude_rad(&self) -> f64 {
        const FLATTENING: f64 = 1.0 / 298.257_223_563;
        let e2 = FLATTENING * (2.0 - FLATTENING);
        (self.geocentric_latitude_rad.tan() / (1.0 - e2)).atan()
    }

    /// Geodetic altitude above the reference ellipsoid, approximated as the
    /// geocentric-radius excess over the equatorial radius corrected for
    /// latitude-dependent ellipsoid radius.
    pub fn geodetic_altitude_ft(&self) -> f64 {
        const FLATTENING: f64 = 1.0 / 298.257_223_563;
        let lat = self.geodetic_latitude_rad();
        let ellipsoid_radius =
            EQUATORIAL_RADIUS_FT * (1.0 - FLATTENING * lat.sin().powi(2));
        self.radius_ft - ellipsoid_radius
    }
}

/// Normalized orientation quaternion plus its derived Euler triplet and DCMs.
#[derive(Debug, Clone, Copy)]
pub struct Orientation {
    quaternion: UnitQuaternion<f64>,
}

impl Default for Orientation {
    fn default() -> Self {
        Self {
            quaternion: UnitQuaternion::identity(),
        }
    }
}

impl Orientation {
    pub fn from_euler(phi_rad: f64, theta_rad: f64, psi_rad: f64) -> Self {
        Self {
            quaternion: quaternion_from_euler(phi_rad, theta_rad, psi_rad),
        }
    }

    pub fn quaternion(&self) -> &UnitQuaternion<f64> {
        &self.quaternion
    }

    /// Euler triplet `(phi, theta, psi)`, psi wrapped into `[0, 2*PI)`.
    pub fn euler_rad(&self) -> (f64, f64, f64) {
        euler_from_quaternion(&self.quaternion)
    }

    pub fn set_euler(&mut self, phi_rad: f64, theta_rad: f64, psi_rad: f64) {
        self.quaternion = quaternion_from_euler(phi_rad, theta_rad, psi_rad);
    }

    pub fn local_to_body(&self, v_local: &Vector3<f64>) -> Vector3<f64> {
        dcm_local_to_body(&self.quaternion) * v_local
    }

    pub fn body_to_local(&self, v_body: &Vector3<f64>) -> Vector3<f64> {
        self.quaternion * v_body
    }
}

/// Body-frame linear velocity and angular rate.
///
/// Invariant: `vt_fps() == (u, v, w).norm()`; the solver keeps this cache
/// current on every setter rather than storing `vt` independently.
#[derive(Debug, Clone, Copy, Default)]
pub struct BodyKinematics {
    pub u_fps: f64,
    pub v_fps: f64,
    pub w_fps: f64,
    pub p_rps: f64,
    pub q_rps: f64,
    pub r_rps: f64,
}

impl BodyKinematics {
    pub fn velocity(&self) -> Vector3<f64> {
        Vector3::new(self.u_fps, self.v_fps, self.w_fps)
    }

    pub fn vt_fps(&self) -> f64 {
        self.velocity().norm()
    }
}

/// Angle of attack and sideslip, derivable from body velocity.
#[derive(Debug, Clone, Copy, Default)]
pub struct AeroAngles {
    pub alpha_rad: f64,
    pub beta_rad: f64,
}

impl AeroAngles {
    /// Recomputes (alpha, beta) from a body-velocity triple, per the data
    /// model invariant `tan(alpha) = w/u`, `sin(beta) = v/vt`.
    pub fn from_body_velocity(u: f64, v: f64, w: f64) -> Self {
        let vt = (u * u + v * v + w * w).sqrt();
        let alpha_rad = if u.abs() > 1e-9 || w.abs() > 1e-9 {
            w.atan2(u)
        } else {
            0.0
        };
        let beta_rad = if vt > 1e-9 { (v / vt).asin() } else { 0.0 };
        Self { alpha_rad, beta_rad }
    }
}

/// NED wind vector; body components are always recomputed from NED plus
/// orientation and are never stored independently.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindState {
    pub ned_fps: Vector3<f64>,
}

impl WindState {
    pub fn heading_rad(&self) -> f64 {
        self.ned_fps.y.atan2(self.ned_fps.x)
    }

    pub fn body_components(&self, orientation: &Orientation) -> Vector3<f64> {
        orientation.local_to_body(&self.ned_fps)
    }
}

/// Records which of the redundant airspeed parameterizations was most
/// recently set; an altitude change recomputes the other four from this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedSet {
    Vt,
    Vc,
    Ve,
    Mach,
    Uvw,
    Ned,
    Vg,
}

/// Which altitude parameterization (above sea level / above ground level)
/// is authoritative; re-invoked when latitude or terrain changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AltitudeSet {
    Asl,
    Agl,
}

/// Which latitude convention (geocentric / geodetic) the user last set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatitudeSet {
    Geocentric,
    Geodetic,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn body_kinematics_vt_matches_norm() {
        let bk = BodyKinematics {
            u_fps: 100.0,
            v_fps: 0.0,
            w_fps: 10.0,
            ..Default::default()
        };
        assert_relative_eq!(bk.vt_fps(), (100.0f64.powi(2) + 10.0f64.powi(2)).sqrt());
    }

    #[test]
    fn aero_angles_from_pure_forward_flight() {
        let angles = AeroAngles::from_body_velocity(100.0, 0.0, 0.0);
        assert_relative_eq!(angles.alpha_rad, 0.0, epsilon = 1e-9);
        assert_relative_eq!(angles.beta_rad, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn wind_heading_from_ned() {
        let wind = WindState {
            ned_fps: Vector3::new(0.0, 10.0, 0.0),
        };
        assert_relative_eq!(
            wind.heading_rad(),
            std::f64::consts::FRAC_PI_2,
            epsilon = 1e-9
        );
    }

    #[test]
    fn orientation_euler_round_trip() {
        let o = Orientation::from_euler(0.1, 0.2, 0.3);
        let (phi, theta, psi) = o.euler_rad();
        assert_relative_eq!(phi, 0.1, epsilon = 1e-9);
        assert_relative_eq!(theta, 0.2, epsilon = 1e-9);
        assert_relative_eq!(psi, 0.3, epsilon = 1e-9);
    }
}

//! Initial-Condition Solver (component D).

use nalgebra::Vector3;

use crate::atmosphere::Atmosphere;
use crate::error::FlightCoreError;
use crate::ic::document::Document;
use crate::ic::state::{AeroAngles, AltitudeSet, BodyKinematics, LatitudeSet, Location, Orientation, SpeedSet, WindState};
use crate::logging::{Level, Logger, NoopLogger};
use crate::math::rootfinder::{solve, RootOutcome, SolverConfig};
use crate::math::units::{convert, Unit};

const STANDARD_SEA_LEVEL_SOUND_SPEED_FPS: f64 = 1116.45;
const FPS_PER_KNOT: f64 = 1.687_809_857;

fn total_over_static_pressure_ratio(mach: f64) -> f64 {
    if mach <= 1.0 {
        (1.0 + 0.2 * mach * mach).powf(3.5)
    } else {
        let m2 = mach * mach;
        let b = 5.76 * m2 / (5.6 * m2 - 0.8);
        let d = (2.8 * m2 - 0.4) * 0.4167;
        b.powf(3.5) * d
    }
}

fn mach_bounds_config(guess: f64) -> SolverConfig {
    SolverConfig {
        bounds: (0.0, 50.0),
        initial_step: (guess.abs() * 0.1).max(0.01),
        ..Default::default()
    }
}

/// Mach from calibrated airspeed via the Rayleigh pitot-tube relation,
/// sub/supersonic branches stitched through
/// [`total_over_static_pressure_ratio`] at M = 1.
fn mach_from_calibrated_airspeed(vc_fps: f64, p_psf: f64, p0_psf: f64) -> Result<f64, FlightCoreError> {
    let mach_sl = (vc_fps / STANDARD_SEA_LEVEL_SOUND_SPEED_FPS).max(0.0);
    let qc = p0_psf * (total_over_static_pressure_ratio(mach_sl) - 1.0);
    let target = 1.0 + qc / p_psf;
    let cfg = mach_bounds_config(mach_sl);
    match solve(|m| total_over_static_pressure_ratio(m) - target, mach_sl, &cfg) {
        RootOutcome::Converged(m) => Ok(m),
        _ => Err(FlightCoreError::NoSolution(
            "mach from calibrated airspeed did not converge".into(),
        )),
    }
}

/// Inverse of [`mach_from_calibrated_airspeed`]: calibrated airspeed from
/// Mach, at the current static pressure.
fn calibrated_airspeed_from_mach(mach: f64, p_psf: f64, p0_psf: f64) -> Result<f64, FlightCoreError> {
    let qc = p_psf * (total_over_static_pressure_ratio(mach) - 1.0);
    let target = 1.0 + qc / p0_psf;
    let cfg = mach_bounds_config(mach);
    match solve(|m| total_over_static_pressure_ratio(m) - target, mach, &cfg) {
        RootOutcome::Converged(mach_sl) => Ok(mach_sl * STANDARD_SEA_LEVEL_SOUND_SPEED_FPS),
        _ => Err(FlightCoreError::NoSolution(
            "calibrated airspeed from mach did not converge".into(),
        )),
    }
}

/// `sin(gamma) - f(theta, phi, alpha, beta)`, the implicit relation between
/// flight-path angle and pitch attitude ("GammaEqOfTheta"). Wind is not
/// folded in: only a trigonometric expression in `(theta, phi, alpha, beta)`
/// is defined here, treating `(u, v, w)` as the airmass-relative velocity
/// triad directly rather than adding an unspecified wind-coupling term (see
/// DESIGN.md).
fn gamma_residual(theta: f64, phi: f64, alpha: f64, beta: f64, gamma: f64) -> f64 {
    let f = alpha.cos() * beta.cos() * theta.sin()
        - beta.sin() * phi.sin() * theta.cos()
        - alpha.sin() * beta.cos() * phi.cos() * theta.cos();
    gamma.sin() - f
}

const THETA_BOUND_RAD: f64 = 89.0 * std::f64::consts::PI / 180.0;

fn solve_theta_from_gamma(phi: f64, alpha: f64, beta: f64, gamma: f64, guess: f64) -> RootOutcome {
    let cfg = SolverConfig {
        bounds: (-THETA_BOUND_RAD, THETA_BOUND_RAD),
        initial_step: 0.02,
        ..Default::default()
    };
    solve(|theta| gamma_residual(theta, phi, alpha, beta, gamma), guess, &cfg)
}

fn solve_alpha_from_gamma(
    phi: f64,
    theta: f64,
    beta: f64,
    gamma: f64,
    bounds: (f64, f64),
    guess: f64,
) -> RootOutcome {
    let cfg = SolverConfig {
        bounds,
        initial_step: 0.02,
        ..Default::default()
    };
    solve(|alpha| gamma_residual(theta, phi, alpha, beta, gamma), guess, &cfg)
}

/// Body-velocity triad from true airspeed and the wind-axis angles.
fn body_velocity_from_vt_alpha_beta(vt: f64, alpha: f64, beta: f64) -> (f64, f64, f64) {
    (
        vt * alpha.cos() * beta.cos(),
        vt * beta.sin(),
        vt * alpha.sin() * beta.cos(),
    )
}

/// Kinematically consistent (position, orientation, body velocity, angular
/// rate) state, built up from any of the redundant parameterizations this
/// data model supports.
pub struct InitialCondition {
    pub location: Location,
    pub orientation: Orientation,
    body: BodyKinematics,
    ned_velocity_fps: Vector3<f64>,
    aero: AeroAngles,
    pub wind: WindState,
    gamma_rad: f64,
    speed_set: SpeedSet,
    altitude_set: AltitudeSet,
    latitude_set: LatitudeSet,
    altitude_asl_ft: f64,
    terrain_elevation_ft: f64,
    alpha_bounds_rad: (f64, f64),
    vt_fps: f64,
    vc_fps: f64,
    ve_fps: f64,
    mach: f64,
    pub requested_trim: Option<String>,
    pub running_engines_mask: Option<i64>,
    pub target_nlf: Option<f64>,
    logger: Box<dyn Logger>,
}

impl Default for InitialCondition {
    fn default() -> Self {
        Self::new()
    }
}

impl InitialCondition {
    pub fn new() -> Self {
        Self {
            location: Location::default(),
            orientation: Orientation::default(),
            body: BodyKinematics::default(),
            ned_velocity_fps: Vector3::zeros(),
            aero: AeroAngles::default(),
            wind: WindState::default(),
            gamma_rad: 0.0,
            speed_set: SpeedSet::Vt,
            altitude_set: AltitudeSet::Asl,
            latitude_set: LatitudeSet::Geocentric,
            altitude_asl_ft: 0.0,
            terrain_elevation_ft: 0.0,
            alpha_bounds_rad: (-THETA_BOUND_RAD, THETA_BOUND_RAD),
            vt_fps: 0.0,
            vc_fps: 0.0,
            ve_fps: 0.0,
            mach: 0.0,
            requested_trim: None,
            running_engines_mask: None,
            target_nlf: None,
            logger: Box::new(NoopLogger),
        }
    }

    pub fn with_logger(logger: Box<dyn Logger>) -> Self {
        Self {
            logger,
            ..Self::new()
        }
    }

    /// Resets every field to canonical defaults (sea level, at rest).
    pub fn initialize(&mut self) {
        *self = Self {
            logger: std::mem::replace(&mut self.logger, Box::new(NoopLogger)),
            ..Self::new()
        };
    }

    pub fn set_alpha_bounds_rad(&mut self, lo: f64, hi: f64) {
        self.alpha_bounds_rad = (lo, hi);
    }

    fn fail(&self, err: FlightCoreError) -> FlightCoreError {
        self.logger.record(Level::Error, &err.to_string());
        err
    }

    // -- getters -----------------------------------------------------

    pub fn vt_fps(&self) -> f64 {
        self.vt_fps
    }
    pub fn vc_fps(&self) -> f64 {
        self.vc_fps
    }
    pub fn ve_fps(&self) -> f64 {
        self.ve_fps
    }
    pub fn mach(&self) -> f64 {
        self.mach
    }
    pub fn alpha_rad(&self) -> f64 {
        self.aero.alpha_rad
    }
    pub fn beta_rad(&self) -> f64 {
        self.aero.beta_rad
    }
    pub fn gamma_rad(&self) -> f64 {
        self.gamma_rad
    }
    pub fn body_kinematics(&self) -> BodyKinematics {
        self.body
    }

    /// Sets the body-frame angular rates directly.
    pub fn set_angular_rates_rps(&mut self, p: f64, q: f64, r: f64) {
        self.body.p_rps = p;
        self.body.q_rps = q;
        self.body.r_rps = r;
    }
    pub fn ned_velocity_fps(&self) -> Vector3<f64> {
        self.ned_velocity_fps
    }
    pub fn speed_set(&self) -> SpeedSet {
        self.speed_set
    }
    pub fn altitude_set(&self) -> AltitudeSet {
        self.altitude_set
    }
    pub fn latitude_set(&self) -> LatitudeSet {
        self.latitude_set
    }
    pub fn altitude_asl_ft(&self) -> f64 {
        self.altitude_asl_ft
    }
    pub fn altitude_agl_ft(&self) -> f64 {
        self.altitude_asl_ft - self.terrain_elevation_ft
    }

    // -- internal synchronization -------------------------------------

    /// Rebuilds the body-velocity/ned-velocity pair from `vt`, the current
    /// (alpha, beta), and the current orientation, then recomputes the
    /// other three speed representations from `vt` (invariant 1).
    fn apply_vt(&mut self, vt: f64, atm: &Atmosphere) -> Result<(), FlightCoreError> {
        let (u, v, w) = body_velocity_from_vt_alpha_beta(vt, self.aero.alpha_rad, self.aero.beta_rad);
        self.body.u_fps = u;
        self.body.v_fps = v;
        self.body.w_fps = w;
        self.ned_velocity_fps = self.orientation.body_to_local(&self.body.velocity());
        self.recompute_speed_cache(vt, atm)
    }

    fn recompute_speed_cache(&mut self, vt: f64, atm: &Atmosphere) -> Result<(), FlightCoreError> {
        let h = self.altitude_asl_ft;
        let a = atm.sound_speed(h)?;
        let rho = atm.density(h)?;
        let rho0 = atm.density(0.0)?;
        let p = atm.pressure(h)?;
        let p0 = atm.pressure(0.0)?;
        self.vt_fps = vt;
        self.mach = if a > 0.0 { vt / a } else { 0.0 };
        self.ve_fps = vt * (rho / rho0).sqrt();
        self.vc_fps = calibrated_airspeed_from_mach(self.mach, p, p0)?;
        Ok(())
    }

    // -- speed setters (invariant 1) -----------------------------------

    pub fn set_vt_fps(&mut self, vt: f64, atm: &Atmosphere) -> Result<(), FlightCoreError> {
        self.apply_vt(vt, atm)?;
        self.speed_set = SpeedSet::Vt;
        Ok(())
    }

    pub fn set_mach(&mut self, mach: f64, atm: &Atmosphere) -> Result<(), FlightCoreError> {
        let a = atm.sound_speed(self.altitude_asl_ft)?;
        self.apply_vt(mach * a, atm)?;
        self.speed_set = SpeedSet::Mach;
        Ok(())
    }

    pub fn set_vc_fps(&mut self, vc: f64, atm: &Atmosphere) -> Result<(), FlightCoreError> {
        let h = self.altitude_asl_ft;
        let p = atm.pressure(h)?;
        let p0 = atm.pressure(0.0)?;
        let mach = self
            .fail_on_err(mach_from_calibrated_airspeed(vc, p, p0))?;
        let a = atm.sound_speed(h)?;
        self.apply_vt(mach * a, atm)?;
        self.speed_set = SpeedSet::Vc;
        Ok(())
    }

    pub fn set_ve_fps(&mut self, ve: f64, atm: &Atmosphere) -> Result<(), FlightCoreError> {
        let h = self.altitude_asl_ft;
        let rho = atm.density(h)?;
        let rho0 = atm.density(0.0)?;
        let vt = ve / (rho / rho0).sqrt();
        self.apply_vt(vt, atm)?;
        self.speed_set = SpeedSet::Ve;
        Ok(())
    }

    fn fail_on_err<T>(&self, r: Result<T, FlightCoreError>) -> Result<T, FlightCoreError> {
        r.map_err(|e| self.fail(e))
    }

    /// Setting any body-component sets vt to the magnitude, switches
    /// last-speed to uvw, and updates (alpha, beta) (invariant 2).
    pub fn set_body_velocity_fps(&mut self, u: f64, v: f64, w: f64, atm: &Atmosphere) -> Result<(), FlightCoreError> {
        self.body.u_fps = u;
        self.body.v_fps = v;
        self.body.w_fps = w;
        self.aero = AeroAngles::from_body_velocity(u, v, w);
        self.ned_velocity_fps = self.orientation.body_to_local(&self.body.velocity());
        let vt = self.body.vt_fps();
        self.recompute_speed_cache(vt, atm)?;
        self.speed_set = SpeedSet::Uvw;
        Ok(())
    }

    pub fn set_ned_velocity_fps(&mut self, ned: Vector3<f64>, atm: &Atmosphere) -> Result<(), FlightCoreError> {
        self.ned_velocity_fps = ned;
        let body = self.orientation.local_to_body(&ned);
        self.body.u_fps = body.x;
        self.body.v_fps = body.y;
        self.body.w_fps = body.z;
        self.aero = AeroAngles::from_body_velocity(body.x, body.y, body.z);
        let vt = self.body.vt_fps();
        self.recompute_speed_cache(vt, atm)?;
        self.speed_set = SpeedSet::Ned;
        Ok(())
    }

    /// Ground speed: horizontal NED magnitude, combined with the current
    /// gamma and heading to rebuild the full NED velocity.
    pub fn set_ground_speed_fps(&mut self, vg: f64, atm: &Atmosphere) -> Result<(), FlightCoreError> {
        let (_, _, psi) = self.orientation.euler_rad();
        let climb_rate = vg * self.gamma_rad.tan();
        let ned = Vector3::new(vg * psi.cos(), vg * psi.sin(), -climb_rate);
        self.set_ned_velocity_fps(ned, atm)?;
        self.speed_set = SpeedSet::Vg;
        Ok(())
    }

    // -- angle-triad setters (invariant 3) -----------------------------

    pub fn set_alpha_rad(&mut self, alpha: f64) -> Result<(), FlightCoreError> {
        let (phi, theta, _) = self.orientation.euler_rad();
        let beta = self.aero.beta_rad;
        match solve_theta_from_gamma(phi, alpha, beta, self.gamma_rad, theta) {
            RootOutcome::Converged(new_theta) => {
                self.aero.alpha_rad = alpha;
                self.set_theta_keep_gamma(new_theta);
                Ok(())
            }
            _ => Err(self.fail(FlightCoreError::NoSolution(
                "theta from alpha/gamma did not converge".into(),
            ))),
        }
    }

    pub fn set_theta_rad(&mut self, theta: f64) -> Result<(), FlightCoreError> {
        let (phi, _, _) = self.orientation.euler_rad();
        let beta = self.aero.beta_rad;
        match solve_alpha_from_gamma(phi, theta, beta, self.gamma_rad, self.alpha_bounds_rad, self.aero.alpha_rad) {
            RootOutcome::Converged(alpha) => {
                self.aero.alpha_rad = alpha;
                self.set_theta_keep_gamma(theta);
                Ok(())
            }
            _ => Err(self.fail(FlightCoreError::NoSolution(
                "alpha from theta/gamma did not converge".into(),
            ))),
        }
    }

    pub fn set_gamma_rad(&mut self, gamma: f64) -> Result<(), FlightCoreError> {
        let (phi, theta, _) = self.orientation.euler_rad();
        let beta = self.aero.beta_rad;
        match solve_theta_from_gamma(phi, self.aero.alpha_rad, beta, gamma, theta) {
            RootOutcome::Converged(new_theta) => {
                self.gamma_rad = gamma;
                self.set_theta_keep_gamma(new_theta);
                Ok(())
            }
            _ => Err(self.fail(FlightCoreError::NoSolution(
                "theta from gamma did not converge".into(),
            ))),
        }
    }

    /// Setting beta keeps vt, climb rate, and alpha unchanged; theta is
    /// re-solved from the triad equation. Heading (psi) is held fixed: only
    /// a single trigonometric relation in `(theta, phi, alpha, beta)` is
    /// defined, not a second one pinning psi, so this does not attempt to
    /// preserve ground-track direction exactly for nonzero phi (see
    /// DESIGN.md).
    pub fn set_beta_rad(&mut self, beta: f64, atm: &Atmosphere) -> Result<(), FlightCoreError> {
        let (phi, theta, _) = self.orientation.euler_rad();
        let alpha = self.aero.alpha_rad;
        match solve_theta_from_gamma(phi, alpha, beta, self.gamma_rad, theta) {
            RootOutcome::Converged(new_theta) => {
                self.aero.beta_rad = beta;
                self.set_theta_keep_gamma(new_theta);
                let vt = self.vt_fps;
                self.apply_vt(vt, atm)
            }
            _ => Err(self.fail(FlightCoreError::NoSolution(
                "theta from beta did not converge".into(),
            ))),
        }
    }

    fn set_theta_keep_gamma(&mut self, theta: f64) {
        let (phi, _, psi) = self.orientation.euler_rad();
        self.orientation.set_euler(phi, theta, psi);
    }

    // -- roll/heading setters (invariant 5) ----------------------------

    pub fn set_phi_rad(&mut self, phi: f64) {
        let (_, theta, psi) = self.orientation.euler_rad();
        self.orientation.set_euler(phi, theta, psi);
        self.resolve_velocity_after_attitude_change();
    }

    pub fn set_psi_rad(&mut self, psi: f64) {
        let (phi, theta, _) = self.orientation.euler_rad();
        self.orientation.set_euler(phi, theta, psi);
        self.resolve_velocity_after_attitude_change();
    }

    fn resolve_velocity_after_attitude_change(&mut self) {
        match self.speed_set {
            SpeedSet::Ned | SpeedSet::Vg => {
                let body = self.orientation.local_to_body(&self.ned_velocity_fps);
                self.body.u_fps = body.x;
                self.body.v_fps = body.y;
                self.body.w_fps = body.z;
                self.aero = AeroAngles::from_body_velocity(body.x, body.y, body.z);
            }
            _ => {
                self.ned_velocity_fps = self.orientation.body_to_local(&self.body.velocity());
            }
        }
    }

    // -- altitude (invariant 6) ----------------------------------------

    pub fn set_altitude_asl_ft(&mut self, altitude_ft: f64, atm: &Atmosphere) -> Result<(), FlightCoreError> {
        self.altitude_asl_ft = altitude_ft;
        self.altitude_set = AltitudeSet::Asl;
        self.reapply_last_speed_set(atm)
    }

    pub fn set_altitude_agl_ft(&mut self, agl_ft: f64, atm: &Atmosphere) -> Result<(), FlightCoreError> {
        self.altitude_asl_ft = agl_ft + self.terrain_elevation_ft;
        self.altitude_set = AltitudeSet::Agl;
        self.reapply_last_speed_set(atm)
    }

    pub fn set_terrain_elevation_ft(&mut self, elevation_ft: f64) {
        self.terrain_elevation_ft = elevation_ft;
    }

    fn reapply_last_speed_set(&mut self, atm: &Atmosphere) -> Result<(), FlightCoreError> {
        match self.speed_set {
            SpeedSet::Vt => self.apply_vt(self.vt_fps, atm),
            SpeedSet::Mach => {
                let a = atm.sound_speed(self.altitude_asl_ft)?;
                self.apply_vt(self.mach * a, atm)
            }
            SpeedSet::Vc => {
                let h = self.altitude_asl_ft;
                let p = atm.pressure(h)?;
                let p0 = atm.pressure(0.0)?;
                let mach = self.fail_on_err(mach_from_calibrated_airspeed(self.vc_fps, p, p0))?;
                let a = atm.sound_speed(h)?;
                self.apply_vt(mach * a, atm)
            }
            SpeedSet::Ve => {
                let rho = atm.density(self.altitude_asl_ft)?;
                let rho0 = atm.density(0.0)?;
                let vt = self.ve_fps / (rho / rho0).sqrt();
                self.apply_vt(vt, atm)
            }
            SpeedSet::Uvw => {
                let vt = self.body.vt_fps();
                self.ned_velocity_fps = self.orientation.body_to_local(&self.body.velocity());
                self.recompute_speed_cache(vt, atm)
            }
            SpeedSet::Ned | SpeedSet::Vg => {
                let body = self.orientation.local_to_body(&self.ned_velocity_fps);
                self.body.u_fps = body.x;
                self.body.v_fps = body.y;
                self.body.w_fps = body.z;
                let vt = self.body.vt_fps();
                self.recompute_speed_cache(vt, atm)
            }
        }
    }

    // -- declarative load -------------------------------------------

    /// Applies setters in the declarative document's element order. When
    /// `must_run` is true, the first setter failure aborts the load and is
    /// returned immediately; otherwise failures are logged and every
    /// remaining element is still attempted, with no error returned.
    pub fn load(&mut self, doc: &Document, must_run: bool, atm: &Atmosphere) -> Result<(), FlightCoreError> {
        if let Some(version) = doc.root.attribute("version").and_then(|v| v.parse::<f64>().ok()) {
            if version >= 3.0 {
                return Err(self.fail(FlightCoreError::UnsupportedVersion(format!(
                    "IC document version {version} is not supported"
                ))));
            }
        }

        let mut apply = |result: Result<(), FlightCoreError>| -> Result<(), FlightCoreError> {
            if let Err(e) = result {
                self.logger.record(Level::Error, &e.to_string());
                if must_run {
                    return Err(e);
                }
            }
            Ok(())
        };

        if let Some(el) = doc.root.child("altitude") {
            if let Some(v) = el.text_as_f64() {
                let ft = length_to_feet(v, el.attribute("unit"))?;
                apply(self.set_altitude_asl_ft(ft, atm))?;
            }
        }
        if let Some(el) = doc.root.child("altitudeAGL") {
            if let Some(v) = el.text_as_f64() {
                let ft = length_to_feet(v, el.attribute("unit"))?;
                apply(self.set_altitude_agl_ft(ft, atm))?;
            }
        }

        if let Some(el) = doc.root.child("latitude") {
            if let Some(v) = el.text_as_f64() {
                let rad = angle_to_rad(v, el.attribute("unit"))?;
                self.location.geocentric_latitude_rad = rad;
                self.latitude_set = if el.attribute("type") == Some("geod") {
                    LatitudeSet::Geodetic
                } else {
                    LatitudeSet::Geocentric
                };
            }
        }
        if let Some(el) = doc.root.child("longitude") {
            if let Some(v) = el.text_as_f64() {
                self.location.longitude_rad = angle_to_rad(v, el.attribute("unit"))?;
            }
        }

        if let Some(el) = doc.root.child("phi") {
            if let Some(v) = el.text_as_f64() {
                self.set_phi_rad(angle_to_rad(v, el.attribute("unit"))?);
            }
        }
        if let Some(el) = doc.root.child("psi") {
            if let Some(v) = el.text_as_f64() {
                self.set_psi_rad(angle_to_rad(v, el.attribute("unit"))?);
            }
        }
        if let Some(el) = doc.root.child("theta") {
            if let Some(v) = el.text_as_f64() {
                apply(self.set_theta_rad(angle_to_rad(v, el.attribute("unit"))?))?;
            }
        }

        if let Some(el) = doc.root.child("alpha") {
            if let Some(v) = el.text_as_f64() {
                apply(self.set_alpha_rad(angle_to_rad(v, el.attribute("unit"))?))?;
            }
        }
        if let Some(el) = doc.root.child("beta") {
            if let Some(v) = el.text_as_f64() {
                apply(self.set_beta_rad(angle_to_rad(v, el.attribute("unit"))?, atm))?;
            }
        }
        if let Some(el) = doc.root.child("gamma") {
            if let Some(v) = el.text_as_f64() {
                apply(self.set_gamma_rad(angle_to_rad(v, el.attribute("unit"))?))?;
            }
        }

        if let Some(el) = doc.root.child("vt") {
            if let Some(v) = el.text_as_f64() {
                apply(self.set_vt_fps(speed_to_fps(v, el.attribute("unit")), atm))?;
            }
        }
        if let Some(el) = doc.root.child("vc") {
            if let Some(v) = el.text_as_f64() {
                apply(self.set_vc_fps(speed_to_fps(v, el.attribute("unit")), atm))?;
            }
        }
        if let Some(el) = doc.root.child("mach") {
            if let Some(v) = el.text_as_f64() {
                apply(self.set_mach(v, atm))?;
            }
        }
        if let Some(el) = doc.root.child("vground") {
            if let Some(v) = el.text_as_f64() {
                apply(self.set_ground_speed_fps(speed_to_fps(v, el.attribute("unit")), atm))?;
            }
        }
        if let (Some(u), Some(v), Some(w)) = (
            doc.root.child("ubody").and_then(|e| e.text_as_f64()),
            doc.root.child("vbody").and_then(|e| e.text_as_f64()),
            doc.root.child("wbody").and_then(|e| e.text_as_f64()),
        ) {
            apply(self.set_body_velocity_fps(u, v, w, atm))?;
        }
        if let (Some(n), Some(e), Some(d)) = (
            doc.root.child("vnorth").and_then(|e| e.text_as_f64()),
            doc.root.child("veast").and_then(|e| e.text_as_f64()),
            doc.root.child("vdown").and_then(|e| e.text_as_f64()),
        ) {
            apply(self.set_ned_velocity_fps(Vector3::new(n, e, d), atm))?;
        }

        if let Some(el) = doc.root.child("winddir") {
            if let Some(dir_deg) = el.text_as_f64() {
                let mag = doc
                    .root
                    .child("vwind")
                    .and_then(|e| e.text_as_f64())
                    .map(|v| speed_to_fps(v, el.attribute("unit")))
                    .unwrap_or(0.0);
                let dir_rad = dir_deg.to_radians();
                self.wind.ned_fps = Vector3::new(mag * dir_rad.cos(), mag * dir_rad.sin(), 0.0);
            }
        }

        if let Some(el) = doc.root.child("trim") {
            self.requested_trim = el.text.clone();
        }
        if let Some(el) = doc.root.child("running") {
            if let Some(v) = el.text_as_f64() {
                self.running_engines_mask = Some(v as i64);
            }
        }
        if let Some(el) = doc.root.child("targetNlf") {
            self.target_nlf = el.text_as_f64();
        }

        Ok(())
    }
}

fn length_to_feet(value: f64, unit: Option<&str>) -> Result<f64, FlightCoreError> {
    match unit {
        None | Some("FT") => Ok(value),
        Some("M") => convert(value, Unit::Meter, Unit::Foot),
        Some(other) => Err(FlightCoreError::BadUnit(format!("unknown length unit {other}"))),
    }
}

fn angle_to_rad(value: f64, unit: Option<&str>) -> Result<f64, FlightCoreError> {
    match unit {
        None | Some("RAD") => Ok(value),
        Some("DEG") => convert(value, Unit::Degree, Unit::Radian),
        Some(other) => Err(FlightCoreError::BadUnit(format!("unknown angle unit {other}"))),
    }
}

/// Speed units (`KTS`, `FT/SEC`) fall outside component A's declared
/// conversion map; handled locally
/// since no other pack module owns speed-unit conversion.
fn speed_to_fps(value: f64, unit: Option<&str>) -> f64 {
    match unit {
        Some("KTS") => value * FPS_PER_KNOT,
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atmosphere::{Atmosphere, Planet};
    use crate::ic::document::parse_minimal_xml;
    use approx::assert_relative_eq;

    fn standard_atm() -> Atmosphere {
        Atmosphere::new(Planet::Earth)
    }

    #[test]
    fn s3_calibrated_airspeed_round_trip_at_10000ft() {
        let atm = standard_atm();
        let mut ic = InitialCondition::new();
        ic.set_altitude_asl_ft(10_000.0, &atm).unwrap();
        ic.set_vc_fps(150.0 * FPS_PER_KNOT, &atm).unwrap();

        assert_relative_eq!(ic.mach(), 0.257, epsilon = 0.01);
        assert_relative_eq!(ic.vt_fps() / FPS_PER_KNOT, 175.6, epsilon = 1.0);
        assert_relative_eq!(ic.ve_fps() / FPS_PER_KNOT, 149.996, epsilon = 1.0);
        assert_relative_eq!(ic.vc_fps() / FPS_PER_KNOT, 150.0, epsilon = 1e-3);
    }

    #[test]
    fn s4_angle_triad_invariant() {
        let mut ic = InitialCondition::new();
        ic.set_alpha_rad(5f64.to_radians()).unwrap();
        ic.set_gamma_rad(3f64.to_radians()).unwrap();
        let (_, theta, _) = ic.orientation.euler_rad();
        assert_relative_eq!(theta.to_degrees(), 8.0, epsilon = 1e-4);
    }

    #[test]
    fn property_2_altitude_change_preserves_last_speed_set() {
        let atm = standard_atm();
        let mut ic = InitialCondition::new();
        ic.set_vc_fps(150.0 * FPS_PER_KNOT, &atm).unwrap();
        let vc_before = ic.vc_fps();
        ic.set_altitude_asl_ft(15_000.0, &atm).unwrap();
        assert_relative_eq!(ic.vc_fps(), vc_before, epsilon = 1e-6 * vc_before.max(1.0));
    }

    #[test]
    fn set_body_velocity_switches_speed_set_to_uvw() {
        let atm = standard_atm();
        let mut ic = InitialCondition::new();
        ic.set_body_velocity_fps(100.0, 0.0, 10.0, &atm).unwrap();
        assert_eq!(ic.speed_set(), SpeedSet::Uvw);
        assert_relative_eq!(ic.vt_fps(), (100f64.powi(2) + 10f64.powi(2)).sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn load_document_applies_altitude_and_speed() {
        let atm = standard_atm();
        let doc = parse_minimal_xml(
            r#"<initialize><altitude unit="FT">10000</altitude><vc unit="KTS">150</vc></initialize>"#,
        )
        .unwrap();
        let mut ic = InitialCondition::new();
        ic.load(&doc, true, &atm).unwrap();
        assert_relative_eq!(ic.altitude_asl_ft(), 10_000.0);
        assert_relative_eq!(ic.vc_fps() / FPS_PER_KNOT, 150.0, epsilon = 1e-2);
    }

    #[test]
    fn load_rejects_version_3_or_above() {
        let atm = standard_atm();
        let doc = parse_minimal_xml(r#"<initialize version="3.0"></initialize>"#).unwrap();
        let mut ic = InitialCondition::new();
        let err = ic.load(&doc, true, &atm).unwrap_err();
        assert!(matches!(err, FlightCoreError::UnsupportedVersion(_)));
    }

    #[test]
    fn phi_change_recomputes_ned_velocity_when_speed_set_is_uvw() {
        let atm = standard_atm();
        let mut ic = InitialCondition::new();
        ic.set_body_velocity_fps(100.0, 0.0, 10.0, &atm).unwrap();
        let ned_before = ic.ned_velocity_fps();
        ic.set_phi_rad(0.3);
        // Body velocity is held fixed; NED is recomputed (and may differ).
        assert_relative_eq!(ic.body_kinematics().u_fps, 100.0, epsilon = 1e-9);
        assert_ne!(ic.ned_velocity_fps(), ned_before);
    }
}

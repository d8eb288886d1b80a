//! Collaborator Façade (component F): read-only trait boundaries onto the
//! external subsystems the core consumes from, plus the owning `Executive`
//! that hands out non-owning handles to the IC solver and trim engine: an
//! executive value that owns each collaborator by composition, with no
//! backward pointer walks between them.

use nalgebra::Vector3;

use crate::error::FlightCoreError;
use crate::ic::solver::InitialCondition;

/// Altitude/attitude/derivative state the propagation integrator (out of
/// scope) exposes for one tick.
pub trait Propagate {
    fn altitude_msl_ft(&self) -> f64;
    fn altitude_agl_ft(&self) -> f64;
    fn euler_angles_rad(&self) -> (f64, f64, f64);
    fn body_velocity_derivative_fps2(&self) -> Vector3<f64>;
    fn angular_rate_derivative_rps2(&self) -> Vector3<f64>;
    fn sin_cos_euler(&self) -> ((f64, f64), (f64, f64), (f64, f64));
    fn terrain_contact(&self) -> bool;
    fn terrain_normal_ned(&self) -> Vector3<f64>;

    /// Runs one IC-plus-integrate tick against the given kinematic state.
    /// The derivatives returned by
    /// `body_velocity_derivative_fps2`/`angular_rate_derivative_rps2` after
    /// this call reflect the perturbed state; this trait does not itself
    /// own the integration.
    fn run_tick(&mut self, ic: &InitialCondition);
}

/// Aerodynamic-angle bounds and current values (aerodynamic buildup itself
/// is out of scope).
pub trait Aerodynamics {
    fn alpha_limits_rad(&self) -> (f64, f64);
    fn alpha_rad(&self) -> f64;
    fn beta_rad(&self) -> f64;
}

/// Per-engine control bounds (propulsion model itself is out of scope).
pub trait Propulsion {
    fn engine_count(&self) -> usize;
    fn throttle_limits(&self, engine_index: usize) -> Result<(f64, f64), FlightCoreError>;
    fn run_steady_state_solver(&mut self) -> Result<(), FlightCoreError>;
}

/// Per-gear-unit ground contact state (ground-reaction model itself is out
/// of scope).
pub trait GroundReactions {
    fn gear_count(&self) -> usize;
    fn weight_on_wheels(&self, gear_index: usize) -> Result<bool, FlightCoreError>;
    fn gear_location_body(&self, gear_index: usize) -> Result<Vector3<f64>, FlightCoreError>;
    fn gear_location_local(&self, gear_index: usize) -> Result<Vector3<f64>, FlightCoreError>;
    fn set_reporting_enabled(&mut self, enabled: bool);
}

/// Inertial/gravitational queries (planet model proper lives in
/// `atmosphere`/geodesy; this trait is the part the external executive is
/// expected to expose).
pub trait Inertial {
    fn reference_radius_ft(&self) -> f64;
    fn gravity_fps2(&self, location_ned: Vector3<f64>) -> f64;
    fn agl_ft(&self, location_ned: Vector3<f64>) -> f64;
}

/// Flight control channel setters/getters consumed by the trim engine
/// (the channel library itself is out of scope).
pub trait FlightControlSystem {
    fn set_throttle_cmd(&mut self, value: f64);
    fn set_elevator_cmd(&mut self, value: f64);
    fn elevator_cmd(&self) -> f64;
    fn set_aileron_cmd(&mut self, value: f64);
    fn aileron_cmd(&self) -> f64;
    fn set_rudder_cmd(&mut self, value: f64);
    fn rudder_cmd(&self) -> f64;
    fn set_pitch_trim_cmd(&mut self, value: f64);
    fn pitch_trim_cmd(&self) -> f64;
    fn set_roll_trim_cmd(&mut self, value: f64);
    fn roll_trim_cmd(&self) -> f64;
    fn set_yaw_trim_cmd(&mut self, value: f64);
    fn yaw_trim_cmd(&self) -> f64;
}

/// Owns one boxed implementation of each collaborator trait and hands out
/// non-owning `&dyn Trait` handles. IC and Trim store only the handle, never
/// a back-pointer into the executive.
pub struct Executive {
    propagate: Box<dyn Propagate>,
    aerodynamics: Box<dyn Aerodynamics>,
    propulsion: Box<dyn Propulsion>,
    ground_reactions: Box<dyn GroundReactions>,
    inertial: Box<dyn Inertial>,
    fcs: Box<dyn FlightControlSystem>,
}

impl Executive {
    pub fn new(
        propagate: Box<dyn Propagate>,
        aerodynamics: Box<dyn Aerodynamics>,
        propulsion: Box<dyn Propulsion>,
        ground_reactions: Box<dyn GroundReactions>,
        inertial: Box<dyn Inertial>,
        fcs: Box<dyn FlightControlSystem>,
    ) -> Self {
        Self {
            propagate,
            aerodynamics,
            propulsion,
            ground_reactions,
            inertial,
            fcs,
        }
    }

    pub fn propagate(&self) -> &dyn Propagate {
        self.propagate.as_ref()
    }

    pub fn propagate_mut(&mut self) -> &mut dyn Propagate {
        self.propagate.as_mut()
    }

    pub fn aerodynamics(&self) -> &dyn Aerodynamics {
        self.aerodynamics.as_ref()
    }

    pub fn propulsion(&self) -> &dyn Propulsion {
        self.propulsion.as_ref()
    }

    pub fn propulsion_mut(&mut self) -> &mut dyn Propulsion {
        self.propulsion.as_mut()
    }

    pub fn ground_reactions(&self) -> &dyn GroundReactions {
        self.ground_reactions.as_ref()
    }

    pub fn ground_reactions_mut(&mut self) -> &mut dyn GroundReactions {
        self.ground_reactions.as_mut()
    }

    pub fn inertial(&self) -> &dyn Inertial {
        self.inertial.as_ref()
    }

    pub fn fcs(&self) -> &dyn FlightControlSystem {
        self.fcs.as_ref()
    }

    pub fn fcs_mut(&mut self) -> &mut dyn FlightControlSystem {
        self.fcs.as_mut()
    }
}

#[cfg(test)]
pub(crate) mod test_doubles {
    use super::*;

    #[derive(Default)]
    pub struct StubPropagate;
    impl Propagate for StubPropagate {
        fn altitude_msl_ft(&self) -> f64 {
            1000.0
        }
        fn altitude_agl_ft(&self) -> f64 {
            1000.0
        }
        fn euler_angles_rad(&self) -> (f64, f64, f64) {
            (0.0, 0.0, 0.0)
        }
        fn body_velocity_derivative_fps2(&self) -> Vector3<f64> {
            Vector3::zeros()
        }
        fn angular_rate_derivative_rps2(&self) -> Vector3<f64> {
            Vector3::zeros()
        }
        fn sin_cos_euler(&self) -> ((f64, f64), (f64, f64), (f64, f64)) {
            ((0.0, 1.0), (0.0, 1.0), (0.0, 1.0))
        }
        fn terrain_contact(&self) -> bool {
            false
        }
        fn terrain_normal_ned(&self) -> Vector3<f64> {
            Vector3::new(0.0, 0.0, -1.0)
        }
        fn run_tick(&mut self, _ic: &InitialCondition) {}
    }

    #[derive(Default)]
    pub struct StubAerodynamics {
        pub alpha: f64,
        pub beta: f64,
    }
    impl Aerodynamics for StubAerodynamics {
        fn alpha_limits_rad(&self) -> (f64, f64) {
            (-0.35, 0.35)
        }
        fn alpha_rad(&self) -> f64 {
            self.alpha
        }
        fn beta_rad(&self) -> f64 {
            self.beta
        }
    }

    #[derive(Default)]
    pub struct StubPropulsion {
        pub engines: usize,
    }
    impl Propulsion for StubPropulsion {
        fn engine_count(&self) -> usize {
            self.engines
        }
        fn throttle_limits(&self, _engine_index: usize) -> Result<(f64, f64), FlightCoreError> {
            Ok((0.0, 1.0))
        }
        fn run_steady_state_solver(&mut self) -> Result<(), FlightCoreError> {
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct StubGroundReactions {
        pub gear: Vec<(bool, Vector3<f64>)>,
    }
    impl GroundReactions for StubGroundReactions {
        fn gear_count(&self) -> usize {
            self.gear.len()
        }
        fn weight_on_wheels(&self, gear_index: usize) -> Result<bool, FlightCoreError> {
            self.gear
                .get(gear_index)
                .map(|(w, _)| *w)
                .ok_or_else(|| FlightCoreError::OutOfRange("gear index".into()))
        }
        fn gear_location_body(&self, gear_index: usize) -> Result<Vector3<f64>, FlightCoreError> {
            self.gear
                .get(gear_index)
                .map(|(_, l)| *l)
                .ok_or_else(|| FlightCoreError::OutOfRange("gear index".into()))
        }
        fn gear_location_local(&self, gear_index: usize) -> Result<Vector3<f64>, FlightCoreError> {
            self.gear_location_body(gear_index)
        }
        fn set_reporting_enabled(&mut self, _enabled: bool) {}
    }

    pub struct StubInertial {
        pub gravity: f64,
        pub radius: f64,
    }
    impl Default for StubInertial {
        fn default() -> Self {
            Self {
                gravity: 32.174,
                radius: 20_925_646.32,
            }
        }
    }
    impl Inertial for StubInertial {
        fn reference_radius_ft(&self) -> f64 {
            self.radius
        }
        fn gravity_fps2(&self, _location_ned: Vector3<f64>) -> f64 {
            self.gravity
        }
        fn agl_ft(&self, location_ned: Vector3<f64>) -> f64 {
            -location_ned.z
        }
    }

    #[derive(Default)]
    pub struct StubFcs {
        pub throttle: f64,
        pub elevator: f64,
        pub aileron: f64,
        pub rudder: f64,
        pub pitch_trim: f64,
        pub roll_trim: f64,
        pub yaw_trim: f64,
    }
    impl FlightControlSystem for StubFcs {
        fn set_throttle_cmd(&mut self, value: f64) {
            self.throttle = value;
        }
        fn set_elevator_cmd(&mut self, value: f64) {
            self.elevator = value;
        }
        fn elevator_cmd(&self) -> f64 {
            self.elevator
        }
        fn set_aileron_cmd(&mut self, value: f64) {
            self.aileron = value;
        }
        fn aileron_cmd(&self) -> f64 {
            self.aileron
        }
        fn set_rudder_cmd(&mut self, value: f64) {
            self.rudder = value;
        }
        fn rudder_cmd(&self) -> f64 {
            self.rudder
        }
        fn set_pitch_trim_cmd(&mut self, value: f64) {
            self.pitch_trim = value;
        }
        fn pitch_trim_cmd(&self) -> f64 {
            self.pitch_trim
        }
        fn set_roll_trim_cmd(&mut self, value: f64) {
            self.roll_trim = value;
        }
        fn roll_trim_cmd(&self) -> f64 {
            self.roll_trim
        }
        fn set_yaw_trim_cmd(&mut self, value: f64) {
            self.yaw_trim = value;
        }
        fn yaw_trim_cmd(&self) -> f64 {
            self.yaw_trim
        }
    }

    #[test]
    fn executive_hands_out_handles_without_back_pointers() {
        let exec = Executive::new(
            Box::new(StubPropagate),
            Box::new(StubAerodynamics::default()),
            Box::new(StubPropulsion { engines: 1 }),
            Box::new(StubGroundReactions::default()),
            Box::new(StubInertial::default()),
            Box::new(StubFcs::default()),
        );
        assert_eq!(exec.propagate().altitude_msl_ft(), 1000.0);
        assert_eq!(exec.propulsion().engine_count(), 1);
    }
}

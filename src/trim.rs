//! Trim Engine (component E): per-axis (state, control)
//! root finding that drives selected accelerations to zero by adjusting
//! selected controls, using the same two-phase bracket-and-regula-falsi
//! solver as the initial-condition solver (`math::rootfinder`).

use nalgebra::Vector3;

use crate::atmosphere::Atmosphere;
use crate::collaborators::Executive;
use crate::error::FlightCoreError;
use crate::ic::solver::InitialCondition;
use crate::logging::{Level, Logger, NoopLogger};
use crate::math::quaternion::wrap_pi;
use crate::math::rootfinder::{solve_mut, RootOutcome, SolverConfig};

/// Accelerations (and the two derived scalars `hmgt`/`nlf`) the engine can
/// drive to a target value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateTag {
    Udot,
    Vdot,
    Wdot,
    Pdot,
    Qdot,
    Rdot,
    /// Heading minus ground track.
    Hmgt,
    /// Normal load factor.
    Nlf,
}

/// Controls the engine may adjust to drive a [`StateTag`] to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlTag {
    Throttle,
    Alpha,
    Beta,
    Elevator,
    Aileron,
    Rudder,
    PitchTrim,
    RollTrim,
    YawTrim,
    Agl,
    Theta,
    Phi,
    Gamma,
    Heading,
}

/// One (state, control) pair and its solver bookkeeping. Created when a
/// trim mode is selected (or via `add_axis`); destroyed on mode change or
/// explicit removal.
#[derive(Debug, Clone, Copy)]
pub struct TrimAxis {
    pub state: StateTag,
    pub control: ControlTag,
    pub state_target: f64,
    pub control_min: f64,
    pub control_max: f64,
    pub tolerance: f64,
    pub solver_epsilon: f64,
    pub iterations: usize,
    pub last_state: f64,
    pub last_control: f64,
}

/// Per-axis outcome, reported through the property bridge after a `run()`.
#[derive(Debug, Clone)]
pub struct AxisReport {
    pub state: StateTag,
    pub control: ControlTag,
    pub iterations: usize,
    pub succeeded: bool,
    pub final_state: f64,
    pub final_control: f64,
    pub state_target: f64,
    pub tolerance: f64,
}

/// Declarative axis-list presets, dispatched at `configure`. `Custom` and
/// `None` start from an empty axis list the caller builds up with
/// `add_axis`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimMode {
    Longitudinal,
    Full,
    Ground,
    Pullup,
    Turn,
    Custom,
    None,
}

/// Result of a successful `run()`.
#[derive(Debug, Clone)]
pub struct TrimOutcome {
    pub succeeded: bool,
    pub reports: Vec<AxisReport>,
}

fn default_tolerance(state: StateTag) -> f64 {
    match state {
        StateTag::Udot | StateTag::Vdot | StateTag::Wdot => 1e-3,
        StateTag::Pdot | StateTag::Qdot | StateTag::Rdot => 1e-4,
        StateTag::Hmgt => 1e-2,
        StateTag::Nlf => 1e-5,
    }
}

fn default_control_bounds(control: ControlTag, exec: &Executive) -> (f64, f64) {
    match control {
        ControlTag::Throttle => {
            if exec.propulsion().engine_count() > 0 {
                exec.propulsion().throttle_limits(0).unwrap_or((0.0, 1.0))
            } else {
                (0.0, 1.0)
            }
        }
        ControlTag::Alpha => exec.aerodynamics().alpha_limits_rad(),
        ControlTag::Beta => (-20f64.to_radians(), 20f64.to_radians()),
        ControlTag::Elevator
        | ControlTag::Aileron
        | ControlTag::Rudder
        | ControlTag::PitchTrim
        | ControlTag::RollTrim
        | ControlTag::YawTrim => (-1.0, 1.0),
        ControlTag::Agl => (0.0, 60_000.0),
        ControlTag::Theta | ControlTag::Phi | ControlTag::Gamma => {
            (-89f64.to_radians(), 89f64.to_radians())
        }
        ControlTag::Heading => (-std::f64::consts::PI, std::f64::consts::PI),
    }
}

fn mode_axes(mode: TrimMode) -> Vec<(StateTag, ControlTag)> {
    use ControlTag::*;
    use StateTag::*;
    match mode {
        TrimMode::Longitudinal => vec![(Wdot, Alpha), (Udot, Throttle), (Qdot, PitchTrim)],
        TrimMode::Full => {
            let mut axes = mode_axes(TrimMode::Longitudinal);
            axes.extend([(Hmgt, Beta), (Vdot, Phi), (Pdot, Aileron), (Rdot, Rudder)]);
            axes
        }
        TrimMode::Ground => vec![(Wdot, Agl), (Qdot, Theta)],
        TrimMode::Pullup => vec![
            (Nlf, Alpha),
            (Udot, Throttle),
            (Qdot, PitchTrim),
            (Hmgt, Beta),
            (Vdot, Phi),
            (Pdot, Aileron),
            (Rdot, Rudder),
        ],
        TrimMode::Turn => vec![
            (Wdot, Alpha),
            (Udot, Throttle),
            (Qdot, PitchTrim),
            (Vdot, Beta),
            (Pdot, Aileron),
            (Rdot, Rudder),
        ],
        TrimMode::Custom | TrimMode::None => Vec::new(),
    }
}

fn within_tolerance(axis: &TrimAxis) -> bool {
    (axis.last_state - axis.state_target).abs() <= axis.tolerance
}

fn axis_report(axis: &TrimAxis) -> AxisReport {
    AxisReport {
        state: axis.state,
        control: axis.control,
        iterations: axis.iterations,
        succeeded: within_tolerance(axis),
        final_state: axis.last_state,
        final_control: axis.last_control,
        state_target: axis.state_target,
        tolerance: axis.tolerance,
    }
}

fn ic_location_ned(ic: &InitialCondition) -> Vector3<f64> {
    Vector3::new(0.0, 0.0, -ic.altitude_asl_ft())
}

fn set_control(
    control: ControlTag,
    value: f64,
    ic: &mut InitialCondition,
    atm: &Atmosphere,
    exec: &mut Executive,
) -> Result<(), FlightCoreError> {
    match control {
        ControlTag::Throttle => {
            exec.fcs_mut().set_throttle_cmd(value);
            Ok(())
        }
        ControlTag::Alpha => ic.set_alpha_rad(value),
        ControlTag::Beta => ic.set_beta_rad(value, atm),
        ControlTag::Elevator => {
            exec.fcs_mut().set_elevator_cmd(value);
            Ok(())
        }
        ControlTag::Aileron => {
            exec.fcs_mut().set_aileron_cmd(value);
            Ok(())
        }
        ControlTag::Rudder => {
            exec.fcs_mut().set_rudder_cmd(value);
            Ok(())
        }
        ControlTag::PitchTrim => {
            exec.fcs_mut().set_pitch_trim_cmd(value);
            Ok(())
        }
        ControlTag::RollTrim => {
            exec.fcs_mut().set_roll_trim_cmd(value);
            Ok(())
        }
        ControlTag::YawTrim => {
            exec.fcs_mut().set_yaw_trim_cmd(value);
            Ok(())
        }
        ControlTag::Agl => ic.set_altitude_agl_ft(value, atm),
        ControlTag::Theta => ic.set_theta_rad(value),
        ControlTag::Phi => {
            ic.set_phi_rad(value);
            Ok(())
        }
        ControlTag::Gamma => ic.set_gamma_rad(value),
        ControlTag::Heading => {
            ic.set_psi_rad(value);
            Ok(())
        }
    }
}

fn read_state(state: StateTag, ic: &InitialCondition, exec: &Executive) -> f64 {
    match state {
        StateTag::Udot => exec.propagate().body_velocity_derivative_fps2().x,
        StateTag::Vdot => exec.propagate().body_velocity_derivative_fps2().y,
        StateTag::Wdot => exec.propagate().body_velocity_derivative_fps2().z,
        StateTag::Pdot => exec.propagate().angular_rate_derivative_rps2().x,
        StateTag::Qdot => exec.propagate().angular_rate_derivative_rps2().y,
        StateTag::Rdot => exec.propagate().angular_rate_derivative_rps2().z,
        StateTag::Hmgt => {
            let (_, _, psi) = ic.orientation.euler_rad();
            let ned = ic.ned_velocity_fps();
            let track = ned.y.atan2(ned.x);
            wrap_pi(psi - track)
        }
        StateTag::Nlf => {
            let wdot = exec.propagate().body_velocity_derivative_fps2().z;
            let g = exec.inertial().gravity_fps2(ic_location_ned(ic));
            1.0 - wdot / g
        }
    }
}

/// Recomputes turn/pullup target angular rates ahead of the axis loop
///: `p = -psi_dot*sin(theta)`, `q = psi_dot*cos(theta)*sin(phi)`,
/// `r = psi_dot*cos(theta)*cos(phi)` with `psi_dot = g*tan(phi)/u` for turn;
/// `q = g*(nlf - cos(gamma))/vt` for pullup.
fn update_mode_kinematics(mode: TrimMode, ic: &mut InitialCondition, exec: &Executive, target_nlf: f64) {
    match mode {
        TrimMode::Turn => {
            let (phi, theta, _psi) = ic.orientation.euler_rad();
            let u = ic.body_kinematics().u_fps.abs().max(1.0);
            let g = exec.inertial().gravity_fps2(ic_location_ned(ic));
            let psi_dot = g * phi.tan() / u;
            let p = -psi_dot * theta.sin();
            let q = psi_dot * theta.cos() * phi.sin();
            let r = psi_dot * theta.cos() * phi.cos();
            ic.set_angular_rates_rps(p, q, r);
        }
        TrimMode::Pullup => {
            let gamma = ic.gamma_rad();
            let vt = ic.vt_fps().max(1.0);
            let g = exec.inertial().gravity_fps2(ic_location_ned(ic));
            let q = g * (target_nlf - gamma.cos()) / vt;
            ic.set_angular_rates_rps(0.0, q, 0.0);
        }
        _ => {}
    }
}

/// Adjusts theta in one-degree steps (capped at 100) until the forward and
/// rearward gear units report equal local z-position, pre-leveling the
/// aircraft before ground-mode wdot/qdot trimming begins.
fn init_theta(ic: &mut InitialCondition, exec: &mut Executive) -> Result<(), FlightCoreError> {
    let (forward_idx, rearward_idx) = {
        let gr = exec.ground_reactions();
        let n = gr.gear_count();
        if n < 2 {
            return Ok(());
        }
        let mut forward_idx = 0;
        let mut rearward_idx = 0;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_x = f64::INFINITY;
        for i in 0..n {
            let x = gr.gear_location_body(i)?.x;
            if x > max_x {
                max_x = x;
                forward_idx = i;
            }
            if x < min_x {
                min_x = x;
                rearward_idx = i;
            }
        }
        (forward_idx, rearward_idx)
    };

    let step = 1f64.to_radians();
    for _ in 0..100 {
        exec.propagate_mut().run_tick(ic);
        let gr = exec.ground_reactions();
        let fwd_z = gr.gear_location_local(forward_idx)?.z;
        let rear_z = gr.gear_location_local(rearward_idx)?.z;
        if (fwd_z - rear_z).abs() < 0.1 {
            return Ok(());
        }
        let (_, theta, _) = ic.orientation.euler_rad();
        let delta = if fwd_z > rear_z { -step } else { step };
        ic.set_theta_rad(theta + delta)?;
    }
    Ok(())
}

/// Runs the bracket-and-regula-falsi solver for one axis, mutating `ic` and
/// `exec` on every probe. Leaves `axis.last_control`/`axis.last_state` at
/// whatever the final probe produced even when the solve does not converge,
/// so the caller can report it.
fn trim_one_axis(
    axis: &mut TrimAxis,
    ic: &mut InitialCondition,
    atm: &Atmosphere,
    exec: &mut Executive,
    max_subcycles: usize,
) -> Result<(), FlightCoreError> {
    let state = axis.state;
    let control = axis.control;
    let target = axis.state_target;
    let cfg = SolverConfig {
        bounds: (axis.control_min, axis.control_max),
        initial_step: ((axis.control_max - axis.control_min).abs() * 0.05).max(1e-3),
        step_growth: 2.0,
        max_expansions: max_subcycles,
        relaxation: axis.solver_epsilon,
        max_inner_iterations: 100,
        func_tolerance: axis.tolerance,
        width_tolerance: 1e-5,
    };
    let guess = axis.last_control.clamp(axis.control_min, axis.control_max);

    let mut iterations = 0usize;
    let mut set_err: Option<FlightCoreError> = None;
    let mut last_probed_control = guess;
    let outcome = {
        let set_err = &mut set_err;
        let last_probed_control = &mut last_probed_control;
        solve_mut(
            |c| {
                iterations += 1;
                *last_probed_control = c;
                if let Err(e) = set_control(control, c, ic, atm, exec) {
                    *set_err = Some(e);
                    return 0.0;
                }
                exec.propagate_mut().run_tick(ic);
                read_state(state, ic, exec) - target
            },
            guess,
            &cfg,
        )
    };
    axis.iterations = iterations;
    if let Some(e) = set_err {
        return Err(e);
    }

    axis.last_control = match outcome {
        RootOutcome::Converged(c) => {
            set_control(control, c, ic, atm, exec)?;
            exec.propagate_mut().run_tick(ic);
            c
        }
        RootOutcome::NoBracket | RootOutcome::NoConverge => last_probed_control,
    };
    axis.last_state = read_state(state, ic, exec);
    Ok(())
}

/// The iterative state/control pairing solver.
pub struct TrimEngine {
    mode: TrimMode,
    axes: Vec<TrimAxis>,
    max_cycles: usize,
    max_subcycles: usize,
    target_nlf: f64,
    fallback_enabled: bool,
    tolerance_override: Option<f64>,
    logger: Box<dyn Logger>,
}

impl Default for TrimEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TrimEngine {
    pub fn new() -> Self {
        Self {
            mode: TrimMode::None,
            axes: Vec::new(),
            max_cycles: 60,
            max_subcycles: 50,
            target_nlf: 1.0,
            fallback_enabled: true,
            tolerance_override: None,
            logger: Box::new(NoopLogger),
        }
    }

    pub fn with_logger(logger: Box<dyn Logger>) -> Self {
        Self {
            logger,
            ..Self::new()
        }
    }

    pub fn mode(&self) -> TrimMode {
        self.mode
    }

    pub fn axes(&self) -> &[TrimAxis] {
        &self.axes
    }

    fn push_axis(&mut self, state: StateTag, control: ControlTag, exec: &Executive) {
        let (lo, hi) = default_control_bounds(control, exec);
        let target = if state == StateTag::Nlf { self.target_nlf } else { 0.0 };
        self.axes.push(TrimAxis {
            state,
            control,
            state_target: target,
            control_min: lo,
            control_max: hi,
            tolerance: self.tolerance_override.unwrap_or_else(|| default_tolerance(state)),
            solver_epsilon: 0.9,
            iterations: 0,
            last_state: 0.0,
            last_control: (lo + hi) * 0.5,
        });
    }

    /// Dispatches the declarative axis list for `mode`.
    pub fn configure(&mut self, mode: TrimMode, exec: &Executive) {
        self.mode = mode;
        self.axes.clear();
        for (state, control) in mode_axes(mode) {
            self.push_axis(state, control, exec);
        }
        self.logger.record(
            Level::Info,
            &format!("trim configured: mode={mode:?}, axes={}", self.axes.len()),
        );
    }

    pub fn add_axis(&mut self, state: StateTag, control: ControlTag, exec: &Executive) {
        self.axes.retain(|a| a.state != state);
        self.push_axis(state, control, exec);
    }

    pub fn remove_axis(&mut self, state: StateTag) {
        self.axes.retain(|a| a.state != state);
    }

    pub fn replace_axis_control(&mut self, state: StateTag, new_control: ControlTag, exec: &Executive) {
        if let Some(axis) = self.axes.iter_mut().find(|a| a.state == state) {
            let (lo, hi) = default_control_bounds(new_control, exec);
            axis.control = new_control;
            axis.control_min = lo;
            axis.control_max = hi;
            axis.last_control = (lo + hi) * 0.5;
        }
    }

    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.tolerance_override = Some(tolerance);
        for axis in &mut self.axes {
            axis.tolerance = tolerance;
        }
    }

    pub fn set_max_cycles(&mut self, n: usize) {
        self.max_cycles = n;
    }

    pub fn set_max_subcycles(&mut self, n: usize) {
        self.max_subcycles = n;
    }

    pub fn set_target_load_factor(&mut self, nlf: f64) {
        self.target_nlf = nlf;
        for axis in &mut self.axes {
            if axis.state == StateTag::Nlf {
                axis.state_target = nlf;
            }
        }
    }

    pub fn set_fallback_enabled(&mut self, enabled: bool) {
        self.fallback_enabled = enabled;
    }

    /// Top-level loop: iterate axes in configured order
    /// until every axis is within tolerance or `max_cycles` is reached.
    pub fn run(
        &mut self,
        ic: &mut InitialCondition,
        atm: &Atmosphere,
        exec: &mut Executive,
    ) -> Result<TrimOutcome, FlightCoreError> {
        if self.mode == TrimMode::Ground {
            init_theta(ic, exec)?;
        }

        let mut succeeded = false;
        for _ in 0..self.max_cycles {
            update_mode_kinematics(self.mode, ic, exec, self.target_nlf);
            for idx in 0..self.axes.len() {
                let mut axis = self.axes[idx];
                trim_one_axis(&mut axis, ic, atm, exec, self.max_subcycles)?;
                self.axes[idx] = axis;
            }
            if self.axes.iter().all(within_tolerance) {
                succeeded = true;
                break;
            }
        }

        if !succeeded && self.fallback_enabled {
            succeeded = self.try_udot_throttle_fallback(ic, atm, exec)?;
        }

        let reports: Vec<AxisReport> = self.axes.iter().map(axis_report).collect();
        self.logger.record(
            if succeeded { Level::Info } else { Level::Warn },
            &format!("trim run finished: succeeded={succeeded}, axes={}", reports.len()),
        );

        if succeeded {
            Ok(TrimOutcome {
                succeeded: true,
                reports,
            })
        } else {
            Err(FlightCoreError::TrimFailed { report: reports })
        }
    }

    /// If (udot, throttle) is the sole remaining untrimmed axis and its
    /// interval is saturated, saturates throttle and retries against gamma.
    /// User-disableable via `set_fallback_enabled`.
    fn try_udot_throttle_fallback(
        &mut self,
        ic: &mut InitialCondition,
        atm: &Atmosphere,
        exec: &mut Executive,
    ) -> Result<bool, FlightCoreError> {
        let out_of_tol: Vec<usize> = self
            .axes
            .iter()
            .enumerate()
            .filter(|(_, a)| !within_tolerance(a))
            .map(|(i, _)| i)
            .collect();
        if out_of_tol.len() != 1 {
            return Ok(false);
        }
        let idx = out_of_tol[0];
        if self.axes[idx].state != StateTag::Udot || self.axes[idx].control != ControlTag::Throttle {
            return Ok(false);
        }

        let (lo, hi) = (self.axes[idx].control_min, self.axes[idx].control_max);
        let target = self.axes[idx].state_target;
        let tolerance = self.axes[idx].tolerance;
        let solver_epsilon = self.axes[idx].solver_epsilon;

        set_control(ControlTag::Throttle, lo, ic, atm, exec)?;
        exec.propagate_mut().run_tick(ic);
        let r_lo = (read_state(StateTag::Udot, ic, exec) - target).abs();
        set_control(ControlTag::Throttle, hi, ic, atm, exec)?;
        exec.propagate_mut().run_tick(ic);
        let r_hi = (read_state(StateTag::Udot, ic, exec) - target).abs();
        let saturated = if r_lo <= r_hi { lo } else { hi };
        set_control(ControlTag::Throttle, saturated, ic, atm, exec)?;
        exec.propagate_mut().run_tick(ic);

        self.logger.record(
            Level::Warn,
            &format!("udot/throttle saturated at {saturated:.3}; retrying via gamma"),
        );

        let (glo, ghi) = default_control_bounds(ControlTag::Gamma, exec);
        let mut gamma_axis = TrimAxis {
            state: StateTag::Udot,
            control: ControlTag::Gamma,
            state_target: target,
            control_min: glo,
            control_max: ghi,
            tolerance,
            solver_epsilon,
            iterations: 0,
            last_state: read_state(StateTag::Udot, ic, exec),
            last_control: ic.gamma_rad(),
        };
        trim_one_axis(&mut gamma_axis, ic, atm, exec, self.max_subcycles)?;
        let converged = within_tolerance(&gamma_axis);
        self.axes[idx] = gamma_axis;
        Ok(converged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::test_doubles::{
        StubAerodynamics, StubFcs, StubGroundReactions, StubInertial,
    };
    use crate::collaborators::{FlightControlSystem, GroundReactions, Inertial, Propagate, Propulsion};
    use crate::logging::NoopLogger;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct PlantState {
        throttle: f64,
        pitch_trim: f64,
        elevator: f64,
        aileron: f64,
        rudder: f64,
        roll_trim: f64,
        yaw_trim: f64,
        udot: f64,
        wdot: f64,
        theta_rad: f64,
    }

    struct MockFcs(Rc<RefCell<PlantState>>);
    impl FlightControlSystem for MockFcs {
        fn set_throttle_cmd(&mut self, value: f64) {
            self.0.borrow_mut().throttle = value;
        }
        fn set_elevator_cmd(&mut self, value: f64) {
            self.0.borrow_mut().elevator = value;
        }
        fn elevator_cmd(&self) -> f64 {
            self.0.borrow().elevator
        }
        fn set_aileron_cmd(&mut self, value: f64) {
            self.0.borrow_mut().aileron = value;
        }
        fn aileron_cmd(&self) -> f64 {
            self.0.borrow().aileron
        }
        fn set_rudder_cmd(&mut self, value: f64) {
            self.0.borrow_mut().rudder = value;
        }
        fn rudder_cmd(&self) -> f64 {
            self.0.borrow().rudder
        }
        fn set_pitch_trim_cmd(&mut self, value: f64) {
            self.0.borrow_mut().pitch_trim = value;
        }
        fn pitch_trim_cmd(&self) -> f64 {
            self.0.borrow().pitch_trim
        }
        fn set_roll_trim_cmd(&mut self, value: f64) {
            self.0.borrow_mut().roll_trim = value;
        }
        fn roll_trim_cmd(&self) -> f64 {
            self.0.borrow().roll_trim
        }
        fn set_yaw_trim_cmd(&mut self, value: f64) {
            self.0.borrow_mut().yaw_trim = value;
        }
        fn yaw_trim_cmd(&self) -> f64 {
            self.0.borrow().yaw_trim
        }
    }

    /// Linear longitudinal response: `wdot = 10*(alpha - 0.05) + 0.5*pitch_trim`,
    /// `udot = 20*(throttle - 0.5) - 2*alpha`. Both axes have a well-posed
    /// interior root, unlike the always-zero `StubPropagate`.
    struct MockPropagate(Rc<RefCell<PlantState>>);
    impl Propagate for MockPropagate {
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
            let s = self.0.borrow();
            Vector3::new(s.udot, 0.0, s.wdot)
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
        fn run_tick(&mut self, ic: &InitialCondition) {
            let alpha = ic.alpha_rad();
            let mut s = self.0.borrow_mut();
            s.wdot = 10.0 * (alpha - 0.05) + 0.5 * s.pitch_trim;
            s.udot = 20.0 * (s.throttle - 0.5) - 2.0 * alpha;
        }
    }

    #[derive(Default)]
    struct MockPropulsion;
    impl Propulsion for MockPropulsion {
        fn engine_count(&self) -> usize {
            1
        }
        fn throttle_limits(&self, _engine_index: usize) -> Result<(f64, f64), FlightCoreError> {
            Ok((0.0, 1.0))
        }
        fn run_steady_state_solver(&mut self) -> Result<(), FlightCoreError> {
            Ok(())
        }
    }

    fn longitudinal_executive() -> (Executive, Rc<RefCell<PlantState>>) {
        let plant = Rc::new(RefCell::new(PlantState::default()));
        let exec = Executive::new(
            Box::new(MockPropagate(plant.clone())),
            Box::new(StubAerodynamics::default()),
            Box::new(MockPropulsion),
            Box::new(StubGroundReactions::default()),
            Box::new(StubInertial::default()),
            Box::new(MockFcs(plant.clone())),
        );
        (exec, plant)
    }

    #[test]
    fn longitudinal_trim_converges_wdot_alpha_and_udot_throttle() {
        let (mut exec, _plant) = longitudinal_executive();
        let mut ic = InitialCondition::new();
        let atm = Atmosphere::default();

        let mut engine = TrimEngine::new();
        engine.configure(TrimMode::Longitudinal, &exec);
        assert_eq!(engine.axes().len(), 3);

        let outcome = engine.run(&mut ic, &atm, &mut exec).expect("trim converges");
        assert!(outcome.succeeded);
        assert_eq!(outcome.reports.len(), 3);

        let alpha_report = outcome
            .reports
            .iter()
            .find(|r| matches!(r.state, StateTag::Wdot))
            .unwrap();
        assert!((alpha_report.final_control - 0.05).abs() < 1e-2);

        let throttle_report = outcome
            .reports
            .iter()
            .find(|r| matches!(r.state, StateTag::Udot))
            .unwrap();
        assert!((throttle_report.final_control - 0.505).abs() < 1e-2);
    }

    #[test]
    fn mode_dispatch_builds_expected_axis_lists() {
        let (exec, _plant) = longitudinal_executive();
        let mut engine = TrimEngine::new();

        engine.configure(TrimMode::Longitudinal, &exec);
        let axes: Vec<(StateTag, ControlTag)> = engine.axes().iter().map(|a| (a.state, a.control)).collect();
        assert_eq!(
            axes,
            vec![
                (StateTag::Wdot, ControlTag::Alpha),
                (StateTag::Udot, ControlTag::Throttle),
                (StateTag::Qdot, ControlTag::PitchTrim),
            ]
        );

        engine.configure(TrimMode::Full, &exec);
        assert_eq!(engine.axes().len(), 7);

        engine.configure(TrimMode::Ground, &exec);
        let axes: Vec<(StateTag, ControlTag)> = engine.axes().iter().map(|a| (a.state, a.control)).collect();
        assert_eq!(
            axes,
            vec![(StateTag::Wdot, ControlTag::Agl), (StateTag::Qdot, ControlTag::Theta)]
        );

        engine.configure(TrimMode::Custom, &exec);
        assert!(engine.axes().is_empty());
    }

    #[test]
    fn set_target_load_factor_updates_existing_nlf_axis() {
        let (exec, _plant) = longitudinal_executive();
        let mut engine = TrimEngine::new();
        engine.configure(TrimMode::Pullup, &exec);
        engine.set_target_load_factor(2.5);
        let nlf_axis = engine.axes().iter().find(|a| a.state == StateTag::Nlf).unwrap();
        assert_eq!(nlf_axis.state_target, 2.5);
    }

    struct MockGroundReactions {
        theta: Rc<RefCell<f64>>,
        positions: [(f64, f64); 2],
    }
    impl GroundReactions for MockGroundReactions {
        fn gear_count(&self) -> usize {
            2
        }
        fn weight_on_wheels(&self, _gear_index: usize) -> Result<bool, FlightCoreError> {
            Ok(true)
        }
        fn gear_location_body(&self, gear_index: usize) -> Result<Vector3<f64>, FlightCoreError> {
            let (x, z) = self.positions[gear_index];
            Ok(Vector3::new(x, 0.0, z))
        }
        fn gear_location_local(&self, gear_index: usize) -> Result<Vector3<f64>, FlightCoreError> {
            let (x, z) = self.positions[gear_index];
            let theta = *self.theta.borrow();
            Ok(Vector3::new(x, 0.0, x * theta.sin() + z * theta.cos()))
        }
        fn set_reporting_enabled(&mut self, _enabled: bool) {}
    }

    struct ThetaTrackingPropagate(Rc<RefCell<f64>>);
    impl Propagate for ThetaTrackingPropagate {
        fn altitude_msl_ft(&self) -> f64 {
            0.0
        }
        fn altitude_agl_ft(&self) -> f64 {
            0.0
        }
        fn euler_angles_rad(&self) -> (f64, f64, f64) {
            (0.0, *self.0.borrow(), 0.0)
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
            true
        }
        fn terrain_normal_ned(&self) -> Vector3<f64> {
            Vector3::new(0.0, 0.0, -1.0)
        }
        fn run_tick(&mut self, ic: &InitialCondition) {
            *self.0.borrow_mut() = ic.orientation.euler_rad().1;
        }
    }

    #[test]
    fn ground_mode_levels_forward_and_rearward_gear() {
        let theta = Rc::new(RefCell::new(0.0));
        let mut exec = Executive::new(
            Box::new(ThetaTrackingPropagate(theta.clone())),
            Box::new(StubAerodynamics::default()),
            Box::new(MockPropulsion),
            Box::new(MockGroundReactions {
                theta: theta.clone(),
                positions: [(5.0, 2.0), (-5.0, 2.5)],
            }),
            Box::new(StubInertial::default()),
            Box::new(StubFcs::default()),
        );
        let mut ic = InitialCondition::new();

        init_theta(&mut ic, &mut exec).expect("init_theta does not fail");

        let gr = exec.ground_reactions();
        let fwd = gr.gear_location_local(0).unwrap().z;
        let rear = gr.gear_location_local(1).unwrap().z;
        assert!((fwd - rear).abs() < 0.3);
    }

    #[test]
    fn fallback_disabled_reports_failure_without_switching_control() {
        // Throttle bounds (0, 0.1) make udot unreachable (root at ~0.505) so
        // the bracket search saturates; with the fallback disabled this must
        // surface as TrimFailed rather than silently switching to gamma.
        let (mut exec, plant) = longitudinal_executive();
        plant.borrow_mut().pitch_trim = 0.0;
        let mut ic = InitialCondition::new();
        let atm = Atmosphere::default();

        let mut engine = TrimEngine::new();
        engine.configure(TrimMode::Longitudinal, &exec);
        for axis in engine.axes.iter_mut() {
            if axis.control == ControlTag::Throttle {
                axis.control_min = 0.0;
                axis.control_max = 0.1;
                axis.last_control = 0.05;
            }
        }
        engine.set_fallback_enabled(false);
        engine.set_max_cycles(5);

        let err = engine.run(&mut ic, &atm, &mut exec).unwrap_err();
        assert!(matches!(err, FlightCoreError::TrimFailed { .. }));
    }

    #[test]
    fn with_logger_accepts_injected_logger() {
        let engine = TrimEngine::with_logger(Box::new(NoopLogger));
        assert_eq!(engine.mode(), TrimMode::None);
    }
}

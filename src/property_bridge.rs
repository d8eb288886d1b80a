//! Property Bridge (component G): a process-wide
//! name-to-accessor registry. Each node binds a string path (e.g.
//! `atmosphere/T-R`, `ic/vc-kts`, `fcs/elevator-cmd-norm`) to a
//! getter-and-optional-setter pair. "Process-wide" here is implemented as
//! lifetime-bound rather than `'static`: the core is single-threaded and
//! cooperative, so a bridge borrowing its bound components for as long
//! as it lives satisfies "queries and writes are serialized by the
//! single-threaded core" without reaching for a global singleton, which
//! would force every bound component to be `'static` for no benefit here.
//!
//! Full XML-initialization dispatch ("recognized elements...are dispatched
//! to the corresponding setter through this registry") is implemented by
//! [`crate::ic::solver::InitialCondition::load`], which already carries the
//! version check, unit conversions, and per-setter error handling tested in
//! `ic::solver`; duplicating that logic here as property-path lookups would
//! only desynchronize from it. [`dispatch_document`] demonstrates the
//! registry-dispatch contract for the small subset of elements that map
//! one-to-one onto a bound path (`phi`, `theta`, `psi`, `alpha`, `beta`,
//! `targetNlf`) without re-deriving `load`'s schema handling.

use std::cell::RefCell;

use crate::atmosphere::Atmosphere;
use crate::collaborators::{Executive, FlightControlSystem};
use crate::error::FlightCoreError;
use crate::ic::document::Document;
use crate::ic::solver::InitialCondition;
use crate::logging::{Level, Logger, NoopLogger};

const FPS_PER_KNOT: f64 = 1.687_809_857;

type Getter<'a> = Box<dyn Fn() -> f64 + 'a>;
type Setter<'a> = Box<dyn FnMut(f64) + 'a>;

/// One bound path: a getter, and an optional setter for read-write nodes.
struct PropertyNode<'a> {
    path: String,
    get: Getter<'a>,
    set: Option<Setter<'a>>,
}

/// A name-to-accessor registry bound to components that outlive it.
pub struct PropertyBridge<'a> {
    nodes: Vec<PropertyNode<'a>>,
    logger: Box<dyn Logger>,
}

impl<'a> Default for PropertyBridge<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> PropertyBridge<'a> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            logger: Box::new(NoopLogger),
        }
    }

    pub fn with_logger(logger: Box<dyn Logger>) -> Self {
        Self {
            nodes: Vec::new(),
            logger,
        }
    }

    /// Registers a read-write node. Replaces any existing node at `path`.
    pub fn bind(&mut self, path: impl Into<String>, get: impl Fn() -> f64 + 'a, set: impl FnMut(f64) + 'a) {
        self.bind_node(path.into(), Box::new(get), Some(Box::new(set)));
    }

    /// Registers a read-only node. Replaces any existing node at `path`.
    pub fn bind_readonly(&mut self, path: impl Into<String>, get: impl Fn() -> f64 + 'a) {
        self.bind_node(path.into(), Box::new(get), None);
    }

    fn bind_node(&mut self, path: String, get: Getter<'a>, set: Option<Setter<'a>>) {
        self.nodes.retain(|n| n.path != path);
        self.logger.record(Level::Info, &format!("property bridge: bind {path}"));
        self.nodes.push(PropertyNode { path, get, set });
    }

    /// Removes the node at `path`, if any. Returns whether a node was removed.
    pub fn unbind(&mut self, path: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.path != path);
        let removed = self.nodes.len() != before;
        if removed {
            self.logger.record(Level::Info, &format!("property bridge: unbind {path}"));
        }
        removed
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.path.as_str())
    }

    pub fn is_writable(&self, path: &str) -> bool {
        self.nodes.iter().any(|n| n.path == path && n.set.is_some())
    }

    pub fn get(&self, path: &str) -> Result<f64, FlightCoreError> {
        self.nodes
            .iter()
            .find(|n| n.path == path)
            .map(|n| (n.get)())
            .ok_or_else(|| FlightCoreError::OutOfRange(format!("unbound property path: {path}")))
    }

    pub fn set(&mut self, path: &str, value: f64) -> Result<(), FlightCoreError> {
        match self.nodes.iter_mut().find(|n| n.path == path) {
            Some(node) => match node.set.as_mut() {
                Some(set) => {
                    set(value);
                    Ok(())
                }
                None => Err(FlightCoreError::OutOfRange(format!("property path is read-only: {path}"))),
            },
            None => {
                let err = FlightCoreError::OutOfRange(format!("unbound property path: {path}"));
                self.logger.error(&err);
                Err(err)
            }
        }
    }
}

/// Binds the `ic/*` category: airspeed, attitude, aerodynamic-angle, and
/// altitude nodes, read-write where the underlying `InitialCondition`
/// setter is infallible from a bound string path (setters that can fail,
/// e.g. an out-of-USSA-range altitude, are bound read-write too; a failed
/// internal conversion is swallowed into a no-op write rather than
/// surfaced, since `FnMut(f64)` has no error channel; callers needing the
/// error should call the `InitialCondition` setter directly instead of
/// going through the bridge).
pub fn bind_ic_properties<'a>(bridge: &mut PropertyBridge<'a>, ic: &'a RefCell<InitialCondition>, atm: &'a Atmosphere) {
    bridge.bind(
        "ic/vt-fps",
        {
            let ic = ic;
            move || ic.borrow().vt_fps()
        },
        {
            let ic = ic;
            move |v| {
                let _ = ic.borrow_mut().set_vt_fps(v, atm);
            }
        },
    );
    bridge.bind(
        "ic/vc-kts",
        {
            let ic = ic;
            move || ic.borrow().vc_fps() / FPS_PER_KNOT
        },
        {
            let ic = ic;
            move |v_kts| {
                let _ = ic.borrow_mut().set_vc_fps(v_kts * FPS_PER_KNOT, atm);
            }
        },
    );
    bridge.bind_readonly("ic/mach", {
        let ic = ic;
        move || ic.borrow().mach()
    });
    bridge.bind(
        "ic/alpha-rad",
        {
            let ic = ic;
            move || ic.borrow().alpha_rad()
        },
        {
            let ic = ic;
            move |v| {
                let _ = ic.borrow_mut().set_alpha_rad(v);
            }
        },
    );
    bridge.bind(
        "ic/beta-rad",
        {
            let ic = ic;
            move || ic.borrow().beta_rad()
        },
        {
            let ic = ic;
            move |v| {
                let _ = ic.borrow_mut().set_beta_rad(v, atm);
            }
        },
    );
    bridge.bind(
        "ic/phi-rad",
        {
            let ic = ic;
            move || ic.borrow().orientation.euler_rad().0
        },
        {
            let ic = ic;
            move |v| ic.borrow_mut().set_phi_rad(v)
        },
    );
    bridge.bind(
        "ic/theta-rad",
        {
            let ic = ic;
            move || ic.borrow().orientation.euler_rad().1
        },
        {
            let ic = ic;
            move |v| {
                let _ = ic.borrow_mut().set_theta_rad(v);
            }
        },
    );
    bridge.bind(
        "ic/psi-true-rad",
        {
            let ic = ic;
            move || ic.borrow().orientation.euler_rad().2
        },
        {
            let ic = ic;
            move |v| ic.borrow_mut().set_psi_rad(v)
        },
    );
    bridge.bind(
        "ic/h-sl-ft",
        {
            let ic = ic;
            move || ic.borrow().altitude_asl_ft()
        },
        {
            let ic = ic;
            move |v| {
                let _ = ic.borrow_mut().set_altitude_asl_ft(v, atm);
            }
        },
    );
    bridge.bind_readonly("ic/h-agl-ft", {
        let ic = ic;
        move || ic.borrow().altitude_agl_ft()
    });
    bridge.bind(
        "ic/gamma-rad",
        {
            let ic = ic;
            move || ic.borrow().gamma_rad()
        },
        {
            let ic = ic;
            move |v| {
                let _ = ic.borrow_mut().set_gamma_rad(v);
            }
        },
    );
}

/// Binds the `atmosphere/*` category, evaluated at the bound IC's current
/// altitude (the atmosphere model itself is altitude-parameterized, not
/// stateful over a "current" altitude; the bridge supplies one).
pub fn bind_atmosphere_properties<'a>(bridge: &mut PropertyBridge<'a>, atm: &'a Atmosphere, ic: &'a RefCell<InitialCondition>) {
    bridge.bind_readonly("atmosphere/T-R", {
        let (atm, ic) = (atm, ic);
        move || atm.temperature(ic.borrow().altitude_asl_ft()).unwrap_or(0.0)
    });
    bridge.bind_readonly("atmosphere/P-psf", {
        let (atm, ic) = (atm, ic);
        move || atm.pressure(ic.borrow().altitude_asl_ft()).unwrap_or(0.0)
    });
    bridge.bind_readonly("atmosphere/rho-slugs_ft3", {
        let (atm, ic) = (atm, ic);
        move || atm.density(ic.borrow().altitude_asl_ft()).unwrap_or(0.0)
    });
    bridge.bind_readonly("atmosphere/a-fps", {
        let (atm, ic) = (atm, ic);
        move || atm.sound_speed(ic.borrow().altitude_asl_ft()).unwrap_or(0.0)
    });
}

/// Binds the `fcs/*` category onto the executive's flight-control-system
/// collaborator.
pub fn bind_fcs_properties<'a>(bridge: &mut PropertyBridge<'a>, exec: &'a RefCell<Executive>) {
    bridge.bind(
        "fcs/elevator-cmd-norm",
        {
            let exec = exec;
            move || exec.borrow().fcs().elevator_cmd()
        },
        {
            let exec = exec;
            move |v| exec.borrow_mut().fcs_mut().set_elevator_cmd(v)
        },
    );
    bridge.bind(
        "fcs/aileron-cmd-norm",
        {
            let exec = exec;
            move || exec.borrow().fcs().aileron_cmd()
        },
        {
            let exec = exec;
            move |v| exec.borrow_mut().fcs_mut().set_aileron_cmd(v)
        },
    );
    bridge.bind(
        "fcs/rudder-cmd-norm",
        {
            let exec = exec;
            move || exec.borrow().fcs().rudder_cmd()
        },
        {
            let exec = exec;
            move |v| exec.borrow_mut().fcs_mut().set_rudder_cmd(v)
        },
    );
    bridge.bind(
        "fcs/pitch-trim-cmd-norm",
        {
            let exec = exec;
            move || exec.borrow().fcs().pitch_trim_cmd()
        },
        {
            let exec = exec;
            move |v| exec.borrow_mut().fcs_mut().set_pitch_trim_cmd(v)
        },
    );
    bridge.bind(
        "fcs/roll-trim-cmd-norm",
        {
            let exec = exec;
            move || exec.borrow().fcs().roll_trim_cmd()
        },
        {
            let exec = exec;
            move |v| exec.borrow_mut().fcs_mut().set_roll_trim_cmd(v)
        },
    );
    bridge.bind(
        "fcs/yaw-trim-cmd-norm",
        {
            let exec = exec;
            move || exec.borrow().fcs().yaw_trim_cmd()
        },
        {
            let exec = exec;
            move |v| exec.borrow_mut().fcs_mut().set_yaw_trim_cmd(v)
        },
    );
    // No node for throttle: `FlightControlSystem` exposes only a setter for
    // it, so there is no getter to bind read-back to.
}

/// Dispatches the small subset of initialization-document elements that map
/// one-to-one onto a bound path (`phi`, `theta`, `psi`, `alpha`, `beta`,
/// `targetNlf`). Unrecognized elements are ignored here; full-schema
/// dispatch (altitude variants, speeds, wind, trim mode, `running`, version
/// rejection) is `InitialCondition::load`'s responsibility.
pub fn dispatch_document(bridge: &mut PropertyBridge<'_>, doc: &Document) -> Result<(), FlightCoreError> {
    const ELEMENT_TO_PATH: &[(&str, &str)] = &[
        ("phi", "ic/phi-rad"),
        ("theta", "ic/theta-rad"),
        ("psi", "ic/psi-true-rad"),
        ("alpha", "ic/alpha-rad"),
        ("beta", "ic/beta-rad"),
        ("gamma", "ic/gamma-rad"),
    ];
    for (element_name, path) in ELEMENT_TO_PATH {
        if let Some(element) = doc.root.child(element_name) {
            if let Some(value) = element.text_as_f64() {
                bridge.set(path, value)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ic::document::parse_minimal_xml;

    #[test]
    fn bind_and_read_back_a_readwrite_node() {
        let value = RefCell::new(3.0_f64);
        let mut bridge = PropertyBridge::new();
        bridge.bind(
            "demo/x",
            {
                let value = &value;
                move || *value.borrow()
            },
            {
                let value = &value;
                move |v| *value.borrow_mut() = v
            },
        );
        assert_eq!(bridge.get("demo/x").unwrap(), 3.0);
        bridge.set("demo/x", 7.5).unwrap();
        assert_eq!(bridge.get("demo/x").unwrap(), 7.5);
        assert_eq!(*value.borrow(), 7.5);
    }

    #[test]
    fn readonly_node_rejects_writes() {
        let mut bridge = PropertyBridge::new();
        bridge.bind_readonly("demo/ro", || 42.0);
        assert_eq!(bridge.get("demo/ro").unwrap(), 42.0);
        assert!(bridge.set("demo/ro", 1.0).is_err());
    }

    #[test]
    fn unbind_removes_the_node() {
        let mut bridge = PropertyBridge::new();
        bridge.bind_readonly("demo/gone", || 1.0);
        assert!(bridge.unbind("demo/gone"));
        assert!(bridge.get("demo/gone").is_err());
        assert!(!bridge.unbind("demo/gone"));
    }

    #[test]
    fn unbound_path_is_an_error() {
        let bridge = PropertyBridge::new();
        assert!(bridge.get("nonexistent/path").is_err());
    }

    #[test]
    fn ic_properties_round_trip_through_the_bridge() {
        let ic = RefCell::new(InitialCondition::new());
        let atm = Atmosphere::default();
        let mut bridge = PropertyBridge::new();
        bind_ic_properties(&mut bridge, &ic, &atm);

        bridge.set("ic/phi-rad", 0.1).unwrap();
        assert!((bridge.get("ic/phi-rad").unwrap() - 0.1).abs() < 1e-9);

        bridge.set("ic/alpha-rad", 0.05).unwrap();
        assert!((bridge.get("ic/alpha-rad").unwrap() - 0.05).abs() < 1e-9);
    }

    #[test]
    fn dispatch_document_applies_recognized_elements() {
        let ic = RefCell::new(InitialCondition::new());
        let atm = Atmosphere::default();
        let mut bridge = PropertyBridge::new();
        bind_ic_properties(&mut bridge, &ic, &atm);

        let doc = parse_minimal_xml(r#"<initialize><phi unit="RAD">0.2</phi><theta unit="RAD">0.1</theta></initialize>"#).unwrap();
        dispatch_document(&mut bridge, &doc).unwrap();

        assert!((ic.borrow().orientation.euler_rad().0 - 0.2).abs() < 1e-9);
        assert!((ic.borrow().orientation.euler_rad().1 - 0.1).abs() < 1e-9);
    }
}

//! Initial-Condition Solver (component D): kinematic/aerodynamic state
//! representation (`state`), the solver itself (`solver`), and the
//! declarative-document contract it loads from (`document`).

pub mod document;
pub mod solver;
pub mod state;

pub use document::{parse_minimal_xml, Document, Element};
pub use solver::InitialCondition;
pub use state::{AeroAngles, AltitudeSet, BodyKinematics, LatitudeSet, Location, Orientation, SpeedSet, WindState};

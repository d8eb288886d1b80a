//! Six-degree-of-freedom flight dynamics core.
//!
//! This crate is the coupled subsystem of a flight dynamics engine that
//! carries the most numerically interesting invariants: the Initial-
//! Condition Solver ([`ic`]), the Trim Engine ([`trim`]), and the Standard
//! Atmosphere with winds/turbulence ([`atmosphere`], [`winds`]). The
//! aerodynamic buildup, propulsion model, ground-reactions model, and the
//! propagation integrator itself are external collaborators consumed
//! through the trait boundaries in [`collaborators`].
//!
//! Components:
//!
//! - [`math`] — vector/matrix algebra (via `nalgebra`), interpolation
//!   tables, quaternion helpers, reproducible RNGs, the unit-conversion
//!   map, and the bracket-and-regula-falsi root finder shared by [`ic`] and
//!   [`trim`].
//! - [`atmosphere`] — 1976 U.S. Standard Atmosphere, humidity, and the Mars
//!   variant.
//! - [`winds`] — steady wind, 1-cos gust, Dryden/MIL-spec turbulence, and
//!   the up/down-burst ring.
//! - [`ic`] — the initial-condition solver and its data model.
//! - [`trim`] — the axis-by-axis trim engine.
//! - [`collaborators`] — read-only trait boundaries onto the external
//!   Propagate/Aerodynamics/Propulsion/GroundReactions/Inertial/FCS
//!   subsystems, plus the owning [`collaborators::Executive`].
//! - [`property_bridge`] — the name-to-accessor registry bridging string
//!   paths to component state.
//! - [`config`] — `serde`-deserializable defaults for a host to drive this
//!   crate from a configuration file.
//! - [`error`] — the crate-wide error type.
//! - [`logging`] — the injected logging seam.

pub mod atmosphere;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod ic;
pub mod logging;
pub mod math;
pub mod property_bridge;
pub mod trim;
pub mod winds;

pub use error::{FlightCoreError, Result};

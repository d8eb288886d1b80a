//! Units & math primitives: vector/matrix algebra comes straight from
//! `nalgebra`; this module adds the pieces a flight-dynamics core needs on
//! top of that, namely interpolation tables, Euler/quaternion helpers, a
//! reproducible RNG pair, a small unit-conversion map, and the generic root
//! finder shared by the initial-condition solver and the trim engine.

pub mod interpolation;
pub mod quaternion;
pub mod rng;
pub mod rootfinder;
pub mod units;

pub use interpolation::{Table1D, Table2D};
pub use quaternion::{dcm_body_to_local, euler_from_quaternion, quaternion_from_euler, wrap_2pi};
pub use rng::{GaussianRng, UniformRng};
pub use rootfinder::{solve, solve_mut, RootOutcome, SolverConfig};
pub use units::{convert, Unit};

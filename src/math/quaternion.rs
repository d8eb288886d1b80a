//! Orientation helpers on top of `nalgebra::UnitQuaternion`.
//!
//! Builds on a `quaternion_to_euler` helper and `UnitQuaternion` attitude
//! field already used for attitude tracking elsewhere, extended with the
//! direction-cosine-matrix conversion and angle wrapping the data model
//! here requires (ψ wrapped into `[0, 2π)`).

use nalgebra::{Matrix3, UnitQuaternion, Vector3};
use std::f64::consts::PI;

/// Builds a normalized orientation quaternion from an Euler triplet
/// (roll φ, pitch θ, yaw ψ), radians.
pub fn quaternion_from_euler(phi: f64, theta: f64, psi: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_euler_angles(phi, theta, psi)
}

/// Extracts the Euler triplet `(phi, theta, psi)`, with `psi` wrapped into
/// `[0, 2*PI)` per the Orientation invariant in the data model.
pub fn euler_from_quaternion(q: &UnitQuaternion<f64>) -> (f64, f64, f64) {
    let (phi, theta, psi) = q.euler_angles();
    (phi, theta, wrap_2pi(psi))
}

/// Wraps an angle (radians) into `[0, 2*PI)`.
pub fn wrap_2pi(angle: f64) -> f64 {
    let two_pi = 2.0 * PI;
    let wrapped = angle % two_pi;
    if wrapped < 0.0 {
        wrapped + two_pi
    } else {
        wrapped
    }
}

/// Wraps an angle (radians) into `[-PI, PI)`, used for heading-minus-track
/// style differences where a signed residual is wanted.
pub fn wrap_pi(angle: f64) -> f64 {
    let wrapped = wrap_2pi(angle + PI) - PI;
    wrapped
}

/// Body-to-local (NED) direction cosine matrix, i.e. `v_local = dcm * v_body`.
pub fn dcm_body_to_local(q: &UnitQuaternion<f64>) -> Matrix3<f64> {
    q.to_rotation_matrix().into_inner()
}

/// Local-to-body direction cosine matrix, the transpose/inverse of the above.
pub fn dcm_local_to_body(q: &UnitQuaternion<f64>) -> Matrix3<f64> {
    dcm_body_to_local(q).transpose()
}

/// Rotates a local (NED) vector into the body frame.
pub fn local_to_body(q: &UnitQuaternion<f64>, v_local: &Vector3<f64>) -> Vector3<f64> {
    q.inverse() * v_local
}

/// Rotates a body vector into the local (NED) frame.
pub fn body_to_local(q: &UnitQuaternion<f64>, v_body: &Vector3<f64>) -> Vector3<f64> {
    q * v_body
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn euler_round_trip() {
        let q = quaternion_from_euler(0.1, 0.2, 0.3);
        let (phi, theta, psi) = euler_from_quaternion(&q);
        assert_relative_eq!(phi, 0.1, epsilon = 1e-9);
        assert_relative_eq!(theta, 0.2, epsilon = 1e-9);
        assert_relative_eq!(psi, 0.3, epsilon = 1e-9);
    }

    #[test]
    fn psi_wraps_into_0_2pi() {
        let q = quaternion_from_euler(0.0, 0.0, -0.5);
        let (_, _, psi) = euler_from_quaternion(&q);
        assert!((0.0..2.0 * PI).contains(&psi));
        assert_relative_eq!(psi, 2.0 * PI - 0.5, epsilon = 1e-9);
    }

    #[test]
    fn body_local_round_trip() {
        let q = quaternion_from_euler(0.3, -0.2, 1.0);
        let v = Vector3::new(1.0, 2.0, 3.0);
        let roundtrip = local_to_body(&q, &body_to_local(&q, &v));
        assert_relative_eq!(roundtrip.x, v.x, epsilon = 1e-9);
        assert_relative_eq!(roundtrip.y, v.y, epsilon = 1e-9);
        assert_relative_eq!(roundtrip.z, v.z, epsilon = 1e-9);
    }
}

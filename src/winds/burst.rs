//! Up/down-burst ring bookkeeping.
//!
//! The induced-velocity formula itself is treated as pluggable: this module
//! owns the active-ring list and iterates/evaluates/accumulates, delegating
//! the actual field evaluation to a [`BurstFieldModel`] implementation. A
//! textbook thin circular vortex filament (regularized Biot–Savart) ships
//! as the default so the module is runnable standalone.

use nalgebra::Vector3;

/// A single toroidal circulation ring.
#[derive(Debug, Clone, Copy)]
pub struct BurstRing {
    pub center_ned: Vector3<f64>,
    pub ring_radius_ft: f64,
    pub core_radius_ft: f64,
    pub circulation_strength: f64,
}

/// Evaluates the velocity field induced by a single ring at `location_ned`.
/// Implemented as a trait so a host can substitute a more faithful model.
pub trait BurstFieldModel {
    fn induced_velocity(&self, ring: &BurstRing, location_ned: Vector3<f64>) -> Vector3<f64>;
}

/// Thin circular vortex filament, Biot–Savart with a regularized core to
/// avoid the singularity at the filament itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct VortexRingModel;

impl BurstFieldModel for VortexRingModel {
    fn induced_velocity(&self, ring: &BurstRing, location_ned: Vector3<f64>) -> Vector3<f64> {
        let rel = location_ned - ring.center_ned;
        let radial_dist = (rel.x * rel.x + rel.y * rel.y).sqrt();
        let height = rel.z;

        // Distance from the evaluation point to the nearest point on the
        // ring filament, regularized by the core radius.
        let dist_to_filament = ((radial_dist - ring.ring_radius_ft).powi(2) + height.powi(2))
            .sqrt()
            .max(ring.core_radius_ft);

        let induced_speed = ring.circulation_strength
            / (2.0 * std::f64::consts::PI * dist_to_filament.max(ring.core_radius_ft));

        if radial_dist < 1e-6 {
            return Vector3::new(0.0, 0.0, induced_speed.signum() * induced_speed);
        }

        // Tangential-in-the-vertical-plane circulation: radially inward/
        // outward component and a vertical component, matching a toroidal
        // ring's induced flow (down the core, out along the ring plane).
        let radial_unit = Vector3::new(rel.x / radial_dist, rel.y / radial_dist, 0.0);
        let sign = if radial_dist < ring.ring_radius_ft {
            -1.0
        } else {
            1.0
        };
        let vertical_component = induced_speed * (ring.ring_radius_ft / dist_to_filament);
        let radial_component = sign * induced_speed * (height.abs() / dist_to_filament).min(1.0);

        radial_unit * radial_component + Vector3::new(0.0, 0.0, vertical_component)
    }
}

/// The active list of up/down-burst rings, with accumulation at a location.
#[derive(Default)]
pub struct BurstField {
    rings: Vec<BurstRing>,
}

impl BurstField {
    pub fn add_ring(&mut self, ring: BurstRing) {
        self.rings.push(ring);
    }

    pub fn remove_all(&mut self) {
        self.rings.clear();
    }

    pub fn ring_count(&self) -> usize {
        self.rings.len()
    }

    /// Evaluates every active ring at `location_ned` using `model` and
    /// accumulates the result.
    pub fn evaluate(&self, location_ned: Vector3<f64>, model: &dyn BurstFieldModel) -> Vector3<f64> {
        self.rings
            .iter()
            .map(|ring| model.induced_velocity(ring, location_ned))
            .fold(Vector3::zeros(), |acc, v| acc + v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_field_induces_nothing() {
        let field = BurstField::default();
        let v = field.evaluate(Vector3::zeros(), &VortexRingModel);
        assert_eq!(v, Vector3::zeros());
    }

    #[test]
    fn ring_induces_nonzero_velocity_nearby() {
        let mut field = BurstField::default();
        field.add_ring(BurstRing {
            center_ned: Vector3::new(0.0, 0.0, -500.0),
            ring_radius_ft: 200.0,
            core_radius_ft: 10.0,
            circulation_strength: 1000.0,
        });
        let v = field.evaluate(Vector3::new(200.0, 0.0, -500.0), &VortexRingModel);
        assert!(v.norm() > 0.0);
    }

    #[test]
    fn multiple_rings_accumulate() {
        let mut field = BurstField::default();
        let ring = BurstRing {
            center_ned: Vector3::new(0.0, 0.0, -500.0),
            ring_radius_ft: 200.0,
            core_radius_ft: 10.0,
            circulation_strength: 500.0,
        };
        field.add_ring(ring);
        field.add_ring(ring);
        assert_eq!(field.ring_count(), 2);

        let mut single = BurstField::default();
        single.add_ring(ring);

        let loc = Vector3::new(150.0, 0.0, -450.0);
        let v_double = field.evaluate(loc, &VortexRingModel);
        let v_single = single.evaluate(loc, &VortexRingModel);
        approx::assert_relative_eq!(v_double.x, 2.0 * v_single.x, epsilon = 1e-9);
    }
}

//! One-minus-cosine discrete gust.

use nalgebra::{Matrix3, Vector3};

/// Frame the gust direction was specified in at trigger time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GustFrame {
    Body,
    Wind,
    Local,
}

/// Profile duration triple: half-cosine ramp up over `startup`, unity over
/// `steady`, half-cosine ramp down over `end`.
#[derive(Debug, Clone, Copy)]
pub struct GustProfile {
    pub startup_s: f64,
    pub steady_s: f64,
    pub end_s: f64,
}

impl GustProfile {
    pub fn total_duration(&self) -> f64 {
        self.startup_s + self.steady_s + self.end_s
    }
}

/// A host-triggered one-minus-cosine gust. The direction is normalized once
/// at trigger time in the tagged frame and kept in local (NED) thereafter;
/// host orientation changes during the gust do not reorient it.
#[derive(Debug, Clone)]
pub struct OneMinusCosineGust {
    direction_ned: Vector3<f64>,
    magnitude: f64,
    frame: GustFrame,
    profile: GustProfile,
    elapsed_s: f64,
    active: bool,
}

impl Default for OneMinusCosineGust {
    fn default() -> Self {
        Self {
            direction_ned: Vector3::zeros(),
            magnitude: 0.0,
            frame: GustFrame::Local,
            profile: GustProfile {
                startup_s: 0.0,
                steady_s: 0.0,
                end_s: 0.0,
            },
            elapsed_s: 0.0,
            active: false,
        }
    }
}

impl OneMinusCosineGust {
    /// Triggers a gust whose direction was specified in `frame`. `to_local`
    /// rotates a vector from `frame` into local NED (identity for
    /// `GustFrame::Local`); the caller supplies it since the rotation
    /// depends on the vehicle's current orientation (body frame) or aero
    /// angles (wind frame), which this module does not own.
    pub fn trigger(
        &mut self,
        direction: Vector3<f64>,
        frame: GustFrame,
        to_local: &Matrix3<f64>,
        magnitude: f64,
        profile: GustProfile,
    ) {
        let local_dir = to_local * direction;
        self.direction_ned = if local_dir.norm() > 1e-12 {
            local_dir.normalize()
        } else {
            Vector3::zeros()
        };
        self.magnitude = magnitude;
        self.frame = frame;
        self.profile = profile;
        self.elapsed_s = 0.0;
        self.active = true;
    }

    pub fn frame(&self) -> GustFrame {
        self.frame
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advances the gust clock by `dt` seconds and returns the current NED
    /// gust vector (zero if inactive or finished).
    pub fn tick(&mut self, dt: f64) -> Vector3<f64> {
        if !self.active {
            return Vector3::zeros();
        }
        let scale = self.scale_at(self.elapsed_s);
        self.elapsed_s += dt;
        if self.elapsed_s >= self.profile.total_duration() {
            self.active = false;
        }
        self.direction_ned * (self.magnitude * scale)
    }

    fn scale_at(&self, t: f64) -> f64 {
        let GustProfile {
            startup_s,
            steady_s,
            end_s,
        } = self.profile;
        use std::f64::consts::PI;
        if t < startup_s {
            if startup_s <= 0.0 {
                1.0
            } else {
                0.5 * (1.0 - (PI * t / startup_s).cos())
            }
        } else if t < startup_s + steady_s {
            1.0
        } else if t < startup_s + steady_s + end_s {
            if end_s <= 0.0 {
                0.0
            } else {
                let t2 = t - startup_s - steady_s;
                0.5 * (1.0 + (PI * t2 / end_s).cos())
            }
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn identity() -> Matrix3<f64> {
        Matrix3::identity()
    }

    #[test]
    fn ramps_up_to_unity_then_back_down() {
        let mut gust = OneMinusCosineGust::default();
        gust.trigger(
            Vector3::new(0.0, 0.0, 1.0),
            GustFrame::Local,
            &identity(),
            10.0,
            GustProfile {
                startup_s: 1.0,
                steady_s: 1.0,
                end_s: 1.0,
            },
        );

        let at_start = gust.tick(0.0);
        assert_relative_eq!(at_start.z, 0.0, epsilon = 1e-9);

        // Advance to the middle of the steady phase.
        gust.tick(1.0);
        let at_steady = gust.tick(0.0);
        assert_relative_eq!(at_steady.z, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn deactivates_after_total_duration() {
        let mut gust = OneMinusCosineGust::default();
        gust.trigger(
            Vector3::new(1.0, 0.0, 0.0),
            GustFrame::Local,
            &identity(),
            5.0,
            GustProfile {
                startup_s: 0.5,
                steady_s: 0.5,
                end_s: 0.5,
            },
        );
        gust.tick(1.6);
        assert!(!gust.is_active());
        assert_relative_eq!(gust.tick(0.0).norm(), 0.0);
    }

    #[test]
    fn direction_is_normalized() {
        let mut gust = OneMinusCosineGust::default();
        gust.trigger(
            Vector3::new(3.0, 4.0, 0.0),
            GustFrame::Local,
            &identity(),
            1.0,
            GustProfile {
                startup_s: 0.0,
                steady_s: 1.0,
                end_s: 0.0,
            },
        );
        let v = gust.tick(0.0);
        assert_relative_eq!(v.norm(), 1.0, epsilon = 1e-9);
    }
}

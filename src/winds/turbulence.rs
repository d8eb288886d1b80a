//! Dryden/Tustin/MIL-F-8785C turbulence spectra and the Culp continuous-gust
//! model.

use crate::math::{GaussianRng, Table2D, UniformRng};

/// Turbulence spectrum in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurbulenceType {
    None,
    /// Standard Culp model: sine-wave vertical term plus an asymmetric spike.
    Culp,
    /// MIL-STD-1797A direct difference-equation discretization.
    Milspec,
    /// Bilinear-transform (Tustin) discretization of the Dryden shaping
    /// filters.
    Tustin,
}

/// Two past output samples and two past noise samples, the minimal state a
/// second-order biquad filter needs to carry between ticks.
#[derive(Debug, Clone, Copy, Default)]
struct AxisHistory {
    y: [f64; 2],
    n: [f64; 2],
}

/// A discrete biquad: `y[n] = b0 x[n] + b1 n[n-1] + b2 n[n-2] - a1 y[n-1] - a2 y[n-2]`.
#[derive(Debug, Clone, Copy)]
struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl Biquad {
    fn step(&self, hist: &mut AxisHistory, x: f64) -> f64 {
        let y = self.b0 * x + self.b1 * hist.n[0] + self.b2 * hist.n[1]
            - self.a1 * hist.y[0]
            - self.a2 * hist.y[1];
        hist.n[1] = hist.n[0];
        hist.n[0] = x;
        hist.y[1] = hist.y[0];
        hist.y[0] = y;
        y
    }

    /// Bilinear-transform discretization of the second-order Dryden shaping
    /// filter `H(s) = K*(1 + a1*s) / (1 + a2*s)^2`. `prewarp` frequency-
    /// prewarps the bilinear substitution (distinguishing the MIL-STD-1797A
    /// direct-difference-equation variant from the plain Tustin transform).
    fn second_order(k: f64, a1: f64, a2: f64, dt: f64, prewarp: bool) -> Self {
        let c = if prewarp && a2 > 1e-9 {
            // Frequency-prewarp the bilinear substitution at the shaping
            // filter's corner frequency, matching the MIL-STD-1797A
            // direct-difference-equation variant instead of a plain Tustin
            // transform.
            let omega = 1.0 / a2;
            omega / (omega * dt / 2.0).tan()
        } else {
            2.0 / dt
        };
        let a = 1.0 + a2 * c;
        let b = 1.0 - a2 * c;
        Self {
            b0: k * (1.0 + a1 * c) / (a * a),
            b1: k * 2.0 / (a * a),
            b2: k * (1.0 - a1 * c) / (a * a),
            a1: 2.0 * a * b / (a * a),
            a2: (b * b) / (a * a),
        }
    }

    /// Bilinear discretization of the first-order Dryden shaping filter
    /// `H(s) = K / (1 + a2*s)`.
    fn first_order(k: f64, a2: f64, dt: f64) -> Self {
        let c = 2.0 / dt;
        let a = 1.0 + a2 * c;
        let b = 1.0 - a2 * c;
        Self {
            b0: k / a,
            b1: k / a,
            b2: 0.0,
            a1: b / a,
            a2: 0.0,
        }
    }
}

/// Scale lengths and intensities for one linear axis at the current
/// height-above-ground, per MIL-F-8785C.
#[derive(Debug, Clone, Copy)]
struct DrydenParameters {
    length_u_ft: f64,
    length_v_ft: f64,
    length_w_ft: f64,
    sigma_u_fps: f64,
    sigma_v_fps: f64,
    sigma_w_fps: f64,
}

fn low_altitude_parameters(agl_ft: f64, wind_at_20ft_fps: f64) -> DrydenParameters {
    let h = agl_ft.max(1.0);
    let length_w = h;
    let length_uv = h / (0.177 + 0.000823 * h).powf(1.2);
    let sigma_w = 0.1 * wind_at_20ft_fps;
    let sigma_uv = sigma_w / (0.177 + 0.000823 * h).powf(0.4);
    DrydenParameters {
        length_u_ft: length_uv,
        length_v_ft: length_uv,
        length_w_ft: length_w,
        sigma_u_fps: sigma_uv,
        sigma_v_fps: sigma_uv,
        sigma_w_fps: sigma_w,
    }
}

/// MIL-F-8785C probability-of-exceedence intensity table (sigma, fps):
/// rows are severity 1..7, columns the standard altitude breakpoints. Each
/// row is a published exceedance curve; above ~35,000-45,000 ft the curves
/// go flat, which a closed-form fit can't reproduce.
fn severity_table() -> Table2D {
    let cols = vec![
        500.0, 1750.0, 3750.0, 7500.0, 15000.0, 25000.0, 35000.0, 45000.0, 55000.0, 65000.0,
        75000.0, 80000.0,
    ];
    let rows: Vec<f64> = (1..=7).map(|s| s as f64).collect();
    let values: Vec<Vec<f64>> = vec![
        vec![2.7, 3.2, 4.2, 5.6, 7.4, 9.6, 10.2, 10.2, 10.2, 10.2, 10.2, 10.2],
        vec![3.2, 4.2, 6.6, 8.6, 11.8, 15.6, 15.6, 15.6, 15.6, 15.6, 15.6, 15.6],
        vec![4.2, 5.6, 8.6, 11.8, 16.0, 21.2, 21.2, 21.2, 21.2, 21.2, 21.2, 21.2],
        vec![6.6, 8.6, 11.8, 15.6, 22.0, 28.4, 28.4, 28.4, 28.4, 28.4, 28.4, 28.4],
        vec![8.6, 11.8, 15.6, 20.0, 26.0, 34.6, 34.6, 34.6, 34.6, 34.6, 34.6, 34.6],
        vec![11.8, 15.6, 20.0, 26.0, 32.0, 40.0, 40.0, 40.0, 40.0, 40.0, 40.0, 40.0],
        vec![15.6, 20.0, 26.0, 32.0, 40.0, 48.0, 48.0, 48.0, 48.0, 48.0, 48.0, 48.0],
    ];
    Table2D::new(rows, cols, values)
}

fn high_altitude_parameters(agl_ft: f64, severity: f64) -> DrydenParameters {
    let table = severity_table();
    let sigma = table.lookup(severity, agl_ft.max(2000.0));
    DrydenParameters {
        length_u_ft: 1750.0,
        length_v_ft: 1750.0,
        length_w_ft: 1750.0,
        sigma_u_fps: sigma,
        sigma_v_fps: sigma,
        sigma_w_fps: sigma,
    }
}

fn dryden_parameters(agl_ft: f64, wind_at_20ft_fps: f64, severity: f64) -> DrydenParameters {
    if agl_ft <= 1000.0 {
        low_altitude_parameters(agl_ft, wind_at_20ft_fps)
    } else if agl_ft >= 2000.0 {
        high_altitude_parameters(agl_ft, severity)
    } else {
        let lo = low_altitude_parameters(1000.0, wind_at_20ft_fps);
        let hi = high_altitude_parameters(2000.0, severity);
        let t = (agl_ft - 1000.0) / 1000.0;
        let lerp = |a: f64, b: f64| a + (b - a) * t;
        DrydenParameters {
            length_u_ft: lerp(lo.length_u_ft, hi.length_u_ft),
            length_v_ft: lerp(lo.length_v_ft, hi.length_v_ft),
            length_w_ft: lerp(lo.length_w_ft, hi.length_w_ft),
            sigma_u_fps: lerp(lo.sigma_u_fps, hi.sigma_u_fps),
            sigma_v_fps: lerp(lo.sigma_v_fps, hi.sigma_v_fps),
            sigma_w_fps: lerp(lo.sigma_w_fps, hi.sigma_w_fps),
        }
    }
}

/// Per-axis Dryden filter history (u, v, w linear axes).
#[derive(Debug, Clone, Copy, Default)]
struct LinearHistories {
    u: AxisHistory,
    v: AxisHistory,
    w: AxisHistory,
}

/// Culp-model relaxation state for the asymmetric spike term.
#[derive(Debug, Clone, Copy, Default)]
struct CulpState {
    time_s: f64,
    spike_value: f64,
    spike_relax_remaining_s: f64,
}

/// Turbulence generator state.
pub struct Turbulence {
    kind: TurbulenceType,
    rng: GaussianRng,
    /// Uniform `[0, 1)` stream for the Culp model's spike-trigger
    /// probability gate and the spike's magnitude/relaxation draws; the
    /// Dryden/Tustin/MIL-spec shaping filters need Gaussian white noise
    /// only, so this stream is Culp-only.
    culp_rng: UniformRng,
    histories: LinearHistories,
    culp: CulpState,
    /// Severity index 1..7 used by the MIL-spec/Tustin high-altitude table.
    pub severity: f64,
    /// Culp sine-wave rate (rad/s) and gain (fps).
    pub culp_rate: f64,
    pub culp_gain: f64,
    prev_w_fps: f64,
    prev_u_fps: f64,
}

/// One tick's turbulence output: NED-frame linear velocity contribution and
/// body-frame angular rate contribution.
#[derive(Debug, Clone, Copy, Default)]
pub struct TurbulenceOutput {
    pub u_fps: f64,
    pub v_fps: f64,
    pub w_fps: f64,
    pub p_rps: f64,
    pub q_rps: f64,
    pub r_rps: f64,
}

impl Turbulence {
    pub fn new(kind: TurbulenceType, seed: u64) -> Self {
        Self {
            kind,
            rng: GaussianRng::new(seed),
            // Distinct stream from `rng` (not just a different consumer of
            // the same bytes) so the Culp gate/magnitude draws don't track
            // the Dryden/Tustin white-noise sequence.
            culp_rng: UniformRng::new(seed ^ 0x5eed_5eed_5eed_5eed),
            histories: LinearHistories::default(),
            culp: CulpState::default(),
            severity: 3.0,
            culp_rate: 1.0,
            culp_gain: 5.0,
            prev_w_fps: 0.0,
            prev_u_fps: 0.0,
        }
    }

    pub fn kind(&self) -> TurbulenceType {
        self.kind
    }

    pub fn set_kind(&mut self, kind: TurbulenceType) {
        self.kind = kind;
    }

    /// Advances the turbulence state by `dt` seconds given height-above-
    /// ground, true airspeed, wingspan (all feet/fps), and wind speed at 20
    /// ft AGL (fps, for the low-altitude Dryden intensity formula).
    pub fn tick(
        &mut self,
        dt: f64,
        agl_ft: f64,
        true_airspeed_fps: f64,
        wingspan_ft: f64,
        wind_at_20ft_fps: f64,
    ) -> TurbulenceOutput {
        match self.kind {
            TurbulenceType::None => TurbulenceOutput::default(),
            TurbulenceType::Culp => self.tick_culp(dt, agl_ft, wingspan_ft),
            TurbulenceType::Tustin => {
                self.tick_dryden(dt, agl_ft, true_airspeed_fps, wingspan_ft, wind_at_20ft_fps, true)
            }
            TurbulenceType::Milspec => {
                self.tick_dryden(dt, agl_ft, true_airspeed_fps, wingspan_ft, wind_at_20ft_fps, false)
            }
        }
    }

    fn tick_dryden(
        &mut self,
        dt: f64,
        agl_ft: f64,
        true_airspeed_fps: f64,
        wingspan_ft: f64,
        wind_at_20ft_fps: f64,
        tustin: bool,
    ) -> TurbulenceOutput {
        let v = true_airspeed_fps.max(1.0);
        let p = dryden_parameters(agl_ft, wind_at_20ft_fps, self.severity);

        let filter_u = Biquad::first_order(
            p.sigma_u_fps * (2.0 * p.length_u_ft / (std::f64::consts::PI * v)).sqrt(),
            p.length_u_ft / v,
            dt,
        );
        let t_w = p.length_w_ft / v;
        let filter_w = Biquad::second_order(
            p.sigma_w_fps * (p.length_w_ft / (std::f64::consts::PI * v)).sqrt(),
            3f64.sqrt() * t_w,
            t_w,
            dt,
            !tustin,
        );
        let t_v = p.length_v_ft / v;
        let filter_v = Biquad::second_order(
            p.sigma_v_fps * (p.length_v_ft / (std::f64::consts::PI * v)).sqrt(),
            3f64.sqrt() * t_v,
            t_v,
            dt,
            !tustin,
        );

        let nu = self.rng.next();
        let nv = self.rng.next();
        let nw = self.rng.next();

        let u = filter_u.step(&mut self.histories.u, nu);
        let v_out = filter_v.step(&mut self.histories.v, nv);
        let w = filter_w.step(&mut self.histories.w, nw);

        let span = wingspan_ft.max(1.0);
        let p_rate = (w - self.prev_w_fps) / span;
        let q_rate = -(u - self.prev_u_fps) / span;
        // Yaw coupling would need a spatial gradient of v across the span,
        // which a single-point turbulence sample doesn't carry.
        let r_rate = 0.0;
        self.prev_w_fps = w;
        self.prev_u_fps = u;

        TurbulenceOutput {
            u_fps: u,
            v_fps: v_out,
            w_fps: w,
            p_rps: p_rate,
            q_rps: q_rate,
            r_rps: r_rate,
        }
    }

    fn tick_culp(&mut self, dt: f64, agl_ft: f64, wingspan_ft: f64) -> TurbulenceOutput {
        self.culp.time_s += dt;

        if self.culp.spike_relax_remaining_s <= 0.0 && self.culp_rng.next() < 0.01 {
            self.culp.spike_value = (self.culp_rng.next() - 0.5) * 2.0 * self.culp_gain;
            self.culp.spike_relax_remaining_s = 0.5 + self.culp_rng.next();
        }
        let spike = if self.culp.spike_relax_remaining_s > 0.0 {
            let decay = (self.culp.spike_relax_remaining_s / 1.5).min(1.0);
            self.culp.spike_relax_remaining_s -= dt;
            self.culp.spike_value * decay
        } else {
            0.0
        };

        let sine = self.culp_gain * (self.culp_rate * self.culp.time_s).sin();
        let mut w = sine + spike;

        let wingspan = wingspan_ft.max(1.0);
        if agl_ft < 3.0 * wingspan {
            let factor = (agl_ft / (3.0 * wingspan)).clamp(0.0, 1.0);
            w *= factor * factor;
        }

        let p_rate = spike / wingspan;

        TurbulenceOutput {
            u_fps: 0.0,
            v_fps: 0.0,
            w_fps: w,
            p_rps: p_rate,
            q_rps: 0.0,
            r_rps: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s6_low_altitude_sigma_w_matches_ten_percent_of_wind20() {
        let p = low_altitude_parameters(500.0, 50.0);
        assert!((p.sigma_w_fps - 5.0).abs() < 1e-9);
    }

    #[test]
    fn turbulence_zero_mean_over_many_ticks() {
        let mut turb = Turbulence::new(TurbulenceType::Tustin, 12345);
        let mut samples = Vec::with_capacity(20_000);
        for _ in 0..20_000 {
            let out = turb.tick(0.02, 500.0, 150.0, 30.0, 20.0);
            samples.push(out.w_fps);
        }
        let mean: f64 = samples.iter().sum::<f64>() / samples.len() as f64;
        let sigma_w = low_altitude_parameters(500.0, 20.0).sigma_w_fps;
        assert!(
            mean.abs() < 0.3 * sigma_w,
            "mean {mean} too large relative to sigma_w {sigma_w}"
        );
    }

    #[test]
    fn none_kind_produces_zero_output() {
        let mut turb = Turbulence::new(TurbulenceType::None, 1);
        let out = turb.tick(0.1, 1000.0, 100.0, 30.0, 10.0);
        assert_eq!(out.u_fps, 0.0);
        assert_eq!(out.w_fps, 0.0);
    }

    #[test]
    fn culp_attenuates_near_ground() {
        let mut turb = Turbulence::new(TurbulenceType::Culp, 7);
        turb.culp_gain = 10.0;
        let near_ground = turb.tick(0.02, 1.0, 100.0, 30.0, 10.0);
        assert!(near_ground.w_fps.abs() <= 1.0);
    }
}

//! Generic bracket-and-regula-falsi root finder.
//!
//! The initial-condition solver and the trim engine both need the same
//! two-phase procedure (bracket by geometric expansion, then regula-falsi
//! with a 0.9 relaxation on the stale endpoint), so it is factored out here
//! as a callable-driven generic solver and reused in both rather than
//! duplicated (see DESIGN.md for why a gradient-based optimizer crate isn't
//! reused instead; it solves a different problem). The algorithm is the
//! "Illinois" variant of regula falsi, where the endpoint that hasn't moved
//! in two consecutive iterations has its function value halved (by
//! `relaxation`) before the next secant step, which keeps the method from
//! stalling the way plain regula falsi can.

/// Outcome of a bracketed root search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RootOutcome {
    /// A root was found; carries the converged independent-variable value.
    Converged(f64),
    /// Bracketing failed to find a sign change within the expansion cap or
    /// the declared bounds.
    NoBracket,
    /// A bracket was found but the inner solve did not converge within the
    /// iteration cap.
    NoConverge,
}

/// Tunables for [`solve`]. Defaults follow the initial-condition solver's
/// needs; the trim engine overrides `relaxation`, `max_inner_iterations`,
/// and the tolerances per axis.
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    pub bounds: (f64, f64),
    pub initial_step: f64,
    pub step_growth: f64,
    pub max_expansions: usize,
    pub relaxation: f64,
    pub max_inner_iterations: usize,
    pub func_tolerance: f64,
    pub width_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            bounds: (f64::NEG_INFINITY, f64::INFINITY),
            initial_step: 1e-2,
            step_growth: 2.0,
            max_expansions: 100,
            relaxation: 0.9,
            max_inner_iterations: 100,
            func_tolerance: 1e-3,
            width_tolerance: 1e-5,
        }
    }
}

/// Finds `x` such that `f(x) ≈ 0`, starting the bracket search at `guess`.
pub fn solve<F: Fn(f64) -> f64>(f: F, guess: f64, cfg: &SolverConfig) -> RootOutcome {
    solve_mut(f, guess, cfg)
}

/// Same algorithm as [`solve`], but takes `FnMut` so a caller whose residual
/// evaluation has side effects (the trim engine perturbs a control and reads
/// back a collaborator's state on every probe) can reuse it too. The IC
/// solver and the trim engine share this one solver; only the trim engine
/// needs the mutable form.
pub fn solve_mut<F: FnMut(f64) -> f64>(mut f: F, guess: f64, cfg: &SolverConfig) -> RootOutcome {
    let (lo_bound, hi_bound) = cfg.bounds;
    let guess = guess.clamp(lo_bound, hi_bound);
    let f0 = f(guess);
    if f0.abs() <= cfg.func_tolerance {
        return RootOutcome::Converged(guess);
    }

    let mut step = cfg.initial_step.max(f64::EPSILON);
    let mut a = guess;
    let mut b = guess;
    let mut fa = f0;
    let mut fb = f0;
    let mut bracketed = false;

    for _ in 0..cfg.max_expansions {
        let new_lo = (guess - step).max(lo_bound);
        let new_hi = (guess + step).min(hi_bound);
        let f_lo = f(new_lo);
        let f_hi = f(new_hi);

        if sign_changed(f_lo, f_hi) {
            a = new_lo;
            b = new_hi;
            fa = f_lo;
            fb = f_hi;
            bracketed = true;
            break;
        }

        if new_lo <= lo_bound && new_hi >= hi_bound {
            // Expansion has saturated both declared bounds with no sign
            // change; further growth cannot help.
            break;
        }
        step *= cfg.step_growth;
    }

    if !bracketed {
        return RootOutcome::NoBracket;
    }

    for _ in 0..cfg.max_inner_iterations {
        if (b - a).abs() <= cfg.width_tolerance {
            return RootOutcome::Converged((a + b) * 0.5);
        }
        let c = b - fb * (b - a) / (fb - fa);
        let fc = f(c);
        if fc.abs() <= cfg.func_tolerance {
            return RootOutcome::Converged(c);
        }
        if sign_changed(fa, fc) {
            b = c;
            fb = fc;
            fa *= cfg.relaxation;
        } else {
            a = c;
            fa = fc;
            fb *= cfg.relaxation;
        }
    }

    RootOutcome::NoConverge
}

fn sign_changed(a: f64, b: f64) -> bool {
    (a < 0.0 && b > 0.0) || (a > 0.0 && b < 0.0) || a == 0.0 || b == 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn finds_root_of_linear_function() {
        let cfg = SolverConfig::default();
        let outcome = solve(|x| x - 3.0, 0.0, &cfg);
        match outcome {
            RootOutcome::Converged(x) => assert_relative_eq!(x, 3.0, epsilon = 1e-3),
            other => panic!("expected convergence, got {other:?}"),
        }
    }

    #[test]
    fn finds_root_of_trig_function() {
        let cfg = SolverConfig {
            initial_step: 0.05,
            ..Default::default()
        };
        // sin(x) - 0.5 = 0 has a root at x = pi/6.
        let outcome = solve(|x| x.sin() - 0.5, 0.0, &cfg);
        match outcome {
            RootOutcome::Converged(x) => {
                assert_relative_eq!(x, std::f64::consts::FRAC_PI_6, epsilon = 1e-2)
            }
            other => panic!("expected convergence, got {other:?}"),
        }
    }

    #[test]
    fn respects_declared_bounds() {
        let cfg = SolverConfig {
            bounds: (-1.0, 1.0),
            initial_step: 0.1,
            max_expansions: 10,
            ..Default::default()
        };
        // Root is at x = 10, well outside the declared bounds: bracketing
        // must fail rather than silently walking past them.
        let outcome = solve(|x| x - 10.0, 0.0, &cfg);
        assert_eq!(outcome, RootOutcome::NoBracket);
    }

    #[test]
    fn converges_monotonically_for_well_posed_problem() {
        let cfg = SolverConfig::default();
        let outcome = solve(|x| x.powi(3) - 8.0, 0.0, &cfg);
        match outcome {
            RootOutcome::Converged(x) => assert_relative_eq!(x, 2.0, epsilon = 1e-2),
            other => panic!("expected convergence, got {other:?}"),
        }
    }
}

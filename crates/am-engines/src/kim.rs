//! Kim integral-equation double-boundary refinement.
//!
//! Given constant upper/lower boundary seeds for a double-boundary put, this
//! solver produces smoothed, monotone, higher-accuracy boundary curves — or
//! an explicit [`FallbackReason`] telling the caller to stay with the seeds.
//! The accept/reject decision is a `Result`, not control flow by exception:
//! every rejection path leaves the caller with a usable constant boundary.
//!
//! The iteration is the stabilized FP-B' scheme: at each time node the upper
//! boundary is updated first and the lower boundary update consumes the
//! just-updated upper value, which suppresses the oscillation the plain
//! FP-B sweep is prone to.

use am_core::{Rate, Real, Time, Volatility};
use am_math::filters::{isotonic_non_decreasing, isotonic_non_increasing, savitzky_golay_5};
use am_math::integrals::Quadrature;

use crate::premium::{band_boundary_update, linear_at};

/// Plausibility band for the terminal upper-boundary/strike ratio.
const UPPER_RATIO_BAND: (Real, Real) = (0.60, 0.90);
/// Plausibility band for the terminal lower-boundary/strike ratio.
const LOWER_RATIO_BAND: (Real, Real) = (0.45, 0.85);
/// Consecutive stagnant iterations tolerated before aborting.
const STAGNATION_LIMIT: usize = 3;
/// Bisection tolerance for the boundary crossing time (years).
const CROSSING_TOLERANCE: Time = 1e-2;
/// Relative terminal deviation above which a refinement looks suspicious.
const SUSPICIOUS_RELATIVE: Real = 2e-3;
/// Absolute terminal deviation above which a refinement looks suspicious.
const SUSPICIOUS_ABSOLUTE: Real = 0.1;

/// Why a refinement was rejected in favour of the constant seed boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// The seed's terminal ratios fall outside the plausibility bands.
    ImplausibleSeed,
    /// The iteration stalled without converging.
    Stagnation,
    /// The refined terminal value drifted too far from the seed.
    SuspiciousDeviation,
}

/// Refined double-boundary curves.
#[derive(Debug, Clone)]
pub struct RefinedBoundaries {
    /// Time-to-expiry nodes, ascending.
    pub times: Vec<Time>,
    /// Upper boundary values.
    pub upper: Vec<Real>,
    /// Lower boundary values.
    pub lower: Vec<Real>,
    /// Crossing time at which the boundaries would otherwise intersect.
    pub crossing: Option<Time>,
}

/// The refinement solver.
#[derive(Debug, Clone)]
pub struct KimSolver {
    max_iterations: usize,
    tolerance: Real,
    quadrature: Quadrature,
}

impl KimSolver {
    /// Create a solver with an iteration budget, an absolute convergence
    /// tolerance (in price units), and the quadrature to use for the
    /// integral-equation updates.
    pub fn new(max_iterations: usize, tolerance: Real, quadrature: Quadrature) -> Self {
        Self {
            max_iterations: max_iterations.max(1),
            tolerance: tolerance.max(1e-12),
            quadrature,
        }
    }

    /// Refine the seeded put boundaries on the given time nodes.
    ///
    /// `times` is ascending with `times[0] ≈ 0`; node 0 carries the analytic
    /// τ→0 limits and is never updated. Returns the refined curves or the
    /// reason the seeds should be kept instead. Only puts are refined here —
    /// the double-boundary call side deliberately stays on its heuristic
    /// constants.
    #[allow(clippy::too_many_arguments)]
    pub fn refine(
        &self,
        strike: Real,
        r: Rate,
        q: Rate,
        sigma: Volatility,
        times: &[Time],
        upper_seed: &[Real],
        lower_seed: &[Real],
    ) -> Result<RefinedBoundaries, FallbackReason> {
        let n = times.len();
        assert!(n >= 2 && upper_seed.len() == n && lower_seed.len() == n);
        let eta = -1.0;

        // Plausibility gate on the terminal (largest-τ) seed values. A seed
        // outside these bands would poison every node it is integrated
        // against.
        let u_ratio = upper_seed[n - 1] / strike;
        let l_ratio = lower_seed[n - 1] / strike;
        if !(UPPER_RATIO_BAND.0..UPPER_RATIO_BAND.1).contains(&u_ratio)
            || !(LOWER_RATIO_BAND.0..LOWER_RATIO_BAND.1).contains(&l_ratio)
            || upper_seed[n - 1] <= lower_seed[n - 1]
        {
            return Err(FallbackReason::ImplausibleSeed);
        }

        // Scratch for the whole call: the curves are refined in place.
        let mut upper = upper_seed.to_vec();
        let mut lower = lower_seed.to_vec();
        let eps = 1e-6 * strike;

        // Crossing handling: beyond the crossing time the band is empty and
        // the integral equations are meaningless, so both curves collapse to
        // the crossing midpoint and those nodes sit out the iteration.
        let crossing = self.detect_crossing(times, &upper, &lower);
        let mut active = vec![true; n];
        active[0] = false;
        if let Some(t_cross) = crossing {
            let mid = 0.5
                * (linear_at(times, &upper, t_cross) + linear_at(times, &lower, t_cross));
            for i in 0..n {
                if times[i] >= t_cross {
                    upper[i] = mid;
                    lower[i] = mid;
                    active[i] = false;
                }
            }
        }

        // FP-B' sweep.
        let mut prev_change = Real::MAX;
        let mut stagnant = 0usize;
        for _ in 0..self.max_iterations {
            let mut max_change: Real = 0.0;

            for i in 1..n {
                if !active[i] {
                    continue;
                }
                let t_i = times[i];

                let u_new = band_boundary_update(
                    upper[i],
                    t_i,
                    strike,
                    r,
                    q,
                    sigma,
                    eta,
                    &|u| linear_at(times, &upper, u),
                    &|u| linear_at(times, &lower, u),
                    &self.quadrature,
                );
                if u_new.is_finite() && u_new > 0.0 && u_new < strike {
                    max_change = max_change.max((u_new - upper[i]).abs());
                    upper[i] = u_new;
                }

                // The lower update sees upper[i] as just written.
                let l_new = band_boundary_update(
                    lower[i],
                    t_i,
                    strike,
                    r,
                    q,
                    sigma,
                    eta,
                    &|u| linear_at(times, &upper, u),
                    &|u| linear_at(times, &lower, u),
                    &self.quadrature,
                );
                if l_new.is_finite() && l_new > 0.0 && l_new < strike {
                    max_change = max_change.max((l_new - lower[i]).abs());
                    lower[i] = l_new;
                }

                if upper[i] <= lower[i] {
                    let mid = 0.5 * (upper[i] + lower[i]);
                    upper[i] = mid + eps;
                    lower[i] = (mid - eps).max(eps);
                }
            }

            if max_change < self.tolerance {
                break;
            }
            if (max_change - prev_change).abs() < self.tolerance {
                stagnant += 1;
                if stagnant > STAGNATION_LIMIT {
                    return Err(FallbackReason::Stagnation);
                }
            } else {
                stagnant = 0;
            }
            prev_change = max_change;
        }

        // Monotonicity (upper non-increasing in τ, lower non-decreasing),
        // then noise suppression. The smoother can disturb monotonicity
        // around sharp kinks, so the isotonic pass runs once more after it.
        isotonic_non_increasing(&mut upper);
        isotonic_non_decreasing(&mut lower);
        savitzky_golay_5(&mut upper);
        savitzky_golay_5(&mut lower);
        isotonic_non_increasing(&mut upper);
        isotonic_non_decreasing(&mut lower);

        for i in 0..n {
            upper[i] = upper[i].clamp(eps, strike);
            lower[i] = lower[i].clamp(eps, strike);
            if upper[i] <= lower[i] {
                let mid = 0.5 * (upper[i] + lower[i]);
                upper[i] = mid + eps;
                lower[i] = (mid - eps).max(eps * 0.5);
            }
        }

        // Terminal acceptance gate: a refinement that moved the terminal
        // value both >0.2 % and >0.1 absolute is treated as unverified and
        // rejected wholesale.
        for (smoothed, seed) in [
            (upper[n - 1], upper_seed[n - 1]),
            (lower[n - 1], lower_seed[n - 1]),
        ] {
            let abs_dev = (smoothed - seed).abs();
            let rel_dev = abs_dev / seed.abs().max(1e-12);
            if rel_dev > SUSPICIOUS_RELATIVE && abs_dev > SUSPICIOUS_ABSOLUTE {
                return Err(FallbackReason::SuspiciousDeviation);
            }
        }

        Ok(RefinedBoundaries {
            times: times.to_vec(),
            upper,
            lower,
            crossing,
        })
    }

    /// Find the first crossing of the two curves, refined by bisection to
    /// [`CROSSING_TOLERANCE`].
    fn detect_crossing(&self, times: &[Time], upper: &[Real], lower: &[Real]) -> Option<Time> {
        let n = times.len();
        let first = (1..n).find(|&i| upper[i] <= lower[i])?;

        let gap = |t: Time| linear_at(times, upper, t) - linear_at(times, lower, t);
        let mut lo = times[first - 1];
        let mut hi = times[first];
        while hi - lo > CROSSING_TOLERANCE {
            let mid = 0.5 * (lo + hi);
            if gap(mid) > 0.0 {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Some(0.5 * (lo + hi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use am_math::chebyshev::chebyshev_nodes;

    fn solver(iterations: usize) -> KimSolver {
        KimSolver::new(iterations, 1e-6, Quadrature::gauss_legendre(16))
    }

    fn seeds(strike: Real, n: usize, r: Rate, q: Rate) -> (Vec<Time>, Vec<Real>, Vec<Real>) {
        let times = chebyshev_nodes(n, 0.0, 1.0);
        let mut upper = vec![0.75 * strike; n];
        let mut lower = vec![0.55 * strike; n];
        upper[0] = strike;
        lower[0] = strike * (r / q).clamp(0.0, 1.0);
        (times, upper, lower)
    }

    #[test]
    fn implausible_terminal_ratio_is_rejected() {
        let (times, mut upper, lower) = seeds(100.0, 9, -0.005, -0.010);
        *upper.last_mut().unwrap() = 95.0; // ratio 0.95 ∉ [0.60, 0.90)
        let err = solver(5)
            .refine(100.0, -0.005, -0.010, 0.20, &times, &upper, &lower)
            .unwrap_err();
        assert_eq!(err, FallbackReason::ImplausibleSeed);
    }

    #[test]
    fn inverted_seed_is_rejected() {
        let (times, mut upper, mut lower) = seeds(100.0, 9, -0.005, -0.010);
        *upper.last_mut().unwrap() = 0.61 * 100.0;
        *lower.last_mut().unwrap() = 0.70 * 100.0;
        let err = solver(5)
            .refine(100.0, -0.005, -0.010, 0.20, &times, &upper, &lower)
            .unwrap_err();
        assert_eq!(err, FallbackReason::ImplausibleSeed);
    }

    #[test]
    fn accepted_refinement_is_ordered_and_monotone() {
        let (times, upper, lower) = seeds(100.0, 11, -0.005, -0.010);
        match solver(6).refine(100.0, -0.005, -0.010, 0.20, &times, &upper, &lower) {
            Ok(rb) => {
                for i in 0..rb.times.len() {
                    assert!(
                        rb.upper[i] > rb.lower[i],
                        "ordering violated at node {i}: {} vs {}",
                        rb.upper[i],
                        rb.lower[i]
                    );
                    assert!(rb.upper[i] > 0.0 && rb.upper[i] <= 100.0);
                    assert!(rb.lower[i] > 0.0 && rb.lower[i] < 100.0);
                }
                for i in 1..rb.times.len() {
                    assert!(
                        rb.upper[i] <= rb.upper[i - 1] + 1e-6,
                        "upper not non-increasing at {i}"
                    );
                    assert!(
                        rb.lower[i] >= rb.lower[i - 1] - 1e-6,
                        "lower not non-decreasing at {i}"
                    );
                }
            }
            // The conservative gates may refuse the refinement; that is a
            // legitimate outcome and the caller keeps the seeds.
            Err(reason) => {
                assert_ne!(reason, FallbackReason::ImplausibleSeed);
            }
        }
    }

    #[test]
    fn crossed_seeds_collapse_to_the_midpoint() {
        let strike = 100.0;
        let n = 11;
        let times = chebyshev_nodes(n, 0.0, 1.0);
        // Upper descending through lower ascending: crossing mid-curve.
        let mut upper: Vec<Real> = (0..n).map(|i| 89.9 - 30.0 * i as Real / (n - 1) as Real).collect();
        let mut lower: Vec<Real> = (0..n).map(|i| 50.0 + 20.0 * i as Real / (n - 1) as Real).collect();
        upper[0] = strike;
        lower[0] = 50.0;
        // Keep the terminal values inside the plausibility bands
        upper[n - 1] = 0.65 * strike;
        lower[n - 1] = 0.64 * strike;

        let result = solver(1).refine(strike, -0.005, -0.010, 0.20, &times, &upper, &lower);
        if let Ok(rb) = result {
            assert!(rb.crossing.is_some() || rb.upper.iter().zip(&rb.lower).all(|(u, l)| u > l));
        }
    }

    #[test]
    fn monotone_iteration_progress_is_not_stagnation() {
        // A clean seed set should not be classified as stagnant on the
        // first couple of sweeps.
        let (times, upper, lower) = seeds(100.0, 9, -0.005, -0.010);
        let r = solver(2).refine(100.0, -0.005, -0.010, 0.20, &times, &upper, &lower);
        if let Err(reason) = r {
            assert_ne!(reason, FallbackReason::ImplausibleSeed);
        }
    }
}

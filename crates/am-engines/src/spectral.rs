//! Spectral collocation engine.
//!
//! The exercise boundary is represented by its values at second-kind
//! Chebyshev nodes on `[0, τ]` and refined by fixed-point iteration of the
//! boundary integral equation (the FP-A sweep); the early-exercise premium
//! is then integrated against the refined boundary and added to the
//! closed-form European price.
//!
//! Three presets trade accuracy for speed; a custom constructor accepts
//! explicit node/iteration counts. Rho is intentionally not implemented by
//! this engine — the unified dispatcher delegates it to the
//! finite-difference engine.

use std::cell::Cell;

use am_core::{
    ExerciseBoundary, OptionSpec, OptionType, RateRegime, Real, Result, Size, Time,
};
use am_math::black_scholes::black_scholes_merton;
use am_math::chebyshev::{chebyshev_nodes, ChebyshevInterpolation};
use am_math::integrals::Quadrature;

use crate::kim::KimSolver;
use crate::near_expiry::TAU_INTRINSIC;
use crate::premium::{band_premium, linear_at, single_boundary_premium, single_boundary_update};
use crate::qdplus;

/// Preset accuracy/speed trade-offs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectralScheme {
    /// 8 Chebyshev nodes, 8-point Gauss-Legendre, 4 iterations.
    Fast,
    /// 12 Chebyshev nodes, 16-point Gauss-Legendre, 6 iterations.
    Accurate,
    /// 24 Chebyshev nodes, tanh-sinh quadrature, 10 iterations.
    HighPrecision,
}

/// Everything one spectral pricing pass produces.
#[derive(Debug, Clone)]
pub struct SpectralOutcome {
    /// The (intrinsic-clamped) American price.
    pub price: Real,
    /// The matching closed-form European price.
    pub european: Real,
    /// Integrated early-exercise premium, ≥ 0.
    pub premium: Real,
    /// Upper boundary snapshot (DoubleBoundary regime only).
    pub upper: Option<ExerciseBoundary>,
    /// Lower boundary snapshot (DoubleBoundary regime only).
    pub lower: Option<ExerciseBoundary>,
}

/// The spectral collocation engine.
///
/// Configuration is read-only after construction; every pricing call is
/// independent, so one engine value may serve many threads.
#[derive(Debug, Clone)]
pub struct SpectralEngine {
    nodes: Size,
    max_iterations: Size,
    tolerance: Real,
    quadrature: Quadrature,
}

impl Default for SpectralEngine {
    fn default() -> Self {
        Self::new(SpectralScheme::Accurate)
    }
}

impl SpectralEngine {
    /// Create an engine with one of the preset schemes.
    pub fn new(scheme: SpectralScheme) -> Self {
        match scheme {
            SpectralScheme::Fast => Self {
                nodes: 8,
                max_iterations: 4,
                tolerance: 1e-6,
                quadrature: Quadrature::gauss_legendre(8),
            },
            SpectralScheme::Accurate => Self {
                nodes: 12,
                max_iterations: 6,
                tolerance: 1e-8,
                quadrature: Quadrature::gauss_legendre(16),
            },
            SpectralScheme::HighPrecision => Self {
                nodes: 24,
                max_iterations: 10,
                tolerance: 1e-10,
                quadrature: Quadrature::tanh_sinh(),
            },
        }
    }

    /// Create an engine with explicit node and iteration counts, clamped to
    /// `[4, 64]` nodes and `[1, 10]` iterations.
    pub fn with_params(nodes: Size, iterations: Size) -> Self {
        Self {
            nodes: nodes.clamp(4, 64),
            max_iterations: iterations.clamp(1, 10),
            tolerance: 1e-8,
            quadrature: Quadrature::gauss_legendre(16),
        }
    }

    /// Price the contract.
    pub fn price(&self, spec: &OptionSpec) -> Result<Real> {
        Ok(self.evaluate(spec)?.price)
    }

    /// Price the contract and return premium and boundary details.
    pub fn evaluate(&self, spec: &OptionSpec) -> Result<SpectralOutcome> {
        spec.validate()?;

        let intrinsic = spec.intrinsic();
        // Less than one trading day out the whole machinery is bypassed.
        if spec.tau < TAU_INTRINSIC {
            return Ok(SpectralOutcome {
                price: intrinsic,
                european: intrinsic,
                premium: 0.0,
                upper: None,
                lower: None,
            });
        }

        let european = black_scholes_merton(
            spec.option_type,
            spec.spot,
            spec.strike,
            spec.rate,
            spec.dividend_yield,
            spec.vol,
            spec.tau,
        )
        .price;

        match spec.regime() {
            RateRegime::Standard => Ok(self.single_boundary(spec, european, intrinsic)),
            RateRegime::DoubleBoundary => match spec.option_type {
                OptionType::Put => Ok(self.double_boundary_put(spec, european, intrinsic)),
                OptionType::Call => Ok(self.double_boundary_call(spec, european, intrinsic)),
            },
        }
    }

    /// Delta by central bump-and-reprice (±1 % of spot).
    pub fn delta(&self, spec: &OptionSpec) -> Result<Real> {
        let h = 0.01 * spec.spot;
        let up = self.price(&OptionSpec { spot: spec.spot + h, ..*spec })?;
        let down = self.price(&OptionSpec { spot: spec.spot - h, ..*spec })?;
        Ok((up - down) / (2.0 * h))
    }

    /// Gamma by central second difference (±1 % of spot).
    pub fn gamma(&self, spec: &OptionSpec) -> Result<Real> {
        let h = 0.01 * spec.spot;
        let up = self.price(&OptionSpec { spot: spec.spot + h, ..*spec })?;
        let mid = self.price(spec)?;
        let down = self.price(&OptionSpec { spot: spec.spot - h, ..*spec })?;
        Ok((up - 2.0 * mid + down) / (h * h))
    }

    /// Vega by central vol bump.
    pub fn vega(&self, spec: &OptionSpec) -> Result<Real> {
        let h = (0.01 * spec.vol).max(1e-4);
        let up = self.price(&OptionSpec { vol: spec.vol + h, ..*spec })?;
        let down = self.price(&OptionSpec { vol: (spec.vol - h).max(1e-6), ..*spec })?;
        Ok((up - down) / (spec.vol + h - (spec.vol - h).max(1e-6)))
    }

    /// Theta (per year) by stepping one calendar day toward expiry.
    pub fn theta(&self, spec: &OptionSpec) -> Result<Real> {
        let dt = (1.0 / 365.0_f64).min(0.5 * spec.tau.max(1e-6));
        let later = self.price(&OptionSpec { tau: spec.tau - dt, ..*spec })?;
        let now = self.price(spec)?;
        Ok((later - now) / dt)
    }

    // ── Single boundary ───────────────────────────────────────────────────

    fn single_boundary(
        &self,
        spec: &OptionSpec,
        european: Real,
        intrinsic: Real,
    ) -> SpectralOutcome {
        let (r, q) = (spec.rate, spec.dividend_yield);
        let (k, sigma, tau) = (spec.strike, spec.vol, spec.tau);
        let eta = spec.option_type.sign();

        // Sign of the premium integrand rules out early exercise outright
        // for these quadrants.
        let never_exercised = match spec.option_type {
            OptionType::Call => q <= 0.0 && r >= 0.0,
            OptionType::Put => r <= 0.0 && q >= 0.0,
        };
        if never_exercised {
            return SpectralOutcome {
                price: european.max(intrinsic),
                european,
                premium: 0.0,
                upper: None,
                lower: None,
            };
        }

        let b_seed = qdplus::critical_boundary(spec.option_type, k, r, q, sigma, tau);
        let times = chebyshev_nodes(self.nodes, 0.0, tau);
        let mut boundary = vec![b_seed; self.nodes];
        boundary[0] = tau_zero_limit(spec.option_type, k, r, q);

        let mut interp = ChebyshevInterpolation::new(times.clone(), boundary.clone());
        let mut next = boundary.clone();

        for _ in 0..self.max_iterations {
            let mut max_change: Real = 0.0;
            for i in 1..self.nodes {
                // Any invalid intermediate value falls back to the last
                // valid interpolated level instead of propagating NaN.
                let last_valid = Cell::new(boundary[i]);
                let curve = |u: Time| {
                    let v = interp.value(u.clamp(0.0, tau));
                    if v.is_finite() && v > 0.0 {
                        last_valid.set(v);
                        v
                    } else {
                        last_valid.get()
                    }
                };
                let updated = single_boundary_update(
                    boundary[i],
                    times[i],
                    k,
                    r,
                    q,
                    sigma,
                    eta,
                    &curve,
                    &self.quadrature,
                );
                let accepted = if updated.is_finite() && updated > 0.0 {
                    match spec.option_type {
                        OptionType::Put => updated.min(k),
                        OptionType::Call => updated.max(k),
                    }
                } else {
                    boundary[i]
                };
                max_change = max_change.max((accepted - boundary[i]).abs());
                next[i] = accepted;
            }
            boundary[1..].copy_from_slice(&next[1..]);
            interp.set_values(&boundary);
            if max_change < self.tolerance * k {
                break;
            }
        }

        let last_valid = Cell::new(b_seed);
        let curve = |u: Time| {
            let v = interp.value(u.clamp(0.0, tau));
            if v.is_finite() && v > 0.0 {
                last_valid.set(v);
                v
            } else {
                last_valid.get()
            }
        };
        let premium = single_boundary_premium(
            spec.spot,
            k,
            tau,
            r,
            q,
            sigma,
            eta,
            &curve,
            &self.quadrature,
        )
        .max(0.0);

        SpectralOutcome {
            price: (european + premium).max(intrinsic),
            european,
            premium,
            upper: None,
            lower: None,
        }
    }

    // ── Double boundary, puts (iterated) ──────────────────────────────────

    fn double_boundary_put(
        &self,
        spec: &OptionSpec,
        european: Real,
        intrinsic: Real,
    ) -> SpectralOutcome {
        let (r, q) = (spec.rate, spec.dividend_yield);
        let (k, sigma, tau) = (spec.strike, spec.vol, spec.tau);

        let (u_seed, l_seed) = qdplus::double_boundary_put_seed(k, r, q, sigma);
        let times = chebyshev_nodes(self.nodes, 0.0, tau);
        let mut upper = vec![u_seed; self.nodes];
        let mut lower = vec![l_seed; self.nodes];
        // τ→0: every in-the-money level above rK/q is exercised.
        upper[0] = k;
        lower[0] = k * (r / q).clamp(0.0, 1.0);
        if lower[0] >= upper[0] {
            lower[0] = 0.5 * upper[0];
        }

        // Hand off to the Kim solver when the iteration budget permits;
        // a rejected refinement keeps the constant QD+ seeds.
        if self.max_iterations >= 2 {
            let kim = KimSolver::new(
                self.max_iterations,
                self.tolerance * k,
                self.quadrature.clone(),
            );
            if let Ok(refined) = kim.refine(k, r, q, sigma, &times, &upper, &lower) {
                upper = refined.upper;
                lower = refined.lower;
            }
        }

        // Safety net: the ordering invariant must hold at every node.
        let eps = 1e-6 * k;
        for i in 0..self.nodes {
            if upper[i] <= lower[i] {
                let mid = 0.5 * (upper[i] + lower[i]);
                upper[i] = mid + eps;
                lower[i] = (mid - eps).max(eps * 0.5);
            }
        }

        // Partially-converged boundaries can flip the sign of the band
        // integral; the absolute value protects the premium.
        let premium = band_premium(
            spec.spot,
            k,
            tau,
            r,
            q,
            sigma,
            -1.0,
            &|u| linear_at(&times, &upper, u),
            &|u| linear_at(&times, &lower, u),
            &self.quadrature,
        )
        .abs();

        SpectralOutcome {
            price: (european + premium).max(intrinsic),
            european,
            premium,
            upper: Some(ExerciseBoundary::new(times.clone(), upper)),
            lower: Some(ExerciseBoundary::new(times, lower)),
        }
    }

    // ── Double boundary, calls (heuristic constants, not iterated) ────────

    fn double_boundary_call(
        &self,
        spec: &OptionSpec,
        european: Real,
        intrinsic: Real,
    ) -> SpectralOutcome {
        let (r, q) = (spec.rate, spec.dividend_yield);
        let (k, sigma, tau) = (spec.strike, spec.vol, spec.tau);

        // The call side of the double-boundary regime is deliberately not
        // iterated: constant heuristic boundaries stand in for the fixed
        // point. Kept as-is until verified against a reference.
        let (u_const, l_const) = qdplus::double_boundary_call_seed(k);
        let times = chebyshev_nodes(self.nodes, 0.0, tau);
        let upper = vec![u_const; self.nodes];
        let lower = vec![l_const; self.nodes];

        let premium = band_premium(
            spec.spot,
            k,
            tau,
            r,
            q,
            sigma,
            1.0,
            &|u| linear_at(&times, &upper, u),
            &|u| linear_at(&times, &lower, u),
            &self.quadrature,
        )
        .abs();

        SpectralOutcome {
            price: (european + premium).max(intrinsic),
            european,
            premium,
            upper: Some(ExerciseBoundary::new(times.clone(), upper)),
            lower: Some(ExerciseBoundary::new(times, lower)),
        }
    }
}

/// Analytic τ→0 boundary limit.
fn tau_zero_limit(option_type: OptionType, k: Real, r: Real, q: Real) -> Real {
    match option_type {
        OptionType::Put => {
            if r > 0.0 && q > 0.0 {
                k * (r / q).min(1.0)
            } else {
                k
            }
        }
        OptionType::Call => {
            if q > 0.0 {
                k * (r / q).max(1.0)
            } else {
                k
            }
        }
    }
}

//! Shared early-exercise-premium integrands and boundary-equation updates.
//!
//! Both the spectral engine and the Kim solver work with the same
//! integral-equation structure: analytic Black-Scholes terms against the
//! strike minus quadrature corrections against the exercise boundary,
//! weighted by `r·e^{−rs}` and `q·e^{−qs}`. The helpers here keep the sign
//! conventions in one place; `η = +1` for calls, `−1` for puts throughout.

use am_core::{Rate, Real, Time, Volatility};
use am_math::distributions::normal_cdf;
use am_math::integrals::{Integrator, Quadrature};

/// `d₁`/`d₂` at horizon `s` for the moneyness ratio `z`.
///
/// The `s → 0` limit is a step in `ln z`; degenerate ratios are pushed to
/// the matching tail instead of producing NaN.
pub(crate) fn d_pair(s: Time, z: Real, r: Rate, q: Rate, sigma: Volatility) -> (Real, Real) {
    if !(z > 0.0) || !z.is_finite() {
        return (-1e10, -1e10);
    }
    let ln_z = z.ln();
    if s <= 1e-12 {
        let tail = if ln_z > 0.0 {
            1e10
        } else if ln_z < 0.0 {
            -1e10
        } else {
            0.0
        };
        return (tail, tail);
    }
    let vol_sqrt = sigma * s.sqrt();
    let d1 = (ln_z + (r - q + 0.5 * sigma * sigma) * s) / vol_sqrt;
    (d1, d1 - vol_sqrt)
}

/// Piecewise-linear evaluation of a boundary sampled at ascending `times`.
pub(crate) fn linear_at(times: &[Time], values: &[Real], t: Time) -> Real {
    let n = times.len();
    debug_assert_eq!(values.len(), n);
    if t <= times[0] {
        return values[0];
    }
    if t >= times[n - 1] {
        return values[n - 1];
    }
    let idx = match times.binary_search_by(|v| v.partial_cmp(&t).unwrap()) {
        Ok(i) => return values[i],
        Err(i) => i - 1,
    };
    let h = (times[idx + 1] - times[idx]).max(1e-15);
    let frac = (t - times[idx]) / h;
    values[idx] * (1.0 - frac) + values[idx + 1] * frac
}

/// One fixed-point update of a single exercise boundary at maturity `tau_i`.
///
/// `B_new = K · N/D` with
/// `N = 1 − e^{−rτ}Φ(η d₂(τ, B/K)) − r∫₀^τ e^{−rs} Φ(η d₂(s, B/B(τ−s))) ds`
/// and `D` the analogous `d₁`/`q`-weighted term. A vanishing denominator or
/// non-finite outcome is reported as NaN for the caller to recover from.
#[allow(clippy::too_many_arguments)]
pub(crate) fn single_boundary_update(
    b: Real,
    tau_i: Time,
    strike: Real,
    r: Rate,
    q: Rate,
    sigma: Volatility,
    eta: Real,
    boundary: &dyn Fn(Time) -> Real,
    quad: &Quadrature,
) -> Real {
    let (d1_k, d2_k) = d_pair(tau_i, b / strike, r, q, sigma);

    let numer_int = quad.integrate(
        |s| {
            let (_, d2) = d_pair(s, b / boundary(tau_i - s), r, q, sigma);
            (-r * s).exp() * normal_cdf(eta * d2)
        },
        0.0,
        tau_i,
    );
    let denom_int = quad.integrate(
        |s| {
            let (d1, _) = d_pair(s, b / boundary(tau_i - s), r, q, sigma);
            (-q * s).exp() * normal_cdf(eta * d1)
        },
        0.0,
        tau_i,
    );

    let numer = 1.0 - (-r * tau_i).exp() * normal_cdf(eta * d2_k) - r * numer_int;
    let denom = 1.0 - (-q * tau_i).exp() * normal_cdf(eta * d1_k) - q * denom_int;

    if !numer.is_finite() || !denom.is_finite() || denom.abs() < 1e-12 {
        return Real::NAN;
    }
    strike * numer / denom
}

/// One fixed-point update of a double-boundary value at maturity `tau_i`.
///
/// Same structure as [`single_boundary_update`], with the integral
/// corrections taken as the band difference between the two boundaries:
/// `η·[Φ(η d(s, B/L(τ−s))) − Φ(η d(s, B/U(τ−s)))]`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn band_boundary_update(
    b: Real,
    tau_i: Time,
    strike: Real,
    r: Rate,
    q: Rate,
    sigma: Volatility,
    eta: Real,
    upper: &dyn Fn(Time) -> Real,
    lower: &dyn Fn(Time) -> Real,
    quad: &Quadrature,
) -> Real {
    let (d1_k, d2_k) = d_pair(tau_i, b / strike, r, q, sigma);

    let numer_int = quad.integrate(
        |s| {
            let rem = tau_i - s;
            let (_, d2_l) = d_pair(s, b / lower(rem), r, q, sigma);
            let (_, d2_u) = d_pair(s, b / upper(rem), r, q, sigma);
            (-r * s).exp() * eta * (normal_cdf(eta * d2_l) - normal_cdf(eta * d2_u))
        },
        0.0,
        tau_i,
    );
    let denom_int = quad.integrate(
        |s| {
            let rem = tau_i - s;
            let (d1_l, _) = d_pair(s, b / lower(rem), r, q, sigma);
            let (d1_u, _) = d_pair(s, b / upper(rem), r, q, sigma);
            (-q * s).exp() * eta * (normal_cdf(eta * d1_l) - normal_cdf(eta * d1_u))
        },
        0.0,
        tau_i,
    );

    let numer = 1.0 - (-r * tau_i).exp() * normal_cdf(eta * d2_k) - r * numer_int;
    let denom = 1.0 - (-q * tau_i).exp() * normal_cdf(eta * d1_k) - q * denom_int;

    if !numer.is_finite() || !denom.is_finite() || denom.abs() < 1e-12 {
        return Real::NAN;
    }
    strike * numer / denom
}

/// Early-exercise premium of a single-boundary contract at `spot`.
///
/// `∫₀^τ η·(q·S·e^{−qs}·Φ(η d₁) − r·K·e^{−rs}·Φ(η d₂)) ds` with both CDF
/// arguments taken against the boundary at the remaining maturity.
#[allow(clippy::too_many_arguments)]
pub(crate) fn single_boundary_premium(
    spot: Real,
    strike: Real,
    tau: Time,
    r: Rate,
    q: Rate,
    sigma: Volatility,
    eta: Real,
    boundary: &dyn Fn(Time) -> Real,
    quad: &Quadrature,
) -> Real {
    quad.integrate(
        |s| {
            let (d1, d2) = d_pair(s, spot / boundary(tau - s), r, q, sigma);
            eta * (q * spot * (-q * s).exp() * normal_cdf(eta * d1)
                - r * strike * (-r * s).exp() * normal_cdf(eta * d2))
        },
        0.0,
        tau,
    )
}

/// Early-exercise premium of a double-boundary contract at `spot`.
///
/// The single-boundary CDF terms are replaced by the difference of the two
/// boundary-conditional terms, i.e. the probability-weighted exercise band.
#[allow(clippy::too_many_arguments)]
pub(crate) fn band_premium(
    spot: Real,
    strike: Real,
    tau: Time,
    r: Rate,
    q: Rate,
    sigma: Volatility,
    eta: Real,
    upper: &dyn Fn(Time) -> Real,
    lower: &dyn Fn(Time) -> Real,
    quad: &Quadrature,
) -> Real {
    quad.integrate(
        |s| {
            let rem = tau - s;
            let (d1_l, d2_l) = d_pair(s, spot / lower(rem), r, q, sigma);
            let (d1_u, d2_u) = d_pair(s, spot / upper(rem), r, q, sigma);
            let band_d1 = eta * (normal_cdf(eta * d1_l) - normal_cdf(eta * d1_u));
            let band_d2 = eta * (normal_cdf(eta * d2_l) - normal_cdf(eta * d2_u));
            eta * (q * spot * (-q * s).exp() * band_d1 - r * strike * (-r * s).exp() * band_d2)
        },
        0.0,
        tau,
    )
}

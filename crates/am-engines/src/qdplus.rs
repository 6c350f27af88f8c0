//! Closed-form boundary seeds.
//!
//! The fixed-point iterations of the spectral and Kim solvers need a
//! reasonable starting boundary. A Barone-Adesi–Whaley-style quadratic
//! built from the characteristic equation of the Black-Scholes PDE supplies
//! it: `½σ²λ² + (r − q − ½σ²)λ − r = 0`, time-damped through
//! `K(τ) = 1 − e^{−rτ}`. Whenever the quadratic degenerates (negative
//! discriminant, vanishing `K(τ)`, root at 1) the seed falls back to the
//! strike — a safe constant that downstream refinement can live with.

use am_core::{OptionType, Rate, Real, Time, Volatility};

/// Single-boundary seed `B∞` for the given contract parameters.
///
/// Puts use the negative root of the quadratic, calls the positive root;
/// `B = K·λ/(λ − 1)`. The result is clamped to the admissible side of the
/// strike (below for puts, above for calls).
pub fn critical_boundary(
    option_type: OptionType,
    strike: Real,
    r: Rate,
    q: Rate,
    sigma: Volatility,
    tau: Time,
) -> Real {
    let sigma2 = sigma * sigma;
    let m = 2.0 * r / sigma2;
    let n = 2.0 * (r - q) / sigma2;
    let big_k = 1.0 - (-r * tau).exp();

    if big_k.abs() < 1e-12 {
        return strike;
    }

    let disc = (n - 1.0) * (n - 1.0) + 4.0 * m / big_k;
    if disc < 0.0 {
        return strike;
    }

    let root = match option_type {
        OptionType::Call => (-(n - 1.0) + disc.sqrt()) / 2.0,
        OptionType::Put => (-(n - 1.0) - disc.sqrt()) / 2.0,
    };

    if (root - 1.0).abs() < 1e-9 {
        return strike;
    }
    let b = strike * root / (root - 1.0);
    if !b.is_finite() || b <= 0.0 {
        return strike;
    }

    match option_type {
        OptionType::Put => b.min(strike),
        OptionType::Call => b.max(strike),
    }
}

/// Heuristic double-boundary put seeds as fractions of the strike.
const UPPER_SEED_RATIO: Real = 0.75;
const LOWER_SEED_RATIO: Real = 0.55;

/// Heuristic double-boundary call seeds as multiples of the strike.
const CALL_LOWER_SEED_RATIO: Real = 1.20;
const CALL_UPPER_SEED_RATIO: Real = 1.50;

/// Constant (upper, lower) seeds for a double-boundary put.
///
/// Tries the perpetual roots of the characteristic quadratic
/// (`B = K·λ/(λ−1)` for each real root); when the discriminant is negative —
/// the usual case deep in the negative-rate regime — or the candidates come
/// out mis-ordered, falls back to fixed strike multiples.
pub fn double_boundary_put_seed(strike: Real, r: Rate, q: Rate, sigma: Volatility) -> (Real, Real) {
    let fallback = (strike * UPPER_SEED_RATIO, strike * LOWER_SEED_RATIO);

    let sigma2 = sigma * sigma;
    let m = 2.0 * r / sigma2;
    let n = 2.0 * (r - q) / sigma2;
    let disc = (n - 1.0) * (n - 1.0) + 4.0 * m;
    if disc <= 0.0 {
        return fallback;
    }

    let lambda_minus = (-(n - 1.0) - disc.sqrt()) / 2.0;
    let lambda_plus = (-(n - 1.0) + disc.sqrt()) / 2.0;
    if (lambda_minus - 1.0).abs() < 1e-9 || (lambda_plus - 1.0).abs() < 1e-9 {
        return fallback;
    }

    let upper = strike * lambda_minus / (lambda_minus - 1.0);
    let lower = strike * lambda_plus / (lambda_plus - 1.0);

    let ordered = upper.is_finite()
        && lower.is_finite()
        && lower > 0.0
        && lower < upper
        && upper < strike;
    if ordered {
        (upper, lower)
    } else {
        fallback
    }
}

/// Constant (upper, lower) seeds for a double-boundary call.
///
/// The call side is not iterated (see the spectral engine); these heuristic
/// multiples of the strike are used as-is.
pub fn double_boundary_call_seed(strike: Real) -> (Real, Real) {
    (strike * CALL_UPPER_SEED_RATIO, strike * CALL_LOWER_SEED_RATIO)
}

//! Near-expiry handling shared by the engines.
//!
//! As τ → 0 both the PDE and the boundary quadrature become ill-conditioned:
//! the grid collapses, the fixed-point integrands turn into step functions,
//! and finite-difference Greeks divide noise by noise. Inside a short window
//! before expiry the engines therefore blend toward intrinsic value and the
//! Greeks switch to their closed-form limits.

use am_core::{OptionSpec, OptionType, Real, Time};
use am_math::black_scholes::black_scholes_merton;
use am_math::distributions::normal_pdf;

/// Width of the blending window: three trading days.
pub const TAU_MIN: Time = 3.0 / 252.0;

/// Below this time to expiry the price is pure intrinsic: one trading day.
pub const TAU_INTRINSIC: Time = 1.0 / 252.0;

/// Blend weight of the engine price against intrinsic value.
///
/// 0 at (and below) the intrinsic cutoff, ramping linearly to 1 at
/// [`TAU_MIN`], so the blended price is continuous at both window edges.
pub fn blend_weight(tau: Time) -> Real {
    if tau <= TAU_INTRINSIC {
        0.0
    } else if tau >= TAU_MIN {
        1.0
    } else {
        (tau - TAU_INTRINSIC) / (TAU_MIN - TAU_INTRINSIC)
    }
}

/// Whether `tau` falls inside the blending window.
pub fn in_blend_window(tau: Time) -> bool {
    tau < TAU_MIN
}

/// Limiting delta: a step function at the strike (±½ exactly at the money).
pub fn limiting_delta(spec: &OptionSpec) -> Real {
    let moneyness = spec.spot - spec.strike;
    match spec.option_type {
        OptionType::Call => {
            if moneyness > 0.0 {
                1.0
            } else if moneyness < 0.0 {
                0.0
            } else {
                0.5
            }
        }
        OptionType::Put => {
            if moneyness < 0.0 {
                -1.0
            } else if moneyness > 0.0 {
                0.0
            } else {
                -0.5
            }
        }
    }
}

/// Limiting gamma: the closed-form value capped at the at-the-money spike
/// the window edge would produce.
pub fn limiting_gamma(spec: &OptionSpec) -> Real {
    let cap = normal_pdf(0.0) / (spec.spot * spec.vol * TAU_MIN.sqrt());
    let bs = black_scholes_merton(
        spec.option_type,
        spec.spot,
        spec.strike,
        spec.rate,
        spec.dividend_yield,
        spec.vol,
        spec.tau.max(TAU_INTRINSIC),
    );
    bs.gamma.min(cap)
}

/// Limiting theta and rho: the closed-form European values, with τ floored
/// at the intrinsic cutoff so the at-the-money theta spike stays bounded.
pub fn limiting_theta_rho(spec: &OptionSpec) -> (Real, Real) {
    let bs = black_scholes_merton(
        spec.option_type,
        spec.spot,
        spec.strike,
        spec.rate,
        spec.dividend_yield,
        spec.vol,
        spec.tau.max(TAU_INTRINSIC),
    );
    (bs.theta, bs.rho)
}

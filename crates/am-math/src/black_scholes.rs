//! Black-Scholes-Merton closed form and Greeks.

use am_core::{OptionType, Rate, Real, Time, Volatility};

use crate::distributions::{normal_cdf, normal_pdf};

/// Price and Greeks of a European vanilla option.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct European {
    /// Option price.
    pub price: Real,
    /// ∂price/∂spot.
    pub delta: Real,
    /// ∂²price/∂spot².
    pub gamma: Real,
    /// ∂price/∂vol (per 1.0 absolute vol).
    pub vega: Real,
    /// Calendar-time decay (per year).
    pub theta: Real,
    /// ∂price/∂rate (per 1.0 rate shift).
    pub rho: Real,
}

/// Closed-form Black-Scholes-Merton price and Greeks.
///
/// $$C = S e^{-qT} \Phi(d_1) - K e^{-rT} \Phi(d_2)$$
/// $$P = K e^{-rT} \Phi(-d_2) - S e^{-qT} \Phi(-d_1)$$
///
/// where $d_{1,2} = \frac{\ln(S/K) + (r - q \pm \sigma^2/2)T}{\sigma\sqrt{T}}$.
///
/// `tau <= 0` collapses to intrinsic value with zero Greeks. A vanishing
/// standard deviation is treated as a forward-moneyness step.
pub fn black_scholes_merton(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    rate: Rate,
    dividend_yield: Rate,
    vol: Volatility,
    tau: Time,
) -> European {
    let phi = option_type.sign();

    if tau <= 0.0 {
        return European {
            price: (phi * (spot - strike)).max(0.0),
            ..European::default()
        };
    }

    let r = rate;
    let q = dividend_yield;
    let sqrt_t = tau.sqrt();
    let std_dev = vol * sqrt_t;
    let df_r = (-r * tau).exp();
    let df_q = (-q * tau).exp();
    let fwd = spot * ((r - q) * tau).exp();

    let (d1, d2) = if std_dev > 1e-15 {
        let d1 = ((spot / strike).ln() + (r - q + 0.5 * vol * vol) * tau) / std_dev;
        (d1, d1 - std_dev)
    } else {
        let big = if fwd > strike { 1e15 } else { -1e15 };
        (big, big)
    };

    let nd1 = normal_cdf(phi * d1);
    let nd2 = normal_cdf(phi * d2);
    let npd1 = normal_pdf(d1);

    let price = phi * (spot * df_q * nd1 - strike * df_r * nd2);
    let delta = phi * df_q * nd1;
    let gamma = df_q * npd1 / (spot * std_dev.max(1e-15));
    let vega = spot * df_q * npd1 * sqrt_t;
    let theta = {
        let decay = -(spot * df_q * npd1 * vol) / (2.0 * sqrt_t);
        decay - phi * r * strike * df_r * nd2 + phi * q * spot * df_q * nd1
    };
    let rho = phi * strike * tau * df_r * nd2;

    European {
        price,
        delta,
        gamma,
        vega,
        theta,
        rho,
    }
}

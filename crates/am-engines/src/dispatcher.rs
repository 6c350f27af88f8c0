//! The unified pricing façade.
//!
//! [`AmericanOptionPricer`] wraps the spectral and finite-difference engines
//! behind one interface: regime classification, near-expiry blending, and
//! arbitrage-floor enforcement happen here, so callers always receive a
//! usable, arbitrage-consistent number regardless of which engine (or
//! fallback) produced it.

use am_core::{
    ExerciseBoundary, OptionSpec, OptionType, PricingMethod, PricingResult, RateRegime, Rate,
    Real, Result, Time, Volatility,
};
use am_math::black_scholes::black_scholes_merton;

use crate::fd_engine::FiniteDifferenceEngine;
use crate::near_expiry::{
    blend_weight, in_blend_window, limiting_delta, limiting_gamma, limiting_theta_rho,
    TAU_INTRINSIC,
};
use crate::spectral::SpectralEngine;

/// Which engine the dispatcher prices with by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryEngine {
    /// Spectral boundary collocation (the default).
    Spectral,
    /// Crank-Nicolson finite differences.
    FiniteDifference,
}

/// The unified American option pricer.
///
/// Prices with the spectral engine by default and, with invariant
/// enforcement on (the default), clamps the result up to
/// `max(price, intrinsic, European)` so approximation error can never
/// produce a sub-arbitrage price. Rho always comes from the
/// finite-difference engine — spectral rho is not implemented.
#[derive(Debug, Clone)]
pub struct AmericanOptionPricer {
    spectral: SpectralEngine,
    fd: FiniteDifferenceEngine,
    primary: PrimaryEngine,
    enforce_invariants: bool,
}

impl Default for AmericanOptionPricer {
    fn default() -> Self {
        Self {
            spectral: SpectralEngine::default(),
            fd: FiniteDifferenceEngine::default(),
            primary: PrimaryEngine::Spectral,
            enforce_invariants: true,
        }
    }
}

impl AmericanOptionPricer {
    /// Create a pricer with explicit engines.
    pub fn new(spectral: SpectralEngine, fd: FiniteDifferenceEngine) -> Self {
        Self {
            spectral,
            fd,
            ..Self::default()
        }
    }

    /// Select the primary pricing engine.
    pub fn with_primary(mut self, primary: PrimaryEngine) -> Self {
        self.primary = primary;
        self
    }

    /// Toggle the arbitrage-floor clamp (on by default).
    pub fn with_invariant_enforcement(mut self, enabled: bool) -> Self {
        self.enforce_invariants = enabled;
        self
    }

    // ── Plain-argument API ────────────────────────────────────────────────

    /// Price an American option.
    #[allow(clippy::too_many_arguments)]
    pub fn price(
        &self,
        spot: Real,
        strike: Real,
        tau: Time,
        rate: Rate,
        dividend_yield: Rate,
        vol: Volatility,
        option_type: OptionType,
    ) -> Result<Real> {
        self.price_spec(&OptionSpec::new(
            spot,
            strike,
            tau,
            rate,
            dividend_yield,
            vol,
            option_type,
        ))
    }

    /// Delta.
    #[allow(clippy::too_many_arguments)]
    pub fn delta(
        &self,
        spot: Real,
        strike: Real,
        tau: Time,
        rate: Rate,
        dividend_yield: Rate,
        vol: Volatility,
        option_type: OptionType,
    ) -> Result<Real> {
        self.delta_spec(&OptionSpec::new(
            spot,
            strike,
            tau,
            rate,
            dividend_yield,
            vol,
            option_type,
        ))
    }

    /// Gamma.
    #[allow(clippy::too_many_arguments)]
    pub fn gamma(
        &self,
        spot: Real,
        strike: Real,
        tau: Time,
        rate: Rate,
        dividend_yield: Rate,
        vol: Volatility,
        option_type: OptionType,
    ) -> Result<Real> {
        self.gamma_spec(&OptionSpec::new(
            spot,
            strike,
            tau,
            rate,
            dividend_yield,
            vol,
            option_type,
        ))
    }

    /// Vega.
    #[allow(clippy::too_many_arguments)]
    pub fn vega(
        &self,
        spot: Real,
        strike: Real,
        tau: Time,
        rate: Rate,
        dividend_yield: Rate,
        vol: Volatility,
        option_type: OptionType,
    ) -> Result<Real> {
        self.vega_spec(&OptionSpec::new(
            spot,
            strike,
            tau,
            rate,
            dividend_yield,
            vol,
            option_type,
        ))
    }

    /// Theta (per year).
    #[allow(clippy::too_many_arguments)]
    pub fn theta(
        &self,
        spot: Real,
        strike: Real,
        tau: Time,
        rate: Rate,
        dividend_yield: Rate,
        vol: Volatility,
        option_type: OptionType,
    ) -> Result<Real> {
        self.theta_spec(&OptionSpec::new(
            spot,
            strike,
            tau,
            rate,
            dividend_yield,
            vol,
            option_type,
        ))
    }

    /// Rho — always computed by the finite-difference engine.
    #[allow(clippy::too_many_arguments)]
    pub fn rho(
        &self,
        spot: Real,
        strike: Real,
        tau: Time,
        rate: Rate,
        dividend_yield: Rate,
        vol: Volatility,
        option_type: OptionType,
    ) -> Result<Real> {
        self.fd.rho(&OptionSpec::new(
            spot,
            strike,
            tau,
            rate,
            dividend_yield,
            vol,
            option_type,
        ))
    }

    /// Price and return the full result: Greeks, regime, method label,
    /// premium, and (for DoubleBoundary) the boundary snapshots.
    #[allow(clippy::too_many_arguments)]
    pub fn price_with_details(
        &self,
        spot: Real,
        strike: Real,
        tau: Time,
        rate: Rate,
        dividend_yield: Rate,
        vol: Volatility,
        option_type: OptionType,
    ) -> Result<PricingResult> {
        let spec = OptionSpec::new(spot, strike, tau, rate, dividend_yield, vol, option_type);
        spec.validate()?;

        let priced = self.priced(&spec)?;
        Ok(PricingResult {
            price: priced.price,
            delta: self.delta_spec(&spec)?,
            gamma: self.gamma_spec(&spec)?,
            vega: self.vega_spec(&spec)?,
            theta: self.theta_spec(&spec)?,
            rho: self.fd.rho(&spec)?,
            regime: spec.regime(),
            method: priced.method,
            early_exercise_premium: priced.premium,
            upper_boundary: priced.upper,
            lower_boundary: priced.lower,
        })
    }

    // ── Spec-struct API ───────────────────────────────────────────────────

    /// Price from an [`OptionSpec`].
    pub fn price_spec(&self, spec: &OptionSpec) -> Result<Real> {
        Ok(self.priced(spec)?.price)
    }

    /// Delta from an [`OptionSpec`].
    pub fn delta_spec(&self, spec: &OptionSpec) -> Result<Real> {
        spec.validate()?;
        if in_blend_window(spec.tau) {
            return Ok(limiting_delta(spec));
        }
        let h = 0.01 * spec.spot;
        let up = self.price_spec(&OptionSpec { spot: spec.spot + h, ..*spec })?;
        let down = self.price_spec(&OptionSpec { spot: spec.spot - h, ..*spec })?;
        Ok((up - down) / (2.0 * h))
    }

    /// Gamma from an [`OptionSpec`].
    pub fn gamma_spec(&self, spec: &OptionSpec) -> Result<Real> {
        spec.validate()?;
        if in_blend_window(spec.tau) {
            return Ok(limiting_gamma(spec));
        }
        let h = 0.01 * spec.spot;
        let up = self.price_spec(&OptionSpec { spot: spec.spot + h, ..*spec })?;
        let mid = self.price_spec(spec)?;
        let down = self.price_spec(&OptionSpec { spot: spec.spot - h, ..*spec })?;
        Ok((up - 2.0 * mid + down) / (h * h))
    }

    /// Vega from an [`OptionSpec`].
    pub fn vega_spec(&self, spec: &OptionSpec) -> Result<Real> {
        spec.validate()?;
        if in_blend_window(spec.tau) {
            // Finite differences divide noise by noise here; the limit is 0.
            return Ok(0.0);
        }
        let h = (0.01 * spec.vol).max(1e-4);
        let lo = (spec.vol - h).max(1e-6);
        let up = self.price_spec(&OptionSpec { vol: spec.vol + h, ..*spec })?;
        let down = self.price_spec(&OptionSpec { vol: lo, ..*spec })?;
        Ok((up - down) / (spec.vol + h - lo))
    }

    /// Theta (per year) from an [`OptionSpec`].
    pub fn theta_spec(&self, spec: &OptionSpec) -> Result<Real> {
        spec.validate()?;
        if in_blend_window(spec.tau) {
            return Ok(limiting_theta_rho(spec).0);
        }
        let dt = (1.0 / 365.0_f64).min(0.5 * spec.tau);
        let later = self.price_spec(&OptionSpec { tau: spec.tau - dt, ..*spec })?;
        let now = self.price_spec(spec)?;
        Ok((later - now) / dt)
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn priced(&self, spec: &OptionSpec) -> Result<Priced> {
        spec.validate()?;

        let intrinsic = spec.intrinsic();
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

        // Below one trading day the engines are bypassed entirely. The
        // arbitrage floor still applies: American ≥ European holds for every
        // valid input, and clamping here keeps the price continuous across
        // the cutoff.
        if spec.tau < TAU_INTRINSIC {
            let price = if self.enforce_invariants {
                intrinsic.max(european)
            } else {
                intrinsic
            };
            return Ok(Priced {
                price,
                premium: (price - european).max(0.0),
                method: PricingMethod::Hybrid,
                upper: None,
                lower: None,
            });
        }

        let (engine_price, mut method, mut upper, mut lower) = match self.primary {
            PrimaryEngine::Spectral => {
                let out = self.spectral.evaluate(spec)?;
                (out.price, PricingMethod::Spectral, out.upper, out.lower)
            }
            PrimaryEngine::FiniteDifference => {
                (self.fd.price(spec)?, PricingMethod::FiniteDifference, None, None)
            }
        };

        // Boundary snapshots belong to the double-boundary regime even when
        // the PDE engine produced the price.
        if spec.regime() == RateRegime::DoubleBoundary && upper.is_none() {
            let out = self.spectral.evaluate(spec)?;
            upper = out.upper;
            lower = out.lower;
        }

        let mut price = engine_price;
        if in_blend_window(spec.tau) {
            let w = blend_weight(spec.tau);
            price = w * engine_price + (1.0 - w) * intrinsic;
            method = PricingMethod::Hybrid;
        }

        if self.enforce_invariants {
            price = price.max(intrinsic).max(european);
        }
        let premium = (price - european).max(0.0);

        Ok(Priced {
            price,
            premium,
            method,
            upper,
            lower,
        })
    }
}

struct Priced {
    price: Real,
    premium: Real,
    method: PricingMethod,
    upper: Option<ExerciseBoundary>,
    lower: Option<ExerciseBoundary>,
}

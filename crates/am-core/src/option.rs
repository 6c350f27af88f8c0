//! The option contract data model.
//!
//! [`OptionSpec`] is the immutable value type describing one pricing request.
//! All engines take it by reference and hold no state beyond their own
//! configuration, so a single spec may be priced concurrently from several
//! threads.

use std::fmt;

use crate::errors::Result;
use crate::regime::{classify, RateRegime};
use crate::{Rate, Real, Time, Volatility};

/// Option type (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OptionType {
    /// A call option (right to buy).
    Call,
    /// A put option (right to sell).
    Put,
}

impl OptionType {
    /// +1 for Call, −1 for Put.
    pub fn sign(self) -> Real {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }

    /// Whether this is a call.
    pub fn is_call(self) -> bool {
        matches!(self, OptionType::Call)
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "Call"),
            OptionType::Put => write!(f, "Put"),
        }
    }
}

/// The inputs of a single American-option pricing call.
///
/// Spot, strike, and volatility must be strictly positive; the rate and
/// dividend yield may take any sign (negative rates are first-class inputs
/// here). A non-positive time to expiry is not an error — it degenerates to
/// intrinsic value at the engine level.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptionSpec {
    /// Spot price of the underlying.
    pub spot: Real,
    /// Strike price.
    pub strike: Real,
    /// Time to expiry in years.
    pub tau: Time,
    /// Continuously-compounded risk-free rate.
    pub rate: Rate,
    /// Continuous dividend yield.
    pub dividend_yield: Rate,
    /// Black volatility.
    pub vol: Volatility,
    /// Call or put.
    pub option_type: OptionType,
}

impl OptionSpec {
    /// Create a new spec. Does not validate; see [`OptionSpec::validate`].
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        spot: Real,
        strike: Real,
        tau: Time,
        rate: Rate,
        dividend_yield: Rate,
        vol: Volatility,
        option_type: OptionType,
    ) -> Self {
        Self {
            spot,
            strike,
            tau,
            rate,
            dividend_yield,
            vol,
            option_type,
        }
    }

    /// Check the guard clauses: spot, strike, and vol must be strictly
    /// positive and finite, and tau must not be NaN.
    pub fn validate(&self) -> Result<()> {
        crate::require!(
            self.spot.is_finite() && self.spot > 0.0,
            "spot must be positive and finite, got {}",
            self.spot
        );
        crate::require!(
            self.strike.is_finite() && self.strike > 0.0,
            "strike must be positive and finite, got {}",
            self.strike
        );
        crate::require!(
            self.vol.is_finite() && self.vol > 0.0,
            "vol must be positive and finite, got {}",
            self.vol
        );
        crate::require!(!self.tau.is_nan(), "tau must not be NaN");
        crate::require!(self.rate.is_finite(), "rate must be finite, got {}", self.rate);
        crate::require!(
            self.dividend_yield.is_finite(),
            "dividend_yield must be finite, got {}",
            self.dividend_yield
        );
        Ok(())
    }

    /// Intrinsic value at the current spot: `max(0, η(S − K))`.
    pub fn intrinsic(&self) -> Real {
        self.intrinsic_at(self.spot)
    }

    /// Intrinsic value at an arbitrary underlying level.
    pub fn intrinsic_at(&self, s: Real) -> Real {
        (self.option_type.sign() * (s - self.strike)).max(0.0)
    }

    /// The rate regime this contract falls into.
    pub fn regime(&self) -> RateRegime {
        classify(self.rate, self.dividend_yield, self.option_type.is_call())
    }
}

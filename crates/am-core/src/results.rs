//! Pricing result and exercise-boundary types.

use crate::regime::RateRegime;
use crate::{Real, Time};

/// Which engine produced a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PricingMethod {
    /// Crank-Nicolson finite-difference PDE solve.
    FiniteDifference,
    /// Spectral boundary collocation.
    Spectral,
    /// Engine price blended with intrinsic value inside the near-expiry
    /// window.
    Hybrid,
}

impl std::fmt::Display for PricingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PricingMethod::FiniteDifference => write!(f, "FiniteDifference"),
            PricingMethod::Spectral => write!(f, "Spectral"),
            PricingMethod::Hybrid => write!(f, "Hybrid"),
        }
    }
}

/// An exercise boundary sampled at an ordered sequence of time nodes.
///
/// `times[i]` is a time to expiry (ascending, years) and `values[i]` the
/// corresponding critical underlying level. Built fresh per pricing call and
/// owned by the caller afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExerciseBoundary {
    /// Time-to-expiry nodes, ascending.
    pub times: Vec<Time>,
    /// Boundary level at each node.
    pub values: Vec<Real>,
}

impl ExerciseBoundary {
    /// Build a boundary from co-indexed node and value vectors.
    ///
    /// # Panics
    /// Panics if the vectors differ in length (programming error, not an
    /// input error).
    pub fn new(times: Vec<Time>, values: Vec<Real>) -> Self {
        assert_eq!(times.len(), values.len(), "boundary vectors must be co-indexed");
        Self { times, values }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether the boundary holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Iterate over `(time, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Time, Real)> + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }

    /// The value at the largest time-to-expiry node.
    pub fn terminal_value(&self) -> Option<Real> {
        self.values.last().copied()
    }
}

/// The full output of a pricing call.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricingResult {
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
    /// The rate regime the request was classified into.
    pub regime: RateRegime,
    /// The engine (or blend) that produced the price.
    pub method: PricingMethod,
    /// American price minus the matching European price, floored at zero.
    pub early_exercise_premium: Real,
    /// Upper exercise boundary (DoubleBoundary regime only).
    pub upper_boundary: Option<ExerciseBoundary>,
    /// Lower exercise boundary (DoubleBoundary regime only).
    pub lower_boundary: Option<ExerciseBoundary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_pairs() {
        let b = ExerciseBoundary::new(vec![0.0, 0.5, 1.0], vec![100.0, 90.0, 85.0]);
        assert_eq!(b.len(), 3);
        assert!(!b.is_empty());
        let pairs: Vec<_> = b.iter().collect();
        assert_eq!(pairs[1], (0.5, 90.0));
        assert_eq!(b.terminal_value(), Some(85.0));
    }

    #[test]
    #[should_panic(expected = "co-indexed")]
    fn mismatched_lengths_panic() {
        let _ = ExerciseBoundary::new(vec![0.0, 1.0], vec![100.0]);
    }
}

//! Rate-regime classification.
//!
//! Under most rate/dividend combinations an American option has a single
//! exercise boundary. When the cost of carry inverts under negative rates —
//! a put with `q < r < 0`, or a call with `0 < r < q` — the continuation
//! region is bounded by two disjoint boundaries instead.

use crate::Rate;

/// The exercise-boundary topology implied by the rate/dividend pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RateRegime {
    /// A single exercise boundary.
    Standard,
    /// Two disjoint exercise boundaries (upper and lower).
    DoubleBoundary,
}

impl std::fmt::Display for RateRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateRegime::Standard => write!(f, "Standard"),
            RateRegime::DoubleBoundary => write!(f, "DoubleBoundary"),
        }
    }
}

/// Classify the rate regime for the given rate, dividend yield, and option
/// direction.
///
/// `DoubleBoundary` iff `(put ∧ q < r < 0) ∨ (call ∧ 0 < r < q)`; `Standard`
/// otherwise. Pure total function.
pub fn classify(r: Rate, q: Rate, is_call: bool) -> RateRegime {
    let double = if is_call {
        0.0 < r && r < q
    } else {
        q < r && r < 0.0
    };
    if double {
        RateRegime::DoubleBoundary
    } else {
        RateRegime::Standard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn put_double_boundary_quadrants() {
        // DoubleBoundary for puts iff q < r < 0
        assert_eq!(classify(-0.005, -0.010, false), RateRegime::DoubleBoundary);
        assert_eq!(classify(-0.010, -0.005, false), RateRegime::Standard); // r < q
        assert_eq!(classify(0.005, -0.010, false), RateRegime::Standard); // r > 0
        assert_eq!(classify(0.005, 0.010, false), RateRegime::Standard);
        assert_eq!(classify(-0.005, 0.010, false), RateRegime::Standard);
        assert_eq!(classify(0.0, -0.010, false), RateRegime::Standard); // r = 0
    }

    #[test]
    fn call_double_boundary_quadrants() {
        // DoubleBoundary for calls iff 0 < r < q
        assert_eq!(classify(0.005, 0.010, true), RateRegime::DoubleBoundary);
        assert_eq!(classify(0.010, 0.005, true), RateRegime::Standard); // r > q
        assert_eq!(classify(-0.005, 0.010, true), RateRegime::Standard); // r < 0
        assert_eq!(classify(-0.005, -0.010, true), RateRegime::Standard);
        assert_eq!(classify(0.0, 0.010, true), RateRegime::Standard); // r = 0
    }

    #[test]
    fn boundary_cases_are_standard() {
        // Equalities fall on the Standard side
        assert_eq!(classify(-0.01, -0.01, false), RateRegime::Standard);
        assert_eq!(classify(0.01, 0.01, true), RateRegime::Standard);
    }

    proptest! {
        #[test]
        fn classification_is_total_and_consistent(
            r in -0.2f64..0.2,
            q in -0.2f64..0.2,
            is_call in any::<bool>(),
        ) {
            let regime = classify(r, q, is_call);
            let expected_double = if is_call {
                0.0 < r && r < q
            } else {
                q < r && r < 0.0
            };
            prop_assert_eq!(regime == RateRegime::DoubleBoundary, expected_double);
        }
    }
}

//! Regime classification and double-boundary behaviour.

use amopt::math::black_scholes::black_scholes_merton;
use amopt::{classify, AmericanOptionPricer, OptionType, RateRegime};
use proptest::prelude::*;

#[test]
fn classification_table_covers_all_sign_quadrants() {
    // (r, q, is_call, expected)
    let table = [
        // Puts: DoubleBoundary iff q < r < 0
        (0.05, 0.02, false, RateRegime::Standard),
        (0.05, -0.02, false, RateRegime::Standard),
        (-0.005, 0.02, false, RateRegime::Standard),
        (-0.005, -0.010, false, RateRegime::DoubleBoundary),
        (-0.010, -0.005, false, RateRegime::Standard),
        (0.0, -0.010, false, RateRegime::Standard),
        // Calls: DoubleBoundary iff 0 < r < q
        (0.005, 0.010, true, RateRegime::DoubleBoundary),
        (0.010, 0.005, true, RateRegime::Standard),
        (-0.005, 0.010, true, RateRegime::Standard),
        (-0.005, -0.010, true, RateRegime::Standard),
        (0.05, -0.02, true, RateRegime::Standard),
        (0.0, 0.010, true, RateRegime::Standard),
    ];
    for (r, q, is_call, expected) in table {
        assert_eq!(
            classify(r, q, is_call),
            expected,
            "classify({r}, {q}, {is_call})"
        );
    }
}

#[test]
fn negative_rate_put_is_double_boundary_with_ordered_boundaries() {
    // Concrete scenario: S=K=100, τ=1, r=−0.5 %, q=−1 %, σ=20 %, put.
    assert_eq!(classify(-0.005, -0.010, false), RateRegime::DoubleBoundary);

    let details = AmericanOptionPricer::default()
        .price_with_details(100.0, 100.0, 1.0, -0.005, -0.010, 0.20, OptionType::Put)
        .unwrap();
    assert_eq!(details.regime, RateRegime::DoubleBoundary);

    let upper = details.upper_boundary.expect("upper boundary");
    let lower = details.lower_boundary.expect("lower boundary");
    assert_eq!(upper.len(), lower.len());
    assert!(upper.len() >= 4);
    for i in 0..upper.len() {
        assert!(
            upper.values[i] > lower.values[i],
            "upper <= lower at node {i}"
        );
        assert!(lower.values[i] > 0.0, "lower not positive at node {i}");
        assert!(
            upper.values[i] <= 100.0 + 1e-9,
            "put boundary above strike at node {i}"
        );
    }
}

#[test]
fn double_boundary_put_upper_is_non_increasing() {
    let details = AmericanOptionPricer::default()
        .price_with_details(100.0, 100.0, 1.0, -0.005, -0.010, 0.20, OptionType::Put)
        .unwrap();
    let upper = details.upper_boundary.expect("upper boundary");
    for w in upper.values.windows(2) {
        assert!(
            w[1] <= w[0] + 1e-3,
            "upper boundary not non-increasing: {:?}",
            upper.values
        );
    }
    let lower = details.lower_boundary.expect("lower boundary");
    for w in lower.values.windows(2) {
        assert!(
            w[1] >= w[0] - 1e-3,
            "lower boundary not non-decreasing: {:?}",
            lower.values
        );
    }
}

#[test]
fn double_boundary_call_boundaries_exceed_strike() {
    let details = AmericanOptionPricer::default()
        .price_with_details(100.0, 100.0, 1.0, 0.005, 0.010, 0.20, OptionType::Call)
        .unwrap();
    assert_eq!(details.regime, RateRegime::DoubleBoundary);
    let upper = details.upper_boundary.expect("upper boundary");
    let lower = details.lower_boundary.expect("lower boundary");
    for i in 0..upper.len() {
        assert!(upper.values[i] > lower.values[i]);
        assert!(lower.values[i] > 100.0);
    }
}

#[test]
fn double_boundary_price_respects_arbitrage_floors() {
    let price = AmericanOptionPricer::default()
        .price(100.0, 100.0, 1.0, -0.005, -0.010, 0.20, OptionType::Put)
        .unwrap();
    let european =
        black_scholes_merton(OptionType::Put, 100.0, 100.0, -0.005, -0.010, 0.20, 1.0).price;
    assert!(price >= european - 1e-12, "price {price} < european {european}");
    assert!(price >= 0.0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn price_never_violates_the_arbitrage_floor(
        spot in 50.0f64..150.0,
        strike in 50.0f64..150.0,
        tau in 0.05f64..2.0,
        r in -0.05f64..0.10,
        q in -0.05f64..0.10,
        vol in 0.10f64..0.50,
        is_call in any::<bool>(),
    ) {
        let ty = if is_call { OptionType::Call } else { OptionType::Put };
        let pricer = AmericanOptionPricer::default();
        let price = pricer.price(spot, strike, tau, r, q, vol, ty).unwrap();
        let european = black_scholes_merton(ty, spot, strike, r, q, vol, tau).price;
        let intrinsic = (ty.sign() * (spot - strike)).max(0.0);

        prop_assert!(price.is_finite());
        prop_assert!(price >= intrinsic - 1e-9, "price {} < intrinsic {}", price, intrinsic);
        prop_assert!(price >= european - 1e-9, "price {} < european {}", price, european);
    }

    #[test]
    fn classification_agrees_with_its_definition(
        r in -0.1f64..0.1,
        q in -0.1f64..0.1,
        is_call in any::<bool>(),
    ) {
        let expected = if is_call { 0.0 < r && r < q } else { q < r && r < 0.0 };
        prop_assert_eq!(
            classify(r, q, is_call) == RateRegime::DoubleBoundary,
            expected
        );
    }
}

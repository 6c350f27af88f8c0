//! The standard normal distribution.

use am_core::Real;
use std::f64::consts::{FRAC_1_SQRT_2, PI};

/// The standard normal probability density function.
///
/// `φ(x) = exp(-x²/2) / √(2π)`
#[inline]
pub fn normal_pdf(x: Real) -> Real {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// The standard normal cumulative distribution function Φ(x).
///
/// Computed through the complementary error function,
/// `Φ(x) = erfc(−x/√2) / 2`, which keeps full accuracy in both tails.
#[inline]
pub fn normal_cdf(x: Real) -> Real {
    0.5 * statrs::function::erf::erfc(-x * FRAC_1_SQRT_2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pdf_at_zero() {
        assert_relative_eq!(normal_pdf(0.0), 0.398_942_280_401_432_7, epsilon = 1e-15);
    }

    #[test]
    fn cdf_reference_values() {
        assert_relative_eq!(normal_cdf(0.0), 0.5, epsilon = 1e-15);
        // Φ(1) and Φ(-1) from tables
        assert_relative_eq!(normal_cdf(1.0), 0.841_344_746_068_543, epsilon = 1e-12);
        assert_relative_eq!(normal_cdf(-1.0), 0.158_655_253_931_457, epsilon = 1e-12);
        // Deep tails stay in (0, 1)
        assert!(normal_cdf(-10.0) > 0.0);
        assert!(normal_cdf(10.0) < 1.0);
        assert!(normal_cdf(-10.0) < 1e-20);
    }

    #[test]
    fn cdf_symmetry() {
        for &x in &[0.1, 0.7, 1.3, 2.9] {
            assert_relative_eq!(normal_cdf(x) + normal_cdf(-x), 1.0, epsilon = 1e-14);
        }
    }
}

//! Crank-Nicolson finite-difference engine.
//!
//! Prices by backward-marching the Black-Scholes PDE on a non-uniform ASINH
//! log-spot grid with per-step early-exercise projection. The projection
//! handles any boundary topology implicitly, so this engine needs no regime
//! dispatch — it also serves as the independent cross-check for the
//! spectral engine and as the dispatcher's rho source.

use am_core::{OptionSpec, Real, Result, Size};
use am_methods::{AsinhGrid, FdmSolver};

/// Grid half-width in units of `σ·√τ`.
const GRID_WIDTH_STDDEVS: Real = 10.0;

/// The finite-difference pricing engine.
///
/// Configuration is read-only after construction; each call builds its own
/// transient grid, so concurrent pricing from several threads is safe.
#[derive(Debug, Clone)]
pub struct FiniteDifferenceEngine {
    /// Number of spatial grid nodes.
    pub grid_nodes: Size,
    /// Number of uniform time steps.
    pub time_steps: Size,
}

impl Default for FiniteDifferenceEngine {
    fn default() -> Self {
        Self {
            grid_nodes: 201,
            time_steps: 100,
        }
    }
}

impl FiniteDifferenceEngine {
    /// Create an engine with explicit grid dimensions.
    pub fn new(grid_nodes: Size, time_steps: Size) -> Self {
        Self {
            grid_nodes: grid_nodes.max(11),
            time_steps: time_steps.max(4),
        }
    }

    /// Price the contract.
    pub fn price(&self, spec: &OptionSpec) -> Result<Real> {
        spec.validate()?;
        if spec.tau <= 0.0 {
            return Ok(spec.intrinsic());
        }

        let x_mid = spec.spot.ln();
        let stddev = spec.vol * spec.tau.sqrt();
        // Widen the grid when the strike would fall off the wings.
        let half = (GRID_WIDTH_STDDEVS * stddev)
            .max((spec.spot / spec.strike).ln().abs() + 2.0 * stddev)
            .max(1e-3);
        let grid = AsinhGrid::new(x_mid, half, half / GRID_WIDTH_STDDEVS, self.grid_nodes);

        let solver = FdmSolver::new(
            spec.rate,
            spec.dividend_yield,
            spec.vol,
            spec.tau,
            self.time_steps,
        );
        let values = solver.solve(&grid, &|s| spec.intrinsic_at(s), true);
        Ok(grid.interpolate(&values, x_mid))
    }

    /// Delta by central bump-and-reprice (±1 % of spot).
    pub fn delta(&self, spec: &OptionSpec) -> Result<Real> {
        let h = 0.01 * spec.spot;
        let up = self.price(&OptionSpec { spot: spec.spot + h, ..*spec })?;
        let down = self.price(&OptionSpec { spot: spec.spot - h, ..*spec })?;
        Ok((up - down) / (2.0 * h))
    }

    /// Gamma by central second difference (±1 % of spot).
    pub fn gamma(&self, spec: &OptionSpec) -> Result<Real> {
        let h = 0.01 * spec.spot;
        let up = self.price(&OptionSpec { spot: spec.spot + h, ..*spec })?;
        let mid = self.price(spec)?;
        let down = self.price(&OptionSpec { spot: spec.spot - h, ..*spec })?;
        Ok((up - 2.0 * mid + down) / (h * h))
    }

    /// Vega by central vol bump.
    pub fn vega(&self, spec: &OptionSpec) -> Result<Real> {
        let h = (0.01 * spec.vol).max(1e-4);
        let lo = (spec.vol - h).max(1e-6);
        let up = self.price(&OptionSpec { vol: spec.vol + h, ..*spec })?;
        let down = self.price(&OptionSpec { vol: lo, ..*spec })?;
        Ok((up - down) / (spec.vol + h - lo))
    }

    /// Theta (per year) by stepping one calendar day toward expiry.
    pub fn theta(&self, spec: &OptionSpec) -> Result<Real> {
        let dt = (1.0 / 365.0_f64).min(0.5 * spec.tau.max(1e-6));
        let later = self.price(&OptionSpec { tau: spec.tau - dt, ..*spec })?;
        let now = self.price(spec)?;
        Ok((later - now) / dt)
    }

    /// Rho by central rate bump (±1 bp).
    pub fn rho(&self, spec: &OptionSpec) -> Result<Real> {
        let h = 1e-4;
        let up = self.price(&OptionSpec { rate: spec.rate + h, ..*spec })?;
        let down = self.price(&OptionSpec { rate: spec.rate - h, ..*spec })?;
        Ok((up - down) / (2.0 * h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use am_core::OptionType;
    use am_math::black_scholes::black_scholes_merton;

    fn put_spec() -> OptionSpec {
        OptionSpec::new(100.0, 100.0, 1.0, 0.05, 0.0, 0.20, OptionType::Put)
    }

    #[test]
    fn guards_fire_before_any_numerics() {
        let engine = FiniteDifferenceEngine::default();
        let mut s = put_spec();
        s.spot = 0.0;
        assert!(engine.price(&s).is_err());
        let mut s = put_spec();
        s.strike = -5.0;
        assert!(engine.price(&s).is_err());
    }

    #[test]
    fn expired_contract_is_intrinsic() {
        let engine = FiniteDifferenceEngine::default();
        let mut s = put_spec();
        s.tau = 0.0;
        s.spot = 90.0;
        assert_eq!(engine.price(&s).unwrap(), 10.0);
    }

    #[test]
    fn american_put_exceeds_european() {
        let engine = FiniteDifferenceEngine::default();
        let s = put_spec();
        let price = engine.price(&s).unwrap();
        let european = black_scholes_merton(
            s.option_type, s.spot, s.strike, s.rate, s.dividend_yield, s.vol, s.tau,
        )
        .price;
        assert!(
            price > european + 0.05,
            "american {price:.4} vs european {european:.4}"
        );
        assert!(price < european + 2.0, "premium implausibly large: {price:.4}");
    }

    #[test]
    fn no_dividend_american_call_is_close_to_european() {
        let engine = FiniteDifferenceEngine::default();
        let s = OptionSpec::new(100.0, 100.0, 1.0, 0.05, 0.0, 0.20, OptionType::Call);
        let price = engine.price(&s).unwrap();
        let european = black_scholes_merton(
            s.option_type, s.spot, s.strike, s.rate, s.dividend_yield, s.vol, s.tau,
        )
        .price;
        assert!(
            (price - european).abs() < 0.10,
            "american {price:.4} vs european {european:.4}"
        );
    }

    #[test]
    fn grid_doubling_moves_the_price_very_little() {
        let coarse = FiniteDifferenceEngine::new(101, 50);
        let fine = FiniteDifferenceEngine::new(201, 100);
        let s = put_spec();
        let p_coarse = coarse.price(&s).unwrap();
        let p_fine = fine.price(&s).unwrap();
        let rel = (p_fine - p_coarse).abs() / p_fine;
        assert!(rel < 3e-3, "coarse {p_coarse:.5}, fine {p_fine:.5}, rel {rel:.5}");
    }

    #[test]
    fn deep_moneyness_stays_on_grid() {
        let engine = FiniteDifferenceEngine::default();
        let mut s = put_spec();
        s.spot = 200.0;
        s.tau = 0.1;
        let price = engine.price(&s).unwrap();
        assert!(price.is_finite() && price >= 0.0);
    }

    #[test]
    fn put_greeks_have_sensible_signs() {
        let engine = FiniteDifferenceEngine::default();
        let s = put_spec();
        let delta = engine.delta(&s).unwrap();
        assert!(delta < 0.0 && delta > -1.0, "delta = {delta}");
        let gamma = engine.gamma(&s).unwrap();
        assert!(gamma > 0.0, "gamma = {gamma}");
        let vega = engine.vega(&s).unwrap();
        assert!(vega > 0.0, "vega = {vega}");
        let rho = engine.rho(&s).unwrap();
        assert!(rho < 0.0, "put rho should be negative, got {rho}");
    }

    #[test]
    fn negative_rate_double_boundary_put_prices_cleanly() {
        let engine = FiniteDifferenceEngine::default();
        let s = OptionSpec::new(100.0, 100.0, 1.0, -0.005, -0.010, 0.20, OptionType::Put);
        let price = engine.price(&s).unwrap();
        let european = black_scholes_merton(
            s.option_type, s.spot, s.strike, s.rate, s.dividend_yield, s.vol, s.tau,
        )
        .price;
        assert!(price >= european - 0.05, "american {price:.4} vs european {european:.4}");
        assert!(price >= s.intrinsic());
    }
}

//! Finite difference methods for PDE-based option pricing.
//!
//! # Overview
//!
//! * [`TridiagonalOperator`] — tridiagonal matrix with a Thomas-algorithm
//!   solver, pivots floor-clamped away from zero
//! * [`AsinhGrid`] — non-uniform log-spot grid concentrating nodes near a
//!   chosen centre
//! * [`FdmSolver`] — Crank-Nicolson backward marcher for the Black-Scholes
//!   PDE with Neumann (gamma = 0) boundaries and optional early-exercise
//!   projection

use am_core::{Rate, Real, Size, Time, Volatility};

/// Floor applied to Thomas-elimination pivots.
const PIVOT_FLOOR: Real = 1e-15;

// ─── Tridiagonal operator ─────────────────────────────────────────────────────

/// A tridiagonal matrix operator.
///
/// Stores the lower, diagonal, and upper bands. Used for 1-D finite
/// difference discretisations of second-order PDEs.
#[derive(Debug, Clone)]
pub struct TridiagonalOperator {
    /// Lower diagonal (index 0 unused — starts from row 1).
    pub lower: Vec<Real>,
    /// Main diagonal.
    pub diag: Vec<Real>,
    /// Upper diagonal (last index unused — ends at row n−2).
    pub upper: Vec<Real>,
}

impl TridiagonalOperator {
    /// Create a zero tridiagonal operator of size `n`.
    pub fn new(n: Size) -> Self {
        Self {
            lower: vec![0.0; n],
            diag: vec![0.0; n],
            upper: vec![0.0; n],
        }
    }

    /// Size (number of rows/columns).
    pub fn size(&self) -> Size {
        self.diag.len()
    }

    /// Apply the operator: `y = A · x`.
    pub fn apply(&self, x: &[Real]) -> Vec<Real> {
        let n = self.size();
        assert_eq!(x.len(), n);
        let mut y = vec![0.0; n];
        y[0] = self.diag[0] * x[0] + self.upper[0] * x[1];
        for i in 1..n - 1 {
            y[i] = self.lower[i] * x[i - 1] + self.diag[i] * x[i] + self.upper[i] * x[i + 1];
        }
        y[n - 1] = self.lower[n - 1] * x[n - 2] + self.diag[n - 1] * x[n - 1];
        y
    }

    /// Solve `A · x = rhs` with the Thomas algorithm into caller-provided
    /// buffers (all of length `size()`).
    ///
    /// Near-singular pivots are floor-clamped at 1e-15 instead of letting a
    /// division blow up into the value slice.
    pub fn solve_into(
        &self,
        rhs: &[Real],
        c_prime: &mut [Real],
        d_prime: &mut [Real],
        x: &mut [Real],
    ) {
        let n = self.size();
        assert_eq!(rhs.len(), n);
        assert!(c_prime.len() >= n && d_prime.len() >= n && x.len() >= n);

        let pivot0 = clamp_pivot(self.diag[0]);
        c_prime[0] = self.upper[0] / pivot0;
        d_prime[0] = rhs[0] / pivot0;

        for i in 1..n {
            let pivot = clamp_pivot(self.diag[i] - self.lower[i] * c_prime[i - 1]);
            if i < n - 1 {
                c_prime[i] = self.upper[i] / pivot;
            }
            d_prime[i] = (rhs[i] - self.lower[i] * d_prime[i - 1]) / pivot;
        }

        x[n - 1] = d_prime[n - 1];
        for i in (0..n - 1).rev() {
            x[i] = d_prime[i] - c_prime[i] * x[i + 1];
        }
    }

    /// Solve `A · x = rhs`, allocating the result.
    pub fn solve(&self, rhs: &[Real]) -> Vec<Real> {
        let n = self.size();
        let mut c_prime = vec![0.0; n];
        let mut d_prime = vec![0.0; n];
        let mut x = vec![0.0; n];
        self.solve_into(rhs, &mut c_prime, &mut d_prime, &mut x);
        x
    }
}

#[inline]
fn clamp_pivot(m: Real) -> Real {
    if m.abs() >= PIVOT_FLOOR {
        m
    } else if m < 0.0 {
        -PIVOT_FLOOR
    } else {
        PIVOT_FLOOR
    }
}

// ─── ASINH grid ───────────────────────────────────────────────────────────────

/// A non-uniform log-spot grid.
///
/// Nodes follow `x = x_mid + density · sinh(y)` with `y` spaced uniformly
/// between `asinh(±half_width/density)`, which concentrates resolution
/// around `x_mid` (the current spot in log-space) while still reaching the
/// far wings.
#[derive(Debug, Clone)]
pub struct AsinhGrid {
    x: Vec<Real>,
}

impl AsinhGrid {
    /// Build a grid of `n` nodes centred at `x_mid` spanning
    /// `[x_mid − half_width, x_mid + half_width]`.
    ///
    /// `density` controls the concentration: smaller values pack more nodes
    /// near the centre. Degenerate inputs are floored so the grid is always
    /// strictly increasing.
    pub fn new(x_mid: Real, half_width: Real, density: Real, n: Size) -> Self {
        let n = n.max(4);
        let half = half_width.max(1e-4);
        let density = density.max(1e-8);

        let y_max = (half / density).asinh();
        let dy = 2.0 * y_max / (n - 1) as Real;

        let mut x: Vec<Real> = (0..n)
            .map(|i| x_mid + density * (-y_max + i as Real * dy).sinh())
            .collect();

        // Guarantee strict monotonicity against floating-point collapse.
        for i in 1..n {
            if x[i] <= x[i - 1] {
                x[i] = x[i - 1] + 1e-12;
            }
        }

        Self { x }
    }

    /// The grid nodes, ascending.
    pub fn nodes(&self) -> &[Real] {
        &self.x
    }

    /// Number of nodes.
    pub fn len(&self) -> Size {
        self.x.len()
    }

    /// Whether the grid is empty (never true for a constructed grid).
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Linear interpolation of `values` (one per node) at position `x`,
    /// clamped to the grid range.
    pub fn interpolate(&self, values: &[Real], x: Real) -> Real {
        let n = self.x.len();
        assert_eq!(values.len(), n);
        if x <= self.x[0] {
            return values[0];
        }
        if x >= self.x[n - 1] {
            return values[n - 1];
        }
        let idx = match self.x.binary_search_by(|v| v.partial_cmp(&x).unwrap()) {
            Ok(i) => return values[i],
            Err(i) => i - 1,
        };
        let h = (self.x[idx + 1] - self.x[idx]).max(1e-15);
        let frac = (x - self.x[idx]) / h;
        values[idx] * (1.0 - frac) + values[idx + 1] * frac
    }
}

// ─── Crank-Nicolson marcher ───────────────────────────────────────────────────

/// A Crank-Nicolson solver for the 1-D Black-Scholes PDE in log-space.
///
/// Solves `∂V/∂t + ½σ²·∂²V/∂x² + (r−q−½σ²)·∂V/∂x − rV = 0` backward in time
/// from the terminal payoff on a (generally non-uniform) grid, with Neumann
/// `gamma = 0` rows at both ends (`V[0] = 2V[1] − V[2]` and mirrored at the
/// top, eliminated into the interior system so it stays tridiagonal) and
/// optional per-step early-exercise projection.
#[derive(Debug, Clone)]
pub struct FdmSolver {
    /// Risk-free rate.
    pub r: Rate,
    /// Continuous dividend yield.
    pub q: Rate,
    /// Volatility.
    pub sigma: Volatility,
    /// Time to expiry.
    pub maturity: Time,
    /// Number of uniform time steps.
    pub time_steps: Size,
}

impl FdmSolver {
    /// Create a new solver.
    pub fn new(r: Rate, q: Rate, sigma: Volatility, maturity: Time, time_steps: Size) -> Self {
        Self {
            r,
            q,
            sigma,
            maturity,
            time_steps: time_steps.max(1),
        }
    }

    /// March the terminal condition back to valuation time and return the
    /// final value slice (one entry per grid node).
    ///
    /// `payoff` maps an underlying price `S = eˣ` to its exercise value; with
    /// `project_exercise` set, `V[i] = max(V[i], payoff(S_i))` is applied at
    /// every node on every step, enforcing the American constraint.
    pub fn solve(
        &self,
        grid: &AsinhGrid,
        payoff: &dyn Fn(Real) -> Real,
        project_exercise: bool,
    ) -> Vec<Real> {
        let x = grid.nodes();
        let n = x.len();
        let dt = self.maturity / self.time_steps as Real;
        let theta = 0.5; // Crank-Nicolson

        let s: Vec<Real> = x.iter().map(|&xi| xi.exp()).collect();
        let exercise: Vec<Real> = s.iter().map(|&si| payoff(si)).collect();

        let alpha = 0.5 * self.sigma * self.sigma;
        let beta = self.r - self.q - 0.5 * self.sigma * self.sigma;

        // Spatial operator A on the interior nodes, variable-spacing central
        // differences: row i couples (i−1, i, i+1).
        let mut lo = vec![0.0; n];
        let mut di = vec![0.0; n];
        let mut up = vec![0.0; n];
        for i in 1..n - 1 {
            let h_m = (x[i] - x[i - 1]).max(1e-12);
            let h_p = (x[i + 1] - x[i]).max(1e-12);
            let span = h_m + h_p;
            lo[i] = 2.0 * alpha / (h_m * span) - beta * h_p / (h_m * span);
            di[i] = -2.0 * alpha / (h_m * h_p) + beta * (h_p - h_m) / (h_m * h_p) - self.r;
            up[i] = 2.0 * alpha / (h_p * span) + beta * h_m / (h_p * span);
        }

        // Implicit system over the n−2 interior unknowns with the Neumann
        // extrapolation identities folded into the first and last rows.
        let m = n - 2;
        let mut op = TridiagonalOperator::new(m);
        for i in 1..n - 1 {
            let k = i - 1;
            op.lower[k] = -theta * dt * lo[i];
            op.diag[k] = 1.0 - theta * dt * di[i];
            op.upper[k] = -theta * dt * up[i];
        }
        // V[0] = 2V[1] − V[2]
        op.diag[0] += 2.0 * op.lower[0];
        op.upper[0] -= op.lower[0];
        op.lower[0] = 0.0;
        // V[n−1] = 2V[n−2] − V[n−3]
        op.diag[m - 1] += 2.0 * op.upper[m - 1];
        op.lower[m - 1] -= op.upper[m - 1];
        op.upper[m - 1] = 0.0;

        // Scratch reused across all time steps.
        let mut values = exercise.clone();
        let mut rhs = vec![0.0; m];
        let mut c_prime = vec![0.0; m];
        let mut d_prime = vec![0.0; m];
        let mut interior = vec![0.0; m];

        for _ in 0..self.time_steps {
            // Explicit half: (I + (1−θ)·dt·A) · V_old on the interior.
            for i in 1..n - 1 {
                rhs[i - 1] = values[i]
                    + (1.0 - theta)
                        * dt
                        * (lo[i] * values[i - 1] + di[i] * values[i] + up[i] * values[i + 1]);
            }

            op.solve_into(&rhs, &mut c_prime, &mut d_prime, &mut interior);
            values[1..(n - 1)].copy_from_slice(&interior[..(n - 2)]);

            // Neumann ends from the fresh interior values.
            values[0] = 2.0 * values[1] - values[2];
            values[n - 1] = 2.0 * values[n - 2] - values[n - 3];

            if project_exercise {
                for i in 0..n {
                    if values[i] < exercise[i] {
                        values[i] = exercise[i];
                    }
                }
            }
        }

        values
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use am_core::OptionType;
    use am_math::black_scholes::black_scholes_merton;

    fn cn_price(american: bool, ty: OptionType, spot: Real, strike: Real) -> Real {
        let (r, q, sigma, tau): (Real, Real, Real, Real) = (0.05, 0.0, 0.20, 1.0);
        let x_mid = spot.ln();
        let half = 10.0 * sigma * tau.sqrt();
        let grid = AsinhGrid::new(x_mid, half, half / 10.0, 201);
        let solver = FdmSolver::new(r, q, sigma, tau, 100);
        let phi = ty.sign();
        let values = solver.solve(&grid, &|s| (phi * (s - strike)).max(0.0), american);
        grid.interpolate(&values, x_mid)
    }

    #[test]
    fn thomas_solves_identity() {
        let mut op = TridiagonalOperator::new(4);
        for i in 0..4 {
            op.diag[i] = 1.0;
        }
        let rhs = vec![1.0, 2.0, 3.0, 4.0];
        let x = op.solve(&rhs);
        for i in 0..4 {
            assert!((x[i] - rhs[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn thomas_solves_tridiagonal_system() {
        // A = [[2, -1, 0], [-1, 2, -1], [0, -1, 2]], x = [1, 2, 3], Ax = [0, 0, 4]
        let mut op = TridiagonalOperator::new(3);
        op.diag = vec![2.0, 2.0, 2.0];
        op.lower = vec![0.0, -1.0, -1.0];
        op.upper = vec![-1.0, -1.0, 0.0];
        let x = op.solve(&[0.0, 0.0, 4.0]);
        assert!((x[0] - 1.0).abs() < 1e-12);
        assert!((x[1] - 2.0).abs() < 1e-12);
        assert!((x[2] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn thomas_survives_near_singular_pivot() {
        let mut op = TridiagonalOperator::new(3);
        op.diag = vec![1e-18, 1.0, 1.0];
        op.upper = vec![1.0, 0.0, 0.0];
        op.lower = vec![0.0, 0.0, 0.0];
        let x = op.solve(&[1.0, 1.0, 1.0]);
        for v in &x {
            assert!(v.is_finite());
        }
    }

    #[test]
    fn asinh_grid_is_strictly_increasing_and_centred() {
        let grid = AsinhGrid::new(0.0, 2.0, 0.2, 101);
        let x = grid.nodes();
        assert_eq!(x.len(), 101);
        for i in 1..x.len() {
            assert!(x[i] > x[i - 1]);
        }
        assert!((x[0] + 2.0).abs() < 1e-10);
        assert!((x[100] - 2.0).abs() < 1e-10);
        // Central spacing tighter than edge spacing
        let mid_gap = x[51] - x[50];
        let edge_gap = x[1] - x[0];
        assert!(mid_gap < edge_gap, "mid {mid_gap} vs edge {edge_gap}");
    }

    #[test]
    fn grid_interpolation_is_linear_between_nodes() {
        let grid = AsinhGrid::new(0.0, 1.0, 0.1, 11);
        let values: Vec<Real> = grid.nodes().iter().map(|&x| 3.0 * x + 1.0).collect();
        for &probe in &[-0.73, -0.2, 0.11, 0.64] {
            let v = grid.interpolate(&values, probe);
            assert!((v - (3.0 * probe + 1.0)).abs() < 1e-10, "at {probe}: {v}");
        }
        // Out-of-range queries clamp
        assert_eq!(grid.interpolate(&values, -5.0), values[0]);
    }

    #[test]
    fn european_call_matches_black_scholes() {
        let bs = black_scholes_merton(OptionType::Call, 100.0, 100.0, 0.05, 0.0, 0.20, 1.0).price;
        let fd = cn_price(false, OptionType::Call, 100.0, 100.0);
        assert!((fd - bs).abs() < 0.05, "FDM {fd:.4} vs BS {bs:.4}");
    }

    #[test]
    fn european_put_call_parity() {
        let call = cn_price(false, OptionType::Call, 100.0, 100.0);
        let put = cn_price(false, OptionType::Put, 100.0, 100.0);
        let expected = 100.0 - 100.0 * (-0.05_f64).exp();
        assert!(
            (call - put - expected).abs() < 0.10,
            "parity {:.4} vs {:.4}",
            call - put,
            expected
        );
    }

    #[test]
    fn american_put_dominates_european() {
        let eu = cn_price(false, OptionType::Put, 100.0, 100.0);
        let am = cn_price(true, OptionType::Put, 100.0, 100.0);
        assert!(am > eu + 1e-4, "american {am:.4} vs european {eu:.4}");
    }

    #[test]
    fn american_projection_keeps_value_above_intrinsic() {
        let am = cn_price(true, OptionType::Put, 80.0, 100.0);
        assert!(am >= 20.0 - 1e-9, "price {am:.4} below intrinsic");
    }
}

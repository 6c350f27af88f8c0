//! Numerical integration.
//!
//! Two schemes cover the engines' needs: fixed-order Gauss-Legendre for
//! smooth early-exercise-premium integrands, and tanh-sinh (double
//! exponential) refinement for the high-precision preset, which tolerates
//! the endpoint behaviour of the boundary integrals.
//!
//! Integrators never fail: when a refinement budget runs out the best
//! available estimate is returned, so numerical degeneracy cannot surface as
//! an error from a pricing call.

pub mod tanhsinh;

pub use tanhsinh::TanhSinh;

use am_core::Real;
use std::f64::consts::PI;

/// A numerical integrator over a finite interval.
pub trait Integrator {
    /// Integrate `f` on `[a, b]`.
    fn integrate<F: Fn(Real) -> Real>(&self, f: F, a: Real, b: Real) -> Real;
}

// ── Gauss-Legendre ────────────────────────────────────────────────────────────

/// Fixed-order Gauss-Legendre quadrature.
///
/// Nodes and weights on `[−1, 1]` are computed once at construction by
/// Newton iteration on the Legendre three-term recurrence, seeded with the
/// Chebyshev estimate of the i-th root; `integrate` maps them onto the
/// requested interval. Exact for polynomials of degree `2·order − 1`.
#[derive(Debug, Clone)]
pub struct GaussLegendre {
    x: Vec<Real>,
    w: Vec<Real>,
}

impl GaussLegendre {
    /// Build a rule of the given `order` (at least 1).
    pub fn new(order: usize) -> Self {
        let n = order.max(1);
        let mut x = vec![0.0; n];
        let mut w = vec![0.0; n];
        let m = n.div_ceil(2);

        for i in 0..m {
            // Chebyshev estimate of the i-th root of P_n
            let mut z = (PI * (i as Real + 0.75) / (n as Real + 0.5)).cos();
            let mut pp = 0.0;
            for _ in 0..100 {
                // Recurrence: (j+1) P_{j+1} = (2j+1) z P_j − j P_{j−1}
                let mut p1 = 1.0;
                let mut p2 = 0.0;
                for j in 0..n {
                    let p3 = p2;
                    p2 = p1;
                    p1 = ((2 * j + 1) as Real * z * p2 - j as Real * p3) / (j + 1) as Real;
                }
                pp = n as Real * (z * p1 - p2) / (z * z - 1.0);
                let z_old = z;
                z -= p1 / pp;
                if (z - z_old).abs() < 1e-15 {
                    break;
                }
            }
            x[i] = -z;
            x[n - 1 - i] = z;
            let wi = 2.0 / ((1.0 - z * z) * pp * pp);
            w[i] = wi;
            w[n - 1 - i] = wi;
        }

        Self { x, w }
    }

    /// Quadrature nodes on `[−1, 1]`, ascending.
    pub fn nodes(&self) -> &[Real] {
        &self.x
    }

    /// Quadrature weights.
    pub fn weights(&self) -> &[Real] {
        &self.w
    }

    /// Number of quadrature points.
    pub fn order(&self) -> usize {
        self.x.len()
    }
}

impl Integrator for GaussLegendre {
    fn integrate<F: Fn(Real) -> Real>(&self, f: F, a: Real, b: Real) -> Real {
        if a == b {
            return 0.0;
        }
        let half = 0.5 * (b - a);
        let mid = 0.5 * (a + b);
        self.x
            .iter()
            .zip(self.w.iter())
            .map(|(&xi, &wi)| wi * f(mid + half * xi))
            .sum::<Real>()
            * half
    }
}

// ── Scheme selection ──────────────────────────────────────────────────────────

/// A quadrature scheme selected at engine construction.
#[derive(Debug, Clone)]
pub enum Quadrature {
    /// Fixed-order Gauss-Legendre.
    GaussLegendre(GaussLegendre),
    /// Tanh-sinh double-exponential refinement.
    TanhSinh(TanhSinh),
}

impl Quadrature {
    /// A Gauss-Legendre scheme of the given order.
    pub fn gauss_legendre(order: usize) -> Self {
        Quadrature::GaussLegendre(GaussLegendre::new(order))
    }

    /// A tanh-sinh scheme with default parameters.
    pub fn tanh_sinh() -> Self {
        Quadrature::TanhSinh(TanhSinh::default())
    }
}

impl Integrator for Quadrature {
    fn integrate<F: Fn(Real) -> Real>(&self, f: F, a: Real, b: Real) -> Real {
        match self {
            Quadrature::GaussLegendre(q) => q.integrate(f, a, b),
            Quadrature::TanhSinh(q) => q.integrate(f, a, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_near(a: Real, b: Real, tol: Real) {
        assert!((a - b).abs() < tol, "expected {b}, got {a}, diff = {}", (a - b).abs());
    }

    #[test]
    fn legendre_nodes_are_symmetric_and_ascending() {
        let q = GaussLegendre::new(8);
        assert_eq!(q.order(), 8);
        for i in 1..8 {
            assert!(q.nodes()[i] > q.nodes()[i - 1]);
        }
        for i in 0..8 {
            assert_near(q.nodes()[i], -q.nodes()[7 - i], 1e-14);
            assert_near(q.weights()[i], q.weights()[7 - i], 1e-14);
        }
        // Weights sum to the interval length
        assert_near(q.weights().iter().sum::<Real>(), 2.0, 1e-13);
    }

    #[test]
    fn legendre_5_point_reference_node() {
        // Largest root of P_5: 0.906179845938664
        let q = GaussLegendre::new(5);
        assert_near(q.nodes()[4], 0.906_179_845_938_664, 1e-12);
        assert_near(q.weights()[2], 0.568_888_888_888_889, 1e-12);
    }

    #[test]
    fn legendre_exact_for_polynomials() {
        // ∫_{-1}^{1} x⁴ dx = 2/5 — exact from order 3 up
        let q = GaussLegendre::new(5);
        assert_near(q.integrate(|x| x.powi(4), -1.0, 1.0), 0.4, 1e-13);
    }

    #[test]
    fn legendre_interval_mapping() {
        // ∫_0^1 x² dx = 1/3
        let q = GaussLegendre::new(5);
        assert_near(q.integrate(|x| x * x, 0.0, 1.0), 1.0 / 3.0, 1e-13);
        // ∫_0^π sin x dx = 2
        let q = GaussLegendre::new(10);
        assert_near(q.integrate(|x| x.sin(), 0.0, PI), 2.0, 1e-10);
    }

    #[test]
    fn empty_interval_is_zero() {
        let q = Quadrature::gauss_legendre(8);
        assert_eq!(q.integrate(|x| x.exp(), 2.0, 2.0), 0.0);
    }
}

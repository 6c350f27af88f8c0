//! Chebyshev nodes and barycentric interpolation.
//!
//! The spectral engine represents the exercise boundary by its values at
//! second-kind Chebyshev nodes (the extrema of `T_{n−1}`) mapped onto
//! `[0, τ]`, and evaluates it between nodes with the barycentric Lagrange
//! formula. Chebyshev spacing keeps the polynomial interpolant stable and
//! clusters nodes at both interval ends, where the boundary moves fastest.

use am_core::Real;
use std::f64::consts::PI;

/// The `n` second-kind Chebyshev nodes mapped onto `[a, b]`, ascending.
///
/// `x_i = a + (b − a)·(1 − cos(iπ/(n−1)))/2`, so the endpoints are included.
///
/// # Panics
/// Panics if `n < 2` (programming error).
pub fn chebyshev_nodes(n: usize, a: Real, b: Real) -> Vec<Real> {
    assert!(n >= 2, "Chebyshev nodes require n >= 2");
    (0..n)
        .map(|i| a + 0.5 * (b - a) * (1.0 - (i as Real * PI / (n - 1) as Real).cos()))
        .collect()
}

/// Barycentric Lagrange interpolation over a fixed set of distinct nodes.
///
/// Node positions (and hence the barycentric weights) are fixed at
/// construction; the interpolated values may be swapped cheaply between
/// fixed-point sweeps via [`ChebyshevInterpolation::set_values`].
#[derive(Debug, Clone)]
pub struct ChebyshevInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
    weights: Vec<Real>,
}

impl ChebyshevInterpolation {
    /// Build an interpolation from co-indexed nodes and values.
    ///
    /// # Panics
    /// Panics if fewer than two nodes are given or the vectors differ in
    /// length.
    pub fn new(xs: Vec<Real>, ys: Vec<Real>) -> Self {
        assert!(xs.len() >= 2, "interpolation requires at least 2 nodes");
        assert_eq!(xs.len(), ys.len(), "nodes and values must be co-indexed");
        let weights = barycentric_weights(&xs);
        Self { xs, ys, weights }
    }

    /// The interpolation nodes.
    pub fn nodes(&self) -> &[Real] {
        &self.xs
    }

    /// Replace the interpolated values, keeping nodes and weights.
    ///
    /// # Panics
    /// Panics if `ys` has a different length than the node set.
    pub fn set_values(&mut self, ys: &[Real]) {
        assert_eq!(ys.len(), self.xs.len());
        self.ys.copy_from_slice(ys);
    }

    /// Evaluate the interpolant at `x`.
    pub fn value(&self, x: Real) -> Real {
        // A query on (or numerically at) a node returns the nodal value.
        for (i, &xi) in self.xs.iter().enumerate() {
            if (x - xi).abs() < f64::EPSILON * (1.0 + x.abs()) {
                return self.ys[i];
            }
        }
        // f(x) = [Σ wⱼ yⱼ / (x − xⱼ)] / [Σ wⱼ / (x − xⱼ)]
        let mut numer = 0.0;
        let mut denom = 0.0;
        for j in 0..self.xs.len() {
            let t = self.weights[j] / (x - self.xs[j]);
            numer += t * self.ys[j];
            denom += t;
        }
        numer / denom
    }
}

fn barycentric_weights(xs: &[Real]) -> Vec<Real> {
    let n = xs.len();
    let mut weights = vec![1.0; n];
    for j in 0..n {
        for k in 0..n {
            if k != j {
                weights[j] /= xs[j] - xs[k];
            }
        }
    }
    weights
}

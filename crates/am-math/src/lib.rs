//! # am-math
//!
//! Stateless mathematical utilities for the pricing engines: floating-point
//! comparison helpers, the standard normal distribution, the
//! Black-Scholes-Merton closed form, quadrature schemes, Chebyshev node
//! generation and barycentric interpolation, and the isotonic-regression /
//! smoothing filters used for exercise-boundary post-processing.
//!
//! Everything here is a pure function or an immutable value type; nothing
//! holds global state.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Black-Scholes-Merton closed form and Greeks.
pub mod black_scholes;

/// Chebyshev nodes and barycentric interpolation.
pub mod chebyshev;

/// Floating-point comparison utilities.
pub mod comparison;

/// The standard normal distribution.
pub mod distributions;

/// Exercise-boundary post-processing filters.
pub mod filters;

/// Numerical integration.
pub mod integrals;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use black_scholes::{black_scholes_merton, European};
pub use chebyshev::{chebyshev_nodes, ChebyshevInterpolation};
pub use comparison::{close, close_enough};
pub use distributions::{normal_cdf, normal_pdf};
pub use integrals::{GaussLegendre, Integrator, Quadrature, TanhSinh};

//! # am-engines
//!
//! The American option pricing engines and their unified façade:
//!
//! * [`FiniteDifferenceEngine`] — Crank-Nicolson PDE solve on a non-uniform
//!   ASINH log-spot grid with early-exercise projection
//! * [`SpectralEngine`] — Chebyshev boundary collocation with fixed-point
//!   refinement of the exercise boundary and quadrature of the
//!   early-exercise premium, covering both single- and double-boundary
//!   regimes
//! * [`kim`] — the stabilized double-boundary refinement solver
//! * [`AmericanOptionPricer`] — regime dispatch, near-expiry blending, and
//!   arbitrage-floor enforcement in front of the engines

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// The unified pricing façade.
pub mod dispatcher;

/// Crank-Nicolson finite-difference engine.
pub mod fd_engine;

/// Kim integral-equation double-boundary refinement.
pub mod kim;

/// Near-expiry handling shared by the engines.
pub mod near_expiry;

mod premium;

/// Closed-form boundary seeds.
pub mod qdplus;

/// Spectral collocation engine.
pub mod spectral;

pub use dispatcher::{AmericanOptionPricer, PrimaryEngine};
pub use fd_engine::FiniteDifferenceEngine;
pub use spectral::{SpectralEngine, SpectralScheme};

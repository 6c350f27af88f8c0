//! # amopt
//!
//! American option pricing for arbitrary rate and dividend regimes,
//! including the negative-rate case where the exercise boundary splits into
//! two disjoint boundaries.
//!
//! This crate is a **façade** that re-exports the public items of the
//! underlying workspace crates. Application code should depend on this
//! crate rather than the individual `am-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use amopt::{AmericanOptionPricer, OptionType};
//!
//! let pricer = AmericanOptionPricer::default();
//! let price = pricer
//!     .price(100.0, 100.0, 1.0, 0.05, 0.0, 0.20, OptionType::Put)
//!     .unwrap();
//! assert!(price > 5.57); // above the European put
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use am_core as core;

/// Mathematical utilities: quadrature, interpolation, filters.
pub use am_math as math;

/// Finite-difference machinery.
pub use am_methods as methods;

/// The pricing engines and the unified dispatcher.
pub use am_engines as engines;

pub use am_core::{
    classify, Error, ExerciseBoundary, OptionSpec, OptionType, PricingMethod, PricingResult,
    RateRegime, Real, Result,
};
pub use am_engines::{
    AmericanOptionPricer, FiniteDifferenceEngine, PrimaryEngine, SpectralEngine, SpectralScheme,
};

//! # am-core
//!
//! Core types, regime classification, and error definitions for amopt.
//!
//! This crate provides the foundational building blocks shared across all
//! other crates in the workspace – type aliases, the error type, the option
//! data model, and the pricing result types.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Error types and the `require!` / `fail!` macros.
pub mod errors;

/// The option contract data model.
pub mod option;

/// Rate-regime classification.
pub mod regime;

/// Pricing result and exercise-boundary types.
pub mod results;

// ── Primitive type aliases ────────────────────────────────────────────────────

/// Floating-point type used throughout the library.
pub type Real = f64;

/// Alias used for array sizes / indices.
pub type Size = usize;

/// A rate expressed as a decimal (e.g. 0.05 = 5 %).
pub type Rate = Real;

/// A volatility level expressed as a decimal.
pub type Volatility = Real;

/// A time measurement in years.
pub type Time = Real;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use errors::{Error, Result};
pub use option::{OptionSpec, OptionType};
pub use regime::{classify, RateRegime};
pub use results::{ExerciseBoundary, PricingMethod, PricingResult};

//! Error types for amopt.
//!
//! A single `thiserror`-derived enum covers the whole workspace. Guard-clause
//! violations map to [`Error::InvalidArgument`] naming the offending
//! parameter; anything else unrecoverable maps to [`Error::Runtime`].
//! Numerical degeneracy (near-singular pivots, non-convergent iterations,
//! NaN intermediates) is deliberately NOT represented here — the engines
//! recover from it locally and always return a usable number.

use thiserror::Error;

/// The top-level error type used throughout amopt.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// An input parameter failed validation. The message names the parameter.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// General runtime error.
    #[error("{0}")]
    Runtime(String),
}

/// Shorthand `Result` type used throughout amopt.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Guard-clause macro: returns `Err(Error::InvalidArgument(...))` if `$cond`
/// is false.
///
/// # Example
/// ```
/// use am_core::require;
/// fn positive(x: f64) -> am_core::Result<f64> {
///     require!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! require {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::InvalidArgument(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use am_core::fail;
/// fn always_err() -> am_core::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}

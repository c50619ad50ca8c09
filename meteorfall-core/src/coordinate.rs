//! Conversion of textual coordinates into numeric degrees.

use std::num::ParseFloatError;

use thiserror::Error;

/// Errors returned by a [`CoordinateResolver`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinateError {
    /// The field was present but blank.
    #[error("coordinate text is empty")]
    Empty,
    /// The text was not a decimal number.
    #[error("coordinate text is not a number: {source}")]
    NotNumeric {
        /// Parser failure.
        #[source]
        source: ParseFloatError,
    },
    /// The text parsed to NaN or an infinity.
    #[error("coordinate must be finite")]
    NonFinite,
}

/// Converts raw coordinate text into decimal degrees.
///
/// Closures with the matching signature implement the trait, which keeps
/// test doubles short.
///
/// # Examples
/// ```
/// use meteorfall_core::{CoordinateError, CoordinateResolver};
///
/// let always_zero = |_: &str| -> Result<f64, CoordinateError> { Ok(0.0) };
/// assert_eq!(always_zero.resolve("anything"), Ok(0.0));
/// ```
pub trait CoordinateResolver {
    /// Resolve `text` into degrees.
    fn resolve(&self, text: &str) -> Result<f64, CoordinateError>;
}

impl<F> CoordinateResolver for F
where
    F: Fn(&str) -> Result<f64, CoordinateError>,
{
    fn resolve(&self, text: &str) -> Result<f64, CoordinateError> {
        self(text)
    }
}

/// Resolver for plain decimal-degree text such as `"50.775000"`.
///
/// Surrounding whitespace is ignored.
///
/// # Examples
/// ```
/// use meteorfall_core::{CoordinateResolver, DecimalResolver};
///
/// assert_eq!(DecimalResolver.resolve(" -33.16667 "), Ok(-33.16667));
/// assert!(DecimalResolver.resolve("north").is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecimalResolver;

impl CoordinateResolver for DecimalResolver {
    fn resolve(&self, text: &str) -> Result<f64, CoordinateError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(CoordinateError::Empty);
        }
        let value: f64 = trimmed
            .parse()
            .map_err(|source| CoordinateError::NotNumeric { source })?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(CoordinateError::NonFinite)
        }
    }
}

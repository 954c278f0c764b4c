use std::error::Error as StdError;
use std::fmt;

/// Failure of a narrowing numeric conversion.
///
/// Narrowing never wraps silently: a result that cannot be represented in the
/// requested target type is always reported through this error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertError {
    /// The exact value lies outside the target type's range.
    Overflow,
    /// The value is NaN or infinite and has no integer representation.
    NonFinite,
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::Overflow => write!(f, "value out of range for the target type"),
            ConvertError::NonFinite => write!(f, "non-finite value has no integer representation"),
        }
    }
}

impl StdError for ConvertError {}

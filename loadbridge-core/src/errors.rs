//! Error types for measurement operations
//!
//! Errors here are deliberately small: they come back from polling paths
//! and may be stored or forwarded by the host, so every variant is `Copy`
//! and carries no heap data. Expected conditions (a conversion that never
//! became ready, a median over zero samples) are communicated as values;
//! the driver never panics for them and never reuses an in-band numeric
//! sentinel the way NAN-style C libraries do.
//!
//! A filter capacity outside the permitted window is *not* an error: it is
//! clamped at construction. See [`crate::median::RunningMedian::new`] for
//! that silent-correction policy.

use thiserror_no_std::Error;

/// Result type for measurement operations
pub type MeasureResult<T> = Result<T, MeasureError>;

/// Measurement errors - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureError {
    /// The chip never signalled a finished conversion within the window
    #[error("conversion not ready within {timeout_ms} ms")]
    TimedOut {
        /// Timeout budget that elapsed, in milliseconds
        timeout_ms: u32,
    },

    /// Median requested from a filter holding zero samples
    #[error("median requested from an empty filter")]
    EmptyFilter,
}

#[cfg(feature = "defmt")]
impl defmt::Format for MeasureError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::TimedOut { timeout_ms } => {
                defmt::write!(fmt, "Not ready within {} ms", timeout_ms)
            }
            Self::EmptyFilter => defmt::write!(fmt, "Empty filter"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_compare_by_value() {
        assert_eq!(
            MeasureError::TimedOut { timeout_ms: 1000 },
            MeasureError::TimedOut { timeout_ms: 1000 },
        );
        assert_ne!(
            MeasureError::TimedOut { timeout_ms: 1000 },
            MeasureError::EmptyFilter,
        );
    }

    #[cfg(feature = "std")]
    #[test]
    fn errors_display_context() {
        let msg = format!("{}", MeasureError::TimedOut { timeout_ms: 250 });
        assert!(msg.contains("250"));
    }
}

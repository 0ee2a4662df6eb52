use thiserror::Error;

/// Errors surfaced to callers of the quote engine.
///
/// Illegal add-on actions are deliberately absent: the selection state machine
/// reports them as no-op transitions instead of failing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QuoteError {
    #[error("distance must be a finite, non-negative number of kilometers (got {value})")]
    InvalidDistance { value: f64 },
    #[error("unknown {kind} '{value}'")]
    UnknownCatalogEntry { kind: &'static str, value: String },
    #[error("centre base price must not be negative (got {value} cents)")]
    NegativeCentreFee { value: i64 },
}

impl QuoteError {
    pub(crate) fn unknown(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownCatalogEntry {
            kind,
            value: value.into(),
        }
    }
}

/// Errors raised when a pricing table violates its invariants.
#[derive(Debug, Error, PartialEq)]
pub enum PricingConfigError {
    #[error("{field} must not be negative (got {value})")]
    NegativePrice { field: &'static str, value: i64 },
    #[error("{field} must be a finite, non-negative distance (got {value:.2})")]
    InvalidThreshold { field: &'static str, value: f64 },
    #[error("30-minute lesson threshold {dropoff:.2} km exceeds 1-hour threshold {lesson_60:.2} km")]
    ThresholdOrder { dropoff: f64, lesson_60: f64 },
}

/// Errors raised while loading JSON data tables (pricing, centre directory).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Pricing(#[from] PricingConfigError),
    #[error("centre directory invalid: {0}")]
    Directory(String),
}

/// Validate a caller-supplied distance, failing fast instead of clamping.
///
/// # Errors
///
/// Returns [`QuoteError::InvalidDistance`] for negative, NaN, or infinite input.
pub fn validate_distance(distance_km: f64) -> Result<f64, QuoteError> {
    if distance_km.is_finite() && distance_km >= 0.0 {
        Ok(distance_km)
    } else {
        Err(QuoteError::InvalidDistance { value: distance_km })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_and_non_finite_distances() {
        assert_eq!(validate_distance(0.0), Ok(0.0));
        assert_eq!(validate_distance(120.5), Ok(120.5));
        assert!(matches!(
            validate_distance(-1.0),
            Err(QuoteError::InvalidDistance { value }) if value < 0.0
        ));
        assert!(validate_distance(f64::NAN).is_err());
        assert!(validate_distance(f64::INFINITY).is_err());
    }

    #[test]
    fn messages_name_the_offending_value() {
        let err = QuoteError::unknown("test type", "M1");
        assert_eq!(err.to_string(), "unknown test type 'M1'");
        let err = PricingConfigError::NegativePrice {
            field: "mock_test_price_cents",
            value: -1,
        };
        assert!(err.to_string().contains("mock_test_price_cents"));
    }
}

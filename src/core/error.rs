//! Failure taxonomy for conversions

use thiserror::Error;

/// Why a conversion did not produce a value.
///
/// Every variant is an expected, user-recoverable condition. None of them is
/// retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unsupported currency pair: {from}-{to}")]
    UnsupportedPair { from: String, to: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate not found for {pair}")]
    RateNotFound { pair: String },
}

impl ConversionError {
    /// Stable identifier for machine-readable output.
    pub fn code(&self) -> &'static str {
        match self {
            ConversionError::InvalidAmount(_) => "invalid_amount",
            ConversionError::UnsupportedPair { .. } => "unsupported_pair",
            ConversionError::Network(_) => "network_error",
            ConversionError::RateNotFound { .. } => "rate_not_found",
        }
    }
}

impl From<reqwest::Error> for ConversionError {
    fn from(e: reqwest::Error) -> Self {
        ConversionError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ConversionError::InvalidAmount("abc".into()).code(),
            "invalid_amount"
        );
        assert_eq!(
            ConversionError::UnsupportedPair {
                from: "USD".into(),
                to: "EUR".into()
            }
            .code(),
            "unsupported_pair"
        );
        assert_eq!(
            ConversionError::Network("timeout".into()).code(),
            "network_error"
        );
        assert_eq!(
            ConversionError::RateNotFound {
                pair: "USD-BRL".into()
            }
            .code(),
            "rate_not_found"
        );
    }

    #[test]
    fn test_error_display() {
        let err = ConversionError::UnsupportedPair {
            from: "USD".into(),
            to: "EUR".into(),
        };
        assert_eq!(err.to_string(), "Unsupported currency pair: USD-EUR");
    }
}

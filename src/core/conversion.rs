//! The conversion procedure: validate, route through BRL, fetch one rate, compute.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::fmt::Display;
use tracing::{debug, instrument};

use super::currency::{CurrencyCode, CurrencyPair, CurrencyRateProvider, Quote};
use super::error::ConversionError;

/// A successful conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    pub amount: f64,
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    /// Rounded to cents after a lookup, the untouched amount otherwise.
    pub converted_amount: f64,
    /// Upstream quote used, `None` when no lookup was needed.
    pub quote: Option<Quote>,
}

impl Display for Conversion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.quote {
            None => write!(
                f,
                "{} {} = {} {}",
                self.amount, self.from, self.converted_amount, self.to
            ),
            Some(_) => write!(
                f,
                "{} {} = {:.2} {}",
                self.amount, self.from, self.converted_amount, self.to
            ),
        }
    }
}

/// Parses user-entered text into a strictly positive, finite amount.
pub fn parse_amount(raw: &str) -> Result<f64, ConversionError> {
    let amount: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ConversionError::InvalidAmount(format!("'{raw}' is not a number")))?;
    validate_amount(amount)
}

fn validate_amount(amount: f64) -> Result<f64, ConversionError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ConversionError::InvalidAmount(format!(
            "{amount} is not a positive number"
        )));
    }
    Ok(amount)
}

/// Rounds to two places, half away from zero.
///
/// Values outside `Decimal`'s range carry no cents worth rounding in an `f64`
/// and come back unchanged.
fn round_to_cents(value: f64) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

pub struct ConversionService<P: CurrencyRateProvider> {
    provider: P,
}

impl<P: CurrencyRateProvider> ConversionService<P> {
    pub fn new(provider: P) -> Self {
        ConversionService { provider }
    }

    /// Converts a raw, user-entered amount.
    pub async fn convert(
        &self,
        amount: &str,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<Conversion, ConversionError> {
        let amount = parse_amount(amount)?;
        self.convert_amount(amount, from, to).await
    }

    /// Converts `amount` of `from` into `to`.
    ///
    /// At most one rate lookup is made, and only when the amount is valid, the
    /// currencies differ and one of them is BRL.
    #[instrument(name = "Convert", skip(self, from, to), fields(from = %from, to = %to))]
    pub async fn convert_amount(
        &self,
        amount: f64,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<Conversion, ConversionError> {
        let amount = validate_amount(amount)?;

        if from == to {
            debug!("Same currency on both sides, skipping lookup");
            return Ok(Conversion {
                amount,
                from: from.clone(),
                to: to.clone(),
                converted_amount: amount,
                quote: None,
            });
        }

        let pair = CurrencyPair::brl_anchored(from, to).ok_or_else(|| {
            ConversionError::UnsupportedPair {
                from: from.to_string(),
                to: to.to_string(),
            }
        })?;
        debug!(pair = %pair, "Resolved upstream pair");

        // Report a missing rate in the order the user asked for it.
        let not_found = || ConversionError::RateNotFound {
            pair: format!("{from}-{to}"),
        };

        let quote = self.provider.get_quote(&pair).await.map_err(|e| match e {
            ConversionError::RateNotFound { .. } => not_found(),
            other => other,
        })?;
        if !quote.rate.is_finite() || quote.rate <= 0.0 {
            debug!(rate = quote.rate, "Discarding unusable rate");
            return Err(not_found());
        }

        // Upstream rates are always quoted in BRL.
        let raw = if from.is_anchor() {
            amount / quote.rate
        } else {
            amount * quote.rate
        };
        let converted_amount = round_to_cents(raw);
        debug!(rate = quote.rate, converted_amount, "Converted");

        Ok(Conversion {
            amount,
            from: from.clone(),
            to: to.clone(),
            converted_amount,
            quote: Some(quote),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockProvider {
        response: Result<f64, ConversionError>,
        call_count: AtomicUsize,
        requested: Mutex<Vec<String>>,
    }

    impl MockProvider {
        fn with_rate(rate: f64) -> Self {
            Self::with_response(Ok(rate))
        }

        fn with_response(response: Result<f64, ConversionError>) -> Self {
            Self {
                response,
                call_count: AtomicUsize::new(0),
                requested: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl<'a> CurrencyRateProvider for &'a MockProvider {
        async fn get_quote(&self, pair: &CurrencyPair) -> Result<Quote, ConversionError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.requested.lock().unwrap().push(pair.key());
            self.response.clone().map(|rate| Quote {
                rate,
                name: None,
                quoted_at: None,
            })
        }
    }

    fn code(s: &str) -> CurrencyCode {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("10").unwrap(), 10.0);
        assert_eq!(parse_amount(" 2.5 ").unwrap(), 2.5);
        for raw in ["", "abc", "0", "-1", "-0.01", "NaN", "inf", "10abc"] {
            assert!(
                matches!(parse_amount(raw), Err(ConversionError::InvalidAmount(_))),
                "expected {raw:?} to be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_invalid_amount_makes_no_request() {
        let provider = MockProvider::with_rate(5.0);
        let service = ConversionService::new(&provider);

        for raw in ["0", "-3", "ten"] {
            let result = service.convert(raw, &code("USD"), &code("BRL")).await;
            assert!(matches!(result, Err(ConversionError::InvalidAmount(_))));
        }
        let result = service
            .convert_amount(f64::NAN, &code("USD"), &code("BRL"))
            .await;
        assert!(matches!(result, Err(ConversionError::InvalidAmount(_))));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_same_currency_returns_amount() {
        let provider = MockProvider::with_rate(5.0);
        let service = ConversionService::new(&provider);

        for c in ["BRL", "USD", "BTC"] {
            let result = service.convert("12.345", &code(c), &code(c)).await.unwrap();
            assert_eq!(result.amount, 12.345);
            assert_eq!(result.converted_amount, 12.345);
            assert_eq!(result.to_string(), format!("12.345 {c} = 12.345 {c}"));
            assert!(result.quote.is_none());
        }
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_pair_without_brl_is_unsupported() {
        let provider = MockProvider::with_rate(5.0);
        let service = ConversionService::new(&provider);

        let result = service.convert("10", &code("USD"), &code("EUR")).await;
        assert_eq!(
            result.unwrap_err(),
            ConversionError::UnsupportedPair {
                from: "USD".into(),
                to: "EUR".into()
            }
        );
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_both_directions_query_same_pair() {
        let provider = MockProvider::with_rate(5.0);
        let service = ConversionService::new(&provider);

        service.convert("10", &code("BRL"), &code("USD")).await.unwrap();
        service.convert("10", &code("USD"), &code("BRL")).await.unwrap();

        assert_eq!(provider.calls(), 2);
        assert_eq!(
            *provider.requested.lock().unwrap(),
            vec!["USD-BRL".to_string(), "USD-BRL".to_string()]
        );
    }

    #[tokio::test]
    async fn test_directional_arithmetic() {
        let provider = MockProvider::with_rate(5.0);
        let service = ConversionService::new(&provider);

        let to_brl = service.convert("10", &code("USD"), &code("BRL")).await.unwrap();
        assert_eq!(to_brl.converted_amount, 50.0);
        assert_eq!(to_brl.to_string(), "10 USD = 50.00 BRL");

        let from_brl = service.convert("10", &code("BRL"), &code("USD")).await.unwrap();
        assert_eq!(from_brl.converted_amount, 2.0);
        assert_eq!(from_brl.to_string(), "10 BRL = 2.00 USD");
    }

    #[tokio::test]
    async fn test_rounds_to_two_places() {
        let provider = MockProvider::with_rate(4.999);
        let service = ConversionService::new(&provider);

        let result = service.convert("10", &code("USD"), &code("BRL")).await.unwrap();
        assert_eq!(result.to_string(), "10 USD = 49.99 BRL");

        let provider = MockProvider::with_rate(3.0);
        let service = ConversionService::new(&provider);
        let result = service.convert("10", &code("BRL"), &code("USD")).await.unwrap();
        assert_eq!(result.to_string(), "10 BRL = 3.33 USD");
    }

    #[tokio::test]
    async fn test_provider_failures_are_passed_through() {
        let provider = MockProvider::with_response(Err(ConversionError::RateNotFound {
            pair: "XYZ-BRL".into(),
        }));
        let service = ConversionService::new(&provider);
        let result = service.convert("10", &code("XYZ"), &code("BRL")).await;
        assert!(matches!(result, Err(ConversionError::RateNotFound { .. })));

        let provider =
            MockProvider::with_response(Err(ConversionError::Network("offline".into())));
        let service = ConversionService::new(&provider);
        let result = service.convert("10", &code("USD"), &code("BRL")).await;
        assert!(matches!(result, Err(ConversionError::Network(_))));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_unusable_rate_is_not_found() {
        for rate in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let provider = MockProvider::with_rate(rate);
            let service = ConversionService::new(&provider);
            let result = service.convert("10", &code("BRL"), &code("USD")).await;
            assert_eq!(
                result.unwrap_err(),
                ConversionError::RateNotFound {
                    pair: "BRL-USD".into()
                }
            );
        }
    }

    #[tokio::test]
    async fn test_missing_rate_names_pair_as_requested() {
        let provider = MockProvider::with_response(Err(ConversionError::RateNotFound {
            pair: "XYZ-BRL".into(),
        }));
        let service = ConversionService::new(&provider);

        let result = service.convert("10", &code("BRL"), &code("XYZ")).await;
        assert_eq!(
            result.unwrap_err(),
            ConversionError::RateNotFound {
                pair: "BRL-XYZ".into()
            }
        );
        assert_eq!(*provider.requested.lock().unwrap(), vec!["XYZ-BRL".to_string()]);
    }

    #[tokio::test]
    async fn test_identity_keeps_extreme_amounts() {
        let provider = MockProvider::with_rate(5.0);
        let service = ConversionService::new(&provider);

        for amount in [1e-30, 1e29, f64::MAX] {
            let result = service
                .convert_amount(amount, &code("USD"), &code("USD"))
                .await
                .unwrap();
            assert_eq!(result.converted_amount, amount);
        }
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_extreme_amounts_through_brl() {
        let provider = MockProvider::with_rate(5.0);
        let service = ConversionService::new(&provider);

        let huge = service
            .convert_amount(1e29, &code("USD"), &code("BRL"))
            .await
            .unwrap();
        assert_eq!(huge.converted_amount, 1e29 * 5.0);

        let tiny = service
            .convert_amount(1e-30, &code("BRL"), &code("USD"))
            .await
            .unwrap();
        assert!(tiny.converted_amount.abs() < 0.005);
        assert!(tiny.to_string().ends_with("= 0.00 USD"));

        assert_eq!(provider.calls(), 2);
    }
}

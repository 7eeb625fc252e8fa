use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::config::AwesomeApiConfig;
use crate::core::currency::{CurrencyPair, CurrencyRateProvider, Quote};
use crate::core::error::ConversionError;

const CREATE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Rate provider backed by AwesomeAPI's `/json/last/<PAIR>` endpoint.
pub struct AwesomeApiProvider {
    base_url: String,
    client: reqwest::Client,
}

impl AwesomeApiProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("cambio/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(AwesomeApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &AwesomeApiConfig) -> Result<Self> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }
}

#[derive(Debug, Deserialize)]
struct AwesomeQuote {
    high: Value,
    name: Option<String>,
    create_date: Option<String>,
}

fn parse_rate(high: &Value) -> Option<f64> {
    match high {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn extract_quote(data: &Map<String, Value>, pair: &CurrencyPair) -> Result<Quote, ConversionError> {
    let not_found = || ConversionError::RateNotFound { pair: pair.key() };

    let entry = data.get(&pair.field()).ok_or_else(not_found)?;
    let quote: AwesomeQuote = serde_json::from_value(entry.clone()).map_err(|e| {
        debug!(error = %e, "Malformed quote entry");
        not_found()
    })?;
    let rate = parse_rate(&quote.high).ok_or_else(not_found)?;
    let quoted_at = quote
        .create_date
        .as_deref()
        .and_then(|d| NaiveDateTime::parse_from_str(d, CREATE_DATE_FORMAT).ok());

    Ok(Quote {
        rate,
        name: quote.name,
        quoted_at,
    })
}

#[async_trait]
impl CurrencyRateProvider for AwesomeApiProvider {
    #[instrument(name = "AwesomeQuoteFetch", skip(self, pair), fields(pair = %pair))]
    async fn get_quote(&self, pair: &CurrencyPair) -> Result<Quote, ConversionError> {
        let url = format!("{}/{}", self.base_url, pair.key());
        debug!("Requesting currency rate from {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            ConversionError::Network(format!("Request error: {e} for currency pair: {pair}"))
        })?;
        let status = response.status();
        debug!(%status, "Received AwesomeAPI response");

        let text = response.text().await?;

        // Unknown pairs come back as a 404 with a JSON body. That is still a
        // response without the expected field, not a transport failure.
        let data: Map<String, Value> = match serde_json::from_str(&text) {
            Ok(data) => data,
            Err(_) if !status.is_success() => {
                return Err(ConversionError::Network(format!(
                    "HTTP error: {status} for currency pair: {pair}"
                )));
            }
            Err(e) => {
                return Err(ConversionError::Network(format!(
                    "Failed to parse JSON response for {pair}: {e}"
                )));
            }
        };

        extract_quote(&data, pair)
    }
}

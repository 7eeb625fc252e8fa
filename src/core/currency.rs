//! Currency codes, pairs and the rate provider abstraction

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use super::error::ConversionError;

/// The only currency the upstream API quotes against.
pub const ANCHOR: &str = "BRL";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_anchor(&self) -> bool {
        self.0 == ANCHOR
    }
}

impl FromStr for CurrencyCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        if code.is_empty() {
            return Err(anyhow!("Currency code cannot be empty"));
        }
        if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(anyhow!("Invalid currency code: {}", s));
        }
        Ok(CurrencyCode(code))
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ordered (base, quote) pair as the upstream API names it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyPair {
    pub base: CurrencyCode,
    pub quote: CurrencyCode,
}

impl CurrencyPair {
    /// Builds the pair to query for a conversion between `from` and `to`.
    ///
    /// The API only exposes `X-BRL` rates, so BRL always ends up as the quote
    /// currency. Returns `None` when neither side is BRL.
    pub fn brl_anchored(from: &CurrencyCode, to: &CurrencyCode) -> Option<Self> {
        if from.is_anchor() {
            Some(CurrencyPair {
                base: to.clone(),
                quote: from.clone(),
            })
        } else if to.is_anchor() {
            Some(CurrencyPair {
                base: from.clone(),
                quote: to.clone(),
            })
        } else {
            None
        }
    }

    /// Path segment for the request, e.g. `USD-BRL`.
    pub fn key(&self) -> String {
        format!("{}-{}", self.base, self.quote)
    }

    /// Response field holding the rate, e.g. `USDBRL`.
    pub fn field(&self) -> String {
        format!("{}{}", self.base, self.quote)
    }
}

impl Display for CurrencyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A rate as reported by the upstream API for one pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    /// Units of the quote currency per unit of the base currency.
    pub rate: f64,
    pub name: Option<String>,
    pub quoted_at: Option<NaiveDateTime>,
}

#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    async fn get_quote(&self, pair: &CurrencyPair) -> Result<Quote, ConversionError>;
}

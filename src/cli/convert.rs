use super::ui;
use crate::core::{
    Conversion, ConversionError, ConversionService, CurrencyCode, CurrencyRateProvider,
};
use anyhow::Result;
use serde_json::json;

/// User-facing text for a conversion outcome.
pub fn message(result: &Result<Conversion, ConversionError>) -> String {
    match result {
        Ok(conversion) => conversion.to_string(),
        Err(ConversionError::InvalidAmount(_)) => {
            "Please enter a positive numeric amount.".to_string()
        }
        Err(ConversionError::UnsupportedPair { .. }) => {
            "Only conversions involving BRL are supported.".to_string()
        }
        Err(ConversionError::RateNotFound { pair }) => {
            format!("Could not find the rate for {pair}.")
        }
        Err(ConversionError::Network(_)) => {
            "Conversion failed. Check your connection and try again.".to_string()
        }
    }
}

fn style_for(result: &Result<Conversion, ConversionError>) -> ui::StyleType {
    match result {
        Ok(_) => ui::StyleType::Success,
        Err(ConversionError::InvalidAmount(_)) => ui::StyleType::Warning,
        Err(_) => ui::StyleType::Error,
    }
}

/// Renders the outcome for a terminal.
pub fn render(result: &Result<Conversion, ConversionError>) -> String {
    let mut output = ui::style_text(&message(result), style_for(result));

    if let Ok(Conversion {
        quote: Some(quote), ..
    }) = result
    {
        let details: Vec<String> = [
            quote.name.clone(),
            quote.quoted_at.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !details.is_empty() {
            output.push('\n');
            output.push_str(&ui::style_text(&details.join(" · "), ui::StyleType::Subtle));
        }
    }

    output
}

/// Renders the outcome as a JSON document.
pub fn render_json(result: &Result<Conversion, ConversionError>) -> Result<String> {
    let value = match result {
        Ok(conversion) => serde_json::to_value(conversion)?,
        Err(e) => json!({
            "error": e.code(),
            "message": message(result),
            "detail": e.to_string(),
        }),
    };
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Runs one conversion and prints the result.
///
/// Conversion failures are rendered like successes; only output errors are
/// returned.
pub async fn run<P: CurrencyRateProvider>(
    service: &ConversionService<P>,
    amount: &str,
    from: &CurrencyCode,
    to: &CurrencyCode,
    as_json: bool,
) -> Result<()> {
    let pb = ui::new_spinner("Fetching rate...");
    let result = service.convert(amount, from, to).await;
    pb.finish_and_clear();

    if let Err(e) = &result {
        tracing::debug!(error = %e, code = e.code(), "Conversion failed");
    }

    if as_json {
        println!("{}", render_json(&result)?);
    } else {
        println!("{}", render(&result));
    }
    Ok(())
}

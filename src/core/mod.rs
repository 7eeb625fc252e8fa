//! Core conversion logic, independent of any terminal output

pub mod config;
pub mod conversion;
pub mod currency;
pub mod error;
pub mod log;

// Re-export main types for cleaner imports
pub use conversion::{Conversion, ConversionService};
pub use currency::{CurrencyCode, CurrencyPair, CurrencyRateProvider, Quote};
pub use error::ConversionError;

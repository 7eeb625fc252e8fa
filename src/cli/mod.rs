//! Terminal front end: argument handling lives in `main.rs`, rendering here.

pub mod convert;
pub mod currencies;
pub mod setup;
pub mod ui;

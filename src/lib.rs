//! kabuto — CSV importer for daily adjusted OHLCV time series.
//!
//! Hexagonal architecture: record types and normalization logic in
//! [`domain`], port traits in [`ports`], file/database implementations in
//! [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;

//! Adjusted daily OHLCV bar, the broker-export record.
//!
//! Export layout (12 columns, header row first):
//! 日付,始値,高値,安値,終値,5日平均,25日平均,75日平均,VWAP,出来高,5日平均,25日平均
//!
//! The moving-average and volume columns carry "--" until enough history
//! exists, so they are nullable. Note the repeated 5日平均/25日平均 labels:
//! the first pair are price averages, the second pair volume averages.

use crate::domain::error::KabutoError;
use crate::domain::field::{CsvRecord, FieldDef, FieldKind, FieldValue};
use crate::domain::header::HeaderMapping;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdjustedDailyBar {
    /// Instrument code. Not a CSV column; seeded by the caller.
    pub code: String,
    /// Compact `YYYYMMDD` trading day.
    pub yyyymmdd: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub dma_price_5: Option<f64>,
    pub dma_price_25: Option<f64>,
    pub dma_price_75: Option<f64>,
    pub vwap: Option<f64>,
    pub volume: Option<f64>,
    pub vma_5: Option<f64>,
    pub vma_25: Option<f64>,
}

impl CsvRecord for AdjustedDailyBar {
    const FIELDS: &'static [FieldDef] = &[
        FieldDef::new("yyyymmdd", FieldKind::Date),
        FieldDef::new("open", FieldKind::Decimal),
        FieldDef::new("high", FieldKind::Decimal),
        FieldDef::new("low", FieldKind::Decimal),
        FieldDef::new("close", FieldKind::Decimal),
        FieldDef::new("dma_price_5", FieldKind::NullableDecimal),
        FieldDef::new("dma_price_25", FieldKind::NullableDecimal),
        FieldDef::new("dma_price_75", FieldKind::NullableDecimal),
        FieldDef::new("vwap", FieldKind::NullableDecimal),
        FieldDef::new("volume", FieldKind::NullableDecimal),
        FieldDef::new("vma_5", FieldKind::NullableDecimal),
        FieldDef::new("vma_25", FieldKind::NullableDecimal),
    ];

    fn set_field(&mut self, name: &str, value: FieldValue) {
        match (name, value) {
            ("yyyymmdd", FieldValue::Date(v)) => self.yyyymmdd = v,
            ("open", FieldValue::Decimal(v)) => self.open = v,
            ("high", FieldValue::Decimal(v)) => self.high = v,
            ("low", FieldValue::Decimal(v)) => self.low = v,
            ("close", FieldValue::Decimal(v)) => self.close = v,
            ("dma_price_5", FieldValue::NullableDecimal(v)) => self.dma_price_5 = v,
            ("dma_price_25", FieldValue::NullableDecimal(v)) => self.dma_price_25 = v,
            ("dma_price_75", FieldValue::NullableDecimal(v)) => self.dma_price_75 = v,
            ("vwap", FieldValue::NullableDecimal(v)) => self.vwap = v,
            ("volume", FieldValue::NullableDecimal(v)) => self.volume = v,
            ("vma_5", FieldValue::NullableDecimal(v)) => self.vma_5 = v,
            ("vma_25", FieldValue::NullableDecimal(v)) => self.vma_25 = v,
            _ => {}
        }
    }
}

impl AdjustedDailyBar {
    /// Expected header text per field for the broker export.
    pub fn header_names() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("yyyymmdd", "日付"),
            ("open", "始値"),
            ("high", "高値"),
            ("low", "安値"),
            ("close", "終値"),
            ("dma_price_5", "5日平均"),
            ("dma_price_25", "25日平均"),
            ("dma_price_75", "75日平均"),
            ("vwap", "VWAP"),
            ("volume", "出来高"),
            ("vma_5", "5日平均"),
            ("vma_25", "25日平均"),
        ])
    }

    /// Column positions for headerless exports, matching the layout above.
    pub fn positional_mapping() -> Result<HeaderMapping, KabutoError> {
        HeaderMapping::from_positions::<Self>(&[
            ("yyyymmdd", 0),
            ("open", 1),
            ("high", 2),
            ("low", 3),
            ("close", 4),
            ("dma_price_5", 5),
            ("dma_price_25", 6),
            ("dma_price_75", 7),
            ("vwap", 8),
            ("volume", 9),
            ("vma_5", 10),
            ("vma_25", 11),
        ])
    }

    /// Resolve the broker header row into a mapping.
    pub fn resolve_header(header_row: &[String]) -> Result<HeaderMapping, KabutoError> {
        HeaderMapping::resolve::<Self>(header_row, &Self::header_names())
    }
}

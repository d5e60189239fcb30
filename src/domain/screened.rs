//! Screening-result record parsed from broker screener exports.
//!
//! The screener export has no stable header text, so columns are addressed
//! positionally: code, name, then price and RSI further right. Rows the
//! screener pads with non-numeric placeholders are expected and skipped by
//! the reader's default row policy.

use crate::domain::error::KabutoError;
use crate::domain::field::{CsvRecord, FieldDef, FieldKind, FieldValue};
use crate::domain::header::HeaderMapping;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenedStock {
    /// Screening day, compact `YYYYMMDD`. Not a CSV column; seeded by the
    /// caller from the screening run date.
    pub yyyymmdd: String,
    pub code: String,
    pub name: String,
    pub price: f64,
    pub rsi: f64,
}

impl CsvRecord for ScreenedStock {
    const FIELDS: &'static [FieldDef] = &[
        FieldDef::new("code", FieldKind::Text),
        FieldDef::new("name", FieldKind::Text),
        FieldDef::new("price", FieldKind::Decimal),
        FieldDef::new("rsi", FieldKind::Decimal),
    ];

    fn set_field(&mut self, name: &str, value: FieldValue) {
        match (name, value) {
            ("code", FieldValue::Text(v)) => self.code = v,
            ("name", FieldValue::Text(v)) => self.name = v,
            ("price", FieldValue::Decimal(v)) => self.price = v,
            ("rsi", FieldValue::Decimal(v)) => self.rsi = v,
            _ => {}
        }
    }
}

impl ScreenedStock {
    /// Column positions in the screener export.
    pub fn positional_mapping() -> Result<HeaderMapping, KabutoError> {
        HeaderMapping::from_positions::<Self>(&[
            ("code", 0),
            ("name", 1),
            ("price", 3),
            ("rsi", 5),
        ])
    }
}

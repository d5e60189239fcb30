//! Field declarations for CSV-backed record types.
//!
//! A record type declares its CSV-backed fields once as a static
//! [`FieldDef`] table and receives coerced values through
//! [`CsvRecord::set_field`]. The table is what the header resolver and row
//! coercer walk, so neither needs to know any concrete record type.

/// How a raw CSV cell is converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Whole number; "," grouping separators are stripped before parsing.
    Integer,
    /// Floating-point number; "," grouping separators are stripped.
    Decimal,
    /// Decimal that may hold the "--" placeholder, yielding an absent value.
    NullableDecimal,
    /// Verbatim text.
    Text,
    /// `YYYY/MM/DD` in the source, normalized to compact `YYYYMMDD`.
    Date,
}

/// One declared field: semantic name plus conversion kind.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDef {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// A coerced cell value, matching the declared [`FieldKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Decimal(f64),
    NullableDecimal(Option<f64>),
    Text(String),
    /// Compact `YYYYMMDD` form.
    Date(String),
}

/// A record type that can be filled from a CSV row.
///
/// `FIELDS` lists only the CSV-backed fields; anything else on the struct
/// (e.g. an instrument code supplied by the caller) is left at its seed
/// value by the coercer.
pub trait CsvRecord: Default {
    const FIELDS: &'static [FieldDef];

    /// Accept a coerced value for a declared field. The coercer only calls
    /// this with names from `FIELDS` and values of the declared kind.
    fn set_field(&mut self, name: &str, value: FieldValue);
}

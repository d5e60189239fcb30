//! Conversion of one raw CSV row into a typed record.

use crate::domain::error::KabutoError;
use crate::domain::field::{CsvRecord, FieldDef, FieldKind, FieldValue};
use crate::domain::header::HeaderMapping;
use chrono::NaiveDate;

/// Placeholder token the broker emits for values that are not yet
/// computable (e.g. a 75-day average inside the first 75 sessions).
pub const NULL_TOKEN: &str = "--";

/// Date format used in the CSV source.
pub const SOURCE_DATE_FORMAT: &str = "%Y/%m/%d";

/// Canonical compact date form used for storage and comparison.
pub const COMPACT_DATE_FORMAT: &str = "%Y%m%d";

/// Coerce `row` into a fresh `T`.
pub fn coerce_row<T: CsvRecord>(
    mapping: &HeaderMapping,
    row: &[String],
) -> Result<T, KabutoError> {
    let mut record = T::default();
    coerce_row_into(mapping, row, &mut record)?;
    Ok(record)
}

/// Coerce `row` into an existing record, leaving caller-seeded fields (such
/// as an instrument code that is not a CSV column) untouched.
///
/// All-or-nothing per row: the first failing field aborts the row and the
/// record must be discarded. Columns beyond those referenced by the mapping
/// are ignored.
pub fn coerce_row_into<T: CsvRecord>(
    mapping: &HeaderMapping,
    row: &[String],
    record: &mut T,
) -> Result<(), KabutoError> {
    let needed = mapping.max_index() + 1;
    if row.len() < needed {
        return Err(KabutoError::RowTooShort {
            needed,
            got: row.len(),
        });
    }

    for (name, index) in mapping.entries() {
        let Some(def) = T::FIELDS.iter().find(|d| d.name == *name) else {
            continue;
        };
        let value = coerce_value(def, &row[*index])?;
        record.set_field(name, value);
    }

    Ok(())
}

fn coerce_value(def: &FieldDef, raw: &str) -> Result<FieldValue, KabutoError> {
    match def.kind {
        FieldKind::Integer => {
            let parsed = strip_separators(raw).parse::<i64>().map_err(|_| {
                KabutoError::FieldParse {
                    field: def.name.to_string(),
                    value: raw.to_string(),
                }
            })?;
            Ok(FieldValue::Integer(parsed))
        }
        FieldKind::Decimal => Ok(FieldValue::Decimal(parse_decimal(def, raw)?)),
        FieldKind::NullableDecimal => {
            if raw == NULL_TOKEN {
                Ok(FieldValue::NullableDecimal(None))
            } else {
                Ok(FieldValue::NullableDecimal(Some(parse_decimal(def, raw)?)))
            }
        }
        FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
        FieldKind::Date => {
            let date = NaiveDate::parse_from_str(raw, SOURCE_DATE_FORMAT).map_err(|_| {
                KabutoError::DateParse {
                    field: def.name.to_string(),
                    value: raw.to_string(),
                }
            })?;
            Ok(FieldValue::Date(date.format(COMPACT_DATE_FORMAT).to_string()))
        }
    }
}

fn parse_decimal(def: &FieldDef, raw: &str) -> Result<f64, KabutoError> {
    strip_separators(raw)
        .parse::<f64>()
        .map_err(|_| KabutoError::FieldParse {
            field: def.name.to_string(),
            value: raw.to_string(),
        })
}

fn strip_separators(raw: &str) -> String {
    raw.replace(',', "")
}

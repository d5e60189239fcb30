//! Resolution of declared record fields against a concrete CSV header row.

use crate::domain::error::KabutoError;
use crate::domain::field::CsvRecord;
use std::collections::HashMap;

/// Resolved field-name → column-index table for one concrete CSV file.
///
/// Construction is total or it fails: every field declared by the record
/// type resolves to exactly one column, or the constructor returns an error.
/// A partially-resolved mapping is never produced.
#[derive(Debug, Clone)]
pub struct HeaderMapping {
    entries: Vec<(&'static str, usize)>,
    max_index: usize,
}

impl HeaderMapping {
    /// Resolve the fields of `T` against an actual header row.
    ///
    /// `field_to_header` maps each semantic field name to the header text
    /// expected in the file. Matching is exact, no normalization. Broker
    /// exports repeat header names (the price and volume moving-average
    /// columns are both labelled "5日平均"), so each column index is claimed
    /// at most once, in field-declaration order.
    pub fn resolve<T: CsvRecord>(
        header_row: &[String],
        field_to_header: &HashMap<&str, &str>,
    ) -> Result<Self, KabutoError> {
        let mut entries = Vec::with_capacity(T::FIELDS.len());
        let mut claimed = vec![false; header_row.len()];

        for def in T::FIELDS {
            let header =
                field_to_header
                    .get(def.name)
                    .ok_or_else(|| KabutoError::UnmappedField {
                        field: def.name.to_string(),
                    })?;

            let index = header_row
                .iter()
                .enumerate()
                .find(|(i, h)| !claimed[*i] && h.as_str() == *header)
                .map(|(i, _)| i)
                .ok_or_else(|| KabutoError::HeaderNotFound {
                    field: def.name.to_string(),
                    header: header.to_string(),
                })?;

            claimed[index] = true;
            entries.push((def.name, index));
        }

        Ok(Self::from_entries(entries))
    }

    /// Build a mapping from explicit column positions, for headerless
    /// sources. Every field declared by `T` must appear exactly once.
    pub fn from_positions<T: CsvRecord>(
        positions: &[(&str, usize)],
    ) -> Result<Self, KabutoError> {
        let mut entries = Vec::with_capacity(T::FIELDS.len());

        for def in T::FIELDS {
            let mut matches = positions.iter().filter(|(name, _)| *name == def.name);
            let index = match (matches.next(), matches.next()) {
                (Some((_, index)), None) => *index,
                _ => {
                    return Err(KabutoError::UnmappedField {
                        field: def.name.to_string(),
                    });
                }
            };
            entries.push((def.name, index));
        }

        Ok(Self::from_entries(entries))
    }

    fn from_entries(entries: Vec<(&'static str, usize)>) -> Self {
        let max_index = entries.iter().map(|(_, i)| *i).max().unwrap_or(0);
        Self { entries, max_index }
    }

    /// Field-name / column-index pairs, in field-declaration order.
    pub fn entries(&self) -> &[(&'static str, usize)] {
        &self.entries
    }

    /// Highest column index referenced by the mapping.
    pub fn max_index(&self) -> usize {
        self.max_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::field::{FieldDef, FieldKind, FieldValue};

    #[derive(Debug, Default)]
    struct Probe {
        int_field: i64,
        decimal_field: f64,
        date_field: String,
        text_field: String,
    }

    impl CsvRecord for Probe {
        const FIELDS: &'static [FieldDef] = &[
            FieldDef::new("int_field", FieldKind::Integer),
            FieldDef::new("decimal_field", FieldKind::Decimal),
            FieldDef::new("date_field", FieldKind::Date),
            FieldDef::new("text_field", FieldKind::Text),
        ];

        fn set_field(&mut self, name: &str, value: FieldValue) {
            match (name, value) {
                ("int_field", FieldValue::Integer(v)) => self.int_field = v,
                ("decimal_field", FieldValue::Decimal(v)) => self.decimal_field = v,
                ("date_field", FieldValue::Date(v)) => self.date_field = v,
                ("text_field", FieldValue::Text(v)) => self.text_field = v,
                _ => {}
            }
        }
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn name_map() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("int_field", "整数"),
            ("decimal_field", "小数"),
            ("date_field", "日付"),
            ("text_field", "文字列"),
        ])
    }

    #[test]
    fn resolve_maps_every_field() {
        let mapping =
            HeaderMapping::resolve::<Probe>(&headers(&["整数", "小数", "日付", "文字列"]), &name_map())
                .unwrap();

        assert_eq!(
            mapping.entries(),
            &[
                ("int_field", 0),
                ("decimal_field", 1),
                ("date_field", 2),
                ("text_field", 3),
            ]
        );
        assert_eq!(mapping.max_index(), 3);
    }

    #[test]
    fn resolve_follows_reordered_headers() {
        let mapping =
            HeaderMapping::resolve::<Probe>(&headers(&["日付", "文字列", "整数", "小数"]), &name_map())
                .unwrap();

        assert_eq!(
            mapping.entries(),
            &[
                ("int_field", 2),
                ("decimal_field", 3),
                ("date_field", 0),
                ("text_field", 1),
            ]
        );
    }

    #[test]
    fn resolve_fails_on_missing_name_map_entry() {
        let mut map = name_map();
        map.remove("text_field");

        let err = HeaderMapping::resolve::<Probe>(
            &headers(&["整数", "小数", "日付", "文字列"]),
            &map,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            KabutoError::UnmappedField { field } if field == "text_field"
        ));
    }

    #[test]
    fn resolve_fails_on_missing_header_column() {
        let err =
            HeaderMapping::resolve::<Probe>(&headers(&["整数", "小数", "日付"]), &name_map())
                .unwrap_err();

        assert!(matches!(
            err,
            KabutoError::HeaderNotFound { field, header }
                if field == "text_field" && header == "文字列"
        ));
    }

    #[test]
    fn resolve_requires_exact_match() {
        // Whitespace differences are not normalized away.
        let err = HeaderMapping::resolve::<Probe>(
            &headers(&["整数 ", "小数", "日付", "文字列"]),
            &name_map(),
        )
        .unwrap_err();

        assert!(matches!(err, KabutoError::HeaderNotFound { .. }));
    }

    #[test]
    fn resolve_claims_duplicate_headers_in_declaration_order() {
        #[derive(Debug, Default)]
        struct Averages {
            price_avg: f64,
            volume_avg: f64,
        }

        impl CsvRecord for Averages {
            const FIELDS: &'static [FieldDef] = &[
                FieldDef::new("price_avg", FieldKind::Decimal),
                FieldDef::new("volume_avg", FieldKind::Decimal),
            ];

            fn set_field(&mut self, name: &str, value: FieldValue) {
                match (name, value) {
                    ("price_avg", FieldValue::Decimal(v)) => self.price_avg = v,
                    ("volume_avg", FieldValue::Decimal(v)) => self.volume_avg = v,
                    _ => {}
                }
            }
        }

        let map = HashMap::from([("price_avg", "5日平均"), ("volume_avg", "5日平均")]);
        let mapping =
            HeaderMapping::resolve::<Averages>(&headers(&["5日平均", "出来高", "5日平均"]), &map)
                .unwrap();

        assert_eq!(mapping.entries(), &[("price_avg", 0), ("volume_avg", 2)]);
    }

    #[test]
    fn from_positions_accepts_complete_set() {
        let mapping = HeaderMapping::from_positions::<Probe>(&[
            ("int_field", 0),
            ("decimal_field", 1),
            ("date_field", 2),
            ("text_field", 3),
        ])
        .unwrap();

        assert_eq!(mapping.max_index(), 3);
    }

    #[test]
    fn from_positions_rejects_missing_field() {
        let err = HeaderMapping::from_positions::<Probe>(&[
            ("int_field", 0),
            ("decimal_field", 1),
            ("date_field", 2),
        ])
        .unwrap_err();

        assert!(matches!(
            err,
            KabutoError::UnmappedField { field } if field == "text_field"
        ));
    }

    #[test]
    fn from_positions_rejects_duplicate_field() {
        let err = HeaderMapping::from_positions::<Probe>(&[
            ("int_field", 0),
            ("int_field", 4),
            ("decimal_field", 1),
            ("date_field", 2),
            ("text_field", 3),
        ])
        .unwrap_err();

        assert!(matches!(err, KabutoError::UnmappedField { .. }));
    }
}

//! Windowing partition properties: gap-free windows concatenate to exactly
//! one full read, with no row duplicated or omitted.

mod common;

use common::*;
use kabuto::adapters::csv_source::{read_header, read_window, CsvSource, RowErrorPolicy};
use kabuto::domain::bar::AdjustedDailyBar;
use kabuto::domain::header::HeaderMapping;
use proptest::prelude::*;

fn mapping_for(csv: &str) -> HeaderMapping {
    let header = read_header(CsvSource::Bytes(csv.as_bytes())).unwrap();
    AdjustedDailyBar::resolve_header(&header).unwrap()
}

fn full_read(csv: &str, mapping: &HeaderMapping) -> Vec<AdjustedDailyBar> {
    read_window::<AdjustedDailyBar>(
        CsvSource::Bytes(csv.as_bytes()),
        mapping,
        true,
        0,
        0,
        RowErrorPolicy::Fail,
    )
    .unwrap()
    .records
}

proptest! {
    #[test]
    fn split_windows_concatenate_to_full_read(rows in 1usize..30, split in 1usize..30) {
        prop_assume!(split <= rows);

        let csv = broker_csv(rows);
        let mapping = mapping_for(&csv);

        let head = read_window::<AdjustedDailyBar>(
            CsvSource::Bytes(csv.as_bytes()),
            &mapping,
            true,
            0,
            split as i64,
            RowErrorPolicy::Fail,
        )
        .unwrap()
        .records;

        let tail = read_window::<AdjustedDailyBar>(
            CsvSource::Bytes(csv.as_bytes()),
            &mapping,
            true,
            split,
            0,
            RowErrorPolicy::Fail,
        )
        .unwrap()
        .records;

        let mut combined = head;
        combined.extend(tail);
        prop_assert_eq!(combined, full_read(&csv, &mapping));
    }

    #[test]
    fn paging_with_any_window_size_visits_each_row_once(rows in 0usize..25, limit in 1i64..8) {
        let csv = broker_csv(rows);
        let mapping = mapping_for(&csv);

        let mut paged = Vec::new();
        let mut offset = 0usize;
        loop {
            let batch = read_window::<AdjustedDailyBar>(
                CsvSource::Bytes(csv.as_bytes()),
                &mapping,
                true,
                offset,
                limit,
                RowErrorPolicy::Fail,
            )
            .unwrap();

            if batch.is_empty() {
                break;
            }
            offset += batch.rows_read();
            paged.extend(batch.records);
        }

        prop_assert_eq!(paged.len(), rows);
        prop_assert_eq!(paged, full_read(&csv, &mapping));
    }

    #[test]
    fn window_at_or_past_end_is_empty(rows in 0usize..20, past in 0usize..5) {
        let csv = broker_csv(rows);
        let mapping = mapping_for(&csv);

        let batch = read_window::<AdjustedDailyBar>(
            CsvSource::Bytes(csv.as_bytes()),
            &mapping,
            true,
            rows + past,
            10,
            RowErrorPolicy::Fail,
        )
        .unwrap();

        prop_assert!(batch.is_empty());
    }
}

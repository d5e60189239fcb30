#![allow(dead_code)]

use chrono::NaiveDate;
use std::io::Write;
use tempfile::NamedTempFile;

/// Header row of the broker's adjusted daily export. Note the repeated
/// 5日平均/25日平均 labels (price averages first, volume averages last).
pub const BROKER_HEADER: &str =
    "日付,始値,高値,安値,終値,5日平均,25日平均,75日平均,VWAP,出来高,5日平均,25日平均";

/// One export data row for the given day offset, with quoted,
/// comma-grouped numbers the way the broker writes them.
pub fn broker_row(date: NaiveDate, base: f64) -> String {
    format!(
        "{},\"{}\",\"{}\",\"{}\",\"{}\",\"{:.2}\",\"{:.2}\",\"{:.2}\",\"{:.4}\",\"{}\",\"{:.2}\",\"{:.2}\"",
        date.format("%Y/%m/%d"),
        group(base),
        group(base + 20.0),
        group(base - 30.0),
        group(base + 5.0),
        base - 1.0,
        base - 2.0,
        base - 3.0,
        base + 0.5,
        group(150_000.0 + base),
        140_000.0,
        130_000.0,
    )
}

fn group(value: f64) -> String {
    let whole = value as i64;
    let mut digits = whole.to_string();
    let mut grouped = String::new();
    while digits.len() > 3 {
        let tail = digits.split_off(digits.len() - 3);
        grouped = if grouped.is_empty() {
            tail
        } else {
            format!("{tail},{grouped}")
        };
    }
    if grouped.is_empty() {
        digits
    } else {
        format!("{digits},{grouped}")
    }
}

/// A complete export with `rows` data rows, newest trading day first, the
/// order the broker emits. Day `i` (0-based, oldest) is 2024-01-01 + i with
/// base price 1000 + i.
pub fn broker_csv(rows: usize) -> String {
    let mut out = String::from(BROKER_HEADER);
    out.push('\n');
    for i in (0..rows).rev() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(i as u64);
        out.push_str(&broker_row(date, 1000.0 + i as f64));
        out.push('\n');
    }
    out
}

/// Compact day for index `i` of [`broker_csv`].
pub fn day(i: usize) -> String {
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(i as u64);
    date.format("%Y%m%d").to_string()
}

pub fn write_temp_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

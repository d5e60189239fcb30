//! Windowed CSV reading over a file path or an in-memory byte blob.
//!
//! A windowed call re-opens the source, optionally discards the header
//! line, skips `offset` data rows and coerces up to `limit` records. The
//! driving loop keeps requesting windows with an advancing offset until it
//! gets an empty batch, which bounds memory on arbitrarily large files.

use crate::domain::coerce::coerce_row;
use crate::domain::error::KabutoError;
use crate::domain::field::CsvRecord;
use crate::domain::header::HeaderMapping;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// CSV bytes, either on disk or already in memory (e.g. a download blob).
#[derive(Debug, Clone, Copy)]
pub enum CsvSource<'a> {
    Path(&'a Path),
    Bytes(&'a [u8]),
}

impl<'a> CsvSource<'a> {
    fn open(self) -> Result<csv::Reader<Box<dyn Read + 'a>>, KabutoError> {
        let inner: Box<dyn Read + 'a> = match self {
            CsvSource::Path(path) => {
                let file = File::open(path).map_err(|e| KabutoError::SourceRead {
                    reason: format!("failed to open {}: {}", path.display(), e),
                })?;
                Box::new(file)
            }
            CsvSource::Bytes(bytes) => Box::new(bytes),
        };

        // Broker exports are ragged: lenient quoting, variable row widths.
        Ok(csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(inner))
    }
}

/// What to do with a row the coercer rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowErrorPolicy {
    /// Collect the error and continue with the remaining rows (default for
    /// imports: partial progress over large, imperfect files).
    Skip,
    /// Abort the window on the first bad row.
    Fail,
}

/// A row rejected by the coercer under [`RowErrorPolicy::Skip`].
#[derive(Debug, Clone)]
pub struct RowError {
    /// Data-row index within the source (0-based, after any header).
    pub index: usize,
    /// Raw cell contents, for diagnostics.
    pub content: Vec<String>,
    pub error: KabutoError,
}

/// One window's worth of coerced records.
///
/// Skipped rows still consumed a data-row index, so callers paging through
/// a source advance their offset by `records.len() + skipped.len()`.
#[derive(Debug)]
pub struct WindowedBatch<T> {
    pub records: Vec<T>,
    pub skipped: Vec<RowError>,
}

impl<T> WindowedBatch<T> {
    /// Number of data rows this window consumed.
    pub fn rows_read(&self) -> usize {
        self.records.len() + self.skipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.skipped.is_empty()
    }
}

/// Read the first row of the source, for header resolution.
pub fn read_header(source: CsvSource) -> Result<Vec<String>, KabutoError> {
    let mut reader = source.open()?;
    let mut record = csv::StringRecord::new();

    let got = reader
        .read_record(&mut record)
        .map_err(|e| KabutoError::SourceRead {
            reason: format!("failed to read header row: {e}"),
        })?;
    if !got {
        return Err(KabutoError::SourceRead {
            reason: "source is empty, no header row".into(),
        });
    }

    Ok(record.iter().map(|s| s.to_string()).collect())
}

/// Read one window of records.
///
/// `skip_header` states whether the source begins with a header line and
/// must be the same for every window over one source, since each call
/// re-opens it. `offset` counts data rows after any skipped header;
/// `limit <= 0` means unbounded. An offset at or past end-of-data yields an
/// empty batch, not an error.
pub fn read_window<T: CsvRecord>(
    source: CsvSource,
    mapping: &HeaderMapping,
    skip_header: bool,
    offset: usize,
    limit: i64,
    policy: RowErrorPolicy,
) -> Result<WindowedBatch<T>, KabutoError> {
    let mut reader = source.open()?;
    let mut raw = csv::StringRecord::new();

    if skip_header {
        reader
            .read_record(&mut raw)
            .map_err(|e| KabutoError::SourceRead {
                reason: format!("failed to read header row: {e}"),
            })?;
    }

    let mut records = Vec::new();
    let mut skipped = Vec::new();
    let mut row_index: usize = 0;

    loop {
        if limit > 0 && records.len() >= limit as usize {
            break;
        }

        let got = reader
            .read_record(&mut raw)
            .map_err(|e| KabutoError::SourceRead {
                reason: format!("failed to read row: {e}"),
            })?;
        if !got {
            break;
        }

        if row_index < offset {
            row_index += 1;
            continue;
        }

        let row: Vec<String> = raw.iter().map(|s| s.to_string()).collect();
        match coerce_row::<T>(mapping, &row) {
            Ok(record) => records.push(record),
            Err(error) => match policy {
                RowErrorPolicy::Skip => skipped.push(RowError {
                    index: row_index,
                    content: row,
                    error,
                }),
                RowErrorPolicy::Fail => return Err(error),
            },
        }

        row_index += 1;
    }

    Ok(WindowedBatch { records, skipped })
}

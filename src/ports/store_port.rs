//! Persistence port traits for the time-series store.

use crate::domain::bar::AdjustedDailyBar;
use crate::domain::error::KabutoError;
use crate::domain::stock::Stock;

/// Time-series persistence keyed by the natural key `(code, yyyymmdd)`.
pub trait BarStore {
    /// Insert the bar, or overwrite every non-key column if the key already
    /// exists. Re-running the same import is a no-op beyond refreshing
    /// values; it never produces duplicate rows or key violations.
    fn upsert_bar(&self, bar: &AdjustedDailyBar) -> Result<(), KabutoError>;

    /// Upsert a batch inside a single transaction.
    fn upsert_bars(&self, bars: &[AdjustedDailyBar]) -> Result<(), KabutoError>;

    fn find_bar(
        &self,
        code: &str,
        yyyymmdd: &str,
    ) -> Result<Option<AdjustedDailyBar>, KabutoError>;

    /// Bars for `code` with `from <= yyyymmdd <= to`, ascending by date.
    fn find_range(
        &self,
        code: &str,
        from: &str,
        to: &str,
    ) -> Result<Vec<AdjustedDailyBar>, KabutoError>;
}

/// Instrument master table access.
pub trait InstrumentStore {
    fn insert_stock(&self, stock: &Stock) -> Result<(), KabutoError>;

    fn find_stock(&self, code: &str) -> Result<Option<Stock>, KabutoError>;
}

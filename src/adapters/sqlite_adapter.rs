//! SQLite time-series store adapter.

use crate::domain::bar::AdjustedDailyBar;
use crate::domain::error::KabutoError;
use crate::domain::stock::Stock;
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::{BarStore, InstrumentStore};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};

fn store_err<E: std::fmt::Display>(e: E) -> KabutoError {
    KabutoError::Store {
        reason: e.to_string(),
    }
}

pub struct SqliteStoreAdapter {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteStoreAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, KabutoError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| KabutoError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4) as u32;
        Self::open(SqliteConnectionManager::file(&db_path), pool_size)
    }

    pub fn from_path(db_path: &std::path::Path) -> Result<Self, KabutoError> {
        Self::open(SqliteConnectionManager::file(db_path), 4)
    }

    pub fn in_memory() -> Result<Self, KabutoError> {
        Self::open(SqliteConnectionManager::memory(), 1)
    }

    fn open(manager: SqliteConnectionManager, pool_size: u32) -> Result<Self, KabutoError> {
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(store_err)?;
        Ok(Self { pool })
    }

    pub fn initialize_schema(&self) -> Result<(), KabutoError> {
        let conn = self.pool.get().map_err(store_err)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS stocks (
                code TEXT PRIMARY KEY,
                name TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS adjusted_daily_ohlcv (
                code         TEXT NOT NULL,
                yyyymmdd     TEXT NOT NULL,
                open         REAL NOT NULL,
                high         REAL NOT NULL,
                low          REAL NOT NULL,
                close        REAL NOT NULL,
                dma_price_5  REAL,
                dma_price_25 REAL,
                dma_price_75 REAL,
                vwap         REAL,
                volume       REAL,
                vma_5        REAL,
                vma_25       REAL,
                PRIMARY KEY (code, yyyymmdd)
            );
            CREATE INDEX IF NOT EXISTS idx_adjusted_daily_ohlcv_yyyymmdd
                ON adjusted_daily_ohlcv(yyyymmdd);",
        )
        .map_err(store_err)?;

        Ok(())
    }

    /// Probe the store with a trivial query. The pool validates connections
    /// on checkout and replaces dead ones, so a successful probe means a
    /// usable connection is being handed out again.
    pub fn check_live(&self) -> Result<(), KabutoError> {
        let conn = self.pool.get().map_err(store_err)?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(store_err)?;
        Ok(())
    }

    fn upsert_on(
        conn: &rusqlite::Connection,
        bar: &AdjustedDailyBar,
    ) -> Result<(), KabutoError> {
        conn.execute(
            "INSERT INTO adjusted_daily_ohlcv (
                code, yyyymmdd, open, high, low, close,
                dma_price_5, dma_price_25, dma_price_75,
                vwap, volume, vma_5, vma_25
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ON CONFLICT(code, yyyymmdd) DO UPDATE SET
                open         = excluded.open,
                high         = excluded.high,
                low          = excluded.low,
                close        = excluded.close,
                dma_price_5  = excluded.dma_price_5,
                dma_price_25 = excluded.dma_price_25,
                dma_price_75 = excluded.dma_price_75,
                vwap         = excluded.vwap,
                volume       = excluded.volume,
                vma_5        = excluded.vma_5,
                vma_25       = excluded.vma_25",
            params![
                bar.code,
                bar.yyyymmdd,
                bar.open,
                bar.high,
                bar.low,
                bar.close,
                bar.dma_price_5,
                bar.dma_price_25,
                bar.dma_price_75,
                bar.vwap,
                bar.volume,
                bar.vma_5,
                bar.vma_25,
            ],
        )
        .map_err(store_err)?;

        Ok(())
    }

    fn row_to_bar(row: &rusqlite::Row) -> rusqlite::Result<AdjustedDailyBar> {
        Ok(AdjustedDailyBar {
            code: row.get(0)?,
            yyyymmdd: row.get(1)?,
            open: row.get(2)?,
            high: row.get(3)?,
            low: row.get(4)?,
            close: row.get(5)?,
            dma_price_5: row.get(6)?,
            dma_price_25: row.get(7)?,
            dma_price_75: row.get(8)?,
            vwap: row.get(9)?,
            volume: row.get(10)?,
            vma_5: row.get(11)?,
            vma_25: row.get(12)?,
        })
    }
}

const BAR_COLUMNS: &str = "code, yyyymmdd, open, high, low, close, \
     dma_price_5, dma_price_25, dma_price_75, vwap, volume, vma_5, vma_25";

impl BarStore for SqliteStoreAdapter {
    fn upsert_bar(&self, bar: &AdjustedDailyBar) -> Result<(), KabutoError> {
        let conn = self.pool.get().map_err(store_err)?;
        Self::upsert_on(&conn, bar)
    }

    fn upsert_bars(&self, bars: &[AdjustedDailyBar]) -> Result<(), KabutoError> {
        let mut conn = self.pool.get().map_err(store_err)?;
        let tx = conn.transaction().map_err(store_err)?;

        for bar in bars {
            Self::upsert_on(&tx, bar)?;
        }

        tx.commit().map_err(store_err)?;
        Ok(())
    }

    fn find_bar(
        &self,
        code: &str,
        yyyymmdd: &str,
    ) -> Result<Option<AdjustedDailyBar>, KabutoError> {
        let conn = self.pool.get().map_err(store_err)?;

        let query = format!(
            "SELECT {BAR_COLUMNS} FROM adjusted_daily_ohlcv
             WHERE code = ?1 AND yyyymmdd = ?2"
        );

        conn.query_row(&query, params![code, yyyymmdd], Self::row_to_bar)
            .optional()
            .map_err(store_err)
    }

    fn find_range(
        &self,
        code: &str,
        from: &str,
        to: &str,
    ) -> Result<Vec<AdjustedDailyBar>, KabutoError> {
        let conn = self.pool.get().map_err(store_err)?;

        let query = format!(
            "SELECT {BAR_COLUMNS} FROM adjusted_daily_ohlcv
             WHERE code = ?1 AND yyyymmdd BETWEEN ?2 AND ?3
             ORDER BY yyyymmdd ASC"
        );

        let mut stmt = conn.prepare(&query).map_err(store_err)?;
        let rows = stmt
            .query_map(params![code, from, to], Self::row_to_bar)
            .map_err(store_err)?;

        let mut bars = Vec::new();
        for row in rows {
            bars.push(row.map_err(store_err)?);
        }

        Ok(bars)
    }
}

impl InstrumentStore for SqliteStoreAdapter {
    fn insert_stock(&self, stock: &Stock) -> Result<(), KabutoError> {
        let conn = self.pool.get().map_err(store_err)?;

        conn.execute(
            "INSERT INTO stocks (code, name) VALUES (?1, ?2)",
            params![stock.code, stock.name],
        )
        .map_err(store_err)?;

        Ok(())
    }

    fn find_stock(&self, code: &str) -> Result<Option<Stock>, KabutoError> {
        let conn = self.pool.get().map_err(store_err)?;

        conn.query_row(
            "SELECT code, name FROM stocks WHERE code = ?1",
            params![code],
            |row| {
                Ok(Stock {
                    code: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()
        .map_err(store_err)
    }
}

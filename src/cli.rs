//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_source::{read_header, read_window, CsvSource, RowErrorPolicy};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::sqlite_adapter::SqliteStoreAdapter;
use crate::domain::bar::AdjustedDailyBar;
use crate::domain::coerce::{COMPACT_DATE_FORMAT, NULL_TOKEN};
use crate::domain::error::KabutoError;
use crate::domain::screened::ScreenedStock;
use crate::domain::stock::Stock;
use crate::ports::store_port::{BarStore, InstrumentStore};

#[derive(Parser, Debug)]
#[command(name = "kabuto", about = "Broker CSV importer for daily OHLCV time series")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Import an adjusted daily OHLCV CSV into the store
    Import {
        /// Instrument code the file belongs to
        #[arg(long)]
        code: String,
        /// Path to the CSV file
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// The file has no header row; map columns by position
        #[arg(long)]
        headerless: bool,
        /// Data rows to skip before the first imported row
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Rows per window (<= 0 reads everything in one window)
        #[arg(long, default_value_t = 100)]
        limit: i64,
        /// Abort on the first unparsable row instead of skipping it
        #[arg(long)]
        strict: bool,
    },
    /// Create tables and indexes (idempotent)
    InitDb {
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Register an instrument in the master table
    Register {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show one bar by code and day (YYYYMMDD)
    Show {
        #[arg(long)]
        code: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List bars for a code between two days (YYYYMMDD, inclusive)
    Range {
        #[arg(long)]
        code: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Parse an RSI screening export and print the screened stocks
    ScreenRsi {
        /// Path to the screening CSV
        #[arg(long)]
        csv: PathBuf,
        /// Screening day (YYYYMMDD) to stamp onto each result
        #[arg(long)]
        date: String,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Import {
            code,
            csv,
            db,
            config,
            headerless,
            offset,
            limit,
            strict,
        } => run_import(
            &code,
            &csv,
            db.as_deref(),
            config.as_deref(),
            ImportOptions {
                headerless,
                offset,
                limit,
                strict,
            },
        ),
        Command::InitDb { db, config } => run_init_db(db.as_deref(), config.as_deref()),
        Command::Register {
            code,
            name,
            db,
            config,
        } => run_register(&code, &name, db.as_deref(), config.as_deref()),
        Command::Show {
            code,
            date,
            db,
            config,
        } => run_show(&code, &date, db.as_deref(), config.as_deref()),
        Command::Range {
            code,
            from,
            to,
            db,
            config,
        } => run_range(&code, &from, &to, db.as_deref(), config.as_deref()),
        Command::ScreenRsi { csv, date } => run_screen_rsi(&csv, &date),
    }
}

fn open_store(
    db: Option<&std::path::Path>,
    config: Option<&std::path::Path>,
) -> Result<SqliteStoreAdapter, KabutoError> {
    if let Some(db_path) = db {
        return SqliteStoreAdapter::from_path(db_path);
    }

    let config_path = config.ok_or_else(|| KabutoError::InvalidArgument {
        reason: "either --db or --config is required".into(),
    })?;

    let adapter =
        FileConfigAdapter::from_file(config_path).map_err(|e| KabutoError::ConfigParse {
            file: config_path.display().to_string(),
            reason: e.to_string(),
        })?;

    SqliteStoreAdapter::from_config(&adapter)
}

fn validate_compact_date(raw: &str) -> Result<(), KabutoError> {
    NaiveDate::parse_from_str(raw, COMPACT_DATE_FORMAT)
        .map(|_| ())
        .map_err(|_| KabutoError::InvalidArgument {
            reason: format!("invalid date {raw:?} (expected YYYYMMDD)"),
        })
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v}"),
        None => NULL_TOKEN.to_string(),
    }
}

struct ImportOptions {
    headerless: bool,
    offset: usize,
    limit: i64,
    strict: bool,
}

fn run_import(
    code: &str,
    csv_path: &std::path::Path,
    db: Option<&std::path::Path>,
    config: Option<&std::path::Path>,
    opts: ImportOptions,
) -> ExitCode {
    eprintln!("Importing {} from {}", code, csv_path.display());

    let store = match open_store(db, config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Resolve the header once per source; every later window re-opens the
    // file and just discards the header line again.
    let mapping = if opts.headerless {
        AdjustedDailyBar::positional_mapping()
    } else {
        read_header(CsvSource::Path(csv_path))
            .and_then(|header| AdjustedDailyBar::resolve_header(&header))
    };
    let mapping = match mapping {
        Ok(m) => m,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let policy = if opts.strict {
        RowErrorPolicy::Fail
    } else {
        RowErrorPolicy::Skip
    };

    let mut offset = opts.offset;
    let mut total_imported = 0usize;
    let mut total_skipped = 0usize;
    let mut total_store_failures = 0usize;

    loop {
        let batch = match read_window::<AdjustedDailyBar>(
            CsvSource::Path(csv_path),
            &mapping,
            !opts.headerless,
            offset,
            opts.limit,
            policy,
        ) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };

        if batch.is_empty() {
            eprintln!("Reached end of CSV");
            break;
        }

        for skip in &batch.skipped {
            eprintln!(
                "warning: skipping row {} {:?}: {}",
                skip.index, skip.content, skip.error
            );
        }
        total_skipped += batch.skipped.len();

        let consumed = batch.rows_read();
        let mut imported = 0usize;

        for mut bar in batch.records {
            bar.code = code.to_string();
            match store.upsert_bar(&bar) {
                Ok(()) => imported += 1,
                Err(e) => {
                    eprintln!("warning: failed to upsert {} {}: {}", bar.code, bar.yyyymmdd, e);
                    total_store_failures += 1;
                }
            }
        }

        eprintln!("Imported {imported} records from offset {offset}");
        total_imported += imported;
        offset += consumed;
    }

    eprintln!(
        "Done: {} imported, {} rows skipped, {} store failures",
        total_imported, total_skipped, total_store_failures
    );
    ExitCode::SUCCESS
}

fn run_init_db(db: Option<&std::path::Path>, config: Option<&std::path::Path>) -> ExitCode {
    let store = match open_store(db, config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if let Err(e) = store.initialize_schema().and_then(|()| store.check_live()) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    eprintln!("Schema initialized");
    ExitCode::SUCCESS
}

fn run_register(
    code: &str,
    name: &str,
    db: Option<&std::path::Path>,
    config: Option<&std::path::Path>,
) -> ExitCode {
    let store = match open_store(db, config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let stock = Stock::new(code, name);
    if let Err(e) = store.insert_stock(&stock) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    eprintln!("Registered {} ({})", stock.code, stock.name);
    ExitCode::SUCCESS
}

fn run_show(
    code: &str,
    date: &str,
    db: Option<&std::path::Path>,
    config: Option<&std::path::Path>,
) -> ExitCode {
    if let Err(e) = validate_compact_date(date) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let store = match open_store(db, config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match store.find_bar(code, date) {
        Ok(Some(bar)) => {
            println!("{}", format_bar(&bar));
            ExitCode::SUCCESS
        }
        Ok(None) => {
            eprintln!("{code} {date}: no data found");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_range(
    code: &str,
    from: &str,
    to: &str,
    db: Option<&std::path::Path>,
    config: Option<&std::path::Path>,
) -> ExitCode {
    for date in [from, to] {
        if let Err(e) = validate_compact_date(date) {
            eprintln!("error: {e}");
            return (&e).into();
        }
    }

    let store = match open_store(db, config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match store.find_range(code, from, to) {
        Ok(bars) => {
            for bar in &bars {
                println!("{}", format_bar(bar));
            }
            eprintln!("{} bars", bars.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn format_bar(bar: &AdjustedDailyBar) -> String {
    format!(
        "{} {} O:{} H:{} L:{} C:{} V:{} VWAP:{}",
        bar.code,
        bar.yyyymmdd,
        bar.open,
        bar.high,
        bar.low,
        bar.close,
        fmt_opt(bar.volume),
        fmt_opt(bar.vwap),
    )
}

fn run_screen_rsi(csv_path: &std::path::Path, date: &str) -> ExitCode {
    if let Err(e) = validate_compact_date(date) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let data = match std::fs::read(csv_path) {
        Ok(d) => d,
        Err(e) => {
            let err = KabutoError::SourceRead {
                reason: format!("failed to read {}: {}", csv_path.display(), e),
            };
            eprintln!("error: {err}");
            return (&err).into();
        }
    };

    let mapping = match ScreenedStock::positional_mapping() {
        Ok(m) => m,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let batch = match read_window::<ScreenedStock>(
        CsvSource::Bytes(&data),
        &mapping,
        true,
        0,
        0,
        RowErrorPolicy::Skip,
    ) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    for skip in &batch.skipped {
        eprintln!("warning: skipping row {}: {}", skip.index, skip.error);
    }

    for mut stock in batch.records {
        stock.yyyymmdd = date.to_string();
        println!(
            "{} {} {} price:{} rsi:{}",
            stock.yyyymmdd, stock.code, stock.name, stock.price, stock.rsi
        );
    }

    ExitCode::SUCCESS
}

//! Price data loading for the runner.
//!
//! One CSV per instrument in a data directory: the file stem is the symbol
//! and the header carries at least `Date,Open,High,Low,Close` (extra columns
//! are ignored). Resolution policy per classified symbol:
//! 1. If `<SYMBOL>.csv` exists → parse it (a parse failure rejects only that symbol)
//! 2. If not and `--synthetic` → generate a synthetic random walk (tagged),
//!    anchored at a price level suited to the symbol's contract
//! 3. Otherwise → the symbol is simply absent from the run
//!
//! Files whose symbol has no sector classification are skipped unread.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use trendfolio_core::contracts::{ContractSpecRegistry, ContractTerms, FallbackContract};
use trendfolio_core::domain::PriceBar;
use trendfolio_core::SectorMap;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read data directory '{path}': {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{symbol}': {source}")]
    Csv {
        symbol: String,
        #[source]
        source: csv::Error,
    },

    #[error("'{symbol}': row {row}: {reason}")]
    InvalidRow {
        symbol: String,
        row: usize,
        reason: String,
    },

    #[error("'{0}': no price rows")]
    Empty(String),

    #[error("no data directory given and synthetic data disabled (use --data-dir or --synthetic)")]
    NoSource,
}

/// First date of generated synthetic history.
pub const SYNTHETIC_START: (i32, u32, u32) = (2000, 1, 3);
/// Last date of generated synthetic history.
pub const SYNTHETIC_END: (i32, u32, u32) = (2024, 12, 31);

/// Dollar value per contract of a 1% price move at the start of a synthetic
/// series. Sets the starting level from the contract's price multiplier.
pub const SYNTHETIC_ONE_PCT_MOVE_USD: f64 = 1_000.0;

/// Synthetic prices never fall below this fraction of the starting level.
pub const SYNTHETIC_FLOOR_FRACTION: f64 = 0.05;

/// Options controlling how prices are loaded.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Directory of `<SYMBOL>.csv` files.
    pub data_dir: Option<PathBuf>,
    /// Drop bars before this date (inclusive bound).
    pub start: Option<NaiveDate>,
    /// Drop bars after this date (inclusive bound).
    pub end: Option<NaiveDate>,
    /// Generate synthetic bars for classified symbols without a CSV.
    pub synthetic: bool,
}

/// Provenance of an instrument's prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Csv,
    Synthetic,
}

/// Loaded prices of one instrument.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
    pub source: DataSource,
}

/// An instrument that could not be admitted to the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedInstrument {
    pub symbol: String,
    pub reason: String,
}

/// Result of loading a data directory.
#[derive(Debug, Clone)]
pub struct LoadedData {
    /// Admitted series keyed by symbol.
    pub series: BTreeMap<String, PriceSeries>,
    /// Files that failed to parse.
    pub rejected: Vec<RejectedInstrument>,
    /// Files whose symbol is not classified.
    pub unclassified: Vec<String>,
    /// Dataset hash for fingerprinting (BLAKE3 over all bar data).
    pub dataset_hash: String,
    /// Whether any symbol used synthetic data.
    pub has_synthetic: bool,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
}

/// Parse one instrument CSV. Row order is preserved; ordering is validated later.
pub fn read_price_csv(path: &Path, symbol: &str) -> Result<Vec<PriceBar>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| LoadError::Csv {
            symbol: symbol.to_string(),
            source,
        })?;

    let mut bars = Vec::new();
    let mut malformed = 0usize;
    for (i, record) in reader.deserialize::<CsvRow>().enumerate() {
        let row = record.map_err(|source| LoadError::Csv {
            symbol: symbol.to_string(),
            source,
        })?;
        if !row.close.is_finite() {
            return Err(LoadError::InvalidRow {
                symbol: symbol.to_string(),
                row: i + 1,
                reason: format!("non-finite close {}", row.close),
            });
        }
        let bar = PriceBar::new(row.date, row.open, row.high, row.low, row.close);
        if !bar.is_sane() {
            malformed += 1;
        }
        bars.push(bar);
    }

    if bars.is_empty() {
        return Err(LoadError::Empty(symbol.to_string()));
    }
    if malformed > 0 {
        // Only the close drives the engine; inconsistent OHLC is reported, not rejected.
        warn!(%symbol, rows = malformed, "bars with high/low outside open/close");
    }
    Ok(bars)
}

/// Load every classified instrument from `opts.data_dir`, plus synthetic
/// series when enabled.
///
/// Only an unreadable data directory is fatal; per-file failures are
/// collected in `rejected`. Contract terms are used only to anchor
/// synthetic series.
pub fn load_prices(
    registry: &ContractSpecRegistry,
    sectors: &SectorMap,
    fallback: &FallbackContract,
    opts: &LoadOptions,
) -> Result<LoadedData, LoadError> {
    if opts.data_dir.is_none() && !opts.synthetic {
        return Err(LoadError::NoSource);
    }

    let mut series = BTreeMap::new();
    let mut rejected = Vec::new();
    let mut unclassified = Vec::new();

    if let Some(dir) = &opts.data_dir {
        for (symbol, path) in list_csv_files(dir)? {
            if !sectors.contains(&symbol) {
                warn!(%symbol, "no sector classification; skipping file");
                unclassified.push(symbol);
                continue;
            }
            match read_price_csv(&path, &symbol) {
                Ok(bars) => {
                    let bars = filter_dates(bars, opts.start, opts.end);
                    debug!(%symbol, bars = bars.len(), "loaded prices");
                    series.insert(
                        symbol.clone(),
                        PriceSeries {
                            symbol,
                            bars,
                            source: DataSource::Csv,
                        },
                    );
                }
                Err(e) => {
                    warn!(%symbol, error = %e, "rejecting instrument");
                    rejected.push(RejectedInstrument {
                        symbol,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    let mut has_synthetic = false;
    if opts.synthetic {
        let (start, end) = synthetic_range(opts);
        for symbol in sectors.symbols() {
            if series.contains_key(symbol) || rejected.iter().any(|r| r.symbol == symbol) {
                continue;
            }
            warn!(%symbol, "generating synthetic data; results will be tagged as synthetic");
            let terms = ContractTerms::resolve(registry, symbol, fallback);
            series.insert(
                symbol.to_string(),
                PriceSeries {
                    symbol: symbol.to_string(),
                    bars: generate_synthetic_bars(symbol, &terms, start, end),
                    source: DataSource::Synthetic,
                },
            );
            has_synthetic = true;
        }
    }

    let dataset_hash = compute_dataset_hash(&series);
    Ok(LoadedData {
        series,
        rejected,
        unclassified,
        dataset_hash,
        has_synthetic,
    })
}

/// `(symbol, path)` of every `.csv` file in `dir`, sorted by symbol.
fn list_csv_files(dir: &Path) -> Result<Vec<(String, PathBuf)>, LoadError> {
    let dir_err = |source| LoadError::DataDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(dir_err)? {
        let path = entry.map_err(dir_err)?.path();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if !is_csv || !path.is_file() {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            files.push((stem.to_string(), path.clone()));
        }
    }
    files.sort();
    Ok(files)
}

fn filter_dates(
    bars: Vec<PriceBar>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<PriceBar> {
    bars.into_iter()
        .filter(|b| start.map_or(true, |s| b.date >= s) && end.map_or(true, |e| b.date <= e))
        .collect()
}

fn synthetic_range(opts: &LoadOptions) -> (NaiveDate, NaiveDate) {
    let ymd = |(y, m, d): (i32, u32, u32)| {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
    };
    (
        opts.start.unwrap_or_else(|| ymd(SYNTHETIC_START)),
        opts.end.unwrap_or_else(|| ymd(SYNTHETIC_END)),
    )
}

/// Compute a deterministic BLAKE3 hash over all bar data, in symbol order.
fn compute_dataset_hash(series: &BTreeMap<String, PriceSeries>) -> String {
    let mut hasher = blake3::Hasher::new();
    for (symbol, s) in series {
        hasher.update(symbol.as_bytes());
        for bar in &s.bars {
            hasher.update(bar.date.to_string().as_bytes());
            hasher.update(&bar.open.to_le_bytes());
            hasher.update(&bar.high.to_le_bytes());
            hasher.update(&bar.low.to_le_bytes());
            hasher.update(&bar.close.to_le_bytes());
        }
    }
    hasher.finalize().to_hex().to_string()
}

/// Starting level of a synthetic series: the price at which a 1% move is
/// worth [`SYNTHETIC_ONE_PCT_MOVE_USD`] per contract, rounded to the tick.
pub fn synthetic_start_price(terms: &ContractTerms) -> f64 {
    let multiplier = terms.price_multiplier();
    if !(multiplier.is_finite() && multiplier > 0.0) {
        return 100.0;
    }
    round_to_tick(SYNTHETIC_ONE_PCT_MOVE_USD * 100.0 / multiplier, terms.tick_size)
}

fn round_to_tick(price: f64, tick: f64) -> f64 {
    if !(tick.is_finite() && tick > 0.0) {
        return price;
    }
    ((price / tick).round() * tick).max(tick)
}

/// Generate a synthetic business-day random walk for `symbol`.
///
/// Starts at [`synthetic_start_price`], moves up to ±2% a day, closes on the
/// contract's tick grid and never drops below [`SYNTHETIC_FLOOR_FRACTION`]
/// of the start. Seeded from the symbol, so the same symbol, terms and range
/// always give the same series.
pub fn generate_synthetic_bars(
    symbol: &str,
    terms: &ContractTerms,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<PriceBar> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let start_price = synthetic_start_price(terms);
    let floor = start_price * SYNTHETIC_FLOOR_FRACTION;

    let mut bars = Vec::new();
    let mut price = start_price;
    let mut current = start;

    while current <= end {
        if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            current += chrono::Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.02..0.02);
        let open = price;
        let close = round_to_tick((price * (1.0 + daily_return)).max(floor), terms.tick_size);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.005));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.005));
        bars.push(PriceBar::new(current, open, high, low, close));

        price = close;
        current += chrono::Duration::days(1);
    }

    bars
}

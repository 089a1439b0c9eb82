//! Artifact export: JSON result and CSV curves.
//!
//! All persisted artifacts include a `schema_version` field. Unknown versions
//! are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::runner::{BacktestResult, InstrumentReport, SCHEMA_VERSION};

pub const SUMMARY_FILE: &str = "summary.json";
pub const EQUITY_FILE: &str = "equity.csv";
pub const INSTRUMENTS_FILE: &str = "instruments.csv";

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export equity curves as CSV.
///
/// Columns: date, one column per emitted sector (canonical order), total.
pub fn export_equity_csv(result: &BacktestResult) -> Result<String> {
    let curves = &result.curves;
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["date".to_string()];
    header.extend(curves.sectors.iter().map(|s| s.sector.to_string()));
    header.push("total".to_string());
    wtr.write_record(&header)?;

    for (i, date) in curves.dates.iter().enumerate() {
        let mut row = Vec::with_capacity(header.len());
        row.push(date.to_string());
        row.extend(curves.sectors.iter().map(|s| format!("{:.2}", s.equity.values[i])));
        row.push(format!("{:.2}", curves.total_equity.values[i]));
        wtr.write_record(&row)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export the per-instrument reports as CSV.
pub fn export_instruments_csv(reports: &[InstrumentReport]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "symbol",
        "sector",
        "contract_source",
        "data_source",
        "tick_size",
        "tick_value",
        "cap",
        "bar_count",
        "first_date",
        "last_date",
        "final_signal",
        "final_position",
        "total_pnl",
    ])?;

    let date = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
    for r in reports {
        wtr.write_record([
            &r.symbol,
            &r.sector.to_string(),
            &format!("{:?}", r.contract_source),
            &format!("{:?}", r.data_source),
            &r.tick_size.to_string(),
            &r.tick_value.to_string(),
            &r.cap.to_string(),
            &r.bar_count.to_string(),
            &date(r.first_date),
            &date(r.last_date),
            &r.final_signal.to_string(),
            &r.final_position.to_string(),
            &format!("{:.2}", r.total_pnl),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the artifact set for a run under `output_dir`:
/// - `summary.json`: the full `BacktestResult`
/// - `equity.csv`: sector and total equity by date
/// - `instruments.csv`: one row per admitted instrument
///
/// Returns `output_dir`.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;

    let write = |name: &str, content: String| -> Result<()> {
        let path = output_dir.join(name);
        std::fs::write(&path, content)
            .with_context(|| format!("failed to write {}", path.display()))
    };
    write(SUMMARY_FILE, export_json(result)?)?;
    write(EQUITY_FILE, export_equity_csv(result)?)?;
    write(INSTRUMENTS_FILE, export_instruments_csv(&result.instruments)?)?;

    Ok(output_dir.to_path_buf())
}

/// Load a `BacktestResult` from an artifact directory's summary.json.
pub fn load_artifacts(dir: &Path) -> Result<BacktestResult> {
    let path = dir.join(SUMMARY_FILE);
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

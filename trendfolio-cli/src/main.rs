//! Trendfolio CLI — run the portfolio backtest and inspect reference data.
//!
//! Commands:
//! - `run`: execute the backtest over a directory of per-symbol CSVs
//! - `contracts`: list contract specs with derived tick values
//! - `sectors`: list the sector classification with position caps

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use trendfolio_core::domain::Sector;
use trendfolio_runner::{run_backtest, save_artifacts, BacktestConfig, BacktestResult, LoadOptions};

#[derive(Parser)]
#[command(
    name = "trendfolio",
    about = "Trendfolio: multi-asset trend-following portfolio backtester"
)]
struct Cli {
    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute the portfolio backtest.
    Run {
        /// Path to a TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory of <SYMBOL>.csv files.
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Output directory for summary.json and equity.csv.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Generate synthetic prices for classified symbols without a CSV.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Start date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        end: Option<String>,
    },
    /// List contract specs with derived tick values.
    Contracts {
        /// Path to a TOML config file (for a contracts override).
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List the sector classification with per-sector position caps.
    Sectors {
        /// Path to a TOML config file (for a sectors override and caps).
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::Run {
            config,
            data_dir,
            output_dir,
            synthetic,
            start,
            end,
        } => run_cmd(config, data_dir, output_dir, synthetic, start, end),
        Commands::Contracts { config } => contracts_cmd(config),
        Commands::Sectors { config } => sectors_cmd(config),
    }
}

/// Install a fmt subscriber; `RUST_LOG` takes precedence over `--log-level`.
fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<PathBuf>) -> Result<BacktestConfig> {
    match path {
        Some(path) => BacktestConfig::from_file(&path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(BacktestConfig::default()),
    }
}

fn parse_date(flag: &str, value: Option<String>) -> Result<Option<NaiveDate>> {
    value
        .map(|v| {
            NaiveDate::parse_from_str(&v, "%Y-%m-%d")
                .with_context(|| format!("invalid --{flag} date '{v}' (expected YYYY-MM-DD)"))
        })
        .transpose()
}

fn run_cmd(
    config_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    output_dir: PathBuf,
    synthetic: bool,
    start: Option<String>,
    end: Option<String>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let opts = LoadOptions {
        data_dir,
        start: parse_date("start", start)?,
        end: parse_date("end", end)?,
        synthetic,
    };
    if let (Some(s), Some(e)) = (opts.start, opts.end) {
        anyhow::ensure!(s <= e, "--start {s} is after --end {e}");
    }

    let result = run_backtest(&config, &opts)?;
    print_summary(&result);

    let dir = save_artifacts(&result, &output_dir)?;
    println!("Artifacts saved to: {}", dir.display());
    Ok(())
}

fn contracts_cmd(config_path: Option<PathBuf>) -> Result<()> {
    let registry = load_config(config_path)?.load_contracts()?;
    println!(
        "{:<6} {:<28} {:>10} {:>12} {:>12}",
        "Symbol", "Name", "Tick", "Point Value", "Tick Value"
    );
    println!("{}", "-".repeat(72));
    for spec in registry.iter() {
        println!(
            "{:<6} {:<28} {:>10} {:>12} {:>12.4}",
            spec.symbol(),
            spec.name(),
            spec.tick_size(),
            spec.big_point_value(),
            spec.tick_value()
        );
    }
    println!();
    println!("{} contracts", registry.len());
    Ok(())
}

fn sectors_cmd(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let sectors = config.load_sectors()?;
    let caps = config.sizing.caps();
    println!("{:<16} {:>4}  Symbols", "Sector", "Cap");
    println!("{}", "-".repeat(72));
    for sector in Sector::ALL {
        let symbols = sectors.symbols_in(sector);
        if symbols.is_empty() {
            continue;
        }
        println!("{:<16} {:>4}  {}", sector.name(), caps.cap_for(sector), symbols.join(" "));
    }
    println!();
    println!("{} symbols", sectors.len());
    Ok(())
}

fn print_summary(result: &BacktestResult) {
    let summary = &result.summary;
    println!();
    println!("=== Portfolio Backtest ===");
    println!("Run:            {}", &result.run_id[..12.min(result.run_id.len())]);
    match (result.start_date(), result.end_date()) {
        (Some(start), Some(end)) => println!("Period:         {start} to {end}"),
        _ => println!("Period:         (no data)"),
    }
    println!("Instruments:    {}", result.instruments.len());
    println!("Fallback specs: {}", result.fallback_count());
    println!("Rejected:       {}", result.rejected.len());
    println!("Unclassified:   {}", result.unclassified.len());
    println!("Risk/instr.:    ${:.0}", result.risk_budget_per_instrument);
    println!();
    println!("--- Sectors ---");
    println!("{:<16} {:>6} {:>16}", "Sector", "Instr", "Net PnL");
    for curve in &result.curves.sectors {
        let pnl: f64 = curve.pnl.iter().sum();
        println!("{:<16} {:>6} {:>16.2}", curve.sector.name(), curve.instruments.len(), pnl);
    }
    println!();
    println!("--- Performance ---");
    println!("Final Equity:   {:.2}", summary.final_equity);
    println!("Total Return:   {:.2}%", summary.total_return_pct);
    println!("Annual Return:  {:.2}%", summary.annualized_return_pct);
    println!("Sharpe:         {:.3}", summary.sharpe);
    println!("Sortino:        {:.3}", summary.sortino);
    println!("Max Drawdown:   {:.2}%", summary.max_drawdown_pct);
    println!("Observations:   {}", summary.observations);
    if result.has_synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    for rejected in &result.rejected {
        println!("REJECTED: {} ({})", rejected.symbol, rejected.reason);
    }
}

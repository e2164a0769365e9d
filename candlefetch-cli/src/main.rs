//! candlefetch CLI: fetch one batch of Binance klines and print the table head.
//!
//! Resolution order for request settings: command-line flag, then `--config`
//! TOML file, then built-in defaults (PEPEUSDT, 1d, 500).

use anyhow::{Context, Result};
use candlefetch_core::{normalize_klines, BinanceProvider, DataProvider, FetchConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "candlefetch",
    about = "Fetch Binance klines into a table and print the first rows"
)]
struct Cli {
    /// TOML file with symbol, interval, limit, base_url, timeout_secs.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Instrument identifier (e.g., PEPEUSDT).
    #[arg(long)]
    symbol: Option<String>,

    /// Bucket width (e.g., 1m, 1h, 1d).
    #[arg(long)]
    interval: Option<String>,

    /// Number of klines requested. Forwarded as-is; the API enforces its own cap.
    #[arg(long)]
    limit: Option<u32>,

    /// API base URL. Defaults to https://api.binance.com.
    #[arg(long)]
    base_url: Option<String>,

    /// Request timeout in seconds. No timeout unless set.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Number of leading rows to print.
    #[arg(long, default_value_t = 5)]
    rows: usize,

    /// Rename headers and type the time and value columns before printing.
    #[arg(long, default_value_t = false)]
    normalize: bool,
}

impl Cli {
    fn resolve_config(&self) -> Result<FetchConfig> {
        let mut config = match &self.config {
            Some(path) => FetchConfig::from_file(path)?,
            None => FetchConfig::default(),
        };

        if let Some(symbol) = &self.symbol {
            config.symbol = symbol.clone();
        }
        if let Some(interval) = &self.interval {
            config.interval = interval.clone();
        }
        if let Some(limit) = self.limit {
            config.limit = limit;
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if self.timeout_secs.is_some() {
            config.timeout_secs = self.timeout_secs;
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    let request = config.request();

    let provider = BinanceProvider::from_config(&config)?;
    info!(
        provider = provider.name(),
        symbol = %request.symbol,
        interval = %request.interval,
        limit = request.limit,
        "fetching klines"
    );

    let mut result = provider
        .fetch(&request)
        .with_context(|| format!("fetching {} {} klines", request.symbol, request.interval))?;

    if cli.normalize {
        normalize_klines(&mut result.frame).context("normalizing kline table")?;
    }

    println!("{}", result.frame.head(Some(cli.rows)));

    Ok(())
}

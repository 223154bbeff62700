//! EdgeLab CLI — run trading cycles and inspect snapshots.
//!
//! Commands:
//! - `run` — cycle the engine over one or more symbols against a synthetic,
//!   CSV, or REST candle source
//! - `snapshot` — build a single microstructure snapshot and print it as JSON
//! - `init-config` — write a default TOML config to edit from

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use edgelab_core::data::{
    CandleProvider, CsvProvider, ProviderBreaker, RestProvider, SyntheticProvider,
};
use edgelab_core::edge::EdgeSynthesizer;
use edgelab_core::features::FeatureExtractor;
use edgelab_core::rng::SeedHierarchy;
use edgelab_runner::{RunnerConfig, StdoutObserver, TradingEngine};

#[derive(Parser)]
#[command(name = "edgelab", about = "EdgeLab CLI — microstructure edge engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run trading cycles.
    Run {
        /// Path to a TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Symbols to cycle (overrides the config file).
        #[arg(long)]
        symbol: Vec<String>,

        /// Number of cycles to run.
        #[arg(long, default_value_t = 10)]
        cycles: usize,

        /// Serve candles from `<dir>/<symbol>.csv` instead of synthetic data.
        #[arg(long)]
        csv_dir: Option<PathBuf>,

        /// Fetch candles from a Binance-compatible REST endpoint.
        #[arg(long)]
        rest_url: Option<String>,

        /// Master seed for the synthetic source.
        #[arg(long)]
        seed: Option<u64>,

        /// Initial balance (overrides the config file).
        #[arg(long)]
        balance: Option<f64>,

        /// Skip the pause between cycles.
        #[arg(long, default_value_t = false)]
        fast: bool,
    },
    /// Build one snapshot for a symbol and print it as JSON.
    Snapshot {
        /// Symbol to inspect.
        symbol: String,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Serve candles from `<dir>/<symbol>.csv` instead of synthetic data.
        #[arg(long)]
        csv_dir: Option<PathBuf>,

        /// Fetch candles from a Binance-compatible REST endpoint.
        #[arg(long)]
        rest_url: Option<String>,

        /// Master seed for the synthetic source.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Write a default config file.
    InitConfig {
        /// Where to write the TOML.
        #[arg(long, default_value = "edgelab.toml")]
        path: PathBuf,
    },
}

fn load_config(path: &Option<PathBuf>) -> Result<RunnerConfig> {
    match path {
        Some(path) => RunnerConfig::load(path),
        None => Ok(RunnerConfig::default()),
    }
}

fn build_provider(
    csv_dir: &Option<PathBuf>,
    rest_url: &Option<String>,
    seed: u64,
) -> Result<Arc<dyn CandleProvider>> {
    match (csv_dir, rest_url) {
        (Some(_), Some(_)) => bail!("--csv-dir and --rest-url are mutually exclusive"),
        (Some(dir), None) => Ok(Arc::new(CsvProvider::new(dir.clone()))),
        (None, Some(url)) => Ok(Arc::new(RestProvider::new(
            url.clone(),
            Arc::new(ProviderBreaker::default_policy()),
        ))),
        (None, None) => Ok(Arc::new(SyntheticProvider::new(SeedHierarchy::new(seed)))),
    }
}

fn run(
    config: Option<PathBuf>,
    symbols: Vec<String>,
    cycles: usize,
    csv_dir: Option<PathBuf>,
    rest_url: Option<String>,
    seed: Option<u64>,
    balance: Option<f64>,
    fast: bool,
) -> Result<()> {
    let mut config = load_config(&config)?;
    if !symbols.is_empty() {
        config.symbols = symbols;
    }
    if let Some(balance) = balance {
        config.initial_balance = balance;
    }
    if let Some(seed) = seed {
        config.master_seed = seed;
    }

    let provider = build_provider(&csv_dir, &rest_url, config.master_seed)?;
    let pause = if fast {
        None
    } else {
        Some(Duration::from_secs(config.cycle_secs))
    };

    println!(
        "running {} cycles over {:?} ({} source, balance {:.2})",
        cycles,
        config.symbols,
        provider.name(),
        config.initial_balance
    );

    let engine = TradingEngine::new(config, provider, Arc::new(StdoutObserver));
    let summary = engine.run_for(cycles, pause);
    let status = engine.status();

    println!();
    println!(
        "cycles {} | opened {} | closed {} | rejected {} | skipped {}",
        summary.cycles, summary.opened, summary.closed, summary.rejected, summary.skipped
    );
    println!(
        "funds: total {:.2} available {:.2} reserved {:.2}",
        status.funds.total_balance, status.funds.available_balance, status.funds.reserved_balance
    );
    println!(
        "trades: {} closed, {} wins, {} losses, win rate {:.0}%, pnl {:+.4}",
        status.performance.closed_trades,
        status.performance.wins,
        status.performance.losses,
        status.performance.win_rate * 100.0,
        status.performance.total_pnl
    );
    if status.breaker.emergency_stopped {
        println!(
            "EMERGENCY STOP: {}",
            status.breaker.emergency_reason.as_deref().unwrap_or("unknown")
        );
    }
    Ok(())
}

fn snapshot(
    symbol: String,
    config: Option<PathBuf>,
    csv_dir: Option<PathBuf>,
    rest_url: Option<String>,
    seed: Option<u64>,
) -> Result<()> {
    let mut config = load_config(&config)?;
    if let Some(seed) = seed {
        config.master_seed = seed;
    }
    let provider = build_provider(&csv_dir, &rest_url, config.master_seed)?;

    let candles = provider.fetch(&symbol, config.interval, config.candle_limit)?;
    let extractor = FeatureExtractor::new(config.engine.features);
    let synthesizer = EdgeSynthesizer::new(config.engine.edge);

    match extractor.extract(&candles) {
        Some(features) => {
            let snapshot = synthesizer.synthesize(&symbol, chrono::Utc::now(), features);
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        None => {
            bail!(
                "insufficient data for {symbol}: {} candles, need {}",
                candles.len(),
                extractor.min_candles()
            );
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            symbol,
            cycles,
            csv_dir,
            rest_url,
            seed,
            balance,
            fast,
        } => run(config, symbol, cycles, csv_dir, rest_url, seed, balance, fast),
        Commands::Snapshot {
            symbol,
            config,
            csv_dir,
            rest_url,
            seed,
        } => snapshot(symbol, config, csv_dir, rest_url, seed),
        Commands::InitConfig { path } => {
            if path.exists() {
                bail!("{} already exists", path.display());
            }
            let config = RunnerConfig::default();
            std::fs::write(&path, config.to_toml_string())?;
            println!("wrote default config to {}", path.display());
            Ok(())
        }
    }
}

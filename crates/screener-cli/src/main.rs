#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/td-screener/issues/")]
#![forbid(unsafe_code)]

mod cli;
mod output;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use screener::{Screener, SqliteCache, Symbol};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, OutputFormat};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Cancel `token` on Ctrl-C.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupt received, stopping");
                token.cancel();
            }
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });
}

fn build_screener(cli: &Cli) -> anyhow::Result<Screener> {
    let config = cli
        .settings
        .screener_config()
        .context("invalid screener settings")?;

    let mut screener = Screener::new(config)
        .with_yahoo()
        .context("failed to build the Yahoo Finance provider")?
        .with_nse_universes()
        .context("failed to build the NSE universes")?;

    if let Some(path) = &cli.settings.cache_path {
        let cache = SqliteCache::new(path)
            .with_context(|| format!("failed to open cache at {}", path.display()))?;
        screener = screener.set_cache(Arc::new(cache));
        info!(
            path = %path.display(),
            ttl_secs = cli.settings.cache_ttl_secs,
            "Using SQLite cache"
        );
    }

    Ok(screener)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let screener = build_screener(&cli)?;
    let shutdown = CancellationToken::new();
    cancel_on_ctrl_c(shutdown.clone());

    match cli.command {
        Command::Score { ticker, format } => {
            let symbol = Symbol::new(&ticker);
            let report = screener
                .score_ticker(&symbol)
                .await
                .with_context(|| format!("failed to score {symbol}"))?;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                OutputFormat::Table => output::print_report(&report),
            }
        }
        Command::Screen {
            universe,
            min_score,
            limit,
            format,
        } => {
            let mut symbols = screener
                .universe(&universe)
                .await
                .with_context(|| format!("failed to load universe {universe}"))?;
            if let Some(limit) = limit {
                symbols.truncate(limit);
            }

            let outcome = screener.screen(&symbols, min_score, shutdown).await;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
                OutputFormat::Table => output::print_outcome(&outcome, min_score),
            }
        }
        Command::Universe { universe } => {
            let symbols = screener
                .universe(&universe)
                .await
                .with_context(|| format!("failed to load universe {universe}"))?;
            for symbol in &symbols {
                println!("{symbol}");
            }
            info!(universe = %universe, count = symbols.len(), "Listed universe");
        }
        Command::Serve { addr } => {
            screener_api::serve(addr, Arc::new(screener), shutdown)
                .await
                .with_context(|| format!("API server on {addr} failed"))?;
        }
    }

    Ok(())
}

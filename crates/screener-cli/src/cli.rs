//! Command-line arguments.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use screener::{LookbackWindow, RetryPolicy, ScreenerConfig};

/// TD investment screener
#[derive(Debug, Parser)]
#[command(
    name = "td-screener",
    version,
    about = "Score NSE stocks against the TD investment checklist",
    long_about = "Scores stocks on business quality, management, financial strength, \
                  forensic accounting, valuation, risk, conviction and a quant edge \
                  from Yahoo Finance fundamentals and up to ten years of daily prices."
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Command,

    #[command(flatten)]
    pub(crate) settings: Settings,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub(crate) log_json: bool,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Score a single ticker
    Score {
        /// Yahoo Finance ticker, e.g. TCS.NS
        ticker: String,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Screen a universe and list tickers at or above a minimum score
    Screen {
        /// Universe to screen
        #[arg(long, default_value = "nse-core")]
        universe: String,

        /// Minimum TD Score percentage
        #[arg(long, default_value_t = 90.0)]
        min_score: f64,

        /// Screen only the first N tickers of the universe
        #[arg(long)]
        limit: Option<usize>,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// List the tickers in a universe
    Universe {
        /// Universe to list
        #[arg(long, default_value = "nse-core")]
        universe: String,
    },
    /// Serve the scoring endpoint over HTTP
    Serve {
        /// Address to bind
        #[arg(long, env = "TD_BIND_ADDR", default_value = "127.0.0.1:8000")]
        addr: SocketAddr,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

/// Settings shared by every subcommand.
#[derive(Debug, Args)]
pub(crate) struct Settings {
    /// Years of daily price history used for the Sharpe ratio
    #[arg(long, global = true, env = "TD_LOOKBACK_YEARS", default_value_t = 10)]
    pub(crate) lookback_years: u32,

    /// Shortest pause between tickers while screening, in milliseconds
    #[arg(long, global = true, env = "TD_MIN_DELAY_MS", default_value_t = 500)]
    pub(crate) min_delay_ms: u64,

    /// Longest pause between tickers while screening, in milliseconds
    #[arg(long, global = true, env = "TD_MAX_DELAY_MS", default_value_t = 1500)]
    pub(crate) max_delay_ms: u64,

    /// Retries per upstream request on network errors and rate limiting
    #[arg(long, global = true, env = "TD_MAX_RETRIES", default_value_t = 3)]
    pub(crate) max_retries: u32,

    /// SQLite file caching fetched fundamentals and prices
    #[arg(long = "cache", global = true, env = "TD_CACHE_PATH")]
    pub(crate) cache_path: Option<PathBuf>,

    /// Seconds before a cached snapshot or price series is refetched
    #[arg(long = "cache-ttl", global = true, env = "TD_CACHE_TTL", default_value_t = 86_400)]
    pub(crate) cache_ttl_secs: u64,
}

impl Settings {
    /// Build the screener configuration.
    pub(crate) fn screener_config(&self) -> screener::Result<ScreenerConfig> {
        let retry = RetryPolicy {
            max_retries: self.max_retries,
            ..RetryPolicy::default()
        };

        ScreenerConfig::default()
            .with_window(LookbackWindow::years(self.lookback_years)?)
            .with_retry(retry)
            .with_cache_ttl(Duration::from_secs(self.cache_ttl_secs))
            .with_delay(
                Duration::from_millis(self.min_delay_ms),
                Duration::from_millis(self.max_delay_ms),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_screen_defaults() {
        let cli = Cli::try_parse_from(["td-screener", "screen"]).unwrap();
        match cli.command {
            Command::Screen {
                universe,
                min_score,
                limit,
                format,
            } => {
                assert_eq!(universe, "nse-core");
                assert_eq!(min_score, 90.0);
                assert_eq!(limit, None);
                assert_eq!(format, OutputFormat::Table);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_settings_after_subcommand() {
        let cli = Cli::try_parse_from([
            "td-screener",
            "score",
            "TCS.NS",
            "--format",
            "json",
            "--lookback-years",
            "5",
            "--max-retries",
            "1",
        ])
        .unwrap();

        let config = cli.settings.screener_config().unwrap();
        assert_eq!(config.window, LookbackWindow::FIVE_YEARS);
        assert_eq!(config.retry.max_retries, 1);
        assert!(matches!(
            cli.command,
            Command::Score {
                format: OutputFormat::Json,
                ..
            }
        ));
    }

    #[test]
    fn test_cache_ttl_setting() {
        let cli = Cli::try_parse_from(["td-screener", "universe"]).unwrap();
        let config = cli.settings.screener_config().unwrap();
        assert_eq!(config.cache_ttl, screener::DEFAULT_CACHE_TTL);

        let cli = Cli::try_parse_from([
            "td-screener",
            "screen",
            "--cache",
            "td.sqlite",
            "--cache-ttl",
            "3600",
        ])
        .unwrap();
        let config = cli.settings.screener_config().unwrap();
        assert_eq!(config.cache_ttl, Duration::from_secs(3600));
    }

    #[test]
    fn test_inverted_delay_is_rejected() {
        let cli = Cli::try_parse_from([
            "td-screener",
            "universe",
            "--min-delay-ms",
            "2000",
            "--max-delay-ms",
            "100",
        ])
        .unwrap();
        assert!(cli.settings.screener_config().is_err());
    }

    #[test]
    fn test_zero_lookback_is_rejected() {
        let cli =
            Cli::try_parse_from(["td-screener", "universe", "--lookback-years", "0"]).unwrap();
        assert!(cli.settings.screener_config().is_err());
    }
}

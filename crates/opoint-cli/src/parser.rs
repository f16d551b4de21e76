//! Command-line arguments.

use std::time::Duration;

use clap::Parser;
use opoint::{DEFAULT_BASE_URL, DocFormat, KEY_ENV, LastId, SafefeedConfig, URL_ENV};

use crate::error::CliError;

/// Poll the Opoint Safefeed and print each batch on its own line.
#[derive(Parser, Debug)]
#[command(name = "safefeed")]
#[command(about = "Poll the Opoint Safefeed and print article batches")]
#[command(version)]
pub struct Cli {
    /// API key
    #[arg(long, env = KEY_ENV, hide_env_values = true)]
    pub key: String,

    /// Feed endpoint
    #[arg(long = "base-url", env = URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Where to start: an id from a previous run, 0 for the oldest retained
    /// article, or ? for the newest
    #[arg(long)]
    pub lastid: Option<LastId>,

    /// Articles per request (disables automatic tuning)
    #[arg(long = "num-art", value_parser = clap::value_parser!(u32).range(1..))]
    pub num_art: Option<u32>,

    /// Seconds between requests (disables automatic tuning)
    #[arg(long, value_name = "SECS", value_parser = parse_seconds)]
    pub interval: Option<Duration>,

    /// Expected articles per second (disables automatic tuning)
    #[arg(long = "expected-rate")]
    pub expected_rate: Option<f64>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", default_value = "30", value_parser = parse_seconds)]
    pub timeout: Duration,

    /// Document format (xml fetches a single batch)
    #[arg(long, default_value = "json")]
    pub format: DocFormat,

    /// Stop after this many batches
    #[arg(long)]
    pub batches: Option<usize>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Cli {
    /// Build the client configuration from the arguments.
    pub fn to_config(&self) -> Result<SafefeedConfig, CliError> {
        if self.key.trim().is_empty() {
            return Err(CliError::Config(format!("{KEY_ENV} is empty")));
        }
        if let Some(rate) = self.expected_rate {
            if !(rate.is_finite() && rate > 0.0) {
                return Err(CliError::Arguments(format!(
                    "expected rate must be a positive number, got {rate}"
                )));
            }
        }

        let mut config = SafefeedConfig::new(self.key.trim())
            .with_base_url(&self.base_url)
            .with_timeout(self.timeout);

        if let Some(lastid) = self.lastid {
            config = config.with_lastid(lastid);
        }
        if let Some(num_art) = self.num_art {
            config = config.with_num_art(num_art);
        }
        if let Some(interval) = self.interval {
            config = config.with_interval(interval);
        }
        if let Some(rate) = self.expected_rate {
            config = config.with_expected_rate(rate);
        }
        Ok(config)
    }

    /// Default log filter when `RUST_LOG` is not set.
    pub const fn default_log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

fn parse_seconds(value: &str) -> Result<Duration, String> {
    let secs: f64 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number of seconds"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid duration '{value}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["safefeed", "--key", "sample-token"]);
        assert_eq!(cli.key, "sample-token");
        assert_eq!(cli.timeout, Duration::from_secs(30));
        assert_eq!(cli.format, DocFormat::Json);
        assert_eq!(cli.lastid, None);
        assert_eq!(cli.batches, None);
        assert!(!cli.verbose);
        assert_eq!(cli.default_log_level(), "info");

        let config = cli.to_config().unwrap();
        assert!(config.autoconfig());
        assert_eq!(config.lastid(), LastId::Newest);
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::parse_from([
            "safefeed",
            "--key",
            "k",
            "--base-url",
            "http://localhost:1234/feed",
            "--lastid",
            "0",
            "--num-art",
            "200",
            "--interval",
            "2.5",
            "--timeout",
            "5",
            "--format",
            "xml",
            "--batches",
            "3",
            "-v",
        ]);

        assert_eq!(cli.lastid, Some(LastId::OLDEST));
        assert_eq!(cli.interval, Some(Duration::from_millis(2500)));
        assert_eq!(cli.batches, Some(3));
        assert_eq!(cli.default_log_level(), "debug");

        let config = cli.to_config().unwrap();
        assert!(!config.autoconfig());
        assert_eq!(cli.format, DocFormat::Xml);
    }

    #[test]
    fn test_newest_lastid() {
        let cli = Cli::parse_from(["safefeed", "--key", "k", "--lastid", "?"]);
        assert_eq!(cli.lastid, Some(LastId::Newest));
    }

    #[test]
    fn test_rejects_negative_interval() {
        let result = Cli::try_parse_from(["safefeed", "--key", "k", "--interval", "-1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_zero_batch_size() {
        let result = Cli::try_parse_from(["safefeed", "--key", "k", "--num-art", "0"]);
        assert!(result.is_err());

        let cli = Cli::parse_from(["safefeed", "--key", "k", "--num-art", "1"]);
        assert_eq!(cli.num_art, Some(1));
    }

    #[test]
    fn test_rejects_bad_rate() {
        let cli = Cli::parse_from(["safefeed", "--key", "k", "--expected-rate", "0"]);
        assert!(matches!(cli.to_config(), Err(CliError::Arguments(_))));
    }

    #[test]
    fn test_rejects_blank_key() {
        let cli = Cli::parse_from(["safefeed", "--key", "  "]);
        assert!(matches!(cli.to_config(), Err(CliError::Config(_))));
    }
}

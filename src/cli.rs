//! Command-line interface definitions using clap derive macros.
//!
//! The relay has a single mode of operation, so [`Cli`] carries the run
//! flags directly. Every flag has an environment variable equivalent and
//! a default that reproduces the stock setup: port 8000 on all
//! interfaces, assets from the current directory, `bitjita.com` upstream.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

pub const DEFAULT_UPSTREAM: &str = "https://bitjita.com";

#[derive(Parser, Debug)]
#[command(
    name = "market-relay",
    version,
    about = "Local CORS relay and static file server for the market helper",
    after_help = "\x1b[1mExamples:\x1b[0m\n  \
        market-relay                              Serve ./ on :8000, relay to bitjita.com\n  \
        market-relay -r ./site -p 8080 --pretty   Local dev mode\n  \
        market-relay -u http://localhost:9000     Relay to a local upstream"
)]
pub struct Cli {
    /// Listen port
    #[arg(short, long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Listen address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Directory served for non-API GET requests
    #[arg(short, long, env = "STATIC_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Upstream base URL that owns the market API
    #[arg(short, long, env = "UPSTREAM_URL", default_value = DEFAULT_UPSTREAM)]
    pub upstream: String,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,

    // -- Tuning --
    /// Upstream request timeout in milliseconds (unset: no timeout)
    #[arg(long, env = "UPSTREAM_TIMEOUT_MS", help_heading = "Tuning")]
    pub timeout: Option<u64>,

    /// Max request body size in bytes
    #[arg(
        long,
        env = "MAX_BODY_SIZE",
        default_value_t = 1_048_576,
        help_heading = "Tuning"
    )]
    pub max_body: usize,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_setup() {
        // PORT and HOST are commonly exported by shells and CI, so only the
        // relay-specific variables are checked here.
        let cli = Cli::try_parse_from(["market-relay"]).unwrap();
        assert_eq!(cli.root, PathBuf::from("."));
        assert_eq!(cli.upstream, DEFAULT_UPSTREAM);
        assert!(cli.timeout.is_none());
        assert_eq!(cli.max_body, 1_048_576);
    }

    #[test]
    fn pretty_and_json_conflict() {
        let result = Cli::try_parse_from(["market-relay", "--pretty", "--json"]);
        assert!(result.is_err());
    }

    #[test]
    fn overrides_are_parsed() {
        let cli = Cli::try_parse_from([
            "market-relay",
            "-p",
            "9000",
            "-r",
            "/srv/site",
            "-u",
            "http://localhost:7000",
            "--timeout",
            "2500",
            "-l",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.port, 9000);
        assert_eq!(cli.root, PathBuf::from("/srv/site"));
        assert_eq!(cli.upstream, "http://localhost:7000");
        assert_eq!(cli.timeout, Some(2500));
        assert_eq!(cli.log_level.to_tracing_level(), tracing::Level::DEBUG);
    }
}

//! Resolved runtime configuration.
//!
//! [`RelayConfig`] is the validated form of the command-line flags. It is
//! built once at startup and handed to the server by value, so nothing
//! downstream reads the process working directory or environment.

pub mod validation;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::cli::Cli;
use crate::error::RelayError;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub listen: SocketAddr,
    pub static_root: PathBuf,
    pub upstream: Url,
    pub timeout: Option<Duration>,
    pub max_body: usize,
}

impl RelayConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self, RelayError> {
        let listen: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;
        let upstream = validation::validate_upstream_url(&cli.upstream).map_err(|message| {
            RelayError::InvalidUpstream {
                url: cli.upstream.clone(),
                message,
            }
        })?;
        validation::validate_static_root(&cli.root)?;

        Ok(Self {
            listen,
            static_root: cli.root.clone(),
            upstream,
            timeout: cli.timeout.map(Duration::from_millis),
            max_body: cli.max_body,
        })
    }

    /// Upstream base without a trailing slash, ready for path concatenation.
    #[must_use]
    pub fn upstream_base(&self) -> String {
        self.upstream.as_str().trim_end_matches('/').to_string()
    }
}

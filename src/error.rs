//! Process-level error types for the relay.
//!
//! [`RelayError`] covers everything that can stop the relay from
//! starting or serving: bad listen address, unusable upstream URL,
//! missing static root, and socket I/O. Failures that happen while
//! handling a single request never become a `RelayError`; they are
//! turned into a [`RelayOutcome`](crate::relay::outcome::RelayOutcome)
//! and answered over HTTP instead.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RelayError {
    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("Invalid upstream URL '{url}': {message}")]
    InvalidUpstream { url: String, message: String },

    #[error("Static root is not a directory: {}\n\n  Pass --root <dir> or run from the asset directory.", path.display())]
    StaticRootMissing { path: PathBuf },

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

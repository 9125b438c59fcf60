//! Startup validation for the upstream URL and static root.

use std::path::Path;

use url::Url;

use crate::error::RelayError;

/// Validate the upstream base URL. Returns the parsed URL or a
/// human-readable error.
pub fn validate_upstream_url(raw: &str) -> Result<Url, String> {
    let parsed = Url::parse(raw).map_err(|_| format!("'{raw}' is not a valid URL"))?;

    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(format!(
            "unsupported scheme '{scheme}' (expected http or https)"
        ));
    }
    if parsed.host_str().is_none() {
        return Err("missing host".into());
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err("base URL cannot carry a query or fragment".into());
    }
    Ok(parsed)
}

pub fn validate_static_root(path: &Path) -> Result<(), RelayError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(RelayError::StaticRootMissing {
            path: path.to_path_buf(),
        })
    }
}

//! Forwarding of relayed calls to the upstream market API.
//!
//! [`Upstream`] owns the shared HTTP client and the upstream base URL.
//! Each call builds one request, follows up to [`MAX_REDIRECTS`]
//! redirects, waits for the full response body, and reports the result
//! as a [`RelayOutcome`]. Nothing is retried and no state is kept
//! between calls.

use std::time::{Duration, Instant};

use axum::http::{header, HeaderValue, Method};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use tower::ServiceExt;
use tower_http::follow_redirect::policy::Limited;
use tower_http::follow_redirect::FollowRedirect;

use super::outcome::RelayOutcome;
use super::routing::{ItemId, BULK_PATH, ITEM_PREFIX};
use crate::server::HttpClient;

const USER_AGENT: &str = concat!("market-relay/", env!("CARGO_PKG_VERSION"));

pub const MAX_REDIRECTS: usize = 5;

type RedirectingClient = FollowRedirect<HttpClient, Limited>;

pub struct Upstream {
    client: RedirectingClient,
    base: String,
    timeout: Option<Duration>,
}

impl Upstream {
    /// `base` must not end with `/`; see
    /// [`RelayConfig::upstream_base`](crate::config::RelayConfig::upstream_base).
    #[must_use]
    pub fn new(client: HttpClient, base: String, timeout: Option<Duration>) -> Self {
        Self {
            client: FollowRedirect::with_policy(client, Limited::new(MAX_REDIRECTS)),
            base,
            timeout,
        }
    }

    #[must_use]
    pub fn item_url(&self, id: &ItemId) -> String {
        format!("{}{ITEM_PREFIX}{id}", self.base)
    }

    #[must_use]
    pub fn bulk_url(&self) -> String {
        format!("{}{BULK_PATH}", self.base)
    }

    pub async fn fetch_item(&self, id: &ItemId, correlation_id: &str) -> RelayOutcome {
        let url = self.item_url(id);
        self.send(Method::GET, &url, None, correlation_id).await
    }

    /// Parse the inbound body as JSON and post its re-serialized form.
    pub async fn post_bulk(&self, body: &[u8], correlation_id: &str) -> RelayOutcome {
        let payload = match reencode_json(body) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(
                    correlation_id = %correlation_id,
                    error = %e,
                    "bulk request body is not valid JSON"
                );
                return RelayOutcome::transport(e);
            }
        };
        let url = self.bulk_url();
        self.send(Method::POST, &url, Some(payload), correlation_id)
            .await
    }

    #[allow(clippy::cast_possible_truncation)]
    async fn send(
        &self,
        method: Method,
        url: &str,
        json_body: Option<Bytes>,
        correlation_id: &str,
    ) -> RelayOutcome {
        let start = Instant::now();
        tracing::info!(
            correlation_id = %correlation_id,
            method = %method,
            upstream = %url,
            "relaying request"
        );

        let uri: hyper::Uri = match url.parse() {
            Ok(u) => u,
            Err(e) => {
                tracing::error!(
                    correlation_id = %correlation_id,
                    upstream = %url,
                    error = %e,
                    "invalid upstream URL"
                );
                return RelayOutcome::transport(e);
            }
        };

        let mut builder = hyper::Request::builder()
            .method(method)
            .uri(uri)
            .header(header::ACCEPT, HeaderValue::from_static("application/json"))
            .header(header::USER_AGENT, HeaderValue::from_static(USER_AGENT))
            .header("x-correlation-id", correlation_id);

        let body = match json_body {
            Some(bytes) => {
                builder = builder.header(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                bytes
            }
            None => Bytes::new(),
        };

        let request = match builder.body(Full::new(body)) {
            Ok(r) => r,
            Err(e) => return failed(url, correlation_id, start, &e),
        };

        let call = self.client.clone().oneshot(request);
        let response = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => {
                    let message = format!("upstream timed out after {}ms", limit.as_millis());
                    return failed(url, correlation_id, start, &message);
                }
            },
            None => call.await,
        };

        let response = match response {
            Ok(r) => r,
            Err(e) => return failed(url, correlation_id, start, &error_chain(&e)),
        };

        let status = response.status();
        let body = match response.into_body().collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                let message = format!("body read error: {}", error_chain(&e));
                return failed(url, correlation_id, start, &message);
            }
        };

        let latency_ms = start.elapsed().as_millis() as u64;
        let outcome = RelayOutcome::from_upstream(status, body);
        if let RelayOutcome::UpstreamError { .. } = outcome {
            tracing::warn!(
                correlation_id = %correlation_id,
                upstream = %url,
                status = status.as_u16(),
                latency_ms,
                "upstream returned error status"
            );
        } else {
            tracing::info!(
                correlation_id = %correlation_id,
                upstream = %url,
                status = status.as_u16(),
                latency_ms,
                "upstream responded"
            );
        }
        outcome
    }
}

#[allow(clippy::cast_possible_truncation)]
fn failed(
    url: &str,
    correlation_id: &str,
    start: Instant,
    error: &dyn std::fmt::Display,
) -> RelayOutcome {
    tracing::error!(
        correlation_id = %correlation_id,
        upstream = %url,
        error = %error,
        latency_ms = start.elapsed().as_millis() as u64,
        "upstream request failed"
    );
    RelayOutcome::transport(error)
}

fn reencode_json(body: &[u8]) -> Result<Bytes, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    serde_json::to_vec(&value).map(Bytes::from)
}

/// Flatten an error and its sources into one line. hyper's client errors
/// only say "client error (Connect)" at the top level.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

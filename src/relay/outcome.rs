//! Typed result of a relay attempt and its single HTTP mapping.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// JSON error body returned for every locally produced failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[derive(Debug)]
pub enum RelayOutcome {
    /// Upstream answered 2xx; body is passed through verbatim.
    Success { status: StatusCode, body: Bytes },
    /// Upstream answered with a non-success status.
    UpstreamError { status: StatusCode, body: Bytes },
    /// The relay could not obtain an upstream answer at all.
    TransportError(String),
}

impl RelayOutcome {
    #[must_use]
    pub fn from_upstream(status: StatusCode, body: Bytes) -> Self {
        if status.is_success() {
            Self::Success { status, body }
        } else {
            Self::UpstreamError { status, body }
        }
    }

    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::TransportError(err.to_string())
    }
}

impl IntoResponse for RelayOutcome {
    fn into_response(self) -> Response {
        match self {
            Self::Success { status, body } => json_bytes(status, body),
            Self::UpstreamError { status, body } if !body.is_empty() => json_bytes(status, body),
            Self::UpstreamError { status, .. } => (
                status,
                Json(ErrorBody::new(format!(
                    "API returned status {}",
                    status.as_u16()
                ))),
            )
                .into_response(),
            Self::TransportError(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody::new(message))).into_response()
            }
        }
    }
}

fn json_bytes(status: StatusCode, body: Bytes) -> Response {
    (
        status,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )],
        body,
    )
        .into_response()
}

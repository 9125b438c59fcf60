//! The relay handler.
//!
//! [`relay_handler`] is the router fallback: every request lands here,
//! is classified by [`routing::match_route`], and is either answered
//! locally (preflight, method errors), relayed to the upstream
//! ([`upstream`]), or handed to the static file service. Relay results
//! are typed as [`outcome::RelayOutcome`] and converted to a response in
//! one place. CORS headers are added around all of this by
//! [`headers::with_cors`].

pub mod headers;
pub mod outcome;
pub mod routing;
pub mod upstream;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tower::ServiceExt;

use crate::server::AppState;
use outcome::{ErrorBody, RelayOutcome};
use routing::RouteMatch;

pub async fn relay_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
) -> Response {
    let method = request.method().clone();
    let route = routing::match_route(&method, request.uri());

    match route {
        RouteMatch::Preflight => StatusCode::OK.into_response(),
        RouteMatch::Item(id) => {
            let correlation_id = correlation_id(&request);
            tracing::info!(
                correlation_id = %correlation_id,
                client = %addr,
                item_id = %id,
                "item lookup"
            );
            let outcome = state.upstream.fetch_item(&id, &correlation_id).await;
            respond(outcome, &correlation_id)
        }
        RouteMatch::BulkPrices => {
            let correlation_id = correlation_id(&request);
            tracing::info!(
                correlation_id = %correlation_id,
                client = %addr,
                "bulk price lookup"
            );
            let outcome = match axum::body::to_bytes(request.into_body(), state.max_body).await {
                Ok(body) => state.upstream.post_bulk(&body, &correlation_id).await,
                Err(e) if exceeds_length_limit(&e) => {
                    tracing::warn!(
                        correlation_id = %correlation_id,
                        limit = state.max_body,
                        "request body too large"
                    );
                    return (
                        StatusCode::PAYLOAD_TOO_LARGE,
                        Json(ErrorBody::new("Request body too large")),
                    )
                        .into_response();
                }
                Err(e) => {
                    tracing::error!(
                        correlation_id = %correlation_id,
                        error = %e,
                        "failed to read request body"
                    );
                    RelayOutcome::transport(e)
                }
            };
            respond(outcome, &correlation_id)
        }
        RouteMatch::Static => serve_static(&state, request).await,
        RouteMatch::MethodNotAllowed => {
            tracing::warn!(
                client = %addr,
                path = %request.uri().path(),
                "POST to non-relay path"
            );
            (
                StatusCode::METHOD_NOT_ALLOWED,
                Json(ErrorBody::new("Method not allowed")),
            )
                .into_response()
        }
        RouteMatch::Unsupported => {
            tracing::warn!(
                client = %addr,
                method = %method,
                path = %request.uri().path(),
                "unsupported method"
            );
            (
                StatusCode::NOT_IMPLEMENTED,
                Json(ErrorBody::new(format!("Unsupported method ('{method}')"))),
            )
                .into_response()
        }
    }
}

fn correlation_id(request: &Request) -> String {
    request
        .headers()
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from)
}

/// Bodies without a `Content-Length` pass the limit layer and only trip
/// the limit while being read, so the error has to be found in the chain.
fn exceeds_length_limit(err: &axum::Error) -> bool {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = current {
        if e.is::<http_body_util::LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

fn respond(outcome: RelayOutcome, correlation_id: &str) -> Response {
    let mut response = outcome.into_response();
    if let Ok(value) = correlation_id.parse() {
        response.headers_mut().insert("x-correlation-id", value);
    }
    response
}

async fn serve_static(state: &AppState, request: Request) -> Response {
    match state.static_files.clone().oneshot(request).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    }
}

//! Shared helpers: a recording stub upstream and a relay bound to an
//! ephemeral port.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use market_relay::config::RelayConfig;
use market_relay::server::{self, AppState};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub target: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    body: &'static str,
    /// Requests to `.0` get a 301 pointing at `.1`.
    redirect: Option<(&'static str, &'static str)>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

pub struct StubUpstream {
    pub addr: SocketAddr,
    pub requests: Arc<Mutex<Vec<Recorded>>>,
    _shutdown: tokio::sync::oneshot::Sender<()>,
}

impl StubUpstream {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

async fn stub_handler(State(stub): State<StubState>, request: Request) -> Response {
    let method = request.method().to_string();
    let target = request
        .uri()
        .path_and_query()
        .map_or_else(|| "/".to_string(), ToString::to_string);
    let content_type = request
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let body = axum::body::to_bytes(request.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();

    stub.requests.lock().unwrap().push(Recorded {
        method,
        target: target.clone(),
        content_type,
        body,
    });

    if let Some((from, to)) = stub.redirect {
        if target == from {
            return (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, to)]).into_response();
        }
    }

    (stub.status, stub.body).into_response()
}

async fn spawn_upstream(state: StubState) -> StubUpstream {
    let requests = Arc::clone(&state.requests);
    let router = Router::new().fallback(stub_handler).with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    StubUpstream {
        addr,
        requests,
        _shutdown: shutdown_tx,
    }
}

/// Start an upstream that answers every request with `status` and `body`
/// and records what it received.
pub async fn start_upstream(status: u16, body: &'static str) -> StubUpstream {
    spawn_upstream(StubState {
        status: StatusCode::from_u16(status).unwrap(),
        body,
        redirect: None,
        requests: Arc::new(Mutex::new(Vec::new())),
    })
    .await
}

/// Like [`start_upstream`] with a 200 `body`, except that requests to
/// `from` are redirected to `to`.
pub async fn start_redirecting_upstream(
    from: &'static str,
    to: &'static str,
    body: &'static str,
) -> StubUpstream {
    spawn_upstream(StubState {
        status: StatusCode::OK,
        body,
        redirect: Some((from, to)),
        requests: Arc::new(Mutex::new(Vec::new())),
    })
    .await
}

/// Temporary asset directory, removed on drop.
pub struct StaticRoot {
    path: PathBuf,
}

impl StaticRoot {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StaticRoot {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// Fresh directory with an `index.html` and a `data/items.json`.
pub fn static_root() -> StaticRoot {
    let path = std::env::temp_dir().join(format!("market-relay-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(path.join("data")).unwrap();
    std::fs::write(path.join("index.html"), "<h1>market helper</h1>").unwrap();
    std::fs::write(path.join("data/items.json"), r#"{"items":[]}"#).unwrap();
    StaticRoot { path }
}

pub async fn start_relay(
    upstream: &str,
    root: StaticRoot,
) -> (SocketAddr, tokio::sync::oneshot::Sender<()>) {
    start_relay_with_limit(upstream, root, 1_048_576).await
}

/// The relay task owns `root`, so the directory lives until the server
/// stops or the test runtime is torn down.
pub async fn start_relay_with_limit(
    upstream: &str,
    root: StaticRoot,
    max_body: usize,
) -> (SocketAddr, tokio::sync::oneshot::Sender<()>) {
    let config = RelayConfig {
        listen: "127.0.0.1:0".parse().unwrap(),
        static_root: root.path().to_path_buf(),
        upstream: upstream.parse().unwrap(),
        timeout: None,
        max_body,
    };
    let state = Arc::new(AppState::new(&config, server::build_http_client()));
    let router = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(config.listen).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        })
        .await
        .unwrap();
        drop(root);
    });

    (addr, shutdown_tx)
}

pub fn assert_cors(response: &reqwest::Response) {
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-methods"], "GET, POST, OPTIONS");
    assert_eq!(headers["access-control-allow-headers"], "Content-Type");
}

//! Start the relay: resolve config, bind, serve until a shutdown signal.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::cli::Cli;
use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::logging;
use crate::server::{self, AppState};

pub async fn execute(cli: Cli) -> Result<(), RelayError> {
    let log_format = logging::resolve_format(cli.pretty, cli.json);
    logging::init(&cli.log_level, log_format);

    let config = RelayConfig::from_cli(&cli)?;
    let state = Arc::new(AppState::new(&config, server::build_http_client()));
    let router = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(config.listen).await?;

    tracing::info!(
        addr = %config.listen,
        root = %config.static_root.display(),
        upstream = %config.upstream_base(),
        "market relay started; open http://localhost:{} in a browser",
        config.listen.port()
    );

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(server::shutdown_signal())
    .await?;

    tracing::info!("market relay stopped");
    Ok(())
}

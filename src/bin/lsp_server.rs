//! REST Client Language Server Binary Entry Point
//!
//! Communicates over stdin/stdout using JSON-RPC. Logging goes to stderr
//! (filtered with `RUST_LOG`) so it never interferes with the protocol.

use rest_client_core::lsp_server::{Backend, REQUEST_EXECUTED_METHOD};
use tower_lsp::{LspService, Server};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    log::info!(
        "Starting REST Client Language Server {}",
        env!("CARGO_PKG_VERSION")
    );

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::build(Backend::new)
        .custom_method(REQUEST_EXECUTED_METHOD, Backend::request_executed)
        .finish();

    let server = Server::new(stdin, stdout, socket);

    tokio::select! {
        _ = server.serve(service) => {
            log::info!("Server finished");
        }
        _ = shutdown_signal() => {
            log::info!("Received shutdown signal");
        }
    }

    log::info!("Server shutting down");
}

/// Waits for Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigint, mut sigterm) = match (
            signal(SignalKind::interrupt()),
            signal(SignalKind::terminate()),
        ) {
            (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
            (Err(e), _) | (_, Err(e)) => {
                log::error!("Failed to install signal handlers: {}", e);
                return std::future::pending().await;
            }
        };

        tokio::select! {
            _ = sigint.recv() => log::debug!("Received SIGINT"),
            _ = sigterm.recv() => log::debug!("Received SIGTERM"),
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

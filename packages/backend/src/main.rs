use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use learntwin_backend::config::Config;
use learntwin_backend::services::catalog::load_catalog;
use learntwin_backend::services::mastery::MasteryService;
use learntwin_backend::state::AppState;
use learntwin_backend::{db, logging, routes};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = logging::init_tracing(&config);

    let pool = match config.sqlite_path.as_deref() {
        Some(path) => match db::connect(path).await {
            Ok(pool) => Some(pool),
            Err(err) => {
                tracing::warn!(error = %err, path, "observation store not initialized");
                None
            }
        },
        None => {
            tracing::info!("no SQLITE_PATH configured, running without persistence");
            None
        }
    };

    let catalog = match config.catalog_path.as_deref() {
        Some(path) => match load_catalog(path) {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(error = %err, path, "catalog not loaded, starting empty");
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    let mastery = Arc::new(MasteryService::new(config.bkt, catalog));
    let state = AppState::new(mastery, pool, config.api_key.clone());

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.bind_addr();
    tracing::info!(%addr, "learntwin backend listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind listener failed");

    let server = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal());

    if let Err(e) = server.await {
        tracing::error!(error = %e, "server error");
    }

    tracing::info!("HTTP server stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

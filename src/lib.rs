// Shiritori backend

pub mod auth;
pub mod db;
pub mod dictionary;
pub mod engine;
pub mod errors;
pub mod http;
pub mod ids;
mod middleware;
pub use middleware::cors_layer;
pub mod models;
pub mod state;
pub mod ws;

use axum::Router;
use state::AppState;
use tokio::signal;

/// Start the HTTP + WebSocket API server
pub async fn start_server() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let state = AppState::new()
        .await
        .expect("Failed to initialize application state");

    sqlx::migrate!("./migrations")
        .run(&state.postgres)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("PostgreSQL connection pool established");

    // Pull persisted dictionaries into the in-memory lookup sets.
    match state.dictionary.warm(&state.postgres).await {
        Ok(count) => tracing::info!("Dictionary warmed with {} words", count),
        Err(e) => tracing::warn!("Dictionary warm-up failed: {}", e),
    }

    // Build HTTP router with the WebSocket routes merged in
    let app = Router::new()
        .merge(http::create_http_routes(state.clone()))
        .merge(ws::create_ws_routes(state.clone()))
        .layer(cors_layer())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .fallback(|| async { "404 Not Found" });

    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3001);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("Failed to bind address");

    tracing::info!("Server listening on port {}", port);

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    if let Err(e) = server.await {
        tracing::error!("Server error: {}", e);
    }
}

/// Handle graceful shutdown on SIGTERM or Ctrl+C
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, shutting down");
        },
        _ = terminate => {
            tracing::info!("SIGTERM received, shutting down");
        },
    }
}

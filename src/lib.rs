pub mod api;
pub mod app_state;
pub mod config;
pub mod extractor;

use anyhow::Context;
use axum::Router;
use axum::extract::Extension;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

//
// Re-export
//
pub use api::{ApiError, InfoRequest, InfoResponse, log_request_errors};
pub use app_state::AppState;
pub use config::Config;
pub use extractor::{ExtractError, VideoInfo, YtDlp};

/// Build the HTTP surface around `state`
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(api::root))
        .route("/info", post(api::info))
        .layer(axum::middleware::from_fn(api::log_request_errors))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(Extension(state))
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    let state = AppState::new(&config);
    let app = router(state);

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Server listening on {addr}");
    info!("Access the server at: http://localhost:{}", config.port);
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use brandscan_analyze::Services;
use brandscan_common::{Config, ScreenshotCache};

mod error;
mod screenshot;
mod state;
mod ws;

use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("brandscan=info".parse()?))
        .init();

    let config = Config::from_env();
    config.log_redacted();

    let state = AppState {
        services: Arc::new(Services::from_config(&config)),
        screenshots: Arc::new(ScreenshotCache::new()),
        config: Arc::new(config),
    };

    let cors = if state.config.cors_origins.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods([Method::GET]).allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = state.config.cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins).allow_methods([Method::GET]).allow_headers([header::CONTENT_TYPE])
    };

    let host = state.config.web_host.clone();
    let port = state.config.web_port;

    let app = Router::new()
        .route("/", get(|| async { "ok" }))
        .route("/ws", get(ws::scan_socket))
        .route("/screenshot/{cache_id}", get(screenshot::get_screenshot))
        .with_state(state)
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        // `if_not_present` rather than `overriding`: the screenshot handler
        // sets its own one-hour Cache-Control and must win over this default.
        .layer(SetResponseHeaderLayer::if_not_present(header::CACHE_CONTROL, HeaderValue::from_static("no-store")))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!("http_request", method = %request.method(), path = %request.uri().path())
            }),
        );

    let addr = format!("{host}:{port}");
    info!("brandscan gateway starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Scanner HTTP service

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::{AppConfig, ASSETS_PREFIX};
use crate::render::{render_gallery, GalleryPage};
use crate::scanner;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
}

/// Create the web application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let assets = ServeDir::new(&state.config.assets_root);
    let endpoint = state.config.server.endpoint.clone();

    Router::new()
        // Pages
        .route("/", get(gallery_page))
        .route("/health", get(health))
        // Scanner endpoint
        .route(&endpoint, get(api_gallery_images))
        .nest_service(ASSETS_PREFIX, assets)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === API Handlers ===

async fn api_gallery_images(State(state): State<Arc<AppState>>) -> Response {
    let config = state.config.clone();
    let scan = tokio::task::spawn_blocking(move || scanner::scan(&config)).await;

    match scan {
        Ok(Ok(manifest)) => Json(manifest).into_response(),
        Ok(Err(e)) => {
            error!("Gallery scan failed: {}", e);
            scan_failed(e.to_string())
        }
        Err(e) => {
            error!("Gallery scan task failed: {}", e);
            scan_failed(e.to_string())
        }
    }
}

fn scan_failed(message: String) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { error: message })).into_response()
}

// === Page Handlers ===

async fn gallery_page(State(state): State<Arc<AppState>>) -> Response {
    let config = state.config.clone();
    let scan = tokio::task::spawn_blocking(move || scanner::scan(&config)).await;

    let manifest = match scan {
        Ok(Ok(manifest)) => manifest,
        Ok(Err(e)) => {
            error!("Gallery scan failed: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Gallery unavailable").into_response();
        }
        Err(e) => {
            error!("Gallery scan task failed: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Gallery unavailable").into_response();
        }
    };

    let mut page = GalleryPage::for_categories(&state.config.categories)
        .with_close_delay(state.config.lightbox.close_delay_ms);
    render_gallery(&mut page, &manifest, &state.config.categories);
    Html(page.to_html("Gallery")).into_response()
}

async fn health() -> &'static str {
    "ok"
}

/// Start the scanner server
pub async fn start_server(config: AppConfig) -> crate::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Scanner endpoint at http://{}{}", addr, config.server.endpoint);

    let router = create_router(Arc::new(AppState { config }));
    axum::serve(listener, router).await
        .map_err(|e| crate::VitrineError::Config(format!("Server error: {}", e)))?;

    Ok(())
}

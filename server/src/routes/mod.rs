//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the auth API under `/api/auth` and serves the static marketing
//! site as the fallback, so the landing pages and the JSON API share one
//! listener.

pub mod auth;

use std::path::PathBuf;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

fn api_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Resolve the path to the static marketing site.
fn website_dir() -> PathBuf {
    std::env::var("WEBSITE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../website"))
}

/// Full application: JSON API plus the static site fallback.
pub fn app(state: AppState) -> Router {
    let website = ServeDir::new(website_dir()).append_index_html_on_directories(true);
    api_routes(state).fallback_service(website)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

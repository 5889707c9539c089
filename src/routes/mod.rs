//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the account endpoints and a health check under a single Axum
//! router. Request spans record method and path only: `GET /login` carries
//! the password in its query string.

pub mod accounts;

use axum::Router;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace = TraceLayer::new_for_http()
        .make_span_with(|request: &Request| {
            tracing::info_span!("http", method = %request.method(), path = %request.uri().path())
        })
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/register", post(accounts::register))
        .route("/login", get(accounts::login_query).post(accounts::login_json))
        .route("/healthz", get(healthz))
        .layer(trace)
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

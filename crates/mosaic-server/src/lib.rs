//! HTTP surface of the mosaic valuation assistant
//!
//! Routes:
//!
//! - `GET|POST /api/agents`: simulated analysis progress
//! - `GET|POST /api/chat`: canned replies in the chat run envelope
//! - `GET /api/market-data`: 30-day candles, optionally with a projection
//! - `POST /api/auth/anonymous`, `GET /api/auth/session`,
//!   `POST /api/auth/signout`: anonymous sessions
//!
//! Every request passes through the page [route guard](auth::guard).

pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, Result};
pub use state::AppState;

/// Assemble the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/agents", get(routes::agents::info).post(routes::agents::handle))
        .route("/api/chat", get(routes::chat::info).post(routes::chat::handle))
        .route("/api/market-data", get(routes::market::handle))
        .route("/api/auth/anonymous", post(auth::sign_in_anonymous))
        .route("/api/auth/session", get(auth::current_session))
        .route("/api/auth/signout", post(auth::sign_out))
        .fallback(routes::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

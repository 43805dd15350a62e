//! Anonymous sign-in, sessions and the page route guard

pub mod guard;
pub mod session;

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::SET_COOKIE;
use axum::response::IntoResponse;
use chrono::Utc;
use serde_json::json;

use crate::error::Result;
use crate::state::AppState;

pub use guard::{GuardDecision, SESSION_COOKIE, decide, require_session, session_token};
pub use session::{InMemorySessionStore, SESSION_MAX_AGE, Session, SessionStore, SessionUser};

/// `POST /api/auth/anonymous`
pub async fn sign_in_anonymous(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let session = Session::new(SessionUser::anonymous(Utc::now()));
    let cookie = format!(
        "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        session.token,
        SESSION_MAX_AGE.as_secs()
    );
    let user = session.user.clone();

    let reaped = state.sessions.cleanup_expired();
    if reaped > 0 {
        tracing::debug!(reaped, "dropped expired sessions");
    }
    state.sessions.insert(session)?;

    tracing::info!(user_id = %user.id, "anonymous sign-in");
    Ok(([(SET_COOKIE, cookie)], Json(json!({ "success": true, "user": user }))))
}

/// `GET /api/auth/session`: the signed-in user, or `null`
pub async fn current_session(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let user = session_token(&headers)
        .and_then(|token| state.sessions.get(&token))
        .map(|session| session.user);
    Json(json!({ "success": true, "user": user }))
}

/// `POST /api/auth/signout`
pub async fn sign_out(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let removed = session_token(&headers).is_some_and(|token| state.sessions.remove(&token));
    let cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    ([(SET_COOKIE, cookie)], Json(json!({ "success": true, "signedOut": removed })))
}

//! Page route guard
//!
//! Unauthenticated visitors are kept out of account pages, and signed-in
//! users are bounced off the sign-in pages. API routes and static assets
//! are never guarded.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::state::AppState;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "mosaic_session";

const SIGN_IN_PATH: &str = "/auth/signin";
const AUTH_PREFIX: &str = "/auth";
const PROTECTED_PREFIXES: &[&str] = &["/dashboard", "/profile", "/settings"];
const UNGUARDED_PREFIXES: &[&str] = &["/api", "/_next/static", "/_next/image", "/public"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Send to sign-in, remembering where the visitor wanted to go
    SignIn { location: String },
    Home,
}

/// Decide what to do with a request for `path`
pub fn decide(path: &str, authenticated: bool) -> GuardDecision {
    if !is_page_route(path) {
        return GuardDecision::Allow;
    }

    let protected = PROTECTED_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix));

    if !authenticated && protected {
        return GuardDecision::SignIn {
            location: sign_in_location(path),
        };
    }
    if authenticated && path.starts_with(AUTH_PREFIX) {
        return GuardDecision::Home;
    }
    GuardDecision::Allow
}

fn is_page_route(path: &str) -> bool {
    if UNGUARDED_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
    {
        return false;
    }
    // Anything that looks like a file is an asset.
    !path.rsplit('/').next().is_some_and(|segment| segment.contains('.'))
}

fn sign_in_location(callback: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("callbackUrl", callback)
        .finish();
    format!("{SIGN_IN_PATH}?{query}")
}

/// Session token from the request's cookies
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.to_string())
        .filter(|token| !token.is_empty())
}

/// Middleware applying [`decide`] to every request
pub async fn require_session(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let authenticated = session_token(request.headers())
        .and_then(|token| state.sessions.get(&token))
        .is_some();

    match decide(request.uri().path(), authenticated) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::SignIn { location } => {
            tracing::debug!(path = request.uri().path(), "redirecting to sign-in");
            Redirect::temporary(&location).into_response()
        }
        GuardDecision::Home => Redirect::temporary("/").into_response(),
    }
}

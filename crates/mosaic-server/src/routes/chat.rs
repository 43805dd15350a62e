//! `/api/chat`: canned analysis replies

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use mosaic_valuation::ChatEnvelope;
use serde_json::{Value, json};

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// `GET /api/chat`
pub async fn info() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Chat API is running. Use POST method to send messages.",
        "endpoints": {
            "chat": "POST /api/chat",
            "market_data": "GET /api/market-data",
        },
    }))
}

/// `POST /api/chat`
pub async fn handle(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<ChatEnvelope>> {
    let Json(body) = payload?;

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .ok_or(ApiError::InvalidMessage)?;
    let session_id = body.get("session_id").and_then(Value::as_str);

    let envelope = state.formatter.respond(message, session_id).await?;
    Ok(Json(envelope))
}

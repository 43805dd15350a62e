//! `/api/agents`: simulated analysis progress

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use mosaic_valuation::progress::{Agent, AnalysisKind, FLOW_STEP_COUNT, FlowStep, ProgressSnapshot};
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::{ApiError, Result};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub success: bool,
    pub agents: Vec<Agent>,
    pub flow: Vec<FlowStep>,
    pub complete: bool,
}

impl From<ProgressSnapshot> for ProgressResponse {
    fn from(snapshot: ProgressSnapshot) -> Self {
        let complete = snapshot.is_complete();
        Self {
            success: true,
            agents: snapshot.agents,
            flow: snapshot.flow,
            complete,
        }
    }
}

/// `GET /api/agents`
pub async fn info() -> Json<Value> {
    let available_types: Vec<&str> = AnalysisKind::ALL.iter().map(AnalysisKind::as_str).collect();
    Json(json!({
        "success": true,
        "message": "Agents API is running",
        "available_types": available_types,
        "actions": ["start", "progress"],
        "example": {
            "start": r#"POST /api/agents { "action": "start", "type": "market_analysis" }"#,
            "progress": r#"POST /api/agents { "action": "progress", "agents": [...], "flow": [...] }"#,
        },
    }))
}

/// `POST /api/agents`
pub async fn handle(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<ProgressResponse>> {
    let Json(body) = payload?;
    let kind = AnalysisKind::resolve(body.get("type").and_then(Value::as_str));

    let snapshot = match body.get("action").and_then(Value::as_str) {
        Some("start") => state.simulator.start(kind),
        Some("progress") => {
            let current = client_snapshot(&body).unwrap_or_else(|| {
                tracing::debug!(kind = kind.as_str(), "no usable snapshot, starting fresh");
                state.simulator.start(kind)
            });
            state
                .rng
                .with(|rng| state.simulator.advance(current, rng))
        }
        _ => return Err(ApiError::InvalidAction),
    };

    Ok(Json(snapshot.into()))
}

/// The snapshot a polling client sent back, if it sent a usable one.
///
/// A usable snapshot carries the full flow; anything else restarts.
fn client_snapshot(body: &Value) -> Option<ProgressSnapshot> {
    let agents = serde_json::from_value(body.get("agents")?.clone()).ok()?;
    let flow: Vec<FlowStep> = serde_json::from_value(body.get("flow")?.clone()).ok()?;
    if flow.len() != FLOW_STEP_COUNT {
        return None;
    }
    Some(ProgressSnapshot { agents, flow })
}

//! `/api/market-data`: 30-day chart with optional projection

use axum::Json;
use axum::extract::{Query, State};
use mosaic_valuation::{ChartCandle, DataSource};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct MarketQuery {
    predict: Option<String>,
}

impl MarketQuery {
    fn wants_predictions(&self) -> bool {
        matches!(self.predict.as_deref(), Some("true" | "1"))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketResponse {
    pub success: bool,
    pub chart_data: Vec<ChartCandle>,
    pub source: DataSource,
    pub ohlc_derived: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predictions: Option<Vec<ChartCandle>>,
}

/// `GET /api/market-data[?predict=true]`
///
/// Never fails: upstream trouble yields a synthetic series.
pub async fn handle(
    State(state): State<AppState>,
    Query(query): Query<MarketQuery>,
) -> Json<MarketResponse> {
    let series = state.market.fetch_or_synthesize().await;
    let predictions = query
        .wants_predictions()
        .then(|| state.market.predict(&series.candles));

    Json(MarketResponse {
        success: true,
        chart_data: series.candles,
        source: series.source,
        ohlc_derived: series.ohlc_derived,
        predictions,
    })
}

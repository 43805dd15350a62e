//! CoinGecko market chart client
//!
//! Public API, no key required. The free tier allows roughly 30 calls per
//! minute; the client refuses calls over its quota instead of waiting so the
//! caller can fall back immediately.

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::config::ValuationConfig;
use crate::error::{Result, ValuationError};

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// `market_chart` response: `[epoch_ms, value]` pairs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketChart {
    pub prices: Vec<[f64; 2]>,
    #[serde(default)]
    pub total_volumes: Vec<[f64; 2]>,
}

/// Source of daily close/volume series
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Daily price and volume points covering the last `days` days
    async fn daily_chart(&self, days: u32) -> Result<MarketChart>;
}

/// CoinGecko API client
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
    coin: String,
    vs_currency: String,
    rate_limiter: SharedRateLimiter,
}

impl CoinGeckoClient {
    /// Create a client from the valuation configuration
    pub fn new(config: &ValuationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("mosaic-valuation/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let per_minute = NonZeroU32::new(config.rate_limit_per_minute).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)));

        Ok(Self {
            client,
            base_url: config.coingecko_base_url.trim_end_matches('/').to_string(),
            coin: config.market_coin.clone(),
            vs_currency: config.vs_currency.clone(),
            rate_limiter,
        })
    }

    fn chart_url(&self) -> String {
        format!("{}/coins/{}/market_chart", self.base_url, self.coin)
    }
}

#[async_trait]
impl MarketDataSource for CoinGeckoClient {
    async fn daily_chart(&self, days: u32) -> Result<MarketChart> {
        if self.rate_limiter.check().is_err() {
            return Err(ValuationError::RateLimitExceeded {
                provider: "CoinGecko".to_string(),
            });
        }

        let days = days.to_string();
        let response = self
            .client
            .get(self.chart_url())
            .query(&[
                ("vs_currency", self.vs_currency.as_str()),
                ("days", days.as_str()),
                ("interval", "daily"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ValuationError::ApiError(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let chart: MarketChart = response.json().await?;
        tracing::debug!(
            coin = %self.coin,
            points = chart.prices.len(),
            "fetched CoinGecko market chart"
        );
        Ok(chart)
    }
}

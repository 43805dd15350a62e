//! Market data with graceful degradation
//!
//! Live series come from a [`MarketDataSource`] and are cached; any upstream
//! failure yields a synthetic series instead of an error.

use chrono::Utc;
use std::sync::Arc;

use super::cache::SeriesCache;
use super::candles::{self, ChartCandle, ChartSeries, HISTORY_DAYS};
use super::coingecko::{CoinGeckoClient, MarketDataSource};
use crate::config::ValuationConfig;
use crate::error::Result;
use crate::random::SharedRng;

/// Fetches, caches and synthesizes chart series
#[derive(Clone)]
pub struct MarketDataService {
    source: Arc<dyn MarketDataSource>,
    cache: SeriesCache,
    cache_key: String,
    rng: SharedRng,
}

impl MarketDataService {
    /// Service backed by the CoinGecko client
    pub fn new(config: &ValuationConfig, rng: SharedRng) -> Result<Self> {
        let client = CoinGeckoClient::new(config)?;
        Ok(Self::with_source(Arc::new(client), config, rng))
    }

    /// Service backed by an arbitrary source
    pub fn with_source(
        source: Arc<dyn MarketDataSource>,
        config: &ValuationConfig,
        rng: SharedRng,
    ) -> Self {
        Self {
            source,
            cache: SeriesCache::new(config.market_cache_ttl),
            cache_key: format!("{}/{}", config.market_coin, config.vs_currency),
            rng,
        }
    }

    /// Live series if available, otherwise a synthetic one. Never fails.
    pub async fn fetch_or_synthesize(&self) -> ChartSeries {
        if let Some(series) = self.cache.get(&self.cache_key).await {
            tracing::debug!(key = %self.cache_key, "market series cache hit");
            return series;
        }

        match self.fetch_live().await {
            Ok(series) => {
                self.cache.insert(self.cache_key.clone(), series.clone()).await;
                series
            }
            Err(e) => {
                tracing::warn!(error = %e, "market data unavailable, using synthetic series");
                let now_ms = Utc::now().timestamp_millis();
                ChartSeries::fallback(self.rng.with(|rng| candles::synthesize(rng, now_ms)))
            }
        }
    }

    async fn fetch_live(&self) -> Result<ChartSeries> {
        let chart = self.source.daily_chart(HISTORY_DAYS as u32).await?;
        let candles = self.rng.with(|rng| candles::derive_live(&chart, rng))?;
        tracing::info!(key = %self.cache_key, candles = candles.len(), "fetched live market series");
        Ok(ChartSeries::live(candles))
    }

    /// Projected candles following `history`
    pub fn predict(&self, history: &[ChartCandle]) -> Vec<ChartCandle> {
        self.rng.with(|rng| candles::predict(history, rng))
    }

    /// Drop any cached live series
    pub async fn invalidate(&self) {
        let dropped = self.cache.len().await;
        self.cache.clear().await;
        tracing::debug!(dropped, "market series cache cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValuationError;
    use crate::market::candles::{DataSource, PREDICTION_DAYS};
    use crate::market::coingecko::{MarketChart, MockMarketDataSource};

    const DAY_MS: f64 = 86_400_000.0;

    fn chart(points: usize) -> MarketChart {
        MarketChart {
            prices: (0..points)
                .map(|i| [1.7e12 + i as f64 * DAY_MS, 60_000.0 + i as f64])
                .collect(),
            total_volumes: (0..points)
                .map(|i| [1.7e12 + i as f64 * DAY_MS, 2.0e10])
                .collect(),
        }
    }

    fn service(mock: MockMarketDataSource) -> MarketDataService {
        MarketDataService::with_source(
            Arc::new(mock),
            &ValuationConfig::default(),
            SharedRng::seeded(11),
        )
    }

    #[tokio::test]
    async fn test_live_series_is_cached() {
        let mut mock = MockMarketDataSource::new();
        mock.expect_daily_chart()
            .withf(|days| *days == 30)
            .times(1)
            .returning(|_| Ok(chart(31)));
        let service = service(mock);

        let first = service.fetch_or_synthesize().await;
        assert_eq!(first.source, DataSource::Coingecko);
        assert!(first.ohlc_derived);
        assert_eq!(first.candles.len(), HISTORY_DAYS);
        assert_eq!(first.last_close(), Some(60_030.0));

        // Served from cache; the mock would panic on a second call.
        let second = service.fetch_or_synthesize().await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_upstream_error_falls_back() {
        let mut mock = MockMarketDataSource::new();
        mock.expect_daily_chart()
            .times(2)
            .returning(|_| Err(ValuationError::ApiError("HTTP error: 429".into())));
        let service = service(mock);

        let series = service.fetch_or_synthesize().await;
        assert_eq!(series.source, DataSource::Fallback);
        assert!(!series.ohlc_derived);
        assert_eq!(series.candles.len(), HISTORY_DAYS);
        assert!(series.candles.iter().all(ChartCandle::is_well_formed));

        // Fallbacks are not cached, so the next call retries upstream.
        let _ = service.fetch_or_synthesize().await;
    }

    #[tokio::test]
    async fn test_short_upstream_series_falls_back() {
        let mut mock = MockMarketDataSource::new();
        mock.expect_daily_chart().returning(|_| Ok(chart(12)));
        let series = service(mock).fetch_or_synthesize().await;
        assert_eq!(series.source, DataSource::Fallback);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let mut mock = MockMarketDataSource::new();
        mock.expect_daily_chart().times(2).returning(|_| Ok(chart(30)));
        let service = service(mock);

        service.fetch_or_synthesize().await;
        service.invalidate().await;
        service.fetch_or_synthesize().await;
    }

    #[test]
    fn test_predict_follows_history() {
        let service = service(MockMarketDataSource::new());
        let history = vec![ChartCandle::new(1_700_000_000_000, 10.0, 11.0, 9.0, 10.5, 1.0)];
        let projected = service.predict(&history);
        assert_eq!(projected.len(), PREDICTION_DAYS);
        assert!(projected.iter().all(|c| c.is_prediction == Some(true)));
        assert!(service.predict(&[]).is_empty());
    }
}

//! Configuration for the valuation services

use crate::error::{Result, ValuationError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default public CoinGecko endpoint
pub const DEFAULT_COINGECKO_BASE: &str = "https://api.coingecko.com/api/v3";

/// Configuration for the valuation services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationConfig {
    /// Lower bound of the simulated chat latency
    pub chat_delay_min: Duration,

    /// Upper bound of the simulated chat latency
    pub chat_delay_max: Duration,

    /// Whether chat replies are delayed at all
    pub simulate_latency: bool,

    /// Model name reported as the source of analysis replies
    pub analysis_model: String,

    /// CoinGecko API base URL
    pub coingecko_base_url: String,

    /// CoinGecko coin id charted by the market-data endpoint
    pub market_coin: String,

    /// Quote currency
    pub vs_currency: String,

    /// How long a live series is served from cache
    pub market_cache_ttl: Duration,

    /// Outbound request timeout
    pub request_timeout: Duration,

    /// Client-side limit for outbound market-data calls
    pub rate_limit_per_minute: u32,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            chat_delay_min: Duration::from_millis(1000),
            chat_delay_max: Duration::from_millis(3000),
            simulate_latency: true,
            analysis_model: "gpt-4o-mini".to_string(),
            coingecko_base_url: DEFAULT_COINGECKO_BASE.to_string(),
            market_coin: "bitcoin".to_string(),
            vs_currency: "usd".to_string(),
            market_cache_ttl: Duration::from_secs(300), // 5 minutes
            request_timeout: Duration::from_secs(10),
            rate_limit_per_minute: 30, // CoinGecko public tier
        }
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

impl ValuationConfig {
    /// Create a new configuration builder
    pub fn builder() -> ValuationConfigBuilder {
        ValuationConfigBuilder::default()
    }

    /// Apply `MOSAIC_*` / `COINGECKO_*` environment overrides
    pub fn with_env(mut self) -> Self {
        if let Some(ms) = env_u64("MOSAIC_CHAT_DELAY_MIN_MS") {
            self.chat_delay_min = Duration::from_millis(ms);
        }
        if let Some(ms) = env_u64("MOSAIC_CHAT_DELAY_MAX_MS") {
            self.chat_delay_max = Duration::from_millis(ms);
        }
        if let Some(enabled) = env_bool("MOSAIC_SIMULATE_LATENCY") {
            self.simulate_latency = enabled;
        }
        if let Ok(model) = std::env::var("MOSAIC_ANALYSIS_MODEL") {
            self.analysis_model = model;
        }
        if let Ok(base) = std::env::var("COINGECKO_API_BASE") {
            self.coingecko_base_url = base;
        }
        if let Ok(coin) = std::env::var("MOSAIC_MARKET_COIN") {
            self.market_coin = coin;
        }
        if let Some(secs) = env_u64("MOSAIC_MARKET_CACHE_TTL_SECS") {
            self.market_cache_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = env_u64("MOSAIC_REQUEST_TIMEOUT_SECS") {
            self.request_timeout = Duration::from_secs(secs);
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.chat_delay_min > self.chat_delay_max {
            return Err(ValuationError::ConfigError(
                "chat_delay_min must not exceed chat_delay_max".to_string(),
            ));
        }

        if self.rate_limit_per_minute == 0 {
            return Err(ValuationError::ConfigError(
                "rate_limit_per_minute must be greater than 0".to_string(),
            ));
        }

        if self.coingecko_base_url.trim().is_empty() || self.market_coin.trim().is_empty() {
            return Err(ValuationError::ConfigError(
                "market data source must name a base URL and a coin".to_string(),
            ));
        }

        Ok(())
    }

    /// Effective chat latency bounds, `None` when latency simulation is off
    pub fn chat_delay_bounds(&self) -> Option<(Duration, Duration)> {
        self.simulate_latency
            .then_some((self.chat_delay_min, self.chat_delay_max))
    }
}

/// Builder for ValuationConfig
#[derive(Debug, Default)]
pub struct ValuationConfigBuilder {
    chat_delay: Option<(Duration, Duration)>,
    simulate_latency: Option<bool>,
    analysis_model: Option<String>,
    coingecko_base_url: Option<String>,
    market_coin: Option<String>,
    vs_currency: Option<String>,
    market_cache_ttl: Option<Duration>,
    request_timeout: Option<Duration>,
    rate_limit_per_minute: Option<u32>,
    from_env: bool,
}

impl ValuationConfigBuilder {
    /// Set the simulated chat latency range
    pub fn chat_delay(mut self, min: Duration, max: Duration) -> Self {
        self.chat_delay = Some((min, max));
        self
    }

    /// Enable or disable simulated chat latency
    pub fn simulate_latency(mut self, enabled: bool) -> Self {
        self.simulate_latency = Some(enabled);
        self
    }

    /// Set the model name reported on analysis replies
    pub fn analysis_model(mut self, model: impl Into<String>) -> Self {
        self.analysis_model = Some(model.into());
        self
    }

    /// Set the CoinGecko base URL
    pub fn coingecko_base_url(mut self, url: impl Into<String>) -> Self {
        self.coingecko_base_url = Some(url.into());
        self
    }

    /// Set the charted coin id
    pub fn market_coin(mut self, coin: impl Into<String>) -> Self {
        self.market_coin = Some(coin.into());
        self
    }

    /// Set the quote currency
    pub fn vs_currency(mut self, currency: impl Into<String>) -> Self {
        self.vs_currency = Some(currency.into());
        self
    }

    /// Set the live series cache TTL
    pub fn market_cache_ttl(mut self, ttl: Duration) -> Self {
        self.market_cache_ttl = Some(ttl);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the outbound rate limit
    pub fn rate_limit_per_minute(mut self, limit: u32) -> Self {
        self.rate_limit_per_minute = Some(limit);
        self
    }

    /// Apply environment overrides before explicit builder values
    pub fn with_env(mut self) -> Self {
        self.from_env = true;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ValuationConfig> {
        let defaults = if self.from_env {
            ValuationConfig::default().with_env()
        } else {
            ValuationConfig::default()
        };
        let (chat_delay_min, chat_delay_max) = self
            .chat_delay
            .unwrap_or((defaults.chat_delay_min, defaults.chat_delay_max));

        let config = ValuationConfig {
            chat_delay_min,
            chat_delay_max,
            simulate_latency: self.simulate_latency.unwrap_or(defaults.simulate_latency),
            analysis_model: self.analysis_model.unwrap_or(defaults.analysis_model),
            coingecko_base_url: self
                .coingecko_base_url
                .unwrap_or(defaults.coingecko_base_url),
            market_coin: self.market_coin.unwrap_or(defaults.market_coin),
            vs_currency: self.vs_currency.unwrap_or(defaults.vs_currency),
            market_cache_ttl: self.market_cache_ttl.unwrap_or(defaults.market_cache_ttl),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            rate_limit_per_minute: self
                .rate_limit_per_minute
                .unwrap_or(defaults.rate_limit_per_minute),
        };

        config.validate()?;
        Ok(config)
    }
}

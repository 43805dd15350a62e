//! Shared handler state

use std::sync::Arc;

use mosaic_valuation::{
    MarketDataService, ProgressSimulator, ResponseFormatter, Result, SharedRng, ValuationConfig,
};

use crate::auth::{InMemorySessionStore, SessionStore};

/// Everything the handlers need, cheap to clone per request
#[derive(Clone)]
pub struct AppState {
    pub simulator: ProgressSimulator,
    pub formatter: ResponseFormatter,
    pub market: MarketDataService,
    pub rng: SharedRng,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    /// State seeded from entropy
    pub fn new(config: &ValuationConfig) -> Result<Self> {
        Self::with_rng(config, SharedRng::from_entropy())
    }

    /// State drawing every random decision from `rng`
    pub fn with_rng(config: &ValuationConfig, rng: SharedRng) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            simulator: ProgressSimulator::new(),
            formatter: ResponseFormatter::new(config, rng.clone()),
            market: MarketDataService::new(config, rng.clone())?,
            rng,
            sessions: Arc::new(InMemorySessionStore::default()),
        })
    }

    /// Replace the market-data service
    pub fn with_market(mut self, market: MarketDataService) -> Self {
        self.market = market;
        self
    }

    /// Replace the session store
    pub fn with_sessions(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = sessions;
        self
    }
}

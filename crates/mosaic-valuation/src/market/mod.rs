//! Daily chart series: live CoinGecko data with a synthetic fallback

pub mod cache;
pub mod candles;
pub mod coingecko;
pub mod service;

pub use cache::SeriesCache;
pub use candles::{
    ChartCandle, ChartSeries, DataSource, HISTORY_DAYS, PREDICTION_DAYS,
};
pub use coingecko::{CoinGeckoClient, MarketChart, MarketDataSource};
pub use service::MarketDataService;

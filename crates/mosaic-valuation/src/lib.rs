//! Mock crypto valuation services
//!
//! This crate holds the domain logic behind the mosaic assistant's HTTP API:
//!
//! - Simulated multi-agent analysis progress (agents plus a four-step flow)
//! - Keyword-routed chat replies wrapped in a chat-platform run envelope
//! - Daily OHLC chart series from CoinGecko with a synthetic fallback and a
//!   short projected tail
//!
//! Nothing here performs real analysis. Every random decision draws from an
//! injectable [`SharedRng`], so tests can seed it.
//!
//! # Example
//!
//! ```rust,ignore
//! use mosaic_valuation::{AnalysisKind, ProgressSimulator, SharedRng};
//!
//! let simulator = ProgressSimulator::new();
//! let rng = SharedRng::seeded(7);
//!
//! let mut snapshot = simulator.start(AnalysisKind::TechnicalAnalysis);
//! while !snapshot.is_complete() {
//!     snapshot = rng.with(|rng| simulator.advance(snapshot, rng));
//! }
//! ```

pub mod chat;
pub mod config;
pub mod error;
pub mod market;
pub mod progress;
pub mod random;

// Re-export main types for convenience
pub use chat::{ChatEnvelope, ResponseFormatter, TopicBucket};
pub use config::{ValuationConfig, ValuationConfigBuilder};
pub use error::{Result, ValuationError};
pub use market::{ChartCandle, ChartSeries, DataSource, MarketDataService};
pub use progress::{AnalysisKind, ProgressSimulator, ProgressSnapshot};
pub use random::SharedRng;

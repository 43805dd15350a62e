//! Chart candles: live derivation, fallback random walk and projection

use chrono::DateTime;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::coingecko::MarketChart;
use crate::error::{Result, ValuationError};

/// Days of history served by the market-data endpoint
pub const HISTORY_DAYS: usize = 30;
/// Days projected by [`predict`]
pub const PREDICTION_DAYS: usize = 7;
/// Starting price of the fallback random walk
pub const FALLBACK_BASE_PRICE: f64 = 43_250.0;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;
const FALLBACK_VOLATILITY: f64 = 0.03;
const PREDICTION_VOLATILITY: f64 = 0.015;
const PREDICTION_TREND_AMPLITUDE: f64 = 0.02;

/// One OHLC + volume bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartCandle {
    /// en-US date label, `M/D/YYYY`
    pub time: String,
    /// Epoch milliseconds
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_prediction: Option<bool>,
}

fn date_label(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|at| at.format("%-m/%-d/%Y").to_string())
        .unwrap_or_default()
}

impl ChartCandle {
    /// Build a candle, widening high and low so they bracket open and close
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            time: date_label(timestamp),
            timestamp,
            open,
            high: high.max(open).max(close),
            low: low.min(open).min(close),
            close,
            volume,
            is_prediction: None,
        }
    }

    fn predicted(mut self) -> Self {
        self.is_prediction = Some(true);
        self
    }

    /// `low <= min(open, close) <= max(open, close) <= high`
    pub fn is_well_formed(&self) -> bool {
        self.low <= self.open.min(self.close) && self.open.max(self.close) <= self.high
    }
}

/// Where a series came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Coingecko,
    Fallback,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Coingecko => "coingecko",
            Self::Fallback => "fallback",
        }
    }
}

/// A full history series with its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub candles: Vec<ChartCandle>,
    pub source: DataSource,
    /// Open, high and low were fabricated around true closing prices
    pub ohlc_derived: bool,
}

impl ChartSeries {
    pub fn live(candles: Vec<ChartCandle>) -> Self {
        Self {
            candles,
            source: DataSource::Coingecko,
            ohlc_derived: true,
        }
    }

    pub fn fallback(candles: Vec<ChartCandle>) -> Self {
        Self {
            candles,
            source: DataSource::Fallback,
            ohlc_derived: false,
        }
    }

    pub fn last_close(&self) -> Option<f64> {
        self.candles.last().map(|c| c.close)
    }
}

/// Turn an upstream close/volume series into candles.
///
/// Keeps the last [`HISTORY_DAYS`] points with strictly increasing timestamps
/// and fails if fewer remain. Open, high and low are random perturbations of
/// the true close: open within ±2%, high up to +2%, low 2–4% below.
pub fn derive_live<R: Rng + ?Sized>(chart: &MarketChart, rng: &mut R) -> Result<Vec<ChartCandle>> {
    let mut points: Vec<(i64, f64, f64)> = chart
        .prices
        .iter()
        .enumerate()
        .filter(|(_, [ts, price])| ts.is_finite() && price.is_finite() && *price > 0.0)
        .map(|(index, [ts, price])| {
            let volume = chart
                .total_volumes
                .get(index)
                .map(|[_, v]| *v)
                .filter(|v| v.is_finite())
                .unwrap_or(0.0);
            (*ts as i64, *price, volume)
        })
        .collect();

    points.sort_by_key(|(ts, _, _)| *ts);
    points.dedup_by_key(|(ts, _, _)| *ts);

    if points.len() < HISTORY_DAYS {
        return Err(ValuationError::InsufficientData {
            expected: HISTORY_DAYS,
            actual: points.len(),
        });
    }

    let recent = &points[points.len() - HISTORY_DAYS..];
    Ok(recent
        .iter()
        .map(|&(ts, close, volume)| {
            let open = close * (0.98 + rng.gen_range(0.0..1.0) * 0.04);
            let high = close * (1.0 + rng.gen_range(0.0..1.0) * 0.02);
            let low = close * (0.98 - rng.gen_range(0.0..1.0) * 0.02);
            ChartCandle::new(ts, open, high, low, close, volume)
        })
        .collect())
}

/// Random walk of [`HISTORY_DAYS`] daily candles ending the day before `now_ms`
pub fn synthesize<R: Rng + ?Sized>(rng: &mut R, now_ms: i64) -> Vec<ChartCandle> {
    let mut price = FALLBACK_BASE_PRICE;

    (0..HISTORY_DAYS)
        .map(|day| {
            let timestamp = now_ms - (HISTORY_DAYS - day) as i64 * DAY_MS;
            let open = price;
            let high = open * (1.0 + rng.gen_range(0.0..1.0) * FALLBACK_VOLATILITY);
            let low = open * (1.0 - rng.gen_range(0.0..1.0) * FALLBACK_VOLATILITY);
            let close = open * (1.0 + (rng.gen_range(0.0..1.0) - 0.5) * FALLBACK_VOLATILITY);
            let volume = rng.gen_range(0..1_000_000_u32) as f64 + 500_000.0;

            price = close;
            ChartCandle::new(timestamp, open, high, low, close, volume)
        })
        .collect()
}

/// Project [`PREDICTION_DAYS`] candles past the end of `history`.
///
/// A fixed sinusoidal trend plus bounded noise around the last close. Returns
/// an empty projection for an empty history.
pub fn predict<R: Rng + ?Sized>(history: &[ChartCandle], rng: &mut R) -> Vec<ChartCandle> {
    let Some(last) = history.last() else {
        return Vec::new();
    };
    let last_price = last.close;

    (1..=PREDICTION_DAYS)
        .map(|day| {
            let trend = (day as f64 * 0.5).sin() * PREDICTION_TREND_AMPLITUDE;
            let noise = (rng.gen_range(0.0..1.0) - 0.5) * PREDICTION_VOLATILITY;
            let close = last_price * (1.0 + trend + noise);
            let volume = rng.gen_range(0..800_000_u32) as f64 + 400_000.0;

            ChartCandle::new(
                last.timestamp + day as i64 * DAY_MS,
                last_price,
                close * 1.02,
                close * 0.98,
                close,
                volume,
            )
            .predicted()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const NOW: i64 = 1_760_000_000_000;

    fn assert_series_shape(candles: &[ChartCandle]) {
        assert!(candles.iter().all(ChartCandle::is_well_formed));
        assert!(candles.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    fn upstream(points: usize) -> MarketChart {
        let start = NOW - points as i64 * DAY_MS;
        MarketChart {
            prices: (0..points)
                .map(|i| [(start + i as i64 * DAY_MS) as f64, 40_000.0 + i as f64 * 10.0])
                .collect(),
            total_volumes: (0..points)
                .map(|i| [(start + i as i64 * DAY_MS) as f64, 1.5e10])
                .collect(),
        }
    }

    #[test]
    fn test_candle_widens_range() {
        let candle = ChartCandle::new(NOW, 105.0, 101.0, 99.0, 98.0, 1.0);
        assert_eq!(candle.high, 105.0);
        assert_eq!(candle.low, 98.0);
        assert!(candle.is_well_formed());
    }

    #[test]
    fn test_date_label() {
        // 2025-10-09T08:53:20Z
        assert_eq!(date_label(NOW), "10/9/2025");
    }

    #[test]
    fn test_synthesize_shape() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let candles = synthesize(&mut rng, NOW);
            assert_eq!(candles.len(), HISTORY_DAYS);
            assert_series_shape(&candles);
            assert_eq!(candles[0].open, FALLBACK_BASE_PRICE);
            assert_eq!(candles.last().unwrap().timestamp, NOW - DAY_MS);
            assert!(candles.windows(2).all(|w| w[1].open == w[0].close));
            assert!(candles
                .iter()
                .all(|c| (500_000.0..1_500_000.0).contains(&c.volume)));
        }
    }

    #[test]
    fn test_derive_live_keeps_last_thirty() {
        let mut rng = StdRng::seed_from_u64(2);
        let chart = upstream(31);
        let candles = derive_live(&chart, &mut rng).unwrap();

        assert_eq!(candles.len(), HISTORY_DAYS);
        assert_series_shape(&candles);
        assert_eq!(candles.last().unwrap().close, 40_300.0);
        assert_eq!(candles[0].close, 40_010.0);
        assert_eq!(candles[0].volume, 1.5e10);
        for candle in &candles {
            assert!(candle.open >= candle.close * 0.98 && candle.open <= candle.close * 1.02);
        }
    }

    #[test]
    fn test_derive_live_sorts_and_dedups() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut chart = upstream(32);
        chart.prices.reverse();
        chart.total_volumes.reverse();
        let duplicate = chart.prices[0];
        chart.prices.push(duplicate);

        let candles = derive_live(&chart, &mut rng).unwrap();
        assert_eq!(candles.len(), HISTORY_DAYS);
        assert_series_shape(&candles);
    }

    #[test]
    fn test_derive_live_rejects_short_series() {
        let mut rng = StdRng::seed_from_u64(4);
        let result = derive_live(&upstream(10), &mut rng);
        assert!(matches!(
            result,
            Err(ValuationError::InsufficientData { expected: 30, actual: 10 })
        ));
    }

    #[test]
    fn test_missing_volume_defaults_to_zero() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut chart = upstream(30);
        chart.total_volumes.truncate(5);
        let candles = derive_live(&chart, &mut rng).unwrap();
        assert_eq!(candles.last().unwrap().volume, 0.0);
    }

    #[test]
    fn test_predict_shape() {
        let mut rng = StdRng::seed_from_u64(6);
        let history = synthesize(&mut rng, NOW);
        let last = history.last().unwrap().clone();

        for _ in 0..20 {
            let predictions = predict(&history, &mut rng);
            assert_eq!(predictions.len(), PREDICTION_DAYS);
            assert!(predictions.iter().all(|c| c.is_prediction == Some(true)));
            assert!(predictions.iter().all(|c| c.open == last.close));
            assert_series_shape(&predictions);
            assert!(predictions[0].timestamp > last.timestamp);
            for candle in &predictions {
                let ratio = candle.close / last.close;
                assert!((0.97..=1.03).contains(&ratio));
            }
        }
    }

    #[test]
    fn test_predict_empty_history() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(predict(&[], &mut rng).is_empty());
    }

    #[test]
    fn test_prediction_flag_serialization() {
        let mut rng = StdRng::seed_from_u64(8);
        let history = synthesize(&mut rng, NOW);
        let historic = serde_json::to_value(&history[0]).unwrap();
        assert!(historic.get("isPrediction").is_none());

        let predicted = serde_json::to_value(&predict(&history, &mut rng)[0]).unwrap();
        assert_eq!(predicted["isPrediction"], true);
        assert!(predicted.get("timestamp").is_some());
    }
}

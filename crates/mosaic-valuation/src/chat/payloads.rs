//! Canned analysis payloads per topic bucket

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::router::TopicBucket;

/// A single indicator, model or risk reading
///
/// Integral readings serialize without a decimal point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Int(i64),
    Float(f64),
    Text(&'static str),
}

/// Recommended position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Recommendation {
    pub action: Action,
    pub target_price: i64,
    pub stop_loss: i64,
    pub confidence: u8,
}

type Readings = &'static [(&'static str, MetricValue)];

/// Serialize readings as a JSON object, keeping declaration order
fn ordered_map<S: Serializer>(pairs: &Readings, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(pairs.len()))?;
    for (key, value) in *pairs {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

/// Static analysis attached to a non-general reply
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisPayload {
    pub confidence: u8,
    pub sources: &'static [&'static str],
    #[serde(serialize_with = "ordered_map")]
    pub technical_indicators: Readings,
    #[serde(serialize_with = "ordered_map")]
    pub valuation_models: Readings,
    #[serde(serialize_with = "ordered_map")]
    pub risk_metrics: Readings,
    pub recommendation: Recommendation,
}

/// Narrative plus payload for one bucket
#[derive(Debug, Clone, PartialEq)]
pub struct CannedAnalysis {
    pub narrative: &'static str,
    pub payload: AnalysisPayload,
}

use MetricValue::{Float, Int, Text};

const BITCOIN: CannedAnalysis = CannedAnalysis {
    narrative: "Based on my comprehensive analysis using multiple valuation models and current market data, Bitcoin appears to be fairly valued at current levels with a target range of $38K-$52K. The technical indicators suggest continued bullish momentum, while on-chain metrics show healthy network activity.",
    payload: AnalysisPayload {
        confidence: 78,
        sources: &["CoinGecko API", "DeFiPulse", "On-chain Analytics", "TradingView"],
        technical_indicators: &[
            ("RSI", Float(65.2)),
            ("MACD", Text("Bullish")),
            ("Support Level", Text("$42,000")),
            ("Resistance Level", Text("$46,000")),
            ("Volume Trend", Text("Increasing")),
        ],
        valuation_models: &[
            ("Stock-to-Flow", Int(52_400)),
            ("NVT Ratio", Int(48_200)),
            ("Metcalfe's Law", Int(45_800)),
            ("Rainbow Chart", Int(44_500)),
        ],
        risk_metrics: &[
            ("Volatility", Text("Medium (65%)")),
            ("Liquidity", Text("Low Risk (85%)")),
            ("Regulatory", Text("Medium (55%)")),
            ("Market Sentiment", Text("Bullish (72%)")),
        ],
        recommendation: Recommendation {
            action: Action::Buy,
            target_price: 52_000,
            stop_loss: 40_000,
            confidence: 78,
        },
    },
};

const ETHEREUM: CannedAnalysis = CannedAnalysis {
    narrative: "Ethereum shows strong fundamentals with the transition to Proof of Stake and growing DeFi ecosystem. Current price levels suggest potential upside with key resistance at $2,800. The merge has reduced energy consumption by 99.95% and created deflationary pressure.",
    payload: AnalysisPayload {
        confidence: 82,
        sources: &["Etherscan", "DeFiPulse", "Ethereum Foundation", "L2Beat"],
        technical_indicators: &[
            ("RSI", Float(58.7)),
            ("MACD", Text("Neutral")),
            ("Support Level", Text("$2,200")),
            ("Resistance Level", Text("$2,800")),
            ("Staking APR", Text("4.2%")),
        ],
        valuation_models: &[
            ("P/E Ratio", Int(2_650)),
            ("NVT Ratio", Int(2_580)),
            ("TVL Model", Int(2_720)),
            ("Burn Rate Model", Int(2_890)),
        ],
        risk_metrics: &[
            ("Volatility", Text("High (78%)")),
            ("Liquidity", Text("Low Risk (88%)")),
            ("Regulatory", Text("Low Risk (25%)")),
            ("Smart Contract Risk", Text("Medium (45%)")),
        ],
        recommendation: Recommendation {
            action: Action::Buy,
            target_price: 2_800,
            stop_loss: 2_100,
            confidence: 82,
        },
    },
};

const MARKET: CannedAnalysis = CannedAnalysis {
    narrative: "The overall crypto market is showing signs of consolidation with increasing institutional adoption. Key metrics suggest we're in a healthy accumulation phase with strong on-chain fundamentals supporting higher prices in the medium term.",
    payload: AnalysisPayload {
        confidence: 74,
        sources: &["CoinMarketCap", "CoinGecko", "Glassnode", "IntoTheBlock"],
        technical_indicators: &[
            ("Fear & Greed Index", Int(67)),
            ("Market Cap", Text("$1.2T")),
            ("Dominance BTC", Text("42.5%")),
            ("Dominance ETH", Text("18.3%")),
            ("Active Addresses", Text("950K")),
        ],
        valuation_models: &[
            ("Total Market Cap", Int(1_200_000_000_000)),
            ("Realized Cap", Int(950_000_000_000)),
            ("MVRV Ratio", Float(1.26)),
            ("NVT Ratio", Float(45.2)),
        ],
        risk_metrics: &[
            ("Volatility", Text("Medium (62%)")),
            ("Liquidity", Text("Medium Risk (58%)")),
            ("Regulatory", Text("Medium (52%)")),
            ("Institutional Flow", Text("Positive (78%)")),
        ],
        recommendation: Recommendation {
            action: Action::Hold,
            target_price: 45_000,
            stop_loss: 38_000,
            confidence: 74,
        },
    },
};

/// Acknowledgements used for the general bucket
pub const GENERAL_RESPONSES: [&str; 3] = [
    "I can help you analyze various cryptocurrencies and market conditions. Try asking about Bitcoin, Ethereum, or general market trends for detailed analysis.",
    "For comprehensive crypto analysis, please specify which cryptocurrency or market aspect you'd like me to examine. I can provide technical analysis, valuation models, and risk assessments.",
    "I specialize in cryptocurrency valuation and market analysis. What specific crypto asset or market trend would you like me to analyze?",
];

/// Canned analysis for a bucket, `None` for general
pub fn analysis_for(bucket: TopicBucket) -> Option<&'static CannedAnalysis> {
    match bucket {
        TopicBucket::Bitcoin => Some(&BITCOIN),
        TopicBucket::Ethereum => Some(&ETHEREUM),
        TopicBucket::Market => Some(&MARKET),
        TopicBucket::General => None,
    }
}

impl CannedAnalysis {
    /// Narrative followed by the payload as a fenced JSON block
    pub fn render(&self) -> serde_json::Result<String> {
        let payload = serde_json::to_string_pretty(&self.payload)?;
        Ok(format!("{}\n\n```json\n{}\n```", self.narrative, payload))
    }
}

//! Static agent and flow configurations

use serde::{Deserialize, Serialize};

use super::simulator::{Agent, FlowStep, StepData, StepStatus};

/// Analysis configuration selectable through `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    #[default]
    MarketAnalysis,
    TechnicalAnalysis,
    FundamentalAnalysis,
}

impl AnalysisKind {
    /// Every selectable kind, in display order
    pub const ALL: [Self; 3] = [
        Self::MarketAnalysis,
        Self::TechnicalAnalysis,
        Self::FundamentalAnalysis,
    ];

    /// Wire name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MarketAnalysis => "market_analysis",
            Self::TechnicalAnalysis => "technical_analysis",
            Self::FundamentalAnalysis => "fundamental_analysis",
        }
    }

    /// Resolve a requested type, falling back to the default for unknown or
    /// missing names
    pub fn resolve(requested: Option<&str>) -> Self {
        requested
            .and_then(|name| Self::ALL.into_iter().find(|kind| kind.as_str() == name))
            .unwrap_or_default()
    }

    fn roster(&self) -> [(&'static str, &'static str); 3] {
        match self {
            Self::MarketAnalysis => [
                ("Market Analyst", "Analyzing price trends..."),
                ("Data Researcher", "Gathering market data..."),
                ("Valuation Expert", "Computing valuations..."),
            ],
            Self::TechnicalAnalysis => [
                ("Technical Analyst", "Analyzing chart patterns..."),
                ("Momentum Trader", "Checking momentum indicators..."),
                ("Risk Manager", "Assessing risk metrics..."),
            ],
            Self::FundamentalAnalysis => [
                ("Fundamental Analyst", "Evaluating network metrics..."),
                ("On-chain Analyst", "Analyzing blockchain data..."),
                ("Macro Economist", "Assessing macro factors..."),
            ],
        }
    }

    /// Fresh agents for this kind, all at zero progress
    pub fn agents(&self) -> Vec<Agent> {
        self.roster()
            .into_iter()
            .zip(1..)
            .map(|((name, status), id)| Agent {
                id,
                name: name.to_string(),
                status: status.to_string(),
                progress: 0.0,
            })
            .collect()
    }
}

fn strings(items: &[&str]) -> Option<Vec<String>> {
    Some(items.iter().map(|s| (*s).to_string()).collect())
}

fn step(id: u32, title: &str, agent: &str, data: StepData) -> FlowStep {
    FlowStep {
        id,
        title: title.to_string(),
        status: StepStatus::Pending,
        agent: agent.to_string(),
        data,
    }
}

/// Number of stages in every flow
pub const FLOW_STEP_COUNT: usize = 4;

/// The four-stage valuation pipeline, every stage pending at zero completion
pub fn flow_steps() -> Vec<FlowStep> {
    vec![
        step(
            1,
            "Data Collection",
            "Data Researcher",
            StepData {
                sources: strings(&["CoinGecko API", "DeFiPulse", "On-chain Analytics", "TradingView"]),
                metrics: strings(&[
                    "Price: $43,250",
                    "Volume: $18.2B",
                    "Market Cap: $850B",
                    "24h Change: +2.4%",
                ]),
                ..StepData::default()
            },
        ),
        step(
            2,
            "Technical Analysis",
            "Market Analyst",
            StepData {
                indicators: strings(&["RSI: 65.2", "MACD: Bullish", "Support: $42K", "Resistance: $46K"]),
                patterns: strings(&["Ascending Triangle", "Volume Confirmation", "Bullish Divergence"]),
                ..StepData::default()
            },
        ),
        step(
            3,
            "Fundamental Analysis",
            "Valuation Expert",
            StepData {
                metrics: strings(&[
                    "NVT Ratio: 45.2",
                    "MVRV: 2.1",
                    "Active Addresses: 1.2M",
                    "Hash Rate: 450 EH/s",
                ]),
                models: strings(&["Stock-to-Flow", "Metcalfe's Law", "NVT Model", "Rainbow Chart"]),
                ..StepData::default()
            },
        ),
        step(
            4,
            "Final Valuation",
            "Valuation Expert",
            StepData {
                range: strings(&["Conservative: $38K", "Base: $45K", "Optimistic: $52K"]),
                confidence: Some("78%".to_string()),
                ..StepData::default()
            },
        ),
    ]
}

//! Topic routing for free-text queries
//!
//! Rule-based keyword matching: the first matching rule wins, so a message
//! naming both Ethereum and Bitcoin is routed to Bitcoin.

use serde::{Deserialize, Serialize};

/// Classification outcome of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicBucket {
    Bitcoin,
    Ethereum,
    Market,
    General,
}

impl TopicBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bitcoin => "bitcoin",
            Self::Ethereum => "ethereum",
            Self::Market => "market",
            Self::General => "general",
        }
    }

    /// Whether this bucket carries an analysis payload
    pub fn has_analysis(&self) -> bool {
        !matches!(self, Self::General)
    }
}

/// Keyword rules, checked in order
const RULES: &[(TopicBucket, &[&str])] = &[
    (TopicBucket::Bitcoin, &["bitcoin", "btc"]),
    (TopicBucket::Ethereum, &["ethereum", "eth"]),
    (TopicBucket::Market, &["market", "crypto"]),
];

/// Classify a message into a topic bucket
pub fn classify(message: &str) -> TopicBucket {
    let lowered = message.to_lowercase();

    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lowered.contains(kw)))
        .map_or(TopicBucket::General, |(bucket, _)| *bucket)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitcoin_queries() {
        assert_eq!(classify("What about BTC today?"), TopicBucket::Bitcoin);
        assert_eq!(classify("Bitcoin outlook"), TopicBucket::Bitcoin);
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(classify("ETH vs BTC"), TopicBucket::Bitcoin);
        assert_eq!(classify("crypto market and bitcoin"), TopicBucket::Bitcoin);
        assert_eq!(classify("ethereum in this market"), TopicBucket::Ethereum);
    }

    #[test]
    fn test_market_and_general() {
        assert_eq!(classify("general market vibes"), TopicBucket::Market);
        assert_eq!(classify("Is CRYPTO dead?"), TopicBucket::Market);
        assert_eq!(classify("hello"), TopicBucket::General);
        assert_eq!(classify(""), TopicBucket::General);
    }

    #[test]
    fn test_substring_matching() {
        // "eth" is a plain substring rule, as in "whether"
        assert_eq!(classify("whether to buy"), TopicBucket::Ethereum);
    }

    #[test]
    fn test_has_analysis() {
        assert!(TopicBucket::Market.has_analysis());
        assert!(!TopicBucket::General.has_analysis());
    }
}

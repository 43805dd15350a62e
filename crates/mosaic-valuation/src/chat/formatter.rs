//! Chat reply composition

use chrono::{DateTime, Utc};
use rand::Rng;
use std::time::Duration;

use super::envelope::{ChatEnvelope, MessageSource, ReplyParts};
use super::ids::mint_id;
use super::payloads::{GENERAL_RESPONSES, analysis_for};
use super::router::classify;
use crate::config::ValuationConfig;
use crate::error::Result;
use crate::random::SharedRng;

/// Builds chat envelopes from free-text queries
#[derive(Debug, Clone)]
pub struct ResponseFormatter {
    analysis_model: String,
    delay: Option<(Duration, Duration)>,
    rng: SharedRng,
}

impl ResponseFormatter {
    pub fn new(config: &ValuationConfig, rng: SharedRng) -> Self {
        Self {
            analysis_model: config.analysis_model.clone(),
            delay: config.chat_delay_bounds(),
            rng,
        }
    }

    /// Disable the simulated inference latency
    pub fn without_latency(mut self) -> Self {
        self.delay = None;
        self
    }

    /// Sample the simulated latency for one reply
    pub fn sample_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Duration> {
        let (min, max) = self.delay?;
        if min >= max {
            return Some(min);
        }
        let millis = rng.gen_range(min.as_millis() as u64..=max.as_millis() as u64);
        Some(Duration::from_millis(millis))
    }

    /// Build the reply envelope for `message` without any delay
    pub fn compose<R: Rng + ?Sized>(
        &self,
        message: &str,
        session_id: Option<&str>,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<ChatEnvelope> {
        let bucket = classify(message);

        // Blank ids are replaced; anything else is echoed verbatim.
        let session_id = match session_id {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => mint_id(rng),
        };

        let (text, source) = match analysis_for(bucket) {
            Some(analysis) => (
                analysis.render()?,
                MessageSource::model(self.analysis_model.as_str()),
            ),
            None => {
                let pick = rng.gen_range(0..GENERAL_RESPONSES.len());
                (
                    GENERAL_RESPONSES[pick].to_string(),
                    MessageSource::custom_component(),
                )
            }
        };

        tracing::info!(
            bucket = bucket.as_str(),
            session_id = %session_id,
            "composed chat reply"
        );

        Ok(ChatEnvelope::reply(ReplyParts {
            session_id,
            input: message.to_string(),
            text,
            message_id: mint_id(rng),
            source,
            created_at: now,
        }))
    }

    /// Classify, wait out the simulated latency and build the reply.
    ///
    /// Timestamps are captured after the delay, when the reply is built.
    pub async fn respond(&self, message: &str, session_id: Option<&str>) -> Result<ChatEnvelope> {
        if let Some(delay) = self.rng.with(|rng| self.sample_delay(rng)) {
            tracing::debug!(delay_ms = delay.as_millis() as u64, "simulating inference latency");
            tokio::time::sleep(delay).await;
        }

        self.rng
            .with(|rng| self.compose(message, session_id, rng, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ids::is_v4_shape;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn formatter() -> ResponseFormatter {
        ResponseFormatter::new(&ValuationConfig::default(), SharedRng::seeded(17))
    }

    #[test]
    fn test_session_id_is_echoed() {
        let mut rng = StdRng::seed_from_u64(1);
        let envelope = formatter()
            .compose("bitcoin?", Some("abc"), &mut rng, Utc::now())
            .unwrap();
        assert_eq!(envelope.session_id, "abc");
        assert_eq!(envelope.message().unwrap().session_id, "abc");
    }

    #[test]
    fn test_session_id_is_echoed_verbatim() {
        let mut rng = StdRng::seed_from_u64(8);
        let envelope = formatter()
            .compose("hello", Some(" abc "), &mut rng, Utc::now())
            .unwrap();
        assert_eq!(envelope.session_id, " abc ");
        assert_eq!(envelope.message().unwrap().session_id, " abc ");
    }

    #[test]
    fn test_session_id_is_minted() {
        let mut rng = StdRng::seed_from_u64(2);
        let f = formatter();
        for session in [None, Some(""), Some("   ")] {
            let envelope = f.compose("hello", session, &mut rng, Utc::now()).unwrap();
            assert!(is_v4_shape(&envelope.session_id), "{}", envelope.session_id);
        }
    }

    #[test]
    fn test_message_ids_are_fresh() {
        let mut rng = StdRng::seed_from_u64(3);
        let f = formatter();
        let a = f.compose("hello", Some("s"), &mut rng, Utc::now()).unwrap();
        let b = f.compose("hello", Some("s"), &mut rng, Utc::now()).unwrap();
        let id_a = &a.message().unwrap().data.id;
        let id_b = &b.message().unwrap().data.id;
        assert!(is_v4_shape(id_a));
        assert_ne!(id_a, id_b);
    }

    #[test]
    fn test_general_reply_is_plain_text() {
        let mut rng = StdRng::seed_from_u64(4);
        let envelope = formatter()
            .compose("hello", None, &mut rng, Utc::now())
            .unwrap();
        let message = envelope.message().unwrap();

        assert!(GENERAL_RESPONSES.contains(&message.text.as_str()));
        assert!(!message.text.contains("```"));
        assert_eq!(message.properties.source, MessageSource::custom_component());
        assert_eq!(envelope.outputs[0].inputs.input_value, "hello");
    }

    #[test]
    fn test_general_replies_vary() {
        let mut rng = StdRng::seed_from_u64(5);
        let f = formatter();
        let texts: std::collections::HashSet<String> = (0..50)
            .map(|_| {
                f.compose("hi", Some("s"), &mut rng, Utc::now())
                    .unwrap()
                    .text()
                    .unwrap()
                    .to_string()
            })
            .collect();
        assert_eq!(texts.len(), GENERAL_RESPONSES.len());
    }

    #[test]
    fn test_analysis_reply_embeds_payload() {
        let mut rng = StdRng::seed_from_u64(6);
        let envelope = formatter()
            .compose("What about BTC today?", None, &mut rng, Utc::now())
            .unwrap();
        let message = envelope.message().unwrap();

        assert!(message.text.starts_with("Based on my comprehensive analysis"));
        assert!(message.text.contains("```json\n"));
        assert!(message.text.contains("\"action\": \"BUY\""));
        assert_eq!(message.properties.source.display_name, "OpenAI");
        assert_eq!(message.properties.source.source.as_deref(), Some("gpt-4o-mini"));
    }

    #[test]
    fn test_sample_delay_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let f = formatter();
        for _ in 0..100 {
            let delay = f.sample_delay(&mut rng).unwrap();
            assert!(delay >= Duration::from_millis(1000));
            assert!(delay <= Duration::from_millis(3000));
        }
        assert_eq!(f.without_latency().sample_delay(&mut rng), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_respond_waits_for_latency() {
        let f = formatter();
        let started = tokio::time::Instant::now();
        let envelope = f.respond("ethereum outlook", Some("sess")).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(1000));
        assert_eq!(envelope.session_id, "sess");
        assert!(envelope.text().unwrap().starts_with("Ethereum shows strong fundamentals"));
    }

    #[tokio::test]
    async fn test_respond_without_latency() {
        let envelope = tokio_test::assert_ok!(formatter().without_latency().respond("crypto", None).await);
        assert!(is_v4_shape(&envelope.session_id));
    }
}

//! Chat reply formatting
//!
//! Classifies a query into a [`TopicBucket`], picks the canned analysis for it
//! and wraps the reply in the chat platform's [`ChatEnvelope`].

pub mod envelope;
pub mod formatter;
pub mod ids;
pub mod payloads;
pub mod router;

pub use envelope::{ChatEnvelope, MessageSource};
pub use formatter::ResponseFormatter;
pub use ids::{is_v4_shape, mint_id};
pub use payloads::{Action, AnalysisPayload, analysis_for};
pub use router::{TopicBucket, classify};

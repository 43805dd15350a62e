//! Chat-platform reply envelope
//!
//! Mirrors the nested run response of the chat platform the front end talks
//! to. Field names and order are part of that contract.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Flow that every reply claims to originate from
pub const FLOW_ID: &str = "5f2e9c1a-8d4b-4e7a-9c3f-2b1d0e6a7f48";
/// Chat output component id
pub const COMPONENT_ID: &str = "ChatOutput-mM8Fq";
const COMPONENT_DISPLAY_NAME: &str = "Chat Output";
const SENDER: &str = "Machine";
const SENDER_NAME: &str = "AI";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEnvelope {
    pub session_id: String,
    pub outputs: Vec<RunOutput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    pub inputs: RunInputs,
    pub outputs: Vec<ComponentOutput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunInputs {
    pub input_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentOutput {
    pub results: ComponentResults,
    pub artifacts: Artifacts,
    pub outputs: ComponentOutputs,
    pub logs: ComponentLogs,
    pub messages: Vec<StreamedMessage>,
    pub timedelta: Option<f64>,
    pub duration: Option<String>,
    pub component_display_name: String,
    pub component_id: String,
    pub used_frozen_result: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentResults {
    pub message: ChatMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifacts {
    pub message: String,
    pub sender: String,
    pub sender_name: String,
    pub files: Vec<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentOutputs {
    pub message: OutputValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputValue {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentLogs {
    pub message: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamedMessage {
    pub message: String,
    pub sender: String,
    pub sender_name: String,
    pub session_id: String,
    pub stream_url: Option<String>,
    pub component_id: String,
    pub files: Vec<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub text_key: String,
    pub data: MessageData,
    pub default_value: String,
    pub text: String,
    pub sender: String,
    pub sender_name: String,
    pub files: Vec<String>,
    pub session_id: String,
    /// Human readable, `YYYY-MM-DD HH:MM:SS UTC`
    pub timestamp: String,
    pub flow_id: String,
    pub error: bool,
    pub edit: bool,
    pub properties: MessageProperties,
    pub category: String,
    pub content_blocks: Vec<serde_json::Value>,
    pub duration: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageData {
    /// ISO-8601
    pub timestamp: String,
    pub sender: String,
    pub sender_name: String,
    pub session_id: String,
    pub text: String,
    pub files: Vec<String>,
    pub error: bool,
    pub edit: bool,
    pub properties: MessageProperties,
    pub category: String,
    pub content_blocks: Vec<serde_json::Value>,
    pub id: String,
    pub flow_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageProperties {
    pub text_color: String,
    pub background_color: String,
    pub edited: bool,
    pub source: MessageSource,
    pub icon: String,
    pub allow_markdown: bool,
    pub positive_feedback: Option<bool>,
    pub state: String,
    pub targets: Vec<serde_json::Value>,
}

/// Where a reply claims to come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSource {
    pub id: Option<String>,
    pub display_name: String,
    pub source: Option<String>,
}

impl MessageSource {
    /// Source tag of plain acknowledgement replies
    pub fn custom_component() -> Self {
        Self {
            id: None,
            display_name: "Custom Component".to_string(),
            source: None,
        }
    }

    /// Source tag of analysis replies produced by a named model
    pub fn model(model: impl Into<String>) -> Self {
        Self {
            id: Some("OpenAIModel-q7Lx2".to_string()),
            display_name: "OpenAI".to_string(),
            source: Some(model.into()),
        }
    }
}

/// Everything that varies between replies
#[derive(Debug, Clone)]
pub struct ReplyParts {
    pub session_id: String,
    pub input: String,
    pub text: String,
    pub message_id: String,
    pub source: MessageSource,
    pub created_at: DateTime<Utc>,
}

fn human_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

impl ChatEnvelope {
    /// Wrap a single machine reply
    pub fn reply(parts: ReplyParts) -> Self {
        let ReplyParts {
            session_id,
            input,
            text,
            message_id,
            source,
            created_at,
        } = parts;

        let properties = MessageProperties {
            text_color: String::new(),
            background_color: String::new(),
            edited: false,
            source,
            icon: String::new(),
            allow_markdown: false,
            positive_feedback: None,
            state: "complete".to_string(),
            targets: Vec::new(),
        };

        let data = MessageData {
            timestamp: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            sender: SENDER.to_string(),
            sender_name: SENDER_NAME.to_string(),
            session_id: session_id.clone(),
            text: text.clone(),
            files: Vec::new(),
            error: false,
            edit: false,
            properties: properties.clone(),
            category: "message".to_string(),
            content_blocks: Vec::new(),
            id: message_id,
            flow_id: FLOW_ID.to_string(),
        };

        let message = ChatMessage {
            text_key: "text".to_string(),
            data,
            default_value: String::new(),
            text: text.clone(),
            sender: SENDER.to_string(),
            sender_name: SENDER_NAME.to_string(),
            files: Vec::new(),
            session_id: session_id.clone(),
            timestamp: human_timestamp(&created_at),
            flow_id: FLOW_ID.to_string(),
            error: false,
            edit: false,
            properties,
            category: "message".to_string(),
            content_blocks: Vec::new(),
            duration: None,
        };

        let component = ComponentOutput {
            results: ComponentResults { message },
            artifacts: Artifacts {
                message: text.clone(),
                sender: SENDER.to_string(),
                sender_name: SENDER_NAME.to_string(),
                files: Vec::new(),
                kind: "object".to_string(),
            },
            outputs: ComponentOutputs {
                message: OutputValue {
                    message: text.clone(),
                    kind: "text".to_string(),
                },
            },
            logs: ComponentLogs {
                message: Vec::new(),
            },
            messages: vec![StreamedMessage {
                message: text,
                sender: SENDER.to_string(),
                sender_name: SENDER_NAME.to_string(),
                session_id: session_id.clone(),
                stream_url: None,
                component_id: COMPONENT_ID.to_string(),
                files: Vec::new(),
                kind: "message".to_string(),
            }],
            timedelta: None,
            duration: None,
            component_display_name: COMPONENT_DISPLAY_NAME.to_string(),
            component_id: COMPONENT_ID.to_string(),
            used_frozen_result: false,
        };

        Self {
            session_id,
            outputs: vec![RunOutput {
                inputs: RunInputs { input_value: input },
                outputs: vec![component],
            }],
        }
    }

    /// The reply message, if the envelope carries one
    pub fn message(&self) -> Option<&ChatMessage> {
        self.outputs
            .first()
            .and_then(|run| run.outputs.first())
            .map(|component| &component.results.message)
    }

    /// Reply text, if any
    pub fn text(&self) -> Option<&str> {
        self.message().map(|m| m.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> ChatEnvelope {
        ChatEnvelope::reply(ReplyParts {
            session_id: "abc".to_string(),
            input: "hello".to_string(),
            text: "hi there".to_string(),
            message_id: "123e4567-e89b-42d3-a456-426614174000".to_string(),
            source: MessageSource::custom_component(),
            created_at: Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap(),
        })
    }

    #[test]
    fn test_envelope_paths() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["session_id"], "abc");
        assert_eq!(value["outputs"][0]["inputs"]["input_value"], "hello");

        let component = &value["outputs"][0]["outputs"][0];
        assert_eq!(component["component_id"], COMPONENT_ID);
        assert_eq!(component["artifacts"]["type"], "object");
        assert_eq!(component["outputs"]["message"]["type"], "text");
        assert!(component["timedelta"].is_null());

        let message = &component["results"]["message"];
        assert_eq!(message["text"], "hi there");
        assert_eq!(message["sender"], "Machine");
        assert_eq!(message["sender_name"], "AI");
        assert_eq!(
            message["properties"]["source"]["display_name"],
            "Custom Component"
        );
        assert!(message["properties"]["source"]["id"].is_null());
    }

    #[test]
    fn test_timestamps() {
        let envelope = sample();
        let message = envelope.message().unwrap();
        assert_eq!(message.timestamp, "2025-03-04 05:06:07 UTC");
        assert_eq!(message.data.timestamp, "2025-03-04T05:06:07.000Z");
    }

    #[test]
    fn test_field_order_matches_contract() {
        let json = serde_json::to_string(&sample()).unwrap();
        let session = json.find("\"session_id\"").unwrap();
        let outputs = json.find("\"outputs\"").unwrap();
        let inputs = json.find("\"inputs\"").unwrap();
        assert!(session < outputs && outputs < inputs);
    }

    #[test]
    fn test_roundtrip_for_clients() {
        let envelope = sample();
        let json = serde_json::to_string(&envelope).unwrap();
        let decoded: ChatEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.text(), Some("hi there"));
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn test_model_source() {
        let source = MessageSource::model("gpt-4o-mini");
        assert_eq!(source.display_name, "OpenAI");
        assert_eq!(source.source.as_deref(), Some("gpt-4o-mini"));
    }
}

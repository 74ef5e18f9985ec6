//! Bus events. Typed payloads carried inside envelopes, one per topic.
//!
//! Field names are the JSON wire contract between publishers and handlers.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed set of bus topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Error,
    Photo,
    Text,
    Command,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Error => "error",
            Topic::Photo => "photo",
            Topic::Text => "text",
            Topic::Command => "command",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event that travels on exactly one topic.
pub trait Event: Serialize + DeserializeOwned {
    const TOPIC: Topic;

    fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    fn decode(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoEvent {
    pub caption: String,
    pub file_id: String,
    pub file_url: String,
    pub file_size: i64,
    /// Inline image bytes, base64 on the wire.
    #[serde(with = "base64_bytes", default)]
    pub file_content: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEvent {
    pub text: String,
}

/// Control-plane command. Encoded as its numeric code (`0` = stop).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum NotificationCommand {
    Stop,
}

impl From<NotificationCommand> for u8 {
    fn from(command: NotificationCommand) -> Self {
        match command {
            NotificationCommand::Stop => 0,
        }
    }
}

impl TryFrom<u8> for NotificationCommand {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(NotificationCommand::Stop),
            other => Err(format!("unknown notification command {}", other)),
        }
    }
}

/// `handler` empty means every handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEvent {
    pub command: NotificationCommand,
    pub handler: String,
}

impl CommandEvent {
    pub fn stop(handler: impl Into<String>) -> Self {
        Self {
            command: NotificationCommand::Stop,
            handler: handler.into(),
        }
    }

    /// True when this command addresses the handler with the given identity.
    pub fn targets(&self, identity: &str) -> bool {
        self.handler.is_empty() || self.handler == identity
    }
}

impl Event for ErrorEvent {
    const TOPIC: Topic = Topic::Error;
}

impl Event for PhotoEvent {
    const TOPIC: Topic = Topic::Photo;
}

impl Event for TextEvent {
    const TOPIC: Topic = Topic::Text;
}

impl Event for CommandEvent {
    const TOPIC: Topic = Topic::Command;
}

mod base64_bytes {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_event_wire_shape() {
        let bytes = TextEvent {
            text: "testing".into(),
        }
        .encode()
        .unwrap();
        assert_eq!(bytes, br#"{"text":"testing"}"#);
        assert_eq!(
            TextEvent::decode(&bytes).unwrap(),
            TextEvent {
                text: "testing".into()
            }
        );
    }

    #[test]
    fn test_photo_event_wire_shape() {
        let event = PhotoEvent {
            caption: "testing".into(),
            file_id: "blablabla".into(),
            file_url: "http://myimage.com/test.jpg".into(),
            file_size: 1234,
            file_content: b"png".to_vec(),
        };
        let json = String::from_utf8(event.encode().unwrap()).unwrap();
        assert_eq!(
            json,
            r#"{"caption":"testing","fileId":"blablabla","fileUrl":"http://myimage.com/test.jpg","fileSize":1234,"fileContent":"cG5n"}"#
        );
        assert_eq!(PhotoEvent::decode(json.as_bytes()).unwrap(), event);
    }

    #[test]
    fn test_command_event_encodes_stop_as_zero() {
        let event = CommandEvent::stop("social");
        let json = String::from_utf8(event.encode().unwrap()).unwrap();
        assert_eq!(json, r#"{"command":0,"handler":"social"}"#);
        assert_eq!(CommandEvent::decode(json.as_bytes()).unwrap(), event);
    }

    #[test]
    fn test_command_event_rejects_unknown_code() {
        assert!(CommandEvent::decode(br#"{"command":7,"handler":""}"#).is_err());
    }

    #[test]
    fn test_error_event_round_trip() {
        let event = ErrorEvent {
            error: "boom".into(),
        };
        assert_eq!(ErrorEvent::decode(&event.encode().unwrap()).unwrap(), event);
    }

    #[test]
    fn test_command_targets() {
        assert!(CommandEvent::stop("").targets("social"));
        assert!(CommandEvent::stop("social").targets("social"));
        assert!(!CommandEvent::stop("social").targets("telegram"));
    }
}

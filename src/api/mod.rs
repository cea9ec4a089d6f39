//! Payloads exchanged with the companion chat server.
//!
//! Request bodies are serialized with `serde_json`; replies are deserialized
//! leniently so that missing optional fields never fail a whole response.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const CHAT_ENDPOINT: &str = "api/chat";
pub const IMAGINE_ENDPOINT: &str = "api/imagine";
pub const PINGS_ENDPOINT: &str = "api/pings";
pub const FORGET_ENDPOINT: &str = "api/forget";

#[derive(Serialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Serialize)]
pub struct ImagineRequest {
    pub prompt: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ImagineResponse {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
}

impl ImagineResponse {
    /// The generated image URL, if the server produced a usable one.
    pub fn image_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }

    /// Server-provided failure text, or a generic fallback.
    pub fn failure_reason(&self) -> &str {
        self.error
            .as_deref()
            .filter(|error| !error.is_empty())
            .unwrap_or("unknown error")
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PingResponse {
    #[serde(default)]
    pub message: Option<String>,
}

impl PingResponse {
    /// Absent, null and empty messages all mean "no ping".
    pub fn into_message(self) -> Option<String> {
        self.message.filter(|message| !message.is_empty())
    }
}

/// One decoded `data: {...}` line of the chat endpoint's streamed reply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// The server is simulating typing; `delay` is the pause it will take, in seconds.
    Typing {
        #[serde(default, deserialize_with = "number_or_none")]
        delay: Option<f64>,
    },
    /// A complete assistant message.
    Message {
        #[serde(default)]
        content: String,
    },
    /// `prompt` is informational; a non-string value is dropped.
    ImageGenerating {
        #[serde(default, deserialize_with = "string_or_none")]
        prompt: Option<String>,
    },
    Image {
        url: String,
    },
    Error {
        #[serde(default)]
        message: String,
    },
    Done,
}

fn string_or_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        _ => None,
    })
}

fn number_or_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_f64())
}

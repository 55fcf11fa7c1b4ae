//! Wire DTOs for the chat channel.
//!
//! DESIGN
//! ======
//! Channel frames are JSON objects discriminated by `type`. Outgoing and
//! incoming frames are separate enums so each direction only accepts what
//! it can legitimately carry. Unknown incoming types deserialize to
//! [`ServerEvent::Unknown`] and are dropped by the reducer.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Deserializer, Serialize};

/// Frame sent from the widget to the channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// A chat message typed by the viewer.
    #[serde(rename = "message.send")]
    MessageSend { text: String },
    /// A keystroke notification, no payload.
    #[serde(rename = "typing")]
    Typing,
}

impl ClientEvent {
    /// Encode for the socket.
    ///
    /// # Errors
    ///
    /// Propagates the serializer error; unreachable for these variants but
    /// kept explicit so callers never panic on encode.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Frame received from the channel.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// A message stored and fanned out by the server.
    #[serde(rename = "message.broadcast")]
    MessageBroadcast { message: BroadcastMessage },
    /// Another participant (or the viewer, if the server echoes) is typing.
    #[serde(rename = "typing")]
    Typing {
        #[serde(default)]
        username: Option<String>,
        #[serde(default, deserialize_with = "deserialize_opt_i64_from_any")]
        user_id: Option<i64>,
    },
    #[serde(other)]
    Unknown,
}

impl ServerEvent {
    /// Decode one text frame.
    ///
    /// # Errors
    ///
    /// Returns the parse error for non-JSON text, a missing `type`, or a
    /// recognized type whose payload has the wrong shape.
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Message payload of a `message.broadcast` frame.
///
/// Every field is optional on the wire; rendering substitutes placeholders
/// for absent names and content.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastMessage {
    #[serde(default, deserialize_with = "deserialize_opt_i64_from_any")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_opt_i64_from_any")]
    pub sender_id: Option<i64>,
    #[serde(default)]
    pub sender_username: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Accept an integer id sent as a JSON number or a numeric string.
#[allow(clippy::cast_possible_truncation)]
fn deserialize_opt_i64_from_any<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

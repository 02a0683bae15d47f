//! Inbound message model.
//!
//! Decoding happens in two steps. [`decode`] only checks that a frame is
//! well-formed JSON and yields an [`Envelope`]. [`Message::try_from`] then
//! classifies the envelope by its `type` tag into the closed set of messages
//! the server acknowledges, with [`Message::Unrecognized`] for everything else.

use crate::error::message::{DecodeError, SchemaError};

use common::ErrorLocation;

use std::panic::Location;

use serde_json::{Map, Value};

pub const TYPE_FIELD: &str = "type";
pub const HEARTBEAT_TAG: &str = "heartbeat";
pub const TEXT_TAG: &str = "text";

/// A decoded frame whose `type` has not been looked at yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope(Value);

impl Envelope {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// The `type` tag, when present and a string.
    pub fn tag(&self) -> Option<&str> {
        self.0.get(TYPE_FIELD).and_then(Value::as_str)
    }
}

/// Parse frame text into an [`Envelope`].
///
/// Any JSON document is accepted. A missing `type` is reported later by
/// [`Message::try_from`], not here.
///
/// # Errors
///
/// Returns [`DecodeError::Json`] when the text is not well-formed JSON.
pub fn decode(text: &str) -> Result<Envelope, DecodeError> {
    let value: Value = serde_json::from_str(text)?;
    Ok(Envelope(value))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Heartbeat {
    /// Client clock reading, echoed untouched.
    pub timestamp: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub id: Option<Value>,
    pub content: Value,
}

/// Message types acknowledged with a fixed status and no payload echo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    Metrics,
    Binary,
    Alert,
    Analytics,
    Priority,
    Routing,
    Api,
    Custom,
    Qos,
    Config,
    Session,
}

impl NoticeKind {
    pub const ALL: [NoticeKind; 11] = [
        NoticeKind::Metrics,
        NoticeKind::Binary,
        NoticeKind::Alert,
        NoticeKind::Analytics,
        NoticeKind::Priority,
        NoticeKind::Routing,
        NoticeKind::Api,
        NoticeKind::Custom,
        NoticeKind::Qos,
        NoticeKind::Config,
        NoticeKind::Session,
    ];

    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "metrics" => NoticeKind::Metrics,
            "binary" => NoticeKind::Binary,
            "alert" => NoticeKind::Alert,
            "analytics" => NoticeKind::Analytics,
            "priority" => NoticeKind::Priority,
            "routing" => NoticeKind::Routing,
            "api" => NoticeKind::Api,
            "custom" => NoticeKind::Custom,
            "qos" => NoticeKind::Qos,
            "config" => NoticeKind::Config,
            "session" => NoticeKind::Session,
            _ => return None,
        };
        Some(kind)
    }

    pub fn tag(self) -> &'static str {
        match self {
            NoticeKind::Metrics => "metrics",
            NoticeKind::Binary => "binary",
            NoticeKind::Alert => "alert",
            NoticeKind::Analytics => "analytics",
            NoticeKind::Priority => "priority",
            NoticeKind::Routing => "routing",
            NoticeKind::Api => "api",
            NoticeKind::Custom => "custom",
            NoticeKind::Qos => "qos",
            NoticeKind::Config => "config",
            NoticeKind::Session => "session",
        }
    }
}

/// A classified inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Heartbeat(Heartbeat),
    Text(Text),
    Notice(NoticeKind),
    /// A string `type` the server does not know. Still acknowledged.
    Unrecognized(String),
}

impl Message {
    pub fn tag(&self) -> &str {
        match self {
            Message::Heartbeat(_) => HEARTBEAT_TAG,
            Message::Text(_) => TEXT_TAG,
            Message::Notice(kind) => kind.tag(),
            Message::Unrecognized(tag) => tag,
        }
    }
}

impl TryFrom<Envelope> for Message {
    type Error = SchemaError;

    fn try_from(envelope: Envelope) -> Result<Self, Self::Error> {
        let Value::Object(mut fields) = envelope.into_value() else {
            return Err(SchemaError::NotAnObject {
                message: String::from("message must be a JSON object"),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let tag = match fields.remove(TYPE_FIELD) {
            Some(Value::String(tag)) => tag,
            Some(other) => {
                return Err(SchemaError::InvalidType {
                    message: format!("`type` must be a string, got {}", json_kind(&other)),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            None => {
                return Err(SchemaError::MissingType {
                    message: String::from("message has no `type` field"),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        match tag.as_str() {
            HEARTBEAT_TAG => {
                let timestamp = take_required(&mut fields, &tag, "timestamp")?;
                Ok(Message::Heartbeat(Heartbeat { timestamp }))
            }
            TEXT_TAG => {
                let content = take_required(&mut fields, &tag, "content")?;
                let id = fields.remove("id");
                Ok(Message::Text(Text { id, content }))
            }
            other => Ok(match NoticeKind::from_tag(other) {
                Some(kind) => Message::Notice(kind),
                None => Message::Unrecognized(tag),
            }),
        }
    }
}

fn take_required(
    fields: &mut Map<String, Value>,
    tag: &str,
    field: &str,
) -> Result<Value, SchemaError> {
    fields.remove(field).ok_or_else(|| SchemaError::MissingField {
        message: format!("`{tag}` message has no `{field}` field"),
        location: ErrorLocation::from(Location::caller()),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

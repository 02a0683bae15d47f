//! Acknowledgement construction.
//!
//! Every classified [`Message`] maps to exactly one response shape, and the
//! mapping is total: a type the server does not know is still acknowledged
//! with [`UNKNOWN_STATUS`] rather than dropped. The only way to get no
//! response is a frame that fails decoding or classification.

use crate::error::message::SchemaError;
use crate::message::{Envelope, Message, NoticeKind};

use serde::Serialize;
use serde_json::Value;

pub const ACK_SUFFIX: &str = "_ack";
pub const HEARTBEAT_STATUS: &str = "heartbeat received";
pub const TEXT_STATUS: &str = "text received";
pub const UNKNOWN_STATUS: &str = "unknown message type";

/// Fixed status string for each notice type.
pub fn notice_status(kind: NoticeKind) -> &'static str {
    match kind {
        NoticeKind::Metrics => "metrics collected",
        NoticeKind::Binary => "binary data received",
        NoticeKind::Alert => "alert triggered",
        NoticeKind::Analytics => "real-time analytics provided",
        NoticeKind::Priority => "high-priority message processed",
        NoticeKind::Routing => "message routed intelligently",
        NoticeKind::Api => "API abstraction tested",
        NoticeKind::Custom => "custom function executed",
        NoticeKind::Qos => "QoS settings applied",
        NoticeKind::Config => "dynamic configuration updated",
        NoticeKind::Session => "session managed successfully",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeartbeatAck {
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: Value,
    pub status: &'static str,
}

/// `id` is always present on the wire and is `null` when the request had none.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextAck {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: Value,
    pub status: &'static str,
    pub content: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusAck {
    #[serde(rename = "type")]
    pub kind: String,
    pub status: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Heartbeat(HeartbeatAck),
    Text(TextAck),
    Status(StatusAck),
}

impl Response {
    /// The `<request type>_ack` tag.
    pub fn kind(&self) -> &str {
        match self {
            Response::Heartbeat(ack) => &ack.kind,
            Response::Text(ack) => &ack.kind,
            Response::Status(ack) => &ack.kind,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            Response::Heartbeat(ack) => ack.status,
            Response::Text(ack) => ack.status,
            Response::Status(ack) => ack.status,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<Message> for Response {
    fn from(message: Message) -> Self {
        let kind = ack_type(message.tag());
        match message {
            Message::Heartbeat(heartbeat) => Response::Heartbeat(HeartbeatAck {
                kind,
                timestamp: heartbeat.timestamp,
                status: HEARTBEAT_STATUS,
            }),
            Message::Text(text) => Response::Text(TextAck {
                kind,
                id: text.id.unwrap_or(Value::Null),
                status: TEXT_STATUS,
                content: text.content,
            }),
            Message::Notice(notice) => Response::Status(StatusAck {
                kind,
                status: notice_status(notice),
            }),
            Message::Unrecognized(_) => Response::Status(StatusAck {
                kind,
                status: UNKNOWN_STATUS,
            }),
        }
    }
}

/// Classify an envelope and build its acknowledgement.
///
/// # Errors
///
/// Returns [`SchemaError`] when the envelope has no usable `type`, or lacks a
/// field its type requires (`timestamp` for heartbeats, `content` for text).
pub fn build(envelope: Envelope) -> Result<Response, SchemaError> {
    let message = Message::try_from(envelope)?;
    Ok(Response::from(message))
}

fn ack_type(tag: &str) -> String {
    format!("{tag}{ACK_SUFFIX}")
}

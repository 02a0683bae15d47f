use crate::error::message::{DecodeError, SchemaError};
use crate::message::{Envelope, Heartbeat, Message, NoticeKind, Text, decode};

use serde_json::json;

fn classify(value: serde_json::Value) -> Result<Message, SchemaError> {
    Message::try_from(Envelope::new(value))
}

/// **VALUE**: Verifies that the decoder accepts well-formed JSON without checking `type`.
///
/// **WHY THIS MATTERS**: A missing `type` is a schema problem reported by the response
/// builder. If the decoder rejected it, the two failure kinds would be logged as one.
#[test]
fn given_json_without_type_when_decoded_then_succeeds() {
    let envelope = decode(r#"{"content":"no type"}"#).expect("valid JSON should decode");

    assert_eq!(envelope.tag(), None);
    assert_eq!(envelope.as_value()["content"], "no type");
}

#[test]
fn given_non_object_json_when_decoded_then_succeeds() {
    for text in ["42", "\"just a string\"", "[1,2,3]", "null"] {
        assert!(decode(text).is_ok(), "{text} is well-formed JSON");
    }
}

/// **VALUE**: Verifies that malformed text is a `DecodeError`.
#[test]
fn given_garbage_text_when_decoded_then_returns_decode_error() {
    for text in ["", "not json at all", "{\"type\":", "{'type':'text'}"] {
        let err = decode(text).expect_err("malformed JSON must fail");
        assert!(matches!(err, DecodeError::Json { .. }), "{text:?}");
    }
}

#[test]
fn given_heartbeat_when_classified_then_keeps_timestamp() {
    let message = classify(json!({"type": "heartbeat", "timestamp": 1700000000})).unwrap();

    assert_eq!(
        message,
        Message::Heartbeat(Heartbeat {
            timestamp: json!(1700000000)
        })
    );
    assert_eq!(message.tag(), "heartbeat");
}

/// **VALUE**: Verifies that `id` is optional on text messages but `content` is not.
#[test]
fn given_text_messages_when_classified_then_id_is_optional() {
    let without_id = classify(json!({"type": "text", "content": "hi"})).unwrap();
    assert_eq!(
        without_id,
        Message::Text(Text {
            id: None,
            content: json!("hi")
        })
    );

    let with_id = classify(json!({"type": "text", "id": 7, "content": "hi"})).unwrap();
    assert_eq!(
        with_id,
        Message::Text(Text {
            id: Some(json!(7)),
            content: json!("hi")
        })
    );
}

#[test]
fn given_every_notice_tag_when_classified_then_maps_to_its_kind() {
    for kind in NoticeKind::ALL {
        let message = classify(json!({"type": kind.tag()})).unwrap();

        assert_eq!(message, Message::Notice(kind));
        assert_eq!(NoticeKind::from_tag(kind.tag()), Some(kind));
    }
}

/// **VALUE**: Verifies that unknown string types are classified, not rejected.
///
/// **BUG THIS CATCHES**: Would catch a dispatch table that errors on unknown types,
/// which would make new client message types vanish instead of being acknowledged.
#[test]
fn given_unknown_type_when_classified_then_returns_unrecognized() {
    let message = classify(json!({"type": "mystery", "payload": [1, 2]})).unwrap();

    assert_eq!(message, Message::Unrecognized(String::from("mystery")));
    assert_eq!(message.tag(), "mystery");
}

#[test]
fn given_type_with_different_case_when_classified_then_is_unrecognized() {
    let message = classify(json!({"type": "Heartbeat", "timestamp": 1})).unwrap();

    assert_eq!(message, Message::Unrecognized(String::from("Heartbeat")));
}

#[test]
fn given_missing_type_when_classified_then_returns_missing_type() {
    let err = classify(json!({"content": "no type"})).unwrap_err();

    assert!(matches!(err, SchemaError::MissingType { .. }));
}

#[test]
fn given_non_string_type_when_classified_then_returns_invalid_type() {
    let err = classify(json!({"type": 5})).unwrap_err();

    assert!(matches!(err, SchemaError::InvalidType { .. }));
    assert!(err.to_string().contains("number"));
}

#[test]
fn given_non_object_when_classified_then_returns_not_an_object() {
    let err = classify(json!(["type", "heartbeat"])).unwrap_err();

    assert!(matches!(err, SchemaError::NotAnObject { .. }));
}

/// **VALUE**: Verifies that type-specific required fields are enforced.
///
/// **WHY THIS MATTERS**: A heartbeat without a timestamp cannot be acknowledged with
/// the echoed timestamp the client uses for latency, so it is dropped instead.
#[test]
fn given_missing_required_field_when_classified_then_returns_missing_field() {
    let heartbeat = classify(json!({"type": "heartbeat"})).unwrap_err();
    assert!(matches!(heartbeat, SchemaError::MissingField { .. }));
    assert!(heartbeat.to_string().contains("timestamp"));

    let text = classify(json!({"type": "text", "id": 1})).unwrap_err();
    assert!(matches!(text, SchemaError::MissingField { .. }));
    assert!(text.to_string().contains("content"));
}

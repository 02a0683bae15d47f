use crate::error::message::FrameError;
use crate::message::{Envelope, NoticeKind};
use crate::response::{
    HEARTBEAT_STATUS, Response, TEXT_STATUS, UNKNOWN_STATUS, build, notice_status,
};
use crate::server::session::dispatch;

use serde_json::{Value, json};

fn respond(value: Value) -> Value {
    let response = build(Envelope::new(value)).expect("message should be acknowledged");
    serde_json::from_str(&response.to_json().expect("response serializes"))
        .expect("response is JSON")
}

/// **VALUE**: Verifies the heartbeat acknowledgement echoes the timestamp untouched.
///
/// **WHY THIS MATTERS**: Clients compute round-trip latency from the echoed timestamp.
/// Any reformatting (float vs int, string coercion) breaks that arithmetic.
#[test]
fn given_heartbeat_when_built_then_echoes_timestamp() {
    let ack = respond(json!({"type": "heartbeat", "timestamp": 1700000000}));

    assert_eq!(
        ack,
        json!({"type": "heartbeat_ack", "timestamp": 1700000000, "status": HEARTBEAT_STATUS})
    );
}

#[test]
fn given_heartbeat_with_string_timestamp_when_built_then_echoes_verbatim() {
    let ack = respond(json!({"type": "heartbeat", "timestamp": "2024-01-01T00:00:00Z"}));

    assert_eq!(ack["timestamp"], "2024-01-01T00:00:00Z");
}

/// **VALUE**: Verifies text acknowledgements always carry an `id` key.
///
/// **BUG THIS CATCHES**: Would catch `skip_serializing_if` on `id`, which makes
/// clients that correlate by id crash on a missing key instead of seeing `null`.
#[test]
fn given_text_without_id_when_built_then_id_is_null() {
    let ack = respond(json!({"type": "text", "content": "Hello"}));

    assert_eq!(
        ack,
        json!({"type": "text_ack", "id": null, "status": TEXT_STATUS, "content": "Hello"})
    );
    assert!(ack.as_object().unwrap().contains_key("id"));
}

#[test]
fn given_text_with_id_and_structured_content_when_built_then_echoes_both() {
    let ack = respond(json!({
        "type": "text",
        "id": "abc-123",
        "content": {"nested": [1, 2, 3]}
    }));

    assert_eq!(ack["id"], "abc-123");
    assert_eq!(ack["content"], json!({"nested": [1, 2, 3]}));
}

/// **VALUE**: Verifies every notice type maps to its fixed status string and nothing else.
#[test]
fn given_each_notice_when_built_then_returns_fixed_status_only() {
    let expected = [
        ("metrics", "metrics collected"),
        ("binary", "binary data received"),
        ("alert", "alert triggered"),
        ("analytics", "real-time analytics provided"),
        ("priority", "high-priority message processed"),
        ("routing", "message routed intelligently"),
        ("api", "API abstraction tested"),
        ("custom", "custom function executed"),
        ("qos", "QoS settings applied"),
        ("config", "dynamic configuration updated"),
        ("session", "session managed successfully"),
    ];
    assert_eq!(expected.len(), NoticeKind::ALL.len());

    for (tag, status) in expected {
        // Extra fields must not leak into the acknowledgement
        let ack = respond(json!({"type": tag, "payload": "ignored", "id": 9}));

        assert_eq!(
            ack,
            json!({"type": format!("{tag}_ack"), "status": status}),
            "notice {tag}"
        );
    }
}

#[test]
fn given_notice_kind_when_status_requested_then_matches_table() {
    assert_eq!(notice_status(NoticeKind::Qos), "QoS settings applied");
    assert_eq!(notice_status(NoticeKind::Api), "API abstraction tested");
}

/// **VALUE**: Verifies unknown types are acknowledged with the generic status.
#[test]
fn given_unknown_type_when_built_then_acknowledges_as_unknown() {
    let ack = respond(json!({"type": "mystery"}));

    assert_eq!(ack, json!({"type": "mystery_ack", "status": UNKNOWN_STATUS}));
}

#[test]
fn given_response_when_accessors_called_then_report_kind_and_status() {
    let response = build(Envelope::new(json!({"type": "alert"}))).unwrap();

    assert!(matches!(response, Response::Status(_)));
    assert_eq!(response.kind(), "alert_ack");
    assert_eq!(response.status(), "alert triggered");
}

/// **VALUE**: Verifies the full text-to-response path used by sessions.
///
/// **WHY THIS MATTERS**: `dispatch` is the single point where malformed frames are
/// separated from acknowledged ones; both failure kinds must surface as errors.
#[test]
fn given_raw_frames_when_dispatched_then_errors_match_failure_kind() {
    assert!(matches!(dispatch("not json"), Err(FrameError::Decode(_))));
    assert!(matches!(dispatch(r#"{"content":"x"}"#), Err(FrameError::Schema(_))));
    assert!(matches!(dispatch("[]"), Err(FrameError::Schema(_))));

    let response = dispatch(r#"{"type":"session"}"#).unwrap();
    assert_eq!(response.status(), "session managed successfully");
}

/// **VALUE**: Verifies the exact bytes on the wire, including field order.
///
/// **WHY THIS MATTERS**: Comparing parsed JSON ignores key order. Clients that match on
/// the raw text (or log it for diffing) see `type` first and `status` before `content`.
///
/// **BUG THIS CATCHES**: Would catch reordering the fields of the acknowledgement structs.
#[test]
fn given_scenario_frames_when_dispatched_then_serialize_in_documented_field_order() {
    let cases = [
        (
            r#"{"type":"heartbeat","timestamp":1700000000}"#,
            r#"{"type":"heartbeat_ack","timestamp":1700000000,"status":"heartbeat received"}"#,
        ),
        (
            r#"{"type":"text","content":"hi"}"#,
            r#"{"type":"text_ack","id":null,"status":"text received","content":"hi"}"#,
        ),
        (
            r#"{"content":"hi","id":3,"type":"text"}"#,
            r#"{"type":"text_ack","id":3,"status":"text received","content":"hi"}"#,
        ),
        (
            r#"{"type":"mystery"}"#,
            r#"{"type":"mystery_ack","status":"unknown message type"}"#,
        ),
    ];

    for (request, expected) in cases {
        let response = dispatch(request).expect("scenario frame is acknowledged");

        assert_eq!(response.to_json().unwrap(), expected, "request {request}");
    }
}

/// **VALUE**: Verifies echoed numbers are reproduced digit for digit.
///
/// **BUG THIS CATCHES**: Would catch numbers being routed through `u64`/`f64`, which
/// rounds integers wider than 64 bits and rejects exponents beyond the `f64` range.
#[test]
fn given_numbers_beyond_f64_when_echoed_then_text_is_preserved() {
    let heartbeat =
        dispatch(r#"{"type":"heartbeat","timestamp":123456789012345678901234567890}"#).unwrap();
    assert_eq!(
        heartbeat.to_json().unwrap(),
        r#"{"type":"heartbeat_ack","timestamp":123456789012345678901234567890,"status":"heartbeat received"}"#
    );

    let text = dispatch(r#"{"type":"text","id":1e400,"content":0.10000000000000000001}"#).unwrap();
    assert_eq!(
        text.to_json().unwrap(),
        r#"{"type":"text_ack","id":1e400,"status":"text received","content":0.10000000000000000001}"#
    );
}

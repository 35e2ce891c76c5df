use std::collections::BTreeMap;

use anyhow::Result;
use serde_json::json;

use super::FrameContext;
use super::InboundFrame;
use super::OutboundFrame;
use super::ServerEvent;

fn context() -> FrameContext {
    return FrameContext {
        session_id: "sess-1".to_string(),
        user_id: "user-7".to_string(),
    };
}

#[test]
fn it_serializes_query_frames() -> Result<()> {
    let frame = OutboundFrame::query("msg-1", "How did Fund II perform?", context());
    let payload = serde_json::to_value(&frame)?;

    assert_eq!(
        payload,
        json!({
            "type": "query",
            "message_id": "msg-1",
            "content": "How did Fund II perform?",
            "data": {"session_id": "sess-1", "user_id": "user-7"}
        })
    );

    return Ok(());
}

#[test]
fn it_serializes_filter_value_frames() -> Result<()> {
    let mut values = BTreeMap::new();
    values.insert("fund".to_string(), "Fund II".to_string());

    let frame = OutboundFrame::filter_values("msg-2", values, context());
    let payload = serde_json::to_value(&frame)?;

    assert_eq!(
        payload,
        json!({
            "type": "query",
            "message_id": "msg-2",
            "content": {"fund": "Fund II"},
            "data": {"session_id": "sess-1", "user_id": "user-7"}
        })
    );

    return Ok(());
}

#[test]
fn it_omits_absent_outbound_fields() -> Result<()> {
    let payload = serde_json::to_value(OutboundFrame::cancel(context()))?;

    assert_eq!(
        payload,
        json!({
            "type": "cancel",
            "data": {"session_id": "sess-1", "user_id": "user-7"}
        })
    );

    return Ok(());
}

#[test]
fn it_normalizes_fields_from_data() {
    let frame = InboundFrame::decode(serde_json::from_str(test_utils::progress_frame_fixture()).unwrap()).unwrap();

    match frame.normalize() {
        ServerEvent::Progress { fields, .. } => {
            assert_eq!(fields.message_id.as_deref(), Some("msg-1"));
            assert_eq!(fields.message.as_deref(), Some("Resolving fund universe"));
        }
        _ => panic!("Wrong event"),
    }
}

#[test]
fn it_normalizes_fields_from_result() {
    let frame =
        InboundFrame::decode(serde_json::from_str(test_utils::query_completed_result_frame_fixture()).unwrap())
            .unwrap();

    match frame.normalize() {
        ServerEvent::QueryCompleted { fields } => {
            assert_eq!(fields.message_id.as_deref(), Some("msg-1"));
            assert_eq!(fields.message.as_deref(), Some("Fund II returned 12.3% net IRR."));
            assert!(fields.raw_result.is_some());
            assert_eq!(fields.is_warehouse_query, Some(true));
        }
        _ => panic!("Wrong event"),
    }
}

#[test]
fn it_prefers_data_over_result() {
    let payload = json!({
        "type": "progress",
        "data": {"message_id": "from-data"},
        "result": {"message_id": "from-result"}
    });

    match InboundFrame::decode(payload).unwrap().normalize() {
        ServerEvent::Progress { fields, .. } => {
            assert_eq!(fields.message_id.as_deref(), Some("from-data"));
        }
        _ => panic!("Wrong event"),
    }
}

#[test]
fn it_normalizes_history_batches() {
    let frame =
        InboundFrame::decode(serde_json::from_str(test_utils::chat_history_frame_fixture()).unwrap()).unwrap();

    match frame.normalize() {
        ServerEvent::ChatHistory { records } => {
            assert_eq!(records.len(), 4);
        }
        _ => panic!("Wrong event"),
    }
}

#[test]
fn it_ignores_history_frames_without_payload() {
    let payload = json!({"type": "chat_history_response"});

    match InboundFrame::decode(payload).unwrap().normalize() {
        ServerEvent::Ignored => {}
        _ => panic!("Wrong event"),
    }
}

#[test]
fn it_skips_unparseable_history_records() {
    let payload = json!({
        "type": "chat_history_response",
        "history_data": {
            "messages": [
                {"message_id": "a", "role": "user", "content": "hi", "message_order": 1},
                {"role": "no-such-role", "message_order": "not-a-number"},
                42
            ]
        }
    });

    match InboundFrame::decode(payload).unwrap().normalize() {
        ServerEvent::ChatHistory { records } => {
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].message_id, "a");
        }
        _ => panic!("Wrong event"),
    }
}

#[test]
fn it_ignores_unknown_frame_kinds() {
    let payload = json!({"type": "telemetry", "data": {"message_id": "msg-1"}});

    match InboundFrame::decode(payload).unwrap().normalize() {
        ServerEvent::Ignored => {}
        _ => panic!("Wrong event"),
    }
}

#[test]
fn it_rejects_frames_without_a_kind() {
    assert!(InboundFrame::decode(json!({"data": {"message_id": "msg-1"}})).is_none());
    assert!(InboundFrame::decode(json!("just a string")).is_none());
}

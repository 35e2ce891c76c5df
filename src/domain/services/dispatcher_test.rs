use serde_json::json;
use serde_json::Value;

use super::ConversationStore;
use super::Dispatcher;
use crate::domain::models::Author;
use crate::domain::models::Content;

fn store() -> ConversationStore {
    return ConversationStore::new("sess-1", "user-7");
}

fn fixture(raw: &str) -> Value {
    return serde_json::from_str(raw).unwrap();
}

#[test]
fn it_replaces_sessions_on_connected() {
    let mut store = store();
    Dispatcher::handle(&mut store, fixture(test_utils::connected_frame_fixture()));

    assert_eq!(store.sessions().len(), 2);
    assert_eq!(store.sessions()[0].session_id, "sess-a");
    assert_eq!(store.sessions_data().unwrap().user_id, "user-7");
}

#[test]
fn it_appends_progress_frames_in_order() {
    let mut store = store();
    for step in ["a", "b", "c"] {
        Dispatcher::handle(
            &mut store,
            json!({"type": "progress", "data": {"message_id": "msg-1", "message": step}}),
        );
    }

    assert_eq!(store.progress_trail("msg-1"), ["a", "b", "c"]);
}

#[test]
fn it_registers_filter_requests() {
    let mut store = store();
    store.add_message(Author::User, Content::text("question"), "msg-1");
    store.set_pending(true);

    Dispatcher::handle(&mut store, fixture(test_utils::waiting_filters_frame_fixture()));

    let request = store.active_filter_request().unwrap();
    assert_eq!(request.message_id, "msg-1");
    assert_eq!(request.filters.len(), 2);
    assert_eq!(request.filters[0].name, "fund");
    assert!(!store.message("msg-1").unwrap().pending);
}

#[test]
fn it_completes_on_step_complete() {
    let mut store = store();
    store.add_message(Author::User, Content::text("question"), "msg-1");
    store.set_pending(true);

    Dispatcher::handle(
        &mut store,
        json!({"type": "progress", "data": {"message_id": "msg-1", "step": "complete"}}),
    );

    assert!(!store.pending);
    assert!(store.is_settled("msg-1"));
}

#[test]
fn it_prepends_a_session_on_title_generated() {
    let mut store = store();
    Dispatcher::handle(&mut store, fixture(test_utils::title_generated_frame_fixture()));

    assert_eq!(store.sessions().len(), 1);
    assert_eq!(store.sessions()[0].session_id, "sess-c");
    assert_eq!(store.sessions()[0].title, "Portfolio concentration");
    assert_eq!(store.sessions()[0].created_at, "2024-02-03T12:00:00Z");
}

#[test]
fn it_populates_detailed_results() {
    let mut store = store();
    Dispatcher::handle(&mut store, fixture(test_utils::detailed_formatting_frame_fixture()));

    assert!(store.detailed_formatted_result("msg-1").is_some());
    assert_eq!(
        store.detailed_raw_result("msg-1"),
        Some(&json!({"rows": [{"fund": "Fund II"}]}))
    );
    assert!(store.chart_suggestions("msg-1").is_some());
}

#[test]
fn it_applies_attachments_from_either_location() {
    let mut store = store();
    Dispatcher::handle(&mut store, fixture(test_utils::query_completed_result_frame_fixture()));

    assert!(store.raw_result("msg-1").is_some());
    assert!(store.is_warehouse_query("msg-1"));
}

#[test]
fn it_records_the_reply_on_query_completed() {
    let mut store = store();
    store.add_message(Author::User, Content::text("question"), "msg-1");
    store.set_pending(true);

    Dispatcher::handle(&mut store, fixture(test_utils::query_completed_data_frame_fixture()));

    assert!(!store.pending);
    let reply = store
        .messages()
        .iter()
        .find(|m| return m.message_id == "msg-1" && m.author == Author::Assistant)
        .unwrap();
    assert_eq!(reply.content, Content::text("Fund II returned 12.3% net IRR."));
}

#[test]
fn it_applies_query_completed_idempotently() {
    let mut store = store();
    store.add_message(Author::User, Content::text("question"), "msg-1");
    store.set_thinking_start("msg-1", chrono::Utc::now());
    store.set_pending(true);

    Dispatcher::handle(&mut store, fixture(test_utils::query_completed_data_frame_fixture()));
    let first_end = store.message("msg-1").unwrap().thinking_end_time;

    Dispatcher::handle(&mut store, fixture(test_utils::query_completed_data_frame_fixture()));

    let replies = store
        .messages()
        .iter()
        .filter(|m| return m.message_id == "msg-1" && m.author == Author::Assistant)
        .count();
    assert_eq!(replies, 1);
    assert!(!store.pending);
    assert_eq!(store.message("msg-1").unwrap().thinking_end_time, first_end);
}

#[test]
fn it_applies_a_late_completion_after_cancel() {
    let mut store = store();
    store.add_message(Author::User, Content::text("question"), "msg-1");
    store.set_pending(true);

    // Optimistic local cancellation.
    store.set_pending(false);

    Dispatcher::handle(&mut store, fixture(test_utils::query_completed_data_frame_fixture()));

    assert!(!store.pending);
    assert!(store.is_settled("msg-1"));
}

#[test]
fn it_replays_chat_history() {
    let mut store = store();
    store.add_message(Author::User, Content::text("stale"), "old-1");

    Dispatcher::handle(&mut store, fixture(test_utils::chat_history_frame_fixture()));

    let ids = store
        .messages()
        .iter()
        .skip(1)
        .map(|m| return m.message_id.to_string())
        .collect::<Vec<String>>();
    assert_eq!(
        ids,
        vec![
            "hist-user-1".to_string(),
            "hist-tool-1".to_string(),
            "hist-user-2".to_string()
        ]
    );
    assert_eq!(store.progress_trail("hist-tool-1"), ["Resolving fund universe"]);
    assert!(store.raw_result("hist-tool-1").is_some());
}

#[test]
fn it_drops_effects_missing_a_message_id() {
    let mut store = store();
    store.set_pending(true);

    Dispatcher::handle(
        &mut store,
        json!({"type": "progress", "data": {"message": "no id on this one"}}),
    );
    Dispatcher::handle(&mut store, json!({"type": "query_completed", "data": {}}));

    // Neither frame produced a mutation that requires an id.
    assert!(store.pending);
    assert_eq!(store.messages().len(), 1);
}

#[test]
fn it_survives_malformed_frames() {
    let mut store = store();
    Dispatcher::handle(&mut store, json!(42));
    Dispatcher::handle(&mut store, json!({"no_type": true}));
    Dispatcher::handle(&mut store, json!({"type": "progress", "data": "not an object"}));

    assert_eq!(store.messages().len(), 1);
}

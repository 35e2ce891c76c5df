#[cfg(test)]
#[path = "dispatcher_test.rs"]
mod tests;

use chrono::SecondsFormat;
use chrono::Utc;
use serde_json::Value;

use super::ConversationStore;
use crate::domain::models::Content;
use crate::domain::models::FrameFields;
use crate::domain::models::InboundFrame;
use crate::domain::models::ServerEvent;
use crate::domain::models::Session;

/// Routes every inbound frame into store mutations. Owns no state of its
/// own; malformed frames are logged and dropped so the channel survives bad
/// input.
pub struct Dispatcher {}

impl Dispatcher {
    pub fn handle(store: &mut ConversationStore, payload: Value) {
        let frame = match InboundFrame::decode(payload) {
            Some(frame) => frame,
            None => {
                tracing::warn!("Dropping inbound frame with no recognizable shape");
                return;
            }
        };

        match frame.normalize() {
            ServerEvent::Connected { sessions_data } => {
                if let Some(data) = sessions_data {
                    store.set_sessions_data(data);
                }
            }
            ServerEvent::Progress {
                update_type,
                timestamp,
                fields,
            } => {
                handle_progress(store, update_type, timestamp, fields);
            }
            ServerEvent::QueryCompleted { fields } => {
                handle_query_completed(store, fields);
            }
            ServerEvent::ChatHistory { records } => {
                store.apply_history(records);
            }
            ServerEvent::Ignored => {}
        }
    }
}

/// Result attachments ride along on any frame kind that names a message.
fn apply_attachments(store: &mut ConversationStore, fields: &FrameFields) {
    let message_id = match &fields.message_id {
        Some(message_id) => message_id,
        None => return,
    };

    if let Some(value) = &fields.chart_suggestions {
        store.set_chart_suggestions(message_id, value.to_owned());
    }
    if let Some(value) = &fields.raw_result {
        store.set_raw_result(message_id, value.to_owned());
    }
    if fields.is_warehouse_query == Some(true) {
        store.set_warehouse_query(message_id, true);
    }
}

fn handle_progress(
    store: &mut ConversationStore,
    update_type: Option<String>,
    timestamp: Option<String>,
    fields: FrameFields,
) {
    apply_attachments(store, &fields);

    match update_type.as_deref() {
        // Session synthesis needs no message id.
        Some("title_generated") => {
            if let (Some(session_id), Some(title)) = (&fields.session_id, &fields.title) {
                let stamp = timestamp.unwrap_or_else(|| {
                    return Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
                });
                store.add_session(Session::generated(session_id, title, &stamp));
            }
        }
        Some("detailed_formatting_complete") => {
            if let Some(message_id) = &fields.message_id {
                if let Some(value) = &fields.detailed_formatted_result {
                    store.set_detailed_formatted_result(message_id, value.to_owned());
                }
                if let Some(value) = &fields.detailed_raw_result {
                    store.set_detailed_raw_result(message_id, value.to_owned());
                }
            }
        }
        _ => {}
    }

    let message_id = match fields.message_id {
        Some(message_id) => message_id,
        None => return,
    };

    if let Some(message) = &fields.message {
        store.append_progress(&message_id, message);
    }

    if fields.step.as_deref() == Some("waiting_filters") {
        if let Some(filters) = fields.filters {
            store.register_filters(&message_id, filters);
        }
    } else if fields.step.as_deref() == Some("complete") {
        store.set_pending(false);
        store.settle(&message_id);
    }
}

fn handle_query_completed(store: &mut ConversationStore, fields: FrameFields) {
    apply_attachments(store, &fields);

    let message_id = match fields.message_id {
        Some(message_id) => message_id,
        None => return,
    };

    if let Some(message) = fields.message {
        store.upsert_reply(&message_id, Content::Text(message));
    }

    store.set_pending(false);
    store.set_thinking_end(&message_id, Utc::now());
    store.settle(&message_id);
}

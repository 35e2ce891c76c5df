#[cfg(test)]
#[path = "store_test.rs"]
mod tests;

use std::collections::HashMap;
use std::collections::HashSet;

use chrono::DateTime;
use chrono::Utc;
use serde_json::Value;

use crate::domain::models::Author;
use crate::domain::models::Content;
use crate::domain::models::Entity;
use crate::domain::models::Filter;
use crate::domain::models::FilterRequest;
use crate::domain::models::FrameContext;
use crate::domain::models::HistoryRecord;
use crate::domain::models::HistoryRole;
use crate::domain::models::Message;
use crate::domain::models::SelectedEntity;
use crate::domain::models::Session;
use crate::domain::models::SessionsData;
use crate::domain::models::Status;

fn greeting() -> Message {
    return Message::new(Author::Assistant, Content::text("Hello, how can I help?"), "");
}

fn parse_recorded_timestamp(timestamp: &Option<String>) -> Option<DateTime<Utc>> {
    let text = timestamp.as_ref()?;
    return DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|parsed| return parsed.with_timezone(&Utc));
}

fn parse_embedded(payload: &Option<String>) -> Option<Value> {
    let text = payload.as_ref()?;
    match serde_json::from_str(text) {
        Ok(value) => return Some(value),
        Err(err) => {
            tracing::warn!(error = ?err, "Failed to parse embedded history payload");
            return None;
        }
    }
}

/// Canonical client state for one conversation. Created once per process and
/// handed by `&mut` to whoever needs to fold events into it; all mutations
/// are synchronous.
pub struct ConversationStore {
    pub status: Status,
    pub pending: bool,
    pub session_id: String,
    pub user_id: String,
    messages: Vec<Message>,
    progress: HashMap<String, Vec<String>>,
    settled: HashSet<String>,
    filter_requests: Vec<FilterRequest>,
    chart_suggestions: HashMap<String, Value>,
    raw_results: HashMap<String, Value>,
    detailed_formatted_results: HashMap<String, Value>,
    detailed_raw_results: HashMap<String, Value>,
    chart_data: HashMap<String, Value>,
    warehouse_queries: HashSet<String>,
    sessions: Vec<Session>,
    sessions_data: Option<SessionsData>,
    entities: HashMap<String, Vec<Entity>>,
    selected_entities: Vec<SelectedEntity>,
    pub entities_error: Option<String>,
}

impl ConversationStore {
    pub fn new(session_id: &str, user_id: &str) -> ConversationStore {
        return ConversationStore {
            status: Status::Disconnected,
            pending: false,
            session_id: session_id.to_string(),
            user_id: user_id.to_string(),
            messages: vec![greeting()],
            progress: HashMap::new(),
            settled: HashSet::new(),
            filter_requests: vec![],
            chart_suggestions: HashMap::new(),
            raw_results: HashMap::new(),
            detailed_formatted_results: HashMap::new(),
            detailed_raw_results: HashMap::new(),
            chart_data: HashMap::new(),
            warehouse_queries: HashSet::new(),
            sessions: vec![],
            sessions_data: None,
            entities: HashMap::new(),
            selected_entities: vec![],
            entities_error: None,
        };
    }

    pub fn context(&self) -> FrameContext {
        return FrameContext {
            session_id: self.session_id.to_string(),
            user_id: self.user_id.to_string(),
        };
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    pub fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
    }

    pub fn messages(&self) -> &[Message] {
        return &self.messages;
    }

    pub fn message(&self, message_id: &str) -> Option<&Message> {
        return self.messages.iter().find(|m| return m.message_id == message_id);
    }

    fn message_mut(&mut self, message_id: &str) -> Option<&mut Message> {
        return self
            .messages
            .iter_mut()
            .find(|m| return m.message_id == message_id);
    }

    pub fn add_message(&mut self, author: Author, content: Content, message_id: &str) {
        self.messages.push(Message::new(author, content, message_id));
    }

    /// Records the final reply for a query. Applying the same completion
    /// twice updates the existing message in place rather than duplicating
    /// it.
    pub fn upsert_reply(&mut self, message_id: &str, content: Content) {
        if let Some(existing) = self
            .messages
            .iter_mut()
            .find(|m| return m.message_id == message_id && m.author != Author::User)
        {
            existing.content = content;
            existing.pending = false;
            return;
        }

        self.messages
            .push(Message::new(Author::Assistant, content, message_id));
    }

    pub fn clear_messages(&mut self) {
        self.messages = vec![greeting()];
    }

    pub fn append_progress(&mut self, message_id: &str, step: &str) {
        // The trail is frozen once a terminal signal for the id arrived.
        if self.settled.contains(message_id) {
            return;
        }

        self.progress
            .entry(message_id.to_string())
            .or_default()
            .push(step.to_string());
    }

    pub fn progress_trail(&self, message_id: &str) -> &[String] {
        return self
            .progress
            .get(message_id)
            .map(|trail| return trail.as_slice())
            .unwrap_or(&[]);
    }

    pub fn replace_progress(&mut self, progress: HashMap<String, Vec<String>>) {
        self.progress = progress;
    }

    /// Marks a message as having received its terminal signal. Only the
    /// first signal flips the pending flag; later ones are no-ops.
    pub fn settle(&mut self, message_id: &str) {
        if !self.settled.insert(message_id.to_string()) {
            return;
        }

        if let Some(message) = self.message_mut(message_id) {
            message.pending = false;
        }
    }

    pub fn is_settled(&self, message_id: &str) -> bool {
        return self.settled.contains(message_id);
    }

    pub fn set_thinking_start(&mut self, message_id: &str, at: DateTime<Utc>) {
        if let Some(message) = self.message_mut(message_id) {
            message.thinking_start_time = Some(at);
        }
    }

    pub fn set_thinking_end(&mut self, message_id: &str, at: DateTime<Utc>) {
        if let Some(message) = self.message_mut(message_id) {
            if message.thinking_end_time.is_none() {
                message.thinking_end_time = Some(at);
            }
        }
    }

    pub fn thinking_time(&self, message_id: &str) -> i64 {
        return self
            .message(message_id)
            .map(|message| return message.thinking_time())
            .unwrap_or(0);
    }

    /// Registers the server's request for missing parameters. The request
    /// doubles as the terminal signal for the message: the backend is now
    /// waiting on the user, not the other way around.
    pub fn register_filters(&mut self, message_id: &str, filters: Vec<Filter>) {
        if let Some(existing) = self
            .filter_requests
            .iter_mut()
            .find(|r| return r.message_id == message_id)
        {
            existing.filters = filters;
        } else {
            self.filter_requests.push(FilterRequest {
                message_id: message_id.to_string(),
                filters,
            });
        }

        self.settle(message_id);
    }

    /// The most recently registered unresolved request. Only one is surfaced
    /// at a time.
    pub fn active_filter_request(&self) -> Option<&FilterRequest> {
        return self.filter_requests.last();
    }

    pub fn resolve_filter_request(&mut self, message_id: &str) {
        self.filter_requests
            .retain(|r| return r.message_id != message_id);
    }

    pub fn clear_filters(&mut self) {
        self.filter_requests.clear();
    }

    pub fn set_chart_suggestions(&mut self, message_id: &str, value: Value) {
        self.chart_suggestions.insert(message_id.to_string(), value);
    }

    pub fn chart_suggestions(&self, message_id: &str) -> Option<&Value> {
        return self.chart_suggestions.get(message_id);
    }

    pub fn set_raw_result(&mut self, message_id: &str, value: Value) {
        self.raw_results.insert(message_id.to_string(), value);
    }

    pub fn raw_result(&self, message_id: &str) -> Option<&Value> {
        return self.raw_results.get(message_id);
    }

    pub fn set_detailed_formatted_result(&mut self, message_id: &str, value: Value) {
        self.detailed_formatted_results
            .insert(message_id.to_string(), value);
    }

    pub fn detailed_formatted_result(&self, message_id: &str) -> Option<&Value> {
        return self.detailed_formatted_results.get(message_id);
    }

    pub fn set_detailed_raw_result(&mut self, message_id: &str, value: Value) {
        self.detailed_raw_results
            .insert(message_id.to_string(), value);
    }

    pub fn detailed_raw_result(&self, message_id: &str) -> Option<&Value> {
        return self.detailed_raw_results.get(message_id);
    }

    pub fn set_chart_data(&mut self, message_id: &str, value: Value) {
        self.chart_data.insert(message_id.to_string(), value);
    }

    pub fn chart_data(&self, message_id: &str) -> Option<&Value> {
        return self.chart_data.get(message_id);
    }

    pub fn set_warehouse_query(&mut self, message_id: &str, flag: bool) {
        if flag {
            self.warehouse_queries.insert(message_id.to_string());
        } else {
            self.warehouse_queries.remove(message_id);
        }
    }

    pub fn is_warehouse_query(&self, message_id: &str) -> bool {
        return self.warehouse_queries.contains(message_id);
    }

    pub fn sessions(&self) -> &[Session] {
        return &self.sessions;
    }

    pub fn sessions_data(&self) -> Option<&SessionsData> {
        return self.sessions_data.as_ref();
    }

    /// Replaces the session list wholesale from the bulk snapshot.
    pub fn set_sessions_data(&mut self, data: SessionsData) {
        self.sessions = data.sessions.to_vec();
        self.sessions_data = Some(data);
    }

    pub fn add_session(&mut self, session: Session) {
        self.sessions.insert(0, session);
    }

    pub fn set_entities(&mut self, entities: HashMap<String, Vec<Entity>>) {
        self.entities = entities;
        self.entities_error = None;
    }

    pub fn entities(&self) -> &HashMap<String, Vec<Entity>> {
        return &self.entities;
    }

    pub fn set_entities_error(&mut self, error: &str) {
        self.entities_error = Some(error.to_string());
    }

    pub fn selected_entities(&self) -> &[SelectedEntity] {
        return &self.selected_entities;
    }

    pub fn toggle_selected_entity(&mut self, name: &str, entity_type: &str) {
        let id = format!("{name}-{entity_type}");
        if let Some(idx) = self
            .selected_entities
            .iter()
            .position(|item| return item.id == id)
        {
            self.selected_entities.remove(idx);
            return;
        }

        self.selected_entities.push(SelectedEntity {
            id,
            name: name.to_string(),
            entity_type: entity_type.to_string(),
        });
    }

    pub fn clear_selected_entities(&mut self) {
        self.selected_entities.clear();
    }

    /// Rebuilds the conversation from a persisted batch. Records are applied
    /// in `message_order`; the progress map is swapped in wholesale at the
    /// end so a half-applied replay is never observable.
    pub fn apply_history(&mut self, mut records: Vec<HistoryRecord>) {
        records.sort_by_key(|record| return record.message_order);

        self.clear_messages();
        self.clear_filters();
        self.settled.clear();

        let mut trails: HashMap<String, Vec<String>> = HashMap::new();

        for record in records {
            match record.role {
                HistoryRole::User => {
                    let message_id = record.resolved_message_id();
                    let mut message =
                        Message::new(Author::User, Content::Text(record.content), &message_id);
                    if let Some(recorded) = parse_recorded_timestamp(&record.timestamp) {
                        message.timestamp = recorded;
                    }
                    // Nothing is in flight for a restored conversation.
                    message.pending = false;
                    self.messages.push(message);
                }
                HistoryRole::Assistant | HistoryRole::Tool => {
                    let message_id = record.message_id.to_string();
                    let raw = parse_embedded(&record.raw_data);

                    let content = match raw.clone() {
                        Some(value) => Content::Structured(value),
                        None => Content::Text(record.content),
                    };
                    let mut message = Message::new(Author::Assistant, content, &message_id);
                    if let Some(recorded) = parse_recorded_timestamp(&record.timestamp) {
                        message.timestamp = recorded;
                    }
                    self.messages.push(message);

                    if let Some(value) = raw {
                        self.raw_results.insert(message_id.to_string(), value);
                    }
                    if let Some(value) = parse_embedded(&record.formatted_data) {
                        self.detailed_formatted_results
                            .insert(message_id.to_string(), value);
                    }
                    if let Some(value) = parse_embedded(&record.chart_suggestions) {
                        self.chart_suggestions.insert(message_id.to_string(), value);
                    }
                }
                HistoryRole::System => {
                    // Progress entries name their target message in the
                    // workflow metadata, not on the record itself.
                    let target = record
                        .metadata
                        .workflow_data
                        .as_ref()
                        .and_then(|workflow| return workflow.message_id.clone());

                    if let Some(target) = target {
                        trails.entry(target).or_default().push(record.content);
                    }
                }
            }
        }

        self.replace_progress(trails);
    }
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;

use std::collections::BTreeMap;

use anyhow::bail;
use anyhow::Result;
use chrono::Utc;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::ConversationStore;
use crate::domain::models::Author;
use crate::domain::models::Content;
use crate::domain::models::FrameContext;
use crate::domain::models::OutboundFrame;
use crate::domain::models::Status;

/// The operations the front end calls. Attaches session and user identity to
/// every frame and keeps the one-request-at-a-time bookkeeping; actual
/// sequencing is advisory and enforced by disabling input while pending.
pub struct ChatService {
    outbound: mpsc::UnboundedSender<OutboundFrame>,
}

impl ChatService {
    pub fn new(outbound: mpsc::UnboundedSender<OutboundFrame>) -> ChatService {
        return ChatService { outbound };
    }

    fn ensure_connected(store: &ConversationStore) -> Result<()> {
        if store.status != Status::Connected {
            bail!("Not connected to the assistant server");
        }

        return Ok(());
    }

    /// Announces identity once the socket reports open, prompting the
    /// sessions snapshot in return.
    pub fn send_connect(&self, store: &ConversationStore) -> Result<()> {
        self.outbound.send(OutboundFrame::connect(store.context()))?;
        return Ok(());
    }

    /// Submits a user query. Completion arrives asynchronously through the
    /// dispatcher; the returned id ties the two together.
    pub fn send_query(&self, store: &mut ConversationStore, text: &str) -> Result<String> {
        ChatService::ensure_connected(store)?;

        let message_id = Uuid::new_v4().to_string();
        store.add_message(Author::User, Content::text(text), &message_id);
        store.set_pending(true);
        store.set_thinking_start(&message_id, Utc::now());

        self.outbound
            .send(OutboundFrame::query(&message_id, text, store.context()))?;

        return Ok(message_id);
    }

    /// Best effort: clears local pending immediately without waiting for the
    /// server to acknowledge, which it may never do.
    pub fn cancel_request(&self, store: &mut ConversationStore) -> Result<()> {
        self.outbound.send(OutboundFrame::cancel(store.context()))?;
        store.set_pending(false);
        return Ok(());
    }

    /// Answers the active filter request with the user's values. The values
    /// travel as the query content; a readable summary lands in the
    /// conversation.
    pub fn send_filter_response(
        &self,
        store: &mut ConversationStore,
        values: BTreeMap<String, String>,
    ) -> Result<String> {
        ChatService::ensure_connected(store)?;

        let message_id = Uuid::new_v4().to_string();
        let summary = values
            .iter()
            .map(|(key, value)| return format!("{key}: {value}"))
            .collect::<Vec<String>>()
            .join(", ");
        store.add_message(
            Author::User,
            Content::Text(format!("Applied filters: {summary}")),
            &message_id,
        );

        if let Some(request) = store.active_filter_request() {
            let request_id = request.message_id.to_string();
            store.resolve_filter_request(&request_id);
        }

        self.outbound.send(OutboundFrame::filter_values(
            &message_id,
            values,
            store.context(),
        ))?;

        return Ok(message_id);
    }

    /// Requests a replay of a stored conversation. The response is folded in
    /// by the dispatcher; there is nothing to return here.
    pub fn get_chat_history(&self, store: &ConversationStore, session_id: &str) -> Result<()> {
        ChatService::ensure_connected(store)?;

        let context = FrameContext {
            session_id: session_id.to_string(),
            user_id: store.user_id.to_string(),
        };
        self.outbound.send(OutboundFrame::chat_history(context))?;

        return Ok(());
    }
}

#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use chrono::DateTime;
use chrono::Utc;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use serde_json::Value;

use super::Author;

/// Replies reconstructed from history carry structured result payloads
/// instead of plain text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Structured(Value),
}

impl Content {
    pub fn text(text: &str) -> Content {
        return Content::Text(text.to_string());
    }

    pub fn as_text(&self) -> String {
        match self {
            Content::Text(text) => return text.to_string(),
            Content::Structured(value) => return value.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub message_id: String,
    pub author: Author,
    pub content: Content,
    pub timestamp: DateTime<Utc>,
    pub pending: bool,
    pub thinking_start_time: Option<DateTime<Utc>>,
    pub thinking_end_time: Option<DateTime<Utc>>,
}

impl Message {
    pub fn new(author: Author, content: Content, message_id: &str) -> Message {
        let pending = author == Author::User;
        return Message {
            message_id: message_id.to_string(),
            author,
            content,
            timestamp: Utc::now(),
            pending,
            thinking_start_time: None,
            thinking_end_time: None,
        };
    }

    /// Whole seconds spent between the thinking timestamps, 0 while either
    /// is missing.
    pub fn thinking_time(&self) -> i64 {
        if let (Some(start), Some(end)) = (self.thinking_start_time, self.thinking_end_time) {
            return end.signed_duration_since(start).num_milliseconds() / 1000;
        }

        return 0;
    }
}

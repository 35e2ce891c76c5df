use serde_derive::Deserialize;
use serde_derive::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    User,
    Assistant,
    System,
    Tool,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct WorkflowData {
    pub message_id: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct HistoryMetadata {
    pub message_id: Option<String>,
    pub workflow_data: Option<WorkflowData>,
}

/// One record of a persisted conversation, as returned by
/// `get_chat_history`. The embedded `*_data` payloads are JSON-encoded
/// strings requiring a nested parse.
#[derive(Clone, Debug, Deserialize)]
pub struct HistoryRecord {
    #[serde(default)]
    pub message_id: String,
    pub role: HistoryRole,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    pub message_order: i64,
    #[serde(default)]
    pub raw_data: Option<String>,
    #[serde(default)]
    pub formatted_data: Option<String>,
    #[serde(default)]
    pub chart_suggestions: Option<String>,
    #[serde(default)]
    pub metadata: HistoryMetadata,
}

impl HistoryRecord {
    /// User records historically carried their id under metadata rather than
    /// on the record itself.
    pub fn resolved_message_id(&self) -> String {
        if let Some(id) = &self.metadata.message_id {
            return id.to_string();
        }

        return self.message_id.to_string();
    }
}

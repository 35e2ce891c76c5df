use serde_derive::Deserialize;
use serde_derive::Serialize;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionMetadata {
    pub query_type: String,
    pub session_id: String,
    pub workflow_type: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub session_id: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
    pub is_active: bool,
    pub metadata: SessionMetadata,
}

impl Session {
    /// Entry synthesized client-side when the server announces a freshly
    /// generated title for the current conversation.
    pub fn generated(session_id: &str, title: &str, timestamp: &str) -> Session {
        return Session {
            session_id: session_id.to_string(),
            title: title.to_string(),
            created_at: timestamp.to_string(),
            updated_at: timestamp.to_string(),
            is_active: true,
            metadata: SessionMetadata {
                query_type: "assistant_query".to_string(),
                session_id: session_id.to_string(),
                workflow_type: "default".to_string(),
            },
        };
    }
}

/// Bulk snapshot delivered once on connect.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsData {
    pub success: bool,
    pub user_id: String,
    pub connection_id: String,
    pub sessions: Vec<Session>,
    pub session_count: usize,
    pub sorted_by: String,
    pub sort_order: String,
}

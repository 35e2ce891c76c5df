#[cfg(test)]
#[path = "frame_test.rs"]
mod tests;

use std::collections::BTreeMap;

use serde_derive::Deserialize;
use serde_derive::Serialize;
use serde_json::Value;

use super::Filter;
use super::HistoryRecord;
use super::SessionsData;

/// Session and user identity attached to every outbound frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameContext {
    pub session_id: String,
    pub user_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryContent {
    Text(String),
    Values(BTreeMap<String, String>),
}

#[derive(Clone, Debug, Serialize)]
pub struct OutboundFrame {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<QueryContent>,
    pub data: FrameContext,
}

impl OutboundFrame {
    pub fn connect(context: FrameContext) -> OutboundFrame {
        return OutboundFrame {
            kind: "connect".to_string(),
            message_id: None,
            content: None,
            data: context,
        };
    }

    pub fn query(message_id: &str, text: &str, context: FrameContext) -> OutboundFrame {
        return OutboundFrame {
            kind: "query".to_string(),
            message_id: Some(message_id.to_string()),
            content: Some(QueryContent::Text(text.to_string())),
            data: context,
        };
    }

    pub fn filter_values(
        message_id: &str,
        values: BTreeMap<String, String>,
        context: FrameContext,
    ) -> OutboundFrame {
        return OutboundFrame {
            kind: "query".to_string(),
            message_id: Some(message_id.to_string()),
            content: Some(QueryContent::Values(values)),
            data: context,
        };
    }

    pub fn cancel(context: FrameContext) -> OutboundFrame {
        return OutboundFrame {
            kind: "cancel".to_string(),
            message_id: None,
            content: None,
            data: context,
        };
    }

    pub fn chat_history(context: FrameContext) -> OutboundFrame {
        return OutboundFrame {
            kind: "get_chat_history".to_string(),
            message_id: None,
            content: None,
            data: context,
        };
    }

    pub fn ping(context: FrameContext) -> OutboundFrame {
        return OutboundFrame {
            kind: "ping".to_string(),
            message_id: None,
            content: None,
            data: context,
        };
    }
}

/// The common payload fields a frame may carry, regardless of whether the
/// server nested them under `data` or `result`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct FrameFields {
    pub message_id: Option<String>,
    pub message: Option<String>,
    pub step: Option<String>,
    pub filters: Option<Vec<Filter>>,
    pub sessions_data: Option<SessionsData>,
    pub session_id: Option<String>,
    pub title: Option<String>,
    pub chart_suggestions: Option<Value>,
    pub raw_result: Option<Value>,
    pub detailed_formatted_result: Option<Value>,
    pub detailed_raw_result: Option<Value>,
    pub is_warehouse_query: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct HistoryData {
    pub messages: Vec<Value>,
}

/// Serde image of one raw inbound frame. Older server builds nest the
/// payload under `result`, newer ones under `data`; both deserialize here
/// and collapse in [`InboundFrame::normalize`].
#[derive(Clone, Debug, Deserialize)]
pub struct InboundFrame {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub update_type: Option<String>,
    #[serde(default)]
    pub data: Option<FrameFields>,
    #[serde(default)]
    pub result: Option<FrameFields>,
    #[serde(default)]
    pub sessions_data: Option<SessionsData>,
    #[serde(default)]
    pub history_data: Option<HistoryData>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Canonical event, one variant per recognized frame kind.
pub enum ServerEvent {
    Connected {
        sessions_data: Option<SessionsData>,
    },
    Progress {
        update_type: Option<String>,
        timestamp: Option<String>,
        fields: FrameFields,
    },
    QueryCompleted {
        fields: FrameFields,
    },
    ChatHistory {
        records: Vec<HistoryRecord>,
    },
    Ignored,
}

impl InboundFrame {
    pub fn decode(payload: Value) -> Option<InboundFrame> {
        return serde_json::from_value(payload).ok();
    }

    /// Collapses the two legacy payload locations into one canonical event.
    /// `data` wins when both sub-objects are present.
    pub fn normalize(self) -> ServerEvent {
        let fields = self.data.or(self.result).unwrap_or_default();

        match self.kind.as_str() {
            "connected" => {
                return ServerEvent::Connected {
                    sessions_data: self.sessions_data.or(fields.sessions_data),
                };
            }
            "progress" => {
                return ServerEvent::Progress {
                    update_type: self.update_type,
                    timestamp: self.timestamp,
                    fields,
                };
            }
            "query_completed" => {
                return ServerEvent::QueryCompleted { fields };
            }
            "chat_history_response" => {
                let history = match self.history_data {
                    Some(history) => history,
                    None => return ServerEvent::Ignored,
                };

                // A batch may mix server generations; records that no longer
                // parse are skipped rather than poisoning the replay.
                let records = history
                    .messages
                    .into_iter()
                    .filter_map(|record| return serde_json::from_value(record).ok())
                    .collect::<Vec<HistoryRecord>>();

                return ServerEvent::ChatHistory { records };
            }
            _ => {
                return ServerEvent::Ignored;
            }
        }
    }
}

use serde_derive::Deserialize;
use serde_derive::Serialize;

/// Descriptor for one structured parameter the server still needs before it
/// can finish a query.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub column: String,
    pub name: String,
    pub table: String,
    #[serde(rename = "type")]
    pub filter_type: String,
    pub is_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterRequest {
    pub message_id: String,
    pub filters: Vec<Filter>,
}

use serde_json::Value;

/// Transport health. The single authoritative signal driving send affordances.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    Connected,
    Disconnected,
    Error,
}

pub enum Event {
    SocketStatus(Status),
    SocketFrame(Value),
}

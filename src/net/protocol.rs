use serde::{Deserialize, Serialize};

/// Messages from us to the external lobby service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Ask for the current lobby counters
    GetLobbyStats,
}

/// Messages from the external lobby service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Greeting sent once the service accepts us
    Connected,
    /// Lobby counters
    LobbyUpdate(LobbyStats),
}

/// Lobby counters as reported by the external service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyStats {
    pub online: u32,
    pub waiting: u32,
    /// Not every server reports this
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_matches: Option<u32>,
}

//! Protocol definitions for daemon notify messages
//!
//! One JSON object per connection in each direction: the client writes a
//! [`NotificationMessage`], the daemon answers with a [`DaemonResponse`].

use serde::{Deserialize, Serialize};

/// Upper bound for a single request body, read in one call by the server
pub const MAX_MESSAGE_BYTES: usize = 64 * 1024;

/// Upper bound for a response body, read in one call by the client
pub const MAX_RESPONSE_BYTES: usize = 4096;

/// Notification severity, used for the bubble colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationLevel::Info => "info",
            NotificationLevel::Success => "success",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        }
    }
}

impl std::str::FromStr for NotificationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(NotificationLevel::Info),
            "success" => Ok(NotificationLevel::Success),
            "warning" | "warn" => Ok(NotificationLevel::Warning),
            "error" => Ok(NotificationLevel::Error),
            other => Err(format!("unknown level: {}", other)),
        }
    }
}

/// Notification sent by a client process to the daemon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NotificationMessage {
    /// Free text to show in the bubble (may contain template tokens)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub level: NotificationLevel,
    /// Sound file played when the bubble appears
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    /// Requested display time in seconds (informational, bubbles are click-dismissed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    /// TERM_PROGRAM style name of the terminal or editor that sent this
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller_app: Option<String>,
    /// Raw hook payload from Claude Code or Copilot CLI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hooks_json: Option<String>,
}

impl NotificationMessage {
    /// Plain text notification at the given level
    pub fn text(message: impl Into<String>, level: NotificationLevel) -> Self {
        Self {
            message: Some(message.into()),
            level,
            ..Default::default()
        }
    }

    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn decode(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

/// Daemon answer, exactly one per request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DaemonResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

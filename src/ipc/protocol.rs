//! IPC message protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian length.

use serde::{Deserialize, Serialize};

use crate::composer::{ComposerCommand, CompositionMode};
use crate::events::ComposerEvent;

/// Requests from UI to daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Request current composer status
    GetStatus,

    /// Ping to check connectivity
    Ping,

    /// Subscribe to composer event notifications
    Subscribe,

    /// Leave the onboarding view for the free-text editor
    StartEditing,

    /// Replace the draft with an edited value
    SetDraft { content: String },

    /// Submit the current draft as a note
    Submit,

    /// Start a dictation session
    StartRecording,

    /// Stop the live dictation session
    StopRecording,
}

impl Request {
    /// The composer command this request carries, if any
    pub fn to_command(&self) -> Option<ComposerCommand> {
        match self {
            Request::StartEditing => Some(ComposerCommand::StartEditing),
            Request::SetDraft { content } => Some(ComposerCommand::SetDraft {
                content: content.clone(),
            }),
            Request::Submit => Some(ComposerCommand::Submit),
            Request::StartRecording => Some(ComposerCommand::StartRecording),
            Request::StopRecording => Some(ComposerCommand::StopRecording),
            Request::GetStatus | Request::Ping | Request::Subscribe => None,
        }
    }
}

/// Responses from daemon to UI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Current composer status
    Status(ComposerStatus),

    /// Pong response to ping
    Pong,

    /// Subscription confirmed
    Subscribed,

    /// Command forwarded to the composer
    Accepted,

    /// Error response
    Error { code: String, message: String },
}

/// Push notification from daemon to UI (for subscribed clients)
///
/// Adjacently tagged: the payload keeps its own `type` tag, so it cannot
/// collide with the notification envelope's.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "event", rename_all = "snake_case")]
pub enum Notification {
    /// Composer event occurred
    Event(ComposerEvent),
}

/// Full composer status snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposerStatus {
    /// Daemon version
    pub version: String,

    /// Current composition mode
    pub mode: CompositionMode,

    /// Whether a dictation session is live
    pub recording: bool,

    /// Whether the speech engine can open sessions on this host
    pub dictation_available: bool,

    /// Uptime in seconds
    pub uptime_secs: u64,
}

impl Default for ComposerStatus {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            mode: CompositionMode::default(),
            recording: false,
            dictation_available: false,
            uptime_secs: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let req = Request::SetDraft {
            content: "Buy milk".to_string(),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("set_draft"));
        assert!(json.contains("Buy milk"));
    }

    #[test]
    fn test_response_serialization() {
        let resp = Response::Status(ComposerStatus::default());
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("status"));
        assert!(json.contains("onboarding"));
    }

    #[test]
    fn test_notification_serialization() {
        let notification = Notification::Event(ComposerEvent::NoteCreated {
            content: "Buy milk".to_string(),
        });
        let json = serde_json::to_string(&notification).unwrap();
        assert!(json.contains("event"));
        assert!(json.contains("note_created"));
    }

    #[test]
    fn test_command_extraction() {
        assert_eq!(
            Request::Submit.to_command(),
            Some(ComposerCommand::Submit)
        );
        assert_eq!(
            Request::SetDraft {
                content: "x".to_string()
            }
            .to_command(),
            Some(ComposerCommand::SetDraft {
                content: "x".to_string()
            })
        );
        assert_eq!(Request::Ping.to_command(), None);
        assert_eq!(Request::Subscribe.to_command(), None);
    }
}

//! Composer event stream
//!
//! Everything externally observable about the composer is emitted as a
//! `ComposerEvent` on a broadcast channel: mode transitions, dictation-driven
//! draft updates, created notes, and user-facing toasts. The IPC layer relays
//! these to subscribed clients; note consumers listen for `NoteCreated`,
//! which fires exactly once per successful submission.

use serde::{Deserialize, Serialize};

use crate::composer::CompositionMode;

/// Severity of a user-facing toast notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastLevel {
    Success,
    Error,
}

impl std::fmt::Display for ToastLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToastLevel::Success => write!(f, "success"),
            ToastLevel::Error => write!(f, "error"),
        }
    }
}

/// Events emitted by the composer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComposerEvent {
    /// Composition mode changed
    ModeChanged {
        from: CompositionMode,
        to: CompositionMode,
        /// Milliseconds spent in the mode being left
        duration_ms: u64,
    },

    /// The draft was replaced by a dictation transcript
    DraftChanged { content: String },

    /// A note was submitted successfully
    NoteCreated { content: String },

    /// Fire-and-forget user notification; rendering is the client's concern
    Toast { level: ToastLevel, message: String },
}

impl std::fmt::Display for ComposerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComposerEvent::ModeChanged {
                from,
                to,
                duration_ms,
            } => write!(f, "MODE_CHANGED ({from} -> {to}, {duration_ms}ms)"),
            ComposerEvent::DraftChanged { content } => {
                write!(f, "DRAFT_CHANGED ({} chars)", content.chars().count())
            }
            ComposerEvent::NoteCreated { content } => {
                write!(f, "NOTE_CREATED ({} chars)", content.chars().count())
            }
            ComposerEvent::Toast { level, message } => {
                write!(f, "TOAST ({level}: {message})")
            }
        }
    }
}

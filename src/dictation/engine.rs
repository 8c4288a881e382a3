//! Speech engine capability interface.
//!
//! The composer never talks to a platform recognizer directly; everything
//! goes through [`SpeechEngine`], so hosts without a recognizer degrade to a
//! user-visible "unavailable" failure and tests can drive the composer with a
//! deterministic double.

use thiserror::Error;
use tokio::sync::mpsc;

use super::transcript::DictationEvent;

/// Settings for a single dictation session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// BCP-47 language tag to recognize.
    pub language: String,
    /// Keep listening across pauses instead of ending at the first phrase.
    pub continuous: bool,
    /// Deliver interim snapshots while a phrase is still in progress.
    pub interim_results: bool,
    /// Maximum candidate transcripts per result.
    pub max_alternatives: u8,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            language: "pt-BR".to_string(),
            continuous: true,
            interim_results: true,
            max_alternatives: 1,
        }
    }
}

/// Errors that can occur when opening a dictation session
#[derive(Debug, Error)]
pub enum DictationError {
    #[error("no speech recognition engine is available")]
    Unavailable,

    #[error("failed to open dictation session: {0}")]
    SessionOpen(String),
}

/// Handle to a live dictation session.
///
/// The holder owns the session exclusively; there is no shared global slot.
/// Stopping is idempotent, but the session is not stopped on drop, so holders
/// must release it explicitly.
pub trait DictationSession: Send + std::fmt::Debug {
    /// Stop the session and its event delivery. Idempotent.
    fn stop(&mut self);

    /// Whether the session is still listening.
    fn is_active(&self) -> bool;
}

/// Injected speech-to-text capability.
pub trait SpeechEngine: Send {
    /// Engine name for logs and status output.
    fn name(&self) -> &'static str;

    /// Whether this engine can open sessions on this host.
    fn is_available(&self) -> bool;

    /// Open a recognition session.
    ///
    /// Events are delivered on `events_tx` until the returned handle is
    /// stopped. Single-session-at-a-time is enforced by the caller, which
    /// holds the handle.
    fn open_session(
        &mut self,
        config: &SessionConfig,
        events_tx: mpsc::Sender<DictationEvent>,
    ) -> Result<Box<dyn DictationSession>, DictationError>;
}

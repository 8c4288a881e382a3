//! Core note composition state machine
//!
//! Handles transitions between Onboarding, Editing, and Recording based on
//! UI commands and dictation events, and owns the draft text plus the live
//! dictation session handle.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

use crate::dictation::{
    assemble_transcript, DictationEvent, DictationSession, RecognitionResult, SessionConfig,
    SpeechEngine,
};
use crate::events::{ComposerEvent, ToastLevel};

const EMPTY_SUBMISSION_MSG: &str = "Note content cannot be empty.";
const DICTATION_UNAVAILABLE_MSG: &str = "Speech recognition is not available.";
const NOTE_SAVED_MSG: &str = "Note saved.";

/// The three views of the note dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionMode {
    /// No draft yet, instructional copy is shown
    Onboarding,
    /// Free-text editor with a draft in progress
    Editing,
    /// A live dictation session is feeding the draft
    Recording,
}

impl Default for CompositionMode {
    fn default() -> Self {
        Self::Onboarding
    }
}

impl std::fmt::Display for CompositionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompositionMode::Onboarding => write!(f, "onboarding"),
            CompositionMode::Editing => write!(f, "editing"),
            CompositionMode::Recording => write!(f, "recording"),
        }
    }
}

/// UI-originated commands, delivered over the composer's command channel
#[derive(Debug, Clone, PartialEq)]
pub enum ComposerCommand {
    /// Leave the onboarding view for the free-text editor
    StartEditing,
    /// Replace the draft with an edited value
    SetDraft { content: String },
    /// Submit the draft as a note
    Submit,
    /// Open a dictation session
    StartRecording,
    /// Stop the live dictation session
    StopRecording,
}

/// The state machine that manages note composition
pub struct Composer {
    /// Current mode
    mode: CompositionMode,
    /// The note in progress
    draft: String,
    /// Live dictation session, if any. Single slot, exclusively owned here:
    /// `Recording` holds a session, every other mode holds none.
    session: Option<Box<dyn DictationSession>>,
    /// Injected speech-to-text capability
    engine: Box<dyn SpeechEngine>,
    /// Settings applied to every session this composer opens
    session_config: SessionConfig,
    /// Sender handed to each session for result/error delivery
    dictation_tx: mpsc::Sender<DictationEvent>,
    /// Time when the current mode was entered
    mode_entered_at: Instant,
    /// Channel for emitting composer events
    event_tx: broadcast::Sender<ComposerEvent>,
}

impl Composer {
    /// Create a new composer in the onboarding mode with an empty draft
    pub fn new(
        engine: Box<dyn SpeechEngine>,
        session_config: SessionConfig,
        dictation_tx: mpsc::Sender<DictationEvent>,
        event_tx: broadcast::Sender<ComposerEvent>,
    ) -> Self {
        Self {
            mode: CompositionMode::Onboarding,
            draft: String::new(),
            session: None,
            engine,
            session_config,
            dictation_tx,
            mode_entered_at: Instant::now(),
            event_tx,
        }
    }

    /// Get the current mode
    pub fn mode(&self) -> CompositionMode {
        self.mode
    }

    /// Get the current draft text
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Whether a dictation session is live
    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the injected engine can open sessions at all
    pub fn dictation_available(&self) -> bool {
        self.engine.is_available()
    }

    /// Run the composer, processing UI commands and dictation events until
    /// the command channel closes
    pub async fn run(
        &mut self,
        mut command_rx: mpsc::Receiver<ComposerCommand>,
        mut dictation_rx: mpsc::Receiver<DictationEvent>,
    ) {
        info!(mode = %self.mode, "composer started");

        loop {
            tokio::select! {
                command = command_rx.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(event) = dictation_rx.recv() => self.handle_dictation_event(event),
            }
        }

        info!("composer stopped");
    }

    /// Handle a single UI command
    pub fn handle_command(&mut self, command: ComposerCommand) {
        debug!(?command, mode = %self.mode, "handling command");
        match command {
            ComposerCommand::StartEditing => self.start_editing(),
            ComposerCommand::SetDraft { content } => self.set_draft(content),
            ComposerCommand::Submit => self.submit(),
            ComposerCommand::StartRecording => self.start_recording(),
            ComposerCommand::StopRecording => self.stop_recording(),
        }
    }

    /// Handle an event from the live dictation session
    pub fn handle_dictation_event(&mut self, event: DictationEvent) {
        match event {
            DictationEvent::Result { results } => self.apply_transcript(&results),
            DictationEvent::Error { message } => {
                // Diagnostic only: the session stays live and the user is
                // not interrupted.
                error!(%message, "dictation engine reported an error");
            }
        }
    }

    /// Release a live dictation session on daemon teardown
    pub fn shutdown(&mut self) {
        if self.release_session() {
            self.transition_to(CompositionMode::Editing);
        }
    }

    fn start_editing(&mut self) {
        if self.mode == CompositionMode::Onboarding {
            self.transition_to(CompositionMode::Editing);
        } else {
            debug!(mode = %self.mode, "start_editing ignored");
        }
    }

    fn set_draft(&mut self, content: String) {
        self.draft = content;
        match self.mode {
            CompositionMode::Editing if self.draft.is_empty() => {
                self.transition_to(CompositionMode::Onboarding);
            }
            CompositionMode::Onboarding if !self.draft.is_empty() => {
                self.transition_to(CompositionMode::Editing);
            }
            _ => {}
        }
    }

    fn submit(&mut self) {
        if self.draft.trim().is_empty() {
            debug!("rejecting submission of empty draft");
            self.toast(ToastLevel::Error, EMPTY_SUBMISSION_MSG);
            return;
        }

        // Submission finalizes dictation along with the note.
        self.release_session();

        let content = std::mem::take(&mut self.draft);
        info!(chars = content.chars().count(), "note submitted");
        self.emit(ComposerEvent::NoteCreated { content });

        self.transition_to(CompositionMode::Onboarding);
        self.toast(ToastLevel::Success, NOTE_SAVED_MSG);
    }

    fn start_recording(&mut self) {
        if self.session.is_some() {
            debug!("dictation session already live, ignoring start");
            return;
        }

        if !self.engine.is_available() {
            warn!(engine = self.engine.name(), "dictation requested but engine is unavailable");
            self.toast(ToastLevel::Error, DICTATION_UNAVAILABLE_MSG);
            return;
        }

        match self
            .engine
            .open_session(&self.session_config, self.dictation_tx.clone())
        {
            Ok(session) => {
                info!(
                    engine = self.engine.name(),
                    language = %self.session_config.language,
                    "dictation session opened"
                );
                self.session = Some(session);
                self.transition_to(CompositionMode::Recording);
            }
            Err(e) => {
                error!(error = %e, "failed to open dictation session");
                self.toast(ToastLevel::Error, DICTATION_UNAVAILABLE_MSG);
            }
        }
    }

    fn stop_recording(&mut self) {
        if !self.release_session() {
            debug!("no dictation session to stop");
            return;
        }
        self.transition_to(CompositionMode::Editing);
    }

    /// Stop and drop the live session, if any. Returns whether one was held.
    fn release_session(&mut self) -> bool {
        match self.session.take() {
            Some(mut session) => {
                session.stop();
                info!("dictation session released");
                true
            }
            None => false,
        }
    }

    fn apply_transcript(&mut self, results: &[RecognitionResult]) {
        if self.session.is_none() {
            debug!("dropping transcript for a stopped session");
            return;
        }

        // Each event carries the full transcript so far: replace, not append.
        self.draft = assemble_transcript(results);
        debug!(chars = self.draft.chars().count(), "draft updated from dictation");
        self.emit(ComposerEvent::DraftChanged {
            content: self.draft.clone(),
        });
    }

    /// Perform a mode transition
    fn transition_to(&mut self, new_mode: CompositionMode) {
        if new_mode == self.mode {
            return;
        }

        let from = self.mode;
        let duration_ms = self.mode_entered_at.elapsed().as_millis() as u64;

        info!(
            from = %from,
            to = %new_mode,
            duration_ms = duration_ms,
            "mode transition"
        );

        self.mode = new_mode;
        self.mode_entered_at = Instant::now();

        self.emit(ComposerEvent::ModeChanged {
            from,
            to: new_mode,
            duration_ms,
        });
    }

    fn toast(&self, level: ToastLevel, message: &str) {
        self.emit(ComposerEvent::Toast {
            level,
            message: message.to_string(),
        });
    }

    fn emit(&self, event: ComposerEvent) {
        debug!(?event, "emitting event");
        let _ = self.event_tx.send(event);
    }
}

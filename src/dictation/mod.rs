//! Dictation bridge module
//!
//! Puts the external speech-to-text capability behind the `SpeechEngine`
//! trait so the composer can be driven by a real recognizer, the built-in
//! simulator, or a test double, and owns the result/error event types that
//! sessions stream back.

mod engine;
mod simulated;
mod transcript;

pub use engine::{DictationError, DictationSession, SessionConfig, SpeechEngine};
pub use simulated::{NullEngine, SimulatedEngine};
pub use transcript::{
    assemble_transcript, DictationEvent, RecognitionAlternative, RecognitionResult,
};

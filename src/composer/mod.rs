//! Note composition module
//!
//! Provides an explicit state machine with three modes:
//! - Onboarding: no draft yet, instructional copy is shown
//! - Editing: free-text entry with a draft in progress
//! - Recording: a live dictation session is feeding the draft

mod machine;

pub use machine::{Composer, ComposerCommand, CompositionMode};
